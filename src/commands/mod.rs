pub mod generate;
pub mod validate;
pub mod write;
