//! Extraction, aggregation, validation and publishing of gettext catalogs.
//!
//! Messages are pulled out of every branch of a git checkout, merged with
//! word lists and existing templates into one `.pot` per domain, and later
//! combined with translated `.po` files into `.mo`, JavaScript or Java
//! artifacts.

pub mod aggregator;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod locale;
pub mod logging;
pub mod merger;
pub mod msgformat;
pub mod output;
pub mod patterns;
pub mod process;
pub mod reverse;
pub mod scanner;
pub mod validator;
pub mod vcs;

pub use error::{Error, Result};
