use anyhow::{bail, Result};

use crate::config::Project;
use crate::fs::RealFileSystem;
use crate::validator::Validator;

pub fn run(project: &Project) -> Result<()> {
    println!("=== gettext-turbo validate ===\n");

    let errors = Validator::default().validate_translations(project, &RealFileSystem)?;

    if errors > 0 {
        bail!("{} invalid translation(s) found", errors);
    }

    println!("All translations are valid.");
    Ok(())
}
