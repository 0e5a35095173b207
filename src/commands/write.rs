use anyhow::{bail, Context, Result};
use std::path::Path;

use crate::config::Project;
use crate::fs::RealFileSystem;
use crate::merger::MergeOptions;
use crate::output;

pub fn run(
    project: &Project,
    project_id: &str,
    output_dir: &Path,
    valid_only: bool,
    include_fuzzy: bool,
) -> Result<()> {
    println!("=== gettext-turbo write ===\n");

    if !output_dir.is_dir() {
        bail!(
            "configuration error: output directory {} does not exist",
            output_dir.display()
        );
    }

    println!("Configuration:");
    println!("  Project: {}", project_id);
    println!("  Output: {}", output_dir.display());
    println!("  Valid only: {}", valid_only);
    println!("  Include fuzzy: {}", include_fuzzy);
    println!();

    let options = MergeOptions {
        valid_only,
        include_fuzzy,
    };
    let written = output::write_translations(project, project_id, output_dir, options, &RealFileSystem)
        .with_context(|| format!("Failed to write translations for {}", project_id))?;

    println!("Wrote {} catalog(s).", written);
    println!("\nDone!");
    Ok(())
}
