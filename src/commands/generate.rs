use anyhow::{Context, Result};

use crate::aggregator::Aggregator;
use crate::config::Project;
use crate::fs::RealFileSystem;
use crate::vcs::GitCli;

pub fn run(project: &mut Project) -> Result<()> {
    println!("=== gettext-turbo generate ===\n");

    println!("Configuration:");
    println!("  Base directory: {}", project.base_dir().display());
    println!("  Domains: {:?}", project.domains());
    println!();

    let fs = RealFileSystem;
    let vcs = GitCli;
    let written = Aggregator::new(&vcs, &fs)
        .write_sources(project)
        .context("Failed to build message catalogs")?;

    println!("Generated catalogs:");
    for path in &written {
        println!("  {}", path.display());
    }

    println!("\nDone!");
    Ok(())
}
