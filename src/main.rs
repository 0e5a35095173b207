use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gettext_turbo::commands;
use gettext_turbo::config::{Project, DEFAULT_CONFIG_FILE};
use gettext_turbo::logging::{self, LogLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gettext-turbo")]
#[command(author, version, about = "Gettext catalog extraction, validation and publishing", long_about = None)]
struct Cli {
    /// Base directory holding the catalogs and the configuration file
    #[arg(short, long, global = true, default_value = ".")]
    basedir: PathBuf,

    /// Path to configuration file (relative to the base directory)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level: error, warn, info or debug
    #[arg(long, global = true, default_value = "info", value_parser = parse_log_level)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every configured source and write one .pot per domain
    Generate,

    /// Merge locale catalogs and write the artifacts of one project
    Write {
        /// Project id of the outputs to write
        #[arg(short, long)]
        project: String,

        /// Directory the output directories are relative to
        #[arg(short = 'd', long)]
        project_dir: PathBuf,

        /// Drop translations that fail validation
        #[arg(short = 'x', long)]
        valid_only: bool,

        /// Keep entries flagged fuzzy
        #[arg(long)]
        include_fuzzy: bool,
    },

    /// Check every locale catalog and fail if any translation is invalid
    Validate,
}

fn parse_log_level(value: &str) -> std::result::Result<LogLevel, String> {
    LogLevel::parse(value).ok_or_else(|| format!("unknown log level: {}", value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.log_level);

    let mut project = Project::load(&cli.basedir, &cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    match cli.command {
        Commands::Generate => commands::generate::run(&mut project)?,
        Commands::Write {
            project: project_id,
            project_dir,
            valid_only,
            include_fuzzy,
        } => commands::write::run(&project, &project_id, &project_dir, valid_only, include_fuzzy)?,
        Commands::Validate => commands::validate::run(&project)?,
    }

    Ok(())
}
