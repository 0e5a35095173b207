use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the extraction, merge and output pipeline.
///
/// Per-entry validation failures are not represented here: they are values
/// (see [`crate::validator::Validity`]) that get counted, never propagated.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing base directory, config file, or malformed configuration value.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An extraction pattern could not be compiled.
    #[error("invalid extraction pattern `{pattern}` for .{extension}: {message}")]
    Extraction {
        extension: String,
        pattern: String,
        message: String,
    },

    /// An external tool exited unsuccessfully (or could not be spawned).
    #[error("command `{command}` in {cwd} failed with code {code}: {stderr}")]
    ToolInvocation {
        command: String,
        cwd: String,
        code: i32,
        stderr: String,
    },

    /// A write invocation matched no output at all.
    #[error("project {project} not found or did not write any translations")]
    ProducedNothing { project: String },

    /// Two source files tried to feed the same locale's reverse map.
    #[error("multi-source reverse translations are not supported ({domain} / {locale})")]
    ReverseMapConflict { domain: String, locale: String },

    /// A two-letter language code missing from the territory table.
    #[error("unknown language code: {0}")]
    UnknownLanguage(String),

    /// A catalog file could not be read or written.
    #[error("catalog {path}: {message}")]
    Catalog { path: PathBuf, message: String },

    /// A lifecycle hook reported failure.
    #[error("{phase} hook failed: {message}")]
    Hook { phase: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn catalog(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Catalog {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
