use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;
use tracing::{debug, error};

use crate::error::{Error, Result};

/// Run an external tool to completion and return its stdout.
///
/// The child sees only `PATH`, `HOME`, `LANG=C.UTF-8` and `extra_env`. All three
/// standard streams are released when `output()` returns, on success or failure.
/// A non-zero exit is an [`Error::ToolInvocation`] carrying the captured stderr.
pub fn run<I, S>(program: &str, args: I, cwd: &Path, extra_env: &[(&str, String)]) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<S> = args.into_iter().collect();
    let command_line = describe(program, &args);
    debug!("Running {} in {}", command_line, cwd.display());

    let mut command = Command::new(program);
    command.args(&args).current_dir(cwd).env_clear().env("LANG", "C.UTF-8");
    for key in ["PATH", "HOME"] {
        if let Some(value) = std::env::var_os(key) {
            command.env(key, value);
        }
    }
    for (key, value) in extra_env {
        command.env(key, value);
    }

    let output = command.output().map_err(|e| Error::ToolInvocation {
        command: command_line.clone(),
        cwd: cwd.display().to_string(),
        code: -1,
        stderr: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        error!("{}", stderr.trim_end());
        return Err(Error::ToolInvocation {
            command: command_line,
            cwd: cwd.display().to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn describe<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(&arg.as_ref().to_string_lossy());
    }
    line
}
