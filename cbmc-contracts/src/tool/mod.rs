//! External tool invocation
//!
//! Every CBMC step is a blocking child process. `ToolRunner` is the seam the
//! driver talks to, so tests can script tool output without CBMC installed.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tracing::info;

use crate::error::{CheckError, Result};

/// A fully specified external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    /// Passed to the process byte for byte; paths are never re-encoded
    pub args: Vec<OsString>,
    /// Working directory; inherits the caller's when `None`
    pub cwd: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a path argument
    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// True if any argument equals `flag`
    pub fn has_arg(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a.as_os_str() == flag)
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// The command line as executed, space separated. Bytes that are not
/// valid UTF-8 show up as U+FFFD here only.
impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Executes external tools
pub trait ToolRunner {
    /// Run to completion; a non-zero exit is an error
    fn run(&self, cmd: &ToolCommand) -> Result<()>;

    /// Run to completion and return stdout split into lines
    fn run_lines(&self, cmd: &ToolCommand) -> Result<Vec<String>>;
}

/// Runs tools as child processes, blocking, with no timeout
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    fn spawn_error(cmd: &ToolCommand, source: std::io::Error) -> CheckError {
        CheckError::ToolSpawn {
            command: cmd.to_string(),
            source,
        }
    }

    fn check_status(cmd: &ToolCommand, status: std::process::ExitStatus) -> Result<()> {
        if status.success() {
            Ok(())
        } else {
            Err(CheckError::ToolFailure {
                command: cmd.to_string(),
                code: status.code(),
            })
        }
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, cmd: &ToolCommand) -> Result<()> {
        info!("$ {cmd}");
        let status = cmd
            .to_command()
            .status()
            .map_err(|e| Self::spawn_error(cmd, e))?;
        Self::check_status(cmd, status)
    }

    fn run_lines(&self, cmd: &ToolCommand) -> Result<Vec<String>> {
        info!("$ {cmd}");
        let Output { status, stdout, .. } = cmd
            .to_command()
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| Self::spawn_error(cmd, e))?;
        Self::check_status(cmd, status)?;
        Ok(String::from_utf8_lossy(&stdout)
            .lines()
            .map(str::to_string)
            .collect())
    }
}
