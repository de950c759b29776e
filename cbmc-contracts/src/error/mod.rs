//! Error types
//!
//! Every failure is fatal to the run. Nothing here is retried or aggregated;
//! the driver stops at the first error and hands it back to `main`.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, CheckError>;

/// Contract checking error
#[derive(Debug, Error)]
pub enum CheckError {
    /// Bad request: path outside the working root, file missing from the
    /// compilation database, unusable compile command.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// `compile_commands.json` could not be parsed
    #[error("Invalid compilation database {}: {source}", .path.display())]
    CompileDb {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The compiled artifact contradicts itself (duplicate alias bindings).
    /// Points at a toolchain anomaly, not at a contract violation.
    #[error("Internal consistency error: {message}")]
    InternalConsistency { message: String },

    /// External tool exited unsuccessfully
    #[error("Command failed ({}): {command}", describe_code(.code))]
    ToolFailure { command: String, code: Option<i32> },

    /// External tool could not be started
    #[error("Failed to run `{command}`: {source}")]
    ToolSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

impl CheckError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalConsistency {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit status for this error.
    ///
    /// A failing tool's own exit code is propagated when it is a usable
    /// non-zero status; everything else exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ToolFailure {
                code: Some(code), ..
            } if *code > 0 && *code < 256 => *code,
            _ => 1,
        }
    }
}
