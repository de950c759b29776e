//! Compilation database
//!
//! Reads `compile_commands.json` as produced by CMake, Meson or Bear. Each
//! entry carries either an `arguments` vector or a shell-quoted `command`
//! string; both are reduced to a plain argument vector.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{CheckError, Result};
use crate::util::absolutize;

/// One translation unit of the compilation database
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompileEntry {
    /// Working directory of the original compilation
    pub directory: PathBuf,
    /// Source file, possibly relative to `directory`
    pub file: PathBuf,
    /// Pre-split argument vector
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
    /// Shell-quoted command line, used when `arguments` is absent
    #[serde(default)]
    pub command: Option<String>,
}

impl CompileEntry {
    /// Normalized absolute path of the source file
    pub fn absolute_file(&self) -> PathBuf {
        absolutize(&self.directory, &self.file)
    }

    /// The compiler invocation as an argument vector.
    ///
    /// `arguments` wins over `command`. An entry with neither, an empty
    /// vector, or unbalanced shell quoting is unusable.
    pub fn argv(&self) -> Result<Vec<String>> {
        let argv = match (&self.arguments, &self.command) {
            (Some(arguments), _) => arguments.clone(),
            (None, Some(command)) => shlex::split(command).ok_or_else(|| {
                CheckError::config(format!(
                    "Cannot split compile command for {}: {}",
                    self.file.display(),
                    command
                ))
            })?,
            (None, None) => Vec::new(),
        };

        if argv.is_empty() {
            return Err(CheckError::config(format!(
                "Compilation database entry for {} has no compile command",
                self.file.display()
            )));
        }

        Ok(argv)
    }
}

/// Ordered list of compilation database entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct CompileDatabase {
    entries: Vec<CompileEntry>,
}

impl CompileDatabase {
    /// Load a database from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CheckError::io(path, e))?;
        Self::parse(path, &text)
    }

    /// Parse database text; `origin` is only used in error messages
    pub fn parse(origin: &Path, text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| CheckError::CompileDb {
            path: origin.to_path_buf(),
            source,
        })
    }

    pub fn from_entries(entries: Vec<CompileEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CompileEntry] {
        &self.entries
    }

    /// First entry whose absolute source path equals `file`.
    /// `file` must already be absolute and normalized.
    pub fn find(&self, file: &Path) -> Option<&CompileEntry> {
        self.entries.iter().find(|e| e.absolute_file() == file)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
