//! Run configuration
//!
//! One immutable value threaded through every stage. Nothing below `main`
//! looks at the process working directory or the environment.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Default build directory, relative to the working root
pub const DEFAULT_BUILD_DIR: &str = "build";

/// External CBMC programs invoked during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Compiler producing goto binaries, also used to relink harnesses
    pub goto_cc: String,
    /// Listing and instrumentation tool
    pub goto_instrument: String,
    /// Harness generator
    pub goto_harness: String,
    /// The model checker
    pub cbmc: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            goto_cc: "goto-cc".to_string(),
            goto_instrument: "goto-instrument".to_string(),
            goto_harness: "goto-harness".to_string(),
            cbmc: "cbmc".to_string(),
        }
    }
}

/// Configuration for one contract checking run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Absolute directory every requested path must live under.
    /// Tools run with this as their current directory.
    pub working_root: PathBuf,
    /// Directory holding `compile_commands.json` and the `cbmc/` artifact tree.
    /// May be relative to `working_root`.
    pub build_dir: PathBuf,
    /// Restricts which contracts are enforced; `None` enforces everything found
    pub allow_list: Option<BTreeSet<String>>,
    /// Programs to invoke
    pub toolchain: Toolchain,
}

impl RunConfig {
    /// Create a configuration rooted at `working_root` with defaults
    pub fn new(working_root: impl Into<PathBuf>) -> Self {
        Self {
            working_root: working_root.into(),
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            allow_list: None,
            toolchain: Toolchain::default(),
        }
    }

    /// Set the build directory
    pub fn build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = dir.into();
        self
    }

    /// Only enforce the named contracts. An empty iterator clears the filter.
    pub fn allow_contracts<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        self.allow_list = if names.is_empty() { None } else { Some(names) };
        self
    }

    /// Set the external programs
    pub fn toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Location of the compilation database
    pub fn compile_db_path(&self) -> PathBuf {
        self.resolve(&self.build_dir).join("compile_commands.json")
    }

    /// Anchor a possibly relative path at the working root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.working_root.join(path)
    }
}
