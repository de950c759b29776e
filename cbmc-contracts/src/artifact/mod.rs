//! Artifact layout
//!
//! ```text
//! {build_dir}/cbmc/{source}.goto              compiled artifact
//! {build_dir}/cbmc/{source}.goto::{f}.goto    harness for function f
//! ```
//!
//! Paths are handed to tools exactly as built here; they are relative
//! whenever the build directory is. Nothing at these paths is trusted across
//! runs: each is deleted before the tool that produces it runs.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{CheckError, Result};

/// Subdirectory of the build directory holding all goto binaries
pub const ARTIFACT_DIR: &str = "cbmc";

/// Compiled artifact path for a source file relative to the working root
pub fn artifact_path(build_dir: &Path, source: &Path) -> PathBuf {
    let mut name = build_dir.join(ARTIFACT_DIR).join(source).into_os_string();
    name.push(".goto");
    PathBuf::from(name)
}

/// Harness path for `function`, derived from its artifact path
pub fn harness_path(artifact: &Path, function: &str) -> PathBuf {
    let mut name = OsString::from(artifact.as_os_str());
    name.push("::");
    name.push(function);
    name.push(".goto");
    PathBuf::from(name)
}

/// Remove whatever a previous run left at `path` and make sure its parent
/// directory exists, so the next tool writes a fresh file.
pub fn prepare_output(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| CheckError::io(parent, e))?;
    }

    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CheckError::io(path, e)),
    }
}
