//! Source resolver
//!
//! Turns the files and directories named on the command line into
//! compilation database entries, with paths relative to the working root.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::compdb::{CompileDatabase, CompileEntry};
use crate::error::{CheckError, Result};
use crate::util::{absolutize, relative_to};

/// A source file selected for checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    /// Path relative to the working root; keys the artifact tree
    pub relative: PathBuf,
    /// How the file is normally compiled
    pub entry: CompileEntry,
}

/// Maps requested paths to the source files to check
pub trait SourceResolver {
    /// Resolve `requested` (files or directories) in order, without duplicates.
    /// An empty request means everything under the working root.
    fn resolve(&self, requested: &[PathBuf]) -> Result<Vec<ResolvedSource>>;
}

/// Resolver backed by a compilation database
#[derive(Debug)]
pub struct CompileDbResolver<'a> {
    root: PathBuf,
    db: &'a CompileDatabase,
}

impl<'a> CompileDbResolver<'a> {
    /// `root` must be absolute
    pub fn new(root: &Path, db: &'a CompileDatabase) -> Self {
        Self {
            root: absolutize(Path::new("/"), root),
            db,
        }
    }

    fn relative(&self, absolute: &Path) -> Result<PathBuf> {
        relative_to(absolute, &self.root).ok_or_else(|| {
            CheckError::config(format!(
                "File path {} is not under working directory {}",
                absolute.display(),
                self.root.display()
            ))
        })
    }

    fn resolve_one(&self, requested: &Path, out: &mut Vec<ResolvedSource>) -> Result<()> {
        let absolute = absolutize(&self.root, requested);
        let relative = self.relative(&absolute)?;

        if self.root.join(&relative).is_dir() {
            for entry in self.db.entries() {
                let file = entry.absolute_file();
                if file.starts_with(&absolute) {
                    out.push(ResolvedSource {
                        relative: self.relative(&file)?,
                        entry: entry.clone(),
                    });
                }
            }
            return Ok(());
        }

        let entry = self.db.find(&absolute).ok_or_else(|| {
            CheckError::config(format!(
                "File {} not found in compile_commands.json",
                relative.display()
            ))
        })?;
        out.push(ResolvedSource {
            relative,
            entry: entry.clone(),
        });
        Ok(())
    }
}

impl SourceResolver for CompileDbResolver<'_> {
    fn resolve(&self, requested: &[PathBuf]) -> Result<Vec<ResolvedSource>> {
        let default = [PathBuf::from(".")];
        let requested = if requested.is_empty() {
            &default[..]
        } else {
            requested
        };

        let mut found = Vec::new();
        for path in requested {
            self.resolve_one(path, &mut found)?;
        }

        let mut seen = HashSet::new();
        found.retain(|source| seen.insert(source.relative.clone()));
        Ok(found)
    }
}
