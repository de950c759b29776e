//! Shared utility functions
//!
//! Lexical path handling used by the resolver and the compilation database.
//! None of these touch the filesystem, so paths to files that do not exist
//! yet (or no longer exist) behave the same as real ones.

use std::path::{Component, Path, PathBuf};

/// Fold `.` and `..` components without resolving symlinks.
///
/// `..` at the root stays at the root, matching `os.path.abspath`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Make `path` absolute against `base`, then normalize it
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    normalize_path(&base.join(path))
}

/// `path` relative to `root`, when `path` lies under `root`.
///
/// Both arguments are expected to be normalized. Matching is per component,
/// so `/work/src2` is not under `/work/src`.
pub fn relative_to(path: &Path, root: &Path) -> Option<PathBuf> {
    path.strip_prefix(root).ok().map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_dots() {
        assert_eq!(
            normalize_path(Path::new("/work/./src/../lib/a.c")),
            PathBuf::from("/work/lib/a.c")
        );
    }

    #[test]
    fn test_normalize_parent_at_root() {
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_normalize_relative_keeps_leading_parent() {
        assert_eq!(normalize_path(Path::new("../a/./b")), PathBuf::from("../a/b"));
        assert_eq!(normalize_path(Path::new("a/../../../b")), PathBuf::from("../../b"));
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize(Path::new("/work"), Path::new("src/../a.c")),
            PathBuf::from("/work/a.c")
        );
        assert_eq!(
            absolutize(Path::new("/work"), Path::new("/elsewhere/a.c")),
            PathBuf::from("/elsewhere/a.c")
        );
    }

    #[test]
    fn test_relative_to_is_component_wise() {
        let root = Path::new("/work/src");
        assert_eq!(
            relative_to(Path::new("/work/src/a.c"), root),
            Some(PathBuf::from("a.c"))
        );
        assert_eq!(relative_to(Path::new("/work/src2/a.c"), root), None);
        assert_eq!(relative_to(root, root), Some(PathBuf::new()));
    }
}
