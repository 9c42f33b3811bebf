//! Path helpers for comparing and excluding roots.
//!
//! Pure string/path manipulation; nothing here touches the filesystem except
//! `start_dir_for`, which has to know whether its input is a directory. Code
//! on an interactive thread uses `file_start_dir` instead.

use std::path::{Component, Path, PathBuf};

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    } else if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Normalizes a path string for comparison.
/// - Removes trailing slashes (except for root "/")
/// - Does NOT resolve symlinks or check filesystem
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Resolves `.` and `..` components without touching the filesystem.
///
/// `..` above the root stays at the root; leading `..` of a relative path is
/// kept. An empty result becomes `.`.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Checks `dir` against `exclude_dirs` entries.
///
/// An entry names one directory exactly, or with a trailing `/*` every
/// directory strictly below it. `~` is expanded.
pub fn is_excluded(dir: &Path, exclude_dirs: &[String]) -> bool {
    exclude_dirs.iter().any(|entry| {
        let entry = normalize_path(entry);
        match entry.strip_suffix("/*") {
            Some(prefix) => {
                let prefix = expand_tilde(&normalize_path(prefix));
                dir != prefix && dir.starts_with(&prefix)
            }
            None => dir == expand_tilde(&entry),
        }
    })
}

/// Directory a walk should start from: the path itself if it is a directory,
/// otherwise its parent. Stats `path`.
pub fn start_dir_for(path: &Path) -> Option<PathBuf> {
    if path.is_dir() {
        Some(normalize_lexical(path))
    } else {
        file_start_dir(path)
    }
}

/// Start directory for a path known to name a file: its lexical parent.
pub fn file_start_dir(path: &Path) -> Option<PathBuf> {
    normalize_lexical(path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn normalize_path_removes_trailing_slash() {
        assert_eq!(normalize_path("/home/dev/project/"), "/home/dev/project");
        assert_eq!(normalize_path("/home/dev/project///"), "/home/dev/project");
    }

    #[test]
    fn normalize_path_preserves_root() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("///"), "/");
    }

    #[test]
    fn expand_tilde_uses_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~"), home);
            assert_eq!(expand_tilde("~/code"), home.join("code"));
        }
        assert_eq!(expand_tilde("/abs/~/x"), PathBuf::from("/abs/~/x"));
    }

    #[test]
    fn exact_exclusion() {
        let excludes = vec!["/tmp/scratch/".to_string()];
        assert!(is_excluded(Path::new("/tmp/scratch"), &excludes));
        assert!(!is_excluded(Path::new("/tmp/scratch/inner"), &excludes));
        assert!(!is_excluded(Path::new("/tmp"), &excludes));
    }

    #[test]
    fn subtree_exclusion_skips_the_directory_itself() {
        let excludes = vec!["/opt/vendor/*".to_string()];
        assert!(is_excluded(Path::new("/opt/vendor/lib"), &excludes));
        assert!(is_excluded(Path::new("/opt/vendor/lib/deep"), &excludes));
        assert!(!is_excluded(Path::new("/opt/vendor"), &excludes));
        assert!(!is_excluded(Path::new("/opt/vendored"), &excludes));
    }

    #[test]
    fn tilde_exclusion() {
        if let Some(home) = dirs::home_dir() {
            let excludes = vec!["~/.cargo/*".to_string()];
            assert!(is_excluded(&home.join(".cargo/registry"), &excludes));
            assert!(!is_excluded(&home.join("code"), &excludes));
        }
    }

    #[test]
    fn start_dir_for_file_and_directory() {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let file = tmp.path().join("main.rs");
        fs_err::write(&file, "").expect("Failed to create file");

        assert_eq!(start_dir_for(tmp.path()), Some(tmp.path().to_path_buf()));
        assert_eq!(start_dir_for(&file), Some(tmp.path().to_path_buf()));
        assert_eq!(start_dir_for(Path::new("main.rs")), None);
    }

    #[test]
    fn normalize_lexical_resolves_dot_components() {
        assert_eq!(
            normalize_lexical(Path::new("/code/app/src/../lib/./x")),
            PathBuf::from("/code/app/lib/x")
        );
        assert_eq!(normalize_lexical(Path::new("/code/..")), PathBuf::from("/"));
        assert_eq!(normalize_lexical(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize_lexical(Path::new("../a/../b")), PathBuf::from("../b"));
        assert_eq!(normalize_lexical(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn file_start_dir_is_lexical() {
        // Neither path exists; only components are inspected.
        assert_eq!(
            file_start_dir(Path::new("/no/such/proj/sub/../main.rs")),
            Some(PathBuf::from("/no/such/proj"))
        );
        assert_eq!(file_start_dir(Path::new("main.rs")), None);
    }
}
