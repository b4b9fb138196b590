//! File system utilities

use std::path::{Component, Path, PathBuf};

/// Shortens long paths for display
pub fn shorten_path(path: &str, max_length: usize) -> String {
    if path.len() <= max_length {
        return path.to_string();
    }

    let components: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if components.len() <= 2 {
        // Too few components to shorten meaningfully
        return path.to_string();
    }

    let prefix = if path.starts_with('/') { "/" } else { "" };
    format!(
        "{}.../{}/{}",
        prefix,
        components[components.len() - 2],
        components[components.len() - 1]
    )
}

/// Lexically removes `.` and `..` components without touching the disk
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Joins `path` onto `base` when relative, then normalizes
pub fn absolute_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Resolves symlinks in the longest existing prefix of `path`
///
/// The remainder (components that do not exist yet) is appended unchanged,
/// so two spellings of a future destination still compare equal.
pub fn real_path(path: &Path) -> PathBuf {
    let mut existing = path.to_path_buf();
    let mut missing = Vec::new();
    loop {
        if let Ok(resolved) = existing.canonicalize() {
            let mut result = resolved;
            for component in missing.iter().rev() {
                result.push(component);
            }
            return result;
        }
        match (existing.file_name().map(|n| n.to_os_string()), existing.parent()) {
            (Some(name), Some(parent)) => {
                missing.push(name);
                existing = parent.to_path_buf();
            }
            _ => return path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten_path_keeps_short_paths() {
        assert_eq!(shorten_path("/a/b", 30), "/a/b");
    }

    #[test]
    fn test_shorten_path_long() {
        assert_eq!(
            shorten_path("/very/long/path/to/some/repository", 20),
            "/.../some/repository"
        );
    }

    #[test]
    fn test_normalize_path_removes_dots() {
        assert_eq!(
            normalize_path(Path::new("/srv/./repos/../vendor/lib/")),
            PathBuf::from("/srv/vendor/lib")
        );
    }

    #[test]
    fn test_normalize_path_stops_at_root() {
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_absolute_path_relative_to_base() {
        assert_eq!(
            absolute_path(Path::new("/etc/fleet"), Path::new("../repos/a")),
            PathBuf::from("/etc/repos/a")
        );
        assert_eq!(
            absolute_path(Path::new("/etc/fleet"), Path::new("/opt/a")),
            PathBuf::from("/opt/a")
        );
    }

    #[test]
    fn test_real_path_of_missing_leaf() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let base = temp_dir.path().canonicalize().unwrap();
        let missing = base.join("not-yet").join("repo");
        assert_eq!(real_path(&missing), missing);
    }

    #[cfg(unix)]
    #[test]
    fn test_real_path_follows_symlinked_parent() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let base = temp_dir.path().canonicalize().unwrap();
        std::fs::create_dir(base.join("real")).unwrap();
        std::os::unix::fs::symlink(base.join("real"), base.join("link")).unwrap();
        assert_eq!(
            real_path(&base.join("link").join("repo")),
            base.join("real").join("repo")
        );
    }
}
