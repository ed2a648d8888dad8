// Resource Root Locator
// Finds the resource root by searching upwards for a marker file

use std::env;
use std::path::{Path, PathBuf};

/// Search `start` and its ancestors for a file at the relative path `marker`.
///
/// Returns the directory that contains the marker file (for a marker like
/// `assets/.rmsroot` that is `<ancestor>/assets`), or `None` when no ancestor
/// has it. Typically a dummy marker file is placed at the top of the
/// resource tree.
pub fn locate_root<P: AsRef<Path>>(start: P, marker: &str) -> Option<PathBuf> {
    if marker.is_empty() {
        return None;
    }

    for dir in start.as_ref().ancestors() {
        let candidate = dir.join(marker);
        if candidate.is_file() {
            return candidate.parent().map(Path::to_path_buf);
        }
    }

    log::debug!(
        "No resource root marker '{}' above {}",
        marker,
        start.as_ref().display()
    );
    None
}

/// [`locate_root`] starting from the current working directory.
pub fn locate_root_from_cwd(marker: &str) -> Option<PathBuf> {
    let cwd = env::current_dir().ok()?;
    locate_root(cwd, marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_locate_in_start_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(".rmsroot"), "").unwrap();

        assert_eq!(
            locate_root(temp_dir.path(), ".rmsroot"),
            Some(temp_dir.path().to_path_buf())
        );
    }

    #[test]
    fn test_locate_nested_marker_from_descendant() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let assets = temp_dir.path().join("path1");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join(".rmsroot"), "").unwrap();
        let deep = temp_dir.path().join("a").join("b");
        fs::create_dir_all(&deep).unwrap();

        assert_eq!(locate_root(&deep, "path1/.rmsroot"), Some(assets));
    }

    #[test]
    fn test_marker_directory_is_not_a_match() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("unlikely-marker-9f2c")).unwrap();

        assert_eq!(locate_root(temp_dir.path(), "unlikely-marker-9f2c"), None);
    }

    #[test]
    fn test_empty_marker() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        assert_eq!(locate_root(temp_dir.path(), ""), None);
    }
}
