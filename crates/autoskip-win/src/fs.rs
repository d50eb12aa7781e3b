use std::path::Path;

use tracing::warn;

/// Create `path` and any missing parents. Succeeds when the directory exists
/// afterwards, including when it already did.
pub fn mkdir(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    match std::fs::create_dir_all(path) {
        Ok(()) => Path::new(path).is_dir(),
        Err(err) => {
            warn!("Failed to create directory {}: {}", path, err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mkdir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("screenshots/2024");
        let target = target.to_str().unwrap();

        assert!(mkdir(target));
        assert!(mkdir(target));
        assert!(Path::new(target).is_dir());
    }

    #[test]
    fn test_mkdir_over_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, b"x").unwrap();

        assert!(!mkdir(file.to_str().unwrap()));
        assert!(!mkdir(""));
    }
}
