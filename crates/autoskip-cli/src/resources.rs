use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// A script compiled into the binary
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub name: &'static str,
    pub contents: &'static str,
}

pub const BUNDLED: &[Resource] = &[
    Resource {
        name: "api.js",
        contents: include_str!("../scripts/api.js"),
    },
    Resource {
        name: "script.js",
        contents: include_str!("../scripts/script.js"),
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    Written,
    /// A file with that name was already there and was left untouched
    Kept,
}

/// Write `resource` into `dir` unless a file of that name already exists
pub fn extract_resource(dir: &Path, resource: &Resource) -> io::Result<Extraction> {
    let path = dir.join(resource.name);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            debug!("Keeping existing {}", path.display());
            return Ok(Extraction::Kept);
        }
        Err(err) => return Err(err),
    };

    file.write_all(resource.contents.as_bytes())?;
    info!("Extracted {}", path.display());
    Ok(Extraction::Written)
}

pub fn extract_all(dir: &Path) -> io::Result<Vec<(&'static str, Extraction)>> {
    fs::create_dir_all(dir)?;
    BUNDLED
        .iter()
        .map(|resource| Ok((resource.name, extract_resource(dir, resource)?)))
        .collect()
}

/// Directory holding the running executable, or the working directory when
/// that cannot be determined
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_scripts() {
        let names: Vec<_> = BUNDLED.iter().map(|resource| resource.name).collect();
        assert_eq!(names, ["api.js", "script.js"]);
        assert!(BUNDLED[1].contents.contains(r#"from "./api.js""#));
    }

    #[test]
    fn test_extract_writes_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("fresh");

        let outcome = extract_all(&target).unwrap();
        assert_eq!(
            outcome,
            [("api.js", Extraction::Written), ("script.js", Extraction::Written)]
        );
        assert_eq!(
            fs::read_to_string(target.join("api.js")).unwrap(),
            BUNDLED[0].contents
        );
    }

    #[test]
    fn test_extract_preserves_user_edits() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("script.js"), "// mine").unwrap();

        let outcome = extract_all(dir.path()).unwrap();
        assert_eq!(outcome[1], ("script.js", Extraction::Kept));
        assert_eq!(fs::read_to_string(dir.path().join("script.js")).unwrap(), "// mine");
        assert_eq!(extract_all(dir.path()).unwrap()[0], ("api.js", Extraction::Kept));
    }

    #[test]
    fn test_executable_dir_exists() {
        assert!(executable_dir().is_dir());
    }
}
