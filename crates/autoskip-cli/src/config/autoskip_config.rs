use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::paths::ProjectPaths;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("IO error reading config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptingConfig {
    /// Root for script lookup and module names. Defaults to the executable's directory.
    pub base_dir: Option<PathBuf>,

    /// Entry module, relative to `base_dir`
    pub entry: String,

    /// Write the bundled scripts into `base_dir` when they are missing
    pub extract_resources: bool,
}

impl Default for ScriptingConfig {
    fn default() -> Self {
        ScriptingConfig {
            base_dir: None,
            entry: String::from("script.js"),
            extract_resources: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also log to `<data dir>/logs/autoskip.log`
    pub file: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoskipConfig {
    #[serde(default)]
    pub scripting: ScriptingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AutoskipConfig {
    pub fn config_path() -> Option<PathBuf> {
        ProjectPaths::new("autoskip").map(|paths| paths.config_file())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigLoadError> {
        if !path.exists() {
            return Err(ConfigLoadError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from `explicit` if given, otherwise from the default location.
    /// A missing default file yields the defaults; a missing explicit one is
    /// an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigLoadError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        match Self::config_path() {
            Some(path) => match Self::load_from(&path) {
                Err(ConfigLoadError::NotFound(_)) => Ok(Self::default()),
                other => other,
            },
            None => Ok(Self::default()),
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AutoskipConfig::default();
        assert_eq!(config.scripting.entry, "script.js");
        assert!(config.scripting.extract_resources);
        assert!(config.scripting.base_dir.is_none());
        assert!(!config.logging.file);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AutoskipConfig = toml::from_str(
            r#"
            [scripting]
            entry = "custom.js"
            "#,
        )
        .unwrap();
        assert_eq!(config.scripting.entry, "custom.js");
        assert!(config.scripting.extract_resources);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AutoskipConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigLoadError::NotFound(_)));
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scripting\nentry = 1").unwrap();

        let err = AutoskipConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AutoskipConfig::default();
        config.scripting.base_dir = Some(dir.path().to_path_buf());
        config.logging.file = true;
        config.save_to(&path).unwrap();

        assert_eq!(AutoskipConfig::load_from(&path).unwrap(), config);
    }
}
