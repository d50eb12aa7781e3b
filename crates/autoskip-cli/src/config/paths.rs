use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Per-user directories for autoskip.
///
/// - Config: `%APPDATA%\autoskip\config` on Windows, `$XDG_CONFIG_HOME/autoskip` elsewhere
/// - Data: `%APPDATA%\autoskip\data` on Windows, `$XDG_DATA_HOME/autoskip` elsewhere
pub struct ProjectPaths {
    dirs: ProjectDirs,
}

impl ProjectPaths {
    /// `None` when no home directory can be determined
    pub fn new(name: &str) -> Option<Self> {
        ProjectDirs::from("", "", name).map(|dirs| ProjectPaths { dirs })
    }

    pub fn config_dir(&self) -> &Path {
        self.dirs.config_dir()
    }

    pub fn data_dir(&self) -> &Path {
        self.dirs.data_dir()
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("config.toml")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }
}
