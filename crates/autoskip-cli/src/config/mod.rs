pub mod autoskip_config;
pub mod paths;

pub use autoskip_config::{AutoskipConfig, ConfigLoadError, LoggingConfig, ScriptingConfig};
pub use paths::ProjectPaths;
