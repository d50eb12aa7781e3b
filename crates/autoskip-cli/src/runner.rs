use std::path::PathBuf;

use anyhow::Context;
use autoskip_scripting_host::{EvalMode, ScriptRuntime};
use autoskip_win::bind_host_functions;
use tracing::info;

use crate::config::ScriptingConfig;
use crate::resources;

/// What to run and where, after config and command line are merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub base_dir: PathBuf,
    pub entry: String,
    pub extract_resources: bool,
    /// Compile the entry module without running it
    pub check_only: bool,
}

impl RunSettings {
    pub fn from_config(config: &ScriptingConfig) -> Self {
        RunSettings {
            base_dir: config
                .base_dir
                .clone()
                .unwrap_or_else(resources::executable_dir),
            entry: config.entry.clone(),
            extract_resources: config.extract_resources,
            check_only: false,
        }
    }
}

/// Extract the bundled scripts if asked to, then evaluate the entry module
/// with the host catalog installed and drive the event loop until no work
/// is left.
pub fn run(settings: &RunSettings) -> anyhow::Result<()> {
    if settings.extract_resources {
        resources::extract_all(&settings.base_dir).with_context(|| {
            format!("Failed to extract scripts into {}", settings.base_dir.display())
        })?;
    }

    let runtime = ScriptRuntime::new(&settings.base_dir)?;
    let context = runtime.create_context()?;
    context
        .with_global(|global| bind_host_functions(global))
        .context("Failed to install host functions")?;
    context.on_module_loaded(|name| info!("Loading script: {}", name));

    if settings.check_only {
        context.eval_file(&settings.entry, EvalMode::ModuleDeclare)?;
        info!("{} compiled", settings.entry);
        return Ok(());
    }

    context.eval_file(&settings.entry, EvalMode::Module)?;
    context.run_loop()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_to_executable_dir() {
        let settings = RunSettings::from_config(&ScriptingConfig::default());
        assert_eq!(settings.base_dir, resources::executable_dir());
        assert_eq!(settings.entry, "script.js");
        assert!(settings.extract_resources);
        assert!(!settings.check_only);
    }

    #[test]
    fn test_settings_keep_configured_base_dir() {
        let config = ScriptingConfig {
            base_dir: Some(PathBuf::from("/srv/autoskip")),
            ..ScriptingConfig::default()
        };
        assert_eq!(
            RunSettings::from_config(&config).base_dir,
            PathBuf::from("/srv/autoskip")
        );
    }
}
