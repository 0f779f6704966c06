//! Configuration file loading: runtime options plus named device profiles,
//! and the task graph file.

use std::collections::BTreeMap;
use std::path::Path;

use pixelbot_core::{RuntimeOptions, TaskRegistry};
use pixelbot_device::DeviceProfile;
use serde::Deserialize;

use crate::error::CliError;

/// The `pixelbot.json` configuration: run-wide options and the devices this
/// installation knows how to drive. Profiles are keyed by name; the key is
/// copied into the profile on load.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub options: RuntimeOptions,
    pub profiles: BTreeMap<String, DeviceProfile>,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let source = read(path)?;
        let mut config: AppConfig =
            serde_json::from_str(&source).map_err(pixelbot_core::ConfigError::from)?;
        for (name, profile) in &mut config.profiles {
            profile.name = name.clone();
        }
        config.options.validate()?;
        Ok(config)
    }

    pub fn profile(&self, name: &str) -> Result<&DeviceProfile, CliError> {
        self.profiles
            .get(name)
            .ok_or_else(|| CliError::UnknownProfile(name.to_string()))
    }
}

/// Load and validate the task graph file.
pub fn load_tasks(path: &Path) -> Result<TaskRegistry, CliError> {
    let source = read(path)?;
    Ok(TaskRegistry::from_json(&source)?)
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
