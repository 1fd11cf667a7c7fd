use std::env;
use std::path::{Path, PathBuf};

use super::model::Opts;
use super::probe_config::RecordConfig;
use crate::director::DeploymentTimes;
use crate::error::{Error, Result};

/// Environment variable naming the YAML config file.
pub const CONFIG_FILE_ENV: &str = "CONFIG_FILE";

/// The config file to read: the explicit path if given, otherwise `CONFIG_FILE`.
/// Without either, no file is read and all settings must come from flags.
pub fn config_file_location(explicit: Option<&Path>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_FILE_ENV).map(PathBuf::from))
}

/// Load the settings of a recording run from a YAML file.
pub fn load_config(path: &Path) -> Result<RecordConfig> {
    let config_str = std::fs::read_to_string(path).map_err(|e| Error::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let config: RecordConfig =
        serde_yaml::from_str(&config_str).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Turn merged settings into validated [`Opts`].
pub fn build_opts(config: &RecordConfig) -> Result<Opts> {
    let output_file = config
        .output_file
        .clone()
        .ok_or_else(|| Error::Config("an output file is required".into()))?;
    let url = config
        .url
        .as_deref()
        .ok_or_else(|| Error::Config("a probe URL is required".into()))?;
    let interval = config
        .interval
        .ok_or_else(|| Error::Config("an interval is required".into()))?;

    Opts::new(output_file, url, interval, config.duration, config.task.clone())
}

/// Load a deployment times file: a YAML map of epoch seconds to event labels.
///
/// ```yaml
/// 1500000123: ["doppler done", "diego start"]
/// 1500000187: ["diego done"]
/// ```
pub fn load_deployment_times(path: &Path) -> Result<DeploymentTimes> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if contents.trim().is_empty() {
        return Ok(DeploymentTimes::new());
    }
    serde_yaml::from_str(&contents).map_err(|e| Error::ConfigFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
