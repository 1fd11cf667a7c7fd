use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::director::client::DirectorConfig;
use crate::duration::deserialize_opt;

/// Settings of a recording run as found in the YAML config file.
/// Every field is optional so command line flags can fill the gaps or override values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordConfig {
    /// The CSV file the probe results are written to.
    pub output_file: Option<PathBuf>,

    /// The URL that is probed.
    pub url: Option<String>,

    /// Time between two probes, e.g. `1s`.
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub interval: Option<Duration>,

    /// Stop after this amount of time. Mutually exclusive with `task`.
    #[serde(default, deserialize_with = "deserialize_opt")]
    pub duration: Option<Duration>,

    /// Probe while this director task is running. Mutually exclusive with `duration`.
    pub task: Option<String>,

    /// Director connection, only needed together with `task`.
    pub director: Option<DirectorSection>,
}

/// The director section of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectorSection {
    pub url: Option<String>,
    pub client: Option<String>,
    pub client_secret: Option<String>,
    pub ca_cert: Option<PathBuf>,
}

impl RecordConfig {
    /// Values set in `self` win over the ones in `fallback`.
    /// The stop policy is taken as a whole: a policy set here replaces the fallback's.
    pub fn or(self, fallback: RecordConfig) -> RecordConfig {
        let (duration, task) = if self.duration.is_some() || self.task.is_some() {
            (self.duration, self.task)
        } else {
            (fallback.duration, fallback.task)
        };
        RecordConfig {
            output_file: self.output_file.or(fallback.output_file),
            url: self.url.or(fallback.url),
            interval: self.interval.or(fallback.interval),
            duration,
            task,
            director: match (self.director, fallback.director) {
                (Some(ours), Some(theirs)) => Some(ours.or(theirs)),
                (ours, theirs) => ours.or(theirs),
            },
        }
    }
}

impl DirectorSection {
    pub fn or(self, fallback: DirectorSection) -> DirectorSection {
        DirectorSection {
            url: self.url.or(fallback.url),
            client: self.client.or(fallback.client),
            client_secret: self.client_secret.or(fallback.client_secret),
            ca_cert: self.ca_cert.or(fallback.ca_cert),
        }
    }

    /// The connection settings, if a director URL is configured.
    pub fn to_director_config(&self) -> Option<DirectorConfig> {
        self.url.as_ref().map(|url| DirectorConfig {
            url: url.clone(),
            client: self.client.clone(),
            client_secret: self.client_secret.clone(),
            ca_cert: self.ca_cert.clone(),
        })
    }
}
