use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// When a recording run ends.
#[derive(Debug, Clone, PartialEq)]
pub enum StopPolicy {
    /// Probe for a fixed amount of time.
    Duration(Duration),
    /// Probe while the given orchestration task is active.
    Task(String),
}

/// Validated settings of a recording run. Immutable once the run starts.
#[derive(Debug, Clone)]
pub struct Opts {
    output_file: PathBuf,
    url: Url,
    interval: Duration,
    stop: StopPolicy,
}

impl Opts {
    /// Validates raw settings: the URL must parse as http(s), the interval must be positive
    /// and exactly one of `duration` and `task` must be given.
    pub fn new(
        output_file: impl Into<PathBuf>,
        url: &str,
        interval: Duration,
        duration: Option<Duration>,
        task: Option<String>,
    ) -> Result<Self> {
        let url = Url::parse(url).map_err(|source| Error::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "probe URL {url} must use http or https"
            )));
        }

        if interval.is_zero() {
            return Err(Error::Config("interval must be greater than zero".into()));
        }

        let stop = match (duration, task) {
            (Some(duration), None) => StopPolicy::Duration(duration),
            (None, Some(task)) if task.trim().is_empty() => {
                return Err(Error::Config("task id must not be empty".into()));
            }
            (None, Some(task)) => StopPolicy::Task(task),
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "duration and task are mutually exclusive".into(),
                ));
            }
            (None, None) => {
                return Err(Error::Config(
                    "either a duration or a task must be given".into(),
                ));
            }
        };

        Ok(Opts {
            output_file: output_file.into(),
            url,
            interval,
            stop,
        })
    }

    pub fn output_file(&self) -> &PathBuf {
        &self.output_file
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stop(&self) -> &StopPolicy {
        &self.stop
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    const URL: &str = "http://localhost:54321/fake-url";

    #[test]
    fn test_duration_policy() {
        let opts = Opts::new(
            "report.csv",
            URL,
            Duration::from_millis(5),
            Some(Duration::from_millis(102)),
            None,
        )
        .expect("Valid opts");
        assert_eq!(opts.stop(), &StopPolicy::Duration(Duration::from_millis(102)));
        assert_eq!(opts.url().as_str(), URL);
        assert_eq!(opts.interval(), Duration::from_millis(5));
    }

    #[test]
    fn test_zero_duration_is_valid() {
        let opts = Opts::new("r.csv", URL, Duration::from_secs(1), Some(Duration::ZERO), None);
        assert!(opts.is_ok());
    }

    #[test]
    fn test_task_policy() {
        let opts = Opts::new("r.csv", URL, Duration::from_secs(1), None, Some("111".into()))
            .expect("Valid opts");
        assert_eq!(opts.stop(), &StopPolicy::Task("111".to_string()));
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let second = Duration::from_secs(1);
        let cases = [
            Opts::new("r.csv", "not a url", second, Some(second), None),
            Opts::new("r.csv", "ftp://example.com", second, Some(second), None),
            Opts::new("r.csv", URL, Duration::ZERO, Some(second), None),
            Opts::new("r.csv", URL, second, Some(second), Some("111".into())),
            Opts::new("r.csv", URL, second, None, None),
            Opts::new("r.csv", URL, second, None, Some(" ".into())),
        ];
        for case in cases {
            assert!(case.is_err(), "{case:?}");
        }
    }

    #[test]
    fn test_bad_url_names_the_url() {
        let err = Opts::new("r.csv", "http//missing-colon", Duration::from_secs(1), Some(Duration::ZERO), None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
        assert!(err.to_string().contains("http//missing-colon"));
    }
}
