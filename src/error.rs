//! Error types for downtimer

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a recording run or an annotation pass.
///
/// Probe transport failures are not represented here: they are recorded as failed rows.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or inconsistent configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The probe or director URL could not be parsed
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The config file could not be read or parsed
    #[error("failed to load config file {}: {reason}", path.display())]
    ConfigFile { path: PathBuf, reason: String },

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// Opening, writing or renaming the log file failed
    #[error("log file {}: {source}", path.display())]
    LogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A row in an existing log could not be parsed
    #[error("malformed row {line} in {}: {reason}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The task-status collaborator failed to answer
    #[error("task status query for task {task} failed: {reason}")]
    TaskStatus { task: String, reason: String },
}

impl Error {
    pub(crate) fn log_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::LogIo {
            path: path.into(),
            source,
        }
    }
}
