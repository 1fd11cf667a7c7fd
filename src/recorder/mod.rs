//! Log Recorder
//!
//! Owns the downtime log for the duration of a run. Every append is one complete,
//! newline-terminated line written with a single call and flushed before returning, so a
//! crash leaves a well-formed prefix of the log on disk.

pub mod csv;

use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::http_probe::result::{HEADER, Record, parse_timestamp};

pub struct LogRecorder {
    path: PathBuf,
    file: File,
    rows: usize,
}

impl LogRecorder {
    /// Creates (or truncates) the log at `path` and writes the header row.
    pub async fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| Error::log_io(&path, e))?;

        let mut recorder = LogRecorder {
            path,
            file,
            rows: 0,
        };
        recorder.write_line(csv::encode_row(&HEADER[..])).await?;
        tracing::debug!(path = %recorder.path.display(), "log created");
        Ok(recorder)
    }

    /// Appends one record as a single line.
    pub async fn append(&mut self, record: &Record) -> Result<()> {
        self.write_line(csv::encode_row(&record.to_fields()[..]))
            .await?;
        self.rows += 1;
        Ok(())
    }

    /// Number of data rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn write_line(&mut self, line: String) -> Result<()> {
        self.file
            .write_all(line.as_bytes())
            .await
            .map_err(|e| Error::log_io(&self.path, e))?;
        self.file
            .flush()
            .await
            .map_err(|e| Error::log_io(&self.path, e))
    }
}

/// Reads a log back into records, skipping the header row and blank lines.
pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| Error::log_io(path, e))?;

    let mut records = Vec::new();
    for (idx, row) in split_log(path, &text)?.into_iter().enumerate() {
        if row.raw.is_empty() || (idx == 0 && parse_timestamp(&row.fields[0]).is_none()) {
            continue;
        }
        let record = Record::from_fields(&row.fields).map_err(|reason| Error::MalformedRow {
            path: path.to_path_buf(),
            line: idx + 1,
            reason,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Splits the contents of the log at `path` into rows.
pub(crate) fn split_log<'a>(path: &Path, text: &'a str) -> Result<Vec<csv::RawRow<'a>>> {
    csv::split_rows(text).map_err(|e| Error::MalformedRow {
        path: path.to_path_buf(),
        line: e.line,
        reason: "quoted field is never closed".to_string(),
    })
}
