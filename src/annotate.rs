//! Annotator
//!
//! Merges deployment events into an existing downtime log. Rows whose timestamp has
//! events get those labels in their annotation column; every other row, the header
//! and blank lines included, is written back exactly as it was read. A log that cannot be
//! split into rows is rejected before anything is written. The new content goes to a sibling
//! temporary file which is then renamed over the log, so readers never see a partial file.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::director::DeploymentTimes;
use crate::error::{Error, Result};
use crate::http_probe::result::{parse_timestamp, set_annotation};
use crate::recorder::csv::{RawRow, encode_row};
use crate::recorder::split_log;

/// Separator between the labels of one timestamp.
pub const LABEL_SEPARATOR: &str = ", ";

/// Rewrites the log at `path`, annotating the rows listed in `times`.
pub async fn annotate(path: impl AsRef<Path>, times: &DeploymentTimes) -> Result<()> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .await
        .map_err(|e| Error::log_io(path, e))?;

    let rows = split_log(path, &text)?;
    let (output, annotated) = annotate_rows(rows, text.len(), times);
    replace_atomically(path, output.as_bytes()).await?;

    tracing::info!(
        path = %path.display(),
        timestamps = times.len(),
        rows = annotated,
        "annotated log"
    );
    Ok(())
}

/// Returns the rewritten log and the number of rows that received an annotation.
fn annotate_rows(rows: Vec<RawRow<'_>>, capacity: usize, times: &DeploymentTimes) -> (String, usize) {
    let mut output = String::with_capacity(capacity);
    let mut annotated = 0;

    for row in rows {
        // The header's timestamp column is not a number, so it never matches.
        match parse_timestamp(&row.fields[0]).and_then(|ts| times.get(&ts)) {
            Some(labels) => {
                let mut fields = row.fields;
                set_annotation(&mut fields, labels.join(LABEL_SEPARATOR));
                output.push_str(&encode_row(&fields[..]));
                annotated += 1;
            }
            None => {
                output.push_str(row.raw);
                output.push('\n');
            }
        }
    }

    (output, annotated)
}

async fn replace_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);

    let written = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(Error::log_io(path, e));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".annotate.tmp");
    path.with_file_name(name)
}
