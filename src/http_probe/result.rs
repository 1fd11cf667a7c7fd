use std::time::Duration;

use crate::duration::{format_latency, parse_latency};

/// Column layout of the downtime log. `fill` is kept empty for downstream consumers.
pub const HEADER: [&str; 7] = [
    "timestamp",
    "success",
    "latency",
    "code",
    "size",
    "fill",
    "annotation",
];

const ANNOTATION_COLUMN: usize = 6;

/// The outcome of a single probe, one row in the log.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Seconds since the epoch at which the probe started.
    pub timestamp: i64,
    pub success: bool,
    pub latency: Duration,
    /// HTTP status code, 0 when no response was received.
    pub code: u16,
    /// Body length in bytes, 0 when no response was received.
    pub size: u64,
    pub annotation: String,
}

impl Record {
    /// Fields in [`HEADER`] order.
    pub fn to_fields(&self) -> [String; 7] {
        [
            self.timestamp.to_string(),
            if self.success { "1" } else { "0" }.to_string(),
            format_latency(self.latency),
            self.code.to_string(),
            self.size.to_string(),
            String::new(),
            self.annotation.clone(),
        ]
    }

    /// Parses the fields of a data row. Missing trailing columns (`fill`, `annotation`)
    /// are treated as empty.
    pub fn from_fields(fields: &[String]) -> Result<Self, String> {
        if fields.len() < 5 {
            return Err(format!("expected at least 5 columns, found {}", fields.len()));
        }

        let success = match fields[1].as_str() {
            "1" => true,
            "0" => false,
            other => return Err(format!("invalid success flag '{other}'")),
        };

        Ok(Record {
            timestamp: parse_timestamp(&fields[0])
                .ok_or_else(|| format!("invalid timestamp '{}'", fields[0]))?,
            success,
            latency: parse_latency(&fields[2])?,
            code: fields[3]
                .parse()
                .map_err(|_| format!("invalid status code '{}'", fields[3]))?,
            size: fields[4]
                .parse()
                .map_err(|_| format!("invalid size '{}'", fields[4]))?,
            annotation: fields.get(ANNOTATION_COLUMN).cloned().unwrap_or_default(),
        })
    }
}

/// The timestamp column of a row, or `None` for the header (or anything non-numeric).
pub fn parse_timestamp(field: &str) -> Option<i64> {
    field.trim().parse().ok()
}

/// Replaces the annotation column of a row, padding missing columns with empty fields.
pub fn set_annotation(fields: &mut Vec<String>, annotation: String) {
    if fields.len() < HEADER.len() {
        fields.resize(HEADER.len(), String::new());
    }
    fields[ANNOTATION_COLUMN] = annotation;
}
