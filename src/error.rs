//! Error types for the monitor.

use std::io;

use thiserror::Error;

/// A Poll Cycle failed to obtain a usable snapshot.
///
/// Always transient: the cycle reports it and the next cycle starts fresh.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("request to simulation service failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("simulation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed snapshot payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("snapshot field `{field}` must be finite and non-negative, got {value}")]
    InvalidSnapshot { field: &'static str, value: f64 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("auto-run interval must be a positive number of milliseconds, got {0}")]
    InvalidInterval(u64),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No history found. Run simulation first!")]
    EmptyHistory,

    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("export i/o failed: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference file i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("preference file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache storage i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error("cache metadata is corrupt: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("fetch of `{path}` failed: {reason}")]
    Fetch { path: String, reason: String },

    #[error("install aborted: `{path}` returned HTTP {status}")]
    Install { path: String, status: u16 },
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server refused download (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("could not save download: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
