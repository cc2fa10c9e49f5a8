//! HTTP client for the simulation service.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, header};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AcquisitionError, ClientError, DownloadError};
use crate::monitor::types::Snapshot;

/// Caller-supplied simulation inputs, forwarded without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    /// Weather category, e.g. `"sunny"` or `"auto"`.
    pub weather: String,
    /// Number of homes.
    pub homes: u32,
    /// Battery capacity (kWh).
    pub battery_cap: f64,
}

/// Anything that can produce one snapshot per request.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Performs one acquisition round trip.
    async fn fetch(&self, params: &RequestParams) -> Result<Snapshot, AcquisitionError>;
}

/// Server-generated report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Txt,
}

impl ReportFormat {
    /// Endpoint path on the simulation server.
    pub fn path(self) -> &'static str {
        match self {
            Self::Json => "/download/json",
            Self::Txt => "/download/txt",
        }
    }

    /// File name used when the server does not suggest one.
    pub fn default_file_name(self) -> &'static str {
        match self {
            Self::Json => "microgrid_report.json",
            Self::Txt => "microgrid_report.txt",
        }
    }
}

/// `reqwest`-backed client for `/simulate` and the report downloads.
///
/// No request timeout is configured: a hung request keeps its cycle busy
/// until the connection settles.
#[derive(Debug, Clone)]
pub struct SimulationClient {
    base_url: String,
    client: Client,
}

impl SimulationClient {
    /// Creates a client for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns a `ClientError` if the underlying HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = Client::builder().build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches a server report and saves the body unmodified under `dir`.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError::Rejected` with the server's message for a
    /// non-success status, or a network / I/O error.
    pub async fn download(
        &self,
        format: ReportFormat,
        dir: &Path,
    ) -> Result<PathBuf, DownloadError> {
        let url = format!("{}{}", self.base_url, format.path());
        debug!(%url, "requesting report download");
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DownloadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let file_name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_file_name)
            .unwrap_or_else(|| format.default_file_name().to_string());
        let body = response.bytes().await?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, &body).await?;
        info!(path = %path.display(), bytes = body.len(), "report saved");
        Ok(path)
    }
}

#[async_trait]
impl SnapshotSource for SimulationClient {
    async fn fetch(&self, params: &RequestParams) -> Result<Snapshot, AcquisitionError> {
        let url = format!("{}/simulate", self.base_url);
        debug!(
            weather = %params.weather,
            homes = params.homes,
            battery_cap = params.battery_cap,
            "requesting snapshot"
        );

        let response = self
            .client
            .get(&url)
            .query(&[
                ("weather", params.weather.clone()),
                ("homes", params.homes.to_string()),
                ("batteryCap", params.battery_cap.to_string()),
            ])
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let body = response.bytes().await?;
                let snapshot: Snapshot = serde_json::from_slice(&body)?;
                snapshot
                    .validate()
                    .map_err(|(field, value)| AcquisitionError::InvalidSnapshot { field, value })?;
                Ok(snapshot)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AcquisitionError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

/// Extracts a safe file name from a `Content-Disposition` header value.
///
/// Path separators are rejected so a hostile header cannot escape the
/// download directory.
fn attachment_file_name(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| {
            !name.is_empty() && !name.contains(['/', '\\']) && name != "." && name != ".."
        })
}
