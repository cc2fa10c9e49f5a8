//! TOML-based monitor configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::client::RequestParams;
use crate::offline::{CachePolicy, DEFAULT_ASSETS, DEFAULT_VERSION};

/// Top-level monitor configuration parsed from TOML.
///
/// Every section is optional and falls back to its `Default`. Load with
/// [`MonitorConfig::from_toml_file`], then check with
/// [`MonitorConfig::validate`] before use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Simulation service location.
    #[serde(default)]
    pub server: ServerConfig,
    /// Parameters sent with every simulation request.
    #[serde(default)]
    pub request: RequestConfig,
    /// Auto-run timing.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Durable UI preference file.
    #[serde(default)]
    pub preferences: PreferencesConfig,
    /// Offline asset cache.
    #[serde(default)]
    pub offline: OfflineConfig,
    /// CSV export and report download targets.
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Base URL of the simulation service, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

/// Request parameters. Passed to the service as-is.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequestConfig {
    /// Weather category label.
    pub weather: String,
    /// Number of homes.
    pub homes: u32,
    /// Battery capacity (kWh).
    pub battery_cap: f64,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            weather: "sunny".to_string(),
            homes: 20,
            battery_cap: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// Auto-run interval in milliseconds (must be > 0).
    pub interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { interval_ms: 5_000 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreferencesConfig {
    pub path: PathBuf,
}

impl Default for PreferencesConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("microgrid-prefs.json"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfflineConfig {
    /// Directory holding the named caches.
    pub cache_dir: PathBuf,
    /// Current cache version tag. Caches with any other name are removed
    /// on activation.
    pub version: String,
    /// Paths pre-cached at install.
    pub assets: Vec<String>,
    pub policy: CachePolicy,
    /// Asset origin; empty means the server base URL.
    pub origin: String,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(".microgrid-cache"),
            version: DEFAULT_VERSION.to_string(),
            assets: DEFAULT_ASSETS.iter().map(|s| (*s).to_string()).collect(),
            policy: CachePolicy::default(),
            origin: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Default CSV history file.
    pub csv_path: PathBuf,
    /// Directory for downloaded reports.
    pub download_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(crate::io::export::DEFAULT_CSV_NAME),
            download_dir: PathBuf::from("."),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"scheduler.interval_ms"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl MonitorConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. Request
    /// parameters are not checked here.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let url = self.server.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::new(
                "server.base_url",
                format!("must be an http(s) URL, got \"{url}\""),
            ));
        }

        if self.scheduler.interval_ms == 0 {
            errors.push(ConfigError::new("scheduler.interval_ms", "must be > 0"));
        }

        if self.preferences.path.as_os_str().is_empty() {
            errors.push(ConfigError::new("preferences.path", "must not be empty"));
        }

        let off = &self.offline;
        if off.version.trim().is_empty() {
            errors.push(ConfigError::new("offline.version", "must not be empty"));
        }
        if off.version.contains(['/', '\\']) {
            errors.push(ConfigError::new(
                "offline.version",
                "must not contain path separators",
            ));
        }
        if off.assets.is_empty() {
            errors.push(ConfigError::new("offline.assets", "must list at least one path"));
        }
        for asset in off.assets.iter().filter(|a| !a.starts_with('/')) {
            errors.push(ConfigError::new(
                "offline.assets",
                format!("\"{asset}\" must start with '/'"),
            ));
        }
        if !off.origin.is_empty()
            && !(off.origin.starts_with("http://") || off.origin.starts_with("https://"))
        {
            errors.push(ConfigError::new(
                "offline.origin",
                format!("must be empty or an http(s) URL, got \"{}\"", off.origin),
            ));
        }

        errors
    }

    pub fn request_params(&self) -> RequestParams {
        RequestParams {
            weather: self.request.weather.clone(),
            homes: self.request.homes,
            battery_cap: self.request.battery_cap,
        }
    }

    /// Origin the offline layer fetches from.
    pub fn offline_origin(&self) -> &str {
        if self.offline.origin.is_empty() {
            &self.server.base_url
        } else {
            &self.offline.origin
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = MonitorConfig::default();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "defaults should be valid: {errors:?}");
        assert_eq!(cfg.scheduler.interval_ms, 5_000);
        assert_eq!(cfg.offline.assets.len(), 8);
        assert_eq!(cfg.offline_origin(), "http://127.0.0.1:5000");
    }

    #[test]
    fn empty_toml_is_default() {
        let cfg = MonitorConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.request.weather, "sunny");
        assert_eq!(cfg.request.homes, 20);
        assert_eq!(cfg.offline.policy, CachePolicy::CacheFirst);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[server]
base_url = "http://grid.local:8080"

[request]
weather = "cloudy"
homes = 45
battery_cap = 25.5

[scheduler]
interval_ms = 1500

[offline]
version = "microgrid-pwa-v2"
assets = ["/", "/about"]
policy = "stale_while_revalidate"
origin = "http://static.local"

[export]
csv_path = "out/history.csv"
"#;
        let cfg = MonitorConfig::from_toml_str(toml).unwrap();
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.request.weather, "cloudy");
        assert_eq!(cfg.request.battery_cap, 25.5);
        assert_eq!(cfg.scheduler.interval_ms, 1_500);
        assert_eq!(cfg.offline.policy, CachePolicy::StaleWhileRevalidate);
        assert_eq!(cfg.offline_origin(), "http://static.local");
        assert_eq!(cfg.export.csv_path, PathBuf::from("out/history.csv"));
        assert_eq!(cfg.export.download_dir, PathBuf::from("."));

        let params = cfg.request_params();
        assert_eq!(params.homes, 45);
    }

    #[test]
    fn unknown_field_rejected() {
        let toml = r#"
[scheduler]
interval_ms = 100
jitter = true
"#;
        let err = MonitorConfig::from_toml_str(toml).unwrap_err();
        assert_eq!(err.field, "toml");
    }

    #[test]
    fn wrong_type_rejected() {
        assert!(MonitorConfig::from_toml_str("[request]\nhomes = \"many\"\n").is_err());
        assert!(MonitorConfig::from_toml_str("[offline]\npolicy = \"network_first\"\n").is_err());
    }

    #[test]
    fn validation_collects_every_violation() {
        let mut cfg = MonitorConfig::default();
        cfg.server.base_url = "grid.local".into();
        cfg.scheduler.interval_ms = 0;
        cfg.offline.assets = vec!["static/style.css".into()];
        cfg.offline.version = "../v1".into();

        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "server.base_url",
                "scheduler.interval_ms",
                "offline.version",
                "offline.assets",
            ]
        );
    }

    #[test]
    fn request_params_are_not_validated() {
        let mut cfg = MonitorConfig::default();
        cfg.request.weather = "volcanic".into();
        cfg.request.homes = 0;
        cfg.request.battery_cap = -3.0;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = MonitorConfig::from_toml_file(Path::new("/nonexistent/monitor.toml")).unwrap_err();
        assert_eq!(err.field, "config");
        assert!(err.message.contains("/nonexistent/monitor.toml"));
    }
}
