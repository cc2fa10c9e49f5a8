//! Durable UI preference (theme) kept in a small JSON key-value file.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::PreferenceError;

/// Key under which the theme is persisted.
pub const THEME_KEY: &str = "theme";

/// Two-valued colour scheme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Parses a persisted value; anything unrecognized yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// File-backed preference store.
///
/// The file is a flat JSON object; keys other than `theme` are preserved
/// on write.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the persisted theme, or light if unset or unrecognized.
    ///
    /// An unset key is created with the default on first read. Storage
    /// errors are logged and fall back to the default.
    pub fn get(&self) -> Theme {
        let entries = match self.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %self.path.display(), "cannot read preferences: {e}");
                return Theme::default();
            }
        };

        match entries.get(THEME_KEY) {
            Some(Value::String(s)) => Theme::parse(s).unwrap_or_default(),
            Some(other) => {
                debug!("unrecognized theme value {other}, using default");
                Theme::default()
            }
            None => {
                if let Err(e) = self.set(Theme::default()) {
                    warn!(path = %self.path.display(), "cannot persist default theme: {e}");
                }
                Theme::default()
            }
        }
    }

    /// Persists `theme` and returns it as the effective value.
    ///
    /// # Errors
    ///
    /// Returns a `PreferenceError` if the file cannot be read or written.
    pub fn set(&self, theme: Theme) -> Result<Theme, PreferenceError> {
        let mut entries = self.load()?;
        entries.insert(THEME_KEY.to_string(), Value::String(theme.as_str().into()));
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)?;
        debug!(%theme, "theme persisted");
        Ok(theme)
    }

    /// Flips the persisted theme.
    ///
    /// # Errors
    ///
    /// See [`set`](Self::set).
    pub fn toggle(&self) -> Result<Theme, PreferenceError> {
        self.set(self.get().toggled())
    }

    fn load(&self) -> Result<Map<String, Value>, PreferenceError> {
        match fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Map::new()),
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes)? {
                Value::Object(map) => Ok(map),
                _ => Ok(Map::new()),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}
