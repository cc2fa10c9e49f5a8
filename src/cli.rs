//! Command-line definitions.

#[cfg(feature = "serve")]
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::client::ReportFormat;
use crate::config::MonitorConfig;
use crate::preference::Theme;

#[derive(Debug, Parser)]
#[command(name = "microgrid-monitor")]
#[command(version, about = "Live monitoring client for a simulated microgrid")]
pub struct Cli {
    /// TOML configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags that override values from the configuration file.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Simulation service base URL
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Weather category sent with each request
    #[arg(long, global = true)]
    pub weather: Option<String>,

    /// Number of homes sent with each request
    #[arg(long, global = true)]
    pub homes: Option<u32>,

    /// Battery capacity (kWh) sent with each request
    #[arg(long, global = true)]
    pub battery_cap: Option<f64>,

    /// Auto-run interval in milliseconds
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,
}

impl Overrides {
    pub fn apply(&self, cfg: &mut MonitorConfig) {
        if let Some(url) = &self.server_url {
            cfg.server.base_url.clone_from(url);
        }
        if let Some(weather) = &self.weather {
            cfg.request.weather.clone_from(weather);
        }
        if let Some(homes) = self.homes {
            cfg.request.homes = homes;
        }
        if let Some(cap) = self.battery_cap {
            cfg.request.battery_cap = cap;
        }
        if let Some(ms) = self.interval_ms {
            cfg.scheduler.interval_ms = ms;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single poll cycle and print the dashboard
    Once {
        /// Write the history as CSV after the cycle
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },

    /// Poll on the auto-run interval until Ctrl-C
    Watch {
        /// Write the history as CSV on exit
        #[arg(long)]
        csv_out: Option<PathBuf>,
    },

    /// Interactive terminal dashboard
    #[cfg(feature = "tui")]
    Tui,

    /// Save a server-generated report
    Download {
        #[arg(value_enum)]
        format: FormatArg,

        /// Target directory (defaults to `export.download_dir`)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Read or change the persisted theme
    Theme {
        #[command(subcommand)]
        action: ThemeCommand,
    },

    /// Manage the offline asset cache
    Offline {
        #[command(subcommand)]
        action: OfflineCommand,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Json,
    Txt,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => Self::Json,
            FormatArg::Txt => Self::Txt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Print the effective theme
    Get,
    /// Persist a theme
    Set {
        #[arg(value_enum)]
        theme: ThemeArg,
    },
    /// Flip between light and dark
    Toggle,
}

#[derive(Debug, Subcommand)]
pub enum OfflineCommand {
    /// Pre-cache the asset manifest under the current version
    Install,
    /// Remove caches from other versions
    Activate,
    /// Resolve one path through the cache policy
    Fetch { path: String },
    /// Serve assets through the cache over HTTP
    #[cfg(feature = "serve")]
    Serve {
        #[arg(long, default_value = "127.0.0.1:8090")]
        addr: SocketAddr,
    },
}
