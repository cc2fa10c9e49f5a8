//! Microgrid monitor entry point: config loading and command dispatch.

use std::path::Path;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use microgrid_monitor::cli::{Cli, Command, OfflineCommand, ThemeCommand};
use microgrid_monitor::client::{SimulationClient, SnapshotSource};
use microgrid_monitor::config::MonitorConfig;
use microgrid_monitor::error::ExportError;
use microgrid_monitor::monitor::cue::TerminalBell;
use microgrid_monitor::monitor::{CycleOutcome, Dashboard, PollCycle, Scheduler};
use microgrid_monitor::offline::{CacheStorage, HttpAssetFetcher, OfflineLayer};
use microgrid_monitor::preference::PreferenceStore;
use microgrid_monitor::render::RenderTarget;
use microgrid_monitor::render::console::ConsoleRenderer;

const DEFAULT_LOG_FILTER: &str = "microgrid_monitor=info";

fn init_tracing(quiet: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    // The TUI owns the terminal; log lines would corrupt the frame.
    if quiet {
        builder.with_writer(std::io::sink).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
}

fn load_config(cli: &Cli) -> MonitorConfig {
    let mut cfg = match &cli.config {
        Some(path) => match MonitorConfig::from_toml_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        },
        None => MonitorConfig::default(),
    };
    cli.overrides.apply(&mut cfg);

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    cfg
}

fn build_scheduler(
    cfg: &MonitorConfig,
    client: &SimulationClient,
    targets: Vec<Arc<dyn RenderTarget>>,
) -> Scheduler {
    let dashboard = Dashboard::new(Box::new(TerminalBell)).shared();
    let source: Arc<dyn SnapshotSource> = Arc::new(client.clone());
    let cycle = targets.into_iter().fold(
        PollCycle::new(source, cfg.request_params(), dashboard),
        PollCycle::with_target,
    );
    Scheduler::new(Arc::new(cycle))
}

fn build_offline_layer(cfg: &MonitorConfig) -> Result<OfflineLayer> {
    let http = reqwest::Client::builder()
        .build()
        .context("failed to build HTTP client")?;
    let off = &cfg.offline;
    Ok(OfflineLayer::new(
        CacheStorage::new(&off.cache_dir),
        off.version.clone(),
        off.assets.clone(),
        off.policy,
        Arc::new(HttpAssetFetcher::new(cfg.offline_origin(), http)),
    ))
}

/// Writes the dashboard history, turning an empty history into a warning.
fn export_history(scheduler: &Scheduler, path: &Path) -> Result<bool> {
    let dashboard = scheduler.cycle().dashboard().lock();
    match dashboard.export_csv(path) {
        Ok(()) => {
            eprintln!("History written to {}", path.display());
            Ok(true)
        }
        Err(ExportError::EmptyHistory) => {
            warn!("{}", ExportError::EmptyHistory);
            eprintln!("warning: {}", ExportError::EmptyHistory);
            Ok(false)
        }
        Err(e) => Err(e).with_context(|| format!("failed to write {}", path.display())),
    }
}

async fn run(cli: Cli, cfg: MonitorConfig) -> Result<bool> {
    let client = SimulationClient::new(&cfg.server.base_url)?;

    match cli.command {
        Command::Once { csv_out } => {
            let console: Arc<dyn RenderTarget> = Arc::new(ConsoleRenderer);
            let scheduler = build_scheduler(&cfg, &client, vec![console]);
            let outcome = scheduler
                .trigger_once()
                .await
                .context("poll cycle task panicked")?;
            if let CycleOutcome::Failed(e) = &outcome {
                eprintln!("error: {e}");
            }
            if let Some(path) = csv_out {
                export_history(&scheduler, &path)?;
            }
            Ok(outcome.is_applied())
        }

        Command::Watch { csv_out } => {
            let console: Arc<dyn RenderTarget> = Arc::new(ConsoleRenderer);
            let mut scheduler = build_scheduler(&cfg, &client, vec![console]);
            scheduler.start_auto(cfg.scheduler.interval_ms)?;
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")?;
            scheduler.stop_auto();
            info!("watch stopped");
            if let Some(path) = csv_out {
                export_history(&scheduler, &path)?;
            }
            Ok(true)
        }

        #[cfg(feature = "tui")]
        Command::Tui => {
            let scheduler = build_scheduler(&cfg, &client, Vec::new());
            let prefs = PreferenceStore::new(&cfg.preferences.path);
            let app = microgrid_monitor::tui::App::new(
                scheduler,
                client,
                prefs,
                cfg.scheduler.interval_ms,
                cfg.export.clone(),
            );
            microgrid_monitor::tui::run(app).await?;
            Ok(true)
        }

        Command::Download { format, dir } => {
            let dir = dir.unwrap_or_else(|| cfg.export.download_dir.clone());
            match client.download(format.into(), &dir).await {
                Ok(path) => {
                    println!("{}", path.display());
                    Ok(true)
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    Ok(false)
                }
            }
        }

        Command::Theme { action } => {
            let prefs = PreferenceStore::new(&cfg.preferences.path);
            let theme = match action {
                ThemeCommand::Get => prefs.get(),
                ThemeCommand::Set { theme } => prefs.set(theme.into())?,
                ThemeCommand::Toggle => prefs.toggle()?,
            };
            println!("{theme}");
            Ok(true)
        }

        Command::Offline { action } => {
            let layer = build_offline_layer(&cfg)?;
            match action {
                OfflineCommand::Install => {
                    let n = layer.install().await?;
                    println!("cached {n} assets under {}", layer.version());
                }
                OfflineCommand::Activate => {
                    let removed = layer.activate().await?;
                    if removed.is_empty() {
                        println!("no stale caches");
                    }
                    for name in removed {
                        println!("removed {name}");
                    }
                }
                OfflineCommand::Fetch { path } => {
                    let served = layer.handle_fetch(&path).await?;
                    println!(
                        "{} {} ({} bytes)",
                        served.response.status,
                        served.source,
                        served.response.body.len()
                    );
                }
                #[cfg(feature = "serve")]
                OfflineCommand::Serve { addr } => {
                    microgrid_monitor::offline::proxy::serve(Arc::new(layer), addr)
                        .await
                        .with_context(|| format!("offline proxy on {addr} failed"))?;
                }
            }
            Ok(true)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    #[cfg(feature = "tui")]
    let quiet = matches!(cli.command, Command::Tui);
    #[cfg(not(feature = "tui"))]
    let quiet = false;
    init_tracing(quiet);

    let cfg = load_config(&cli);
    match run(cli, cfg).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}
