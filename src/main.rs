//! `remoted`: GPIO remote daemon.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │  RppalGpio / debug   JsonFileStore   SystemClock         │
//! │  (GpioPort)          (RecordStore)   (Clock)             │
//! │  LogEventSink                                            │
//! │  (EventSink)                                             │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ───────────────     │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │          RemoteService (device model)              │  │
//! │  │  SimpleOutput · SimpleInput · MotionSensor · …     │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Loads every stored remote, then runs an output pass each
//! `poll_interval_ms` until Ctrl+C / SIGTERM, and closes every pin on the
//! way out.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use tokio::signal;

use remotes::adapters::json_store::JsonFileStore;
use remotes::adapters::log_sink::LogEventSink;
use remotes::adapters::time::SystemClock;
use remotes::app::service::RemoteService;
use remotes::config::RemotesConfig;
use remotes::remotes::Binding;

#[derive(Debug, Parser)]
#[command(name = "remoted", version, about = "Raspberry Pi GPIO remote daemon")]
struct Args {
    /// TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single output pass and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = RemotesConfig::load(args.config.as_deref()).context("loading config")?;

    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::fmt().with_env_filter(log_filter).init();

    info!("remoted v{} starting", env!("CARGO_PKG_VERSION"));
    info!("Record store: {}", config.store_path.display());

    let mut store = JsonFileStore::open(&config.store_path)
        .with_context(|| format!("opening {}", config.store_path.display()))?;
    let mut sink = LogEventSink::new();
    let clock = SystemClock;

    let mut service = RemoteService::new(hardware_binding(&config)?);
    let report = service.load(&store, &mut sink).context("loading remotes")?;
    for err in &report.failed {
        warn!("Not started: {}", err);
    }

    if args.once {
        service.poll(&mut store, &clock, &mut sink);
        service.shutdown(&mut sink);
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_millis(config.poll_interval_ms));
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                service.poll(&mut store, &clock, &mut sink);
            }
            _ = &mut shutdown => break,
        }
    }

    service.shutdown(&mut sink);
    info!("Shutdown complete");
    Ok(())
}

#[cfg(all(feature = "rpi", target_os = "linux"))]
fn hardware_binding(config: &RemotesConfig) -> Result<Binding> {
    use std::sync::Arc;

    use remotes::adapters::rpi::RppalGpio;

    if !config.hardware_enabled {
        return Ok(Binding::disabled());
    }
    let gpio = RppalGpio::new().context("opening GPIO")?;
    Ok(Binding::enabled(Arc::new(gpio)))
}

#[cfg(not(all(feature = "rpi", target_os = "linux")))]
fn hardware_binding(config: &RemotesConfig) -> Result<Binding> {
    if config.hardware_enabled {
        warn!(
            "hardware_enabled is set but this build has no GPIO backend (enable the `rpi` feature)"
        );
    }
    Ok(Binding::disabled())
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
