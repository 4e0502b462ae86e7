//! Door lock simulator.
//!
//! Runs the Interface Unit and the Control Unit in one process, linked over
//! an in-memory byte stream. Each stdin line is typed on the keypad and
//! followed by Enter; `+` and `-` pick a menu entry, `C` clears the entry.
//!
//! # Usage
//!
//! ```bash
//! # Default timings, password kept in memory
//! doorlock-sim
//!
//! # Custom timings, password kept across runs
//! doorlock-sim --config doorlock.json --store eeprom.bin
//! ```

mod console;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use doorlock_core::DoorlockConfig;
use doorlock_core::constants::PASSWORD_STORE_SLOTS;
use doorlock_emulator::{ControlUnit, InterfaceUnit, UnitError};
use doorlock_hardware::mock::{MemoryStore, MockKeypad};
use doorlock_hardware::{FileStore, HardwareError, PersistentStore};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::{ConsoleAlarm, ConsoleDisplay, ConsoleMotor, feed_keypad};

/// Two-unit electronic door lock simulator
#[derive(Parser, Debug)]
#[command(name = "doorlock-sim")]
#[command(about = "Simulate the door lock interface and control units")]
#[command(version)]
struct Args {
    /// JSON configuration file (timings, attempts, reply timeout)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File backing the password store; kept in memory when omitted
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match &args.config {
        Some(path) => DoorlockConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => DoorlockConfig::default(),
    };
    info!(?config, "Door lock simulator starting");

    match &args.store {
        Some(path) => {
            let store = FileStore::open(path, PASSWORD_STORE_SLOTS)
                .await
                .with_context(|| format!("opening store {}", path.display()))?;
            simulate(config, store).await
        }
        None => {
            let (store, _cells) = MemoryStore::new(PASSWORD_STORE_SLOTS);
            simulate(config, store).await
        }
    }
}

/// Run both units until stdin closes, Ctrl-C, or a unit fails.
async fn simulate<S: PersistentStore>(config: DoorlockConfig, store: S) -> anyhow::Result<()> {
    let (iu_io, cu_io) = tokio::io::duplex(64);
    let (keypad, keys) = MockKeypad::new();

    let mut iu = InterfaceUnit::new(iu_io, keypad, ConsoleDisplay::new(), config.clone());
    let mut cu = ControlUnit::new(cu_io, ConsoleMotor, ConsoleAlarm, store, config);

    tokio::spawn(async move {
        if let Err(e) = feed_keypad(keys).await {
            warn!("Keypad input stopped: {}", e);
        }
    });

    let outcome = tokio::select! {
        result = iu.run() => result,
        result = cu.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(())
        }
    };

    match outcome {
        Err(UnitError::Hardware(HardwareError::Disconnected { .. })) => {
            info!("Keypad closed, shutting down");
            Ok(())
        }
        other => other.context("door lock unit failed"),
    }
}
