//! Baromotion CLI
//!
//! Barometric vertical-motion sensing agent.

use baromotion::{
    classifier::{FileModelProvider, ModelProvider, StaticModelProvider},
    config::Config,
    event::{EventSink, JsonlSink, LogSink},
    pipeline::{Pipeline, PipelineOptions},
    source::{RawReading, ReplaySource, SimProfile, SimulatedSource},
    stats::create_shared_stats_with_persistence,
    VERSION,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "baromotion")]
#[command(version = VERSION)]
#[command(about = "Barometric vertical-motion sensing agent", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sensing pipeline against a pressure source
    Start {
        /// Replay a recorded session (JSONL of readings)
        #[arg(long)]
        replay: Option<PathBuf>,

        /// Generate a simulated elevator ride instead of replaying
        #[arg(long)]
        simulate: bool,

        /// Duration of the simulated ride in seconds
        #[arg(long, default_value = "60")]
        duration_secs: u64,

        /// Pace the source to wall-clock time
        #[arg(long)]
        realtime: bool,

        /// Sampling window width in milliseconds
        #[arg(long)]
        window_ms: Option<u64>,

        /// Model artifact name to request from the model directory
        #[arg(long)]
        model: Option<String>,
    },

    /// Show run statistics from previous sessions
    Status,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            replay,
            simulate,
            duration_secs,
            realtime,
            window_ms,
            model,
        } => {
            cmd_start(replay, simulate, duration_secs, realtime, window_ms, model);
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

/// A started pressure source; kept so it can be stopped after the
/// pipeline has been torn down.
enum Source {
    Replay(ReplaySource),
    Simulated(SimulatedSource),
}

impl Source {
    fn stop(&mut self) {
        match self {
            Source::Replay(s) => s.stop(),
            Source::Simulated(s) => s.stop(),
        }
    }
}

fn cmd_start(
    replay: Option<PathBuf>,
    simulate: bool,
    duration_secs: u64,
    realtime: bool,
    window_ms: Option<u64>,
    model: Option<String>,
) {
    println!("Baromotion v{VERSION}");
    println!();

    let mut config = Config::load().unwrap_or_default();
    if let Some(window_ms) = window_ms {
        config.window_ms = window_ms;
    }
    if let Some(model) = model {
        config.model_name = model;
    }
    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    if replay.is_some() && simulate {
        eprintln!("Error: --replay and --simulate are mutually exclusive");
        std::process::exit(1);
    }

    // Build the pressure source; simulation is the default when no
    // recording was given.
    let (mut source, readings) = match replay {
        Some(path) => {
            println!("Source: replay of {path:?}");
            let mut source = ReplaySource::new(path, realtime);
            let readings: Receiver<RawReading> = source.receiver().clone();
            if let Err(e) = source.start() {
                eprintln!("Error starting replay: {e}");
                std::process::exit(1);
            }
            (Source::Replay(source), readings)
        }
        None => {
            println!("Source: simulated elevator ride ({duration_secs}s)");
            let mut source = SimulatedSource::new(SimProfile {
                duration_secs,
                realtime,
                ..SimProfile::default()
            });
            let readings = source.receiver().clone();
            if let Err(e) = source.start() {
                eprintln!("Error starting simulation: {e}");
                std::process::exit(1);
            }
            (Source::Simulated(source), readings)
        }
    };

    // Use the trained artifact when present, otherwise fall back to the
    // built-in model so development runs still classify.
    let file_provider = FileModelProvider::new(config.model_dir.clone());
    let provider: Box<dyn ModelProvider> = if file_provider
        .artifact_path(&config.model_name)
        .exists()
    {
        println!("Model: {} (from {:?})", config.model_name, config.model_dir);
        Box::new(file_provider)
    } else {
        println!("Model: builtin (no '{}' artifact found)", config.model_name);
        Box::new(StaticModelProvider::builtin())
    };

    println!("Window: {}ms", config.window_ms);

    // Event sinks: session file plus the log stream.
    let session_path = config
        .export_path
        .join(format!("session_{}.jsonl", Utc::now().format("%Y%m%d_%H%M%S")));
    let mut sinks: Vec<Box<dyn EventSink>> = vec![Box::new(LogSink)];
    match JsonlSink::create(&session_path) {
        Ok(sink) => {
            println!("Session file: {session_path:?}");
            sinks.push(Box::new(sink));
        }
        Err(e) => eprintln!("Warning: Could not create session file: {e}"),
    }

    let stats = create_shared_stats_with_persistence(config.data_path.join("run_stats.json"));

    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let mut handle = Pipeline::start(
        PipelineOptions {
            window_ms: config.window_ms,
            model_name: config.model_name.clone(),
        },
        readings,
        provider,
        sinks,
        stats.clone(),
    );

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    // Wait for shutdown or end of stream.
    while running.load(Ordering::SeqCst) && !handle.is_finished() {
        thread::sleep(Duration::from_millis(100));
    }

    println!();
    println!("Stopping...");
    handle.stop();
    source.stop();

    let snapshot = handle.state().snapshot();
    println!();
    println!("Final state:");
    println!("  Direction: {}", snapshot.direction);
    println!("  Altitude: {} m", snapshot.altitude);
    println!("  Pressure: {} hPa", snapshot.pressure);
    println!("  Altitude rate: {} m/s", snapshot.altitude_rate);
    println!("  Pressure rate: {} hPa/s", snapshot.pressure_rate);

    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save run stats: {e}");
    }

    println!();
    println!("{}", stats.summary());
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Baromotion Status");
    println!("=================");
    println!();
    println!("Configuration:");
    println!("  Window: {}ms", config.window_ms);
    println!("  Model: {}", config.model_name);
    println!("  Model directory: {:?}", config.model_dir);
    println!();

    let stats_path = config.data_path.join("run_stats.json");
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                if let Some(readings) = stats.get("readings_seen") {
                    println!("  Readings consumed: {readings}");
                }
                if let Some(windows) = stats.get("windows_computed") {
                    println!("  Windows computed: {windows}");
                }
                if let Some(skipped) = stats.get("windows_skipped") {
                    println!("  Windows skipped: {skipped}");
                }
                if let Some(events) = stats.get("events_published") {
                    println!("  Events published: {events}");
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}
