//! Engine binary for the Gridlock traffic simulation.
//!
//! Loads configuration, seeds the world and runs the tick cycle for the
//! configured number of ticks. Structured logs go to stderr; when
//! `logging.emit_tick_summaries` is set, every tick summary is written to
//! stdout as one JSON line.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (first argument, else `gridlock-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Seed the population and signal controller
//! 4. Run the simulation loop
//! 5. Log the result

mod error;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use gridlock_core::config::SimulationConfig;
use gridlock_core::runner::{self, TickCallback};
use gridlock_core::tick::{SimulationState, TickSummary};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "gridlock-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, seeding, the simulation or the
/// metrics stream fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so remember whether the
    //    file was missing and report it once the subscriber exists.
    let path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, found) = load_config(&path)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    info!("gridlock-engine starting");
    if !found {
        warn!(path = %path.display(), "Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        grid_size = config.world.grid_size,
        cars = config.population.cars,
        pedestrians = config.population.pedestrians,
        max_ticks = config.simulation.max_ticks,
        "Configuration loaded"
    );

    // 3. Seed the world.
    let mut state = SimulationState::from_config(&config)?;
    info!(
        agents = state.agents.len(),
        lights = state.signals.lights().len(),
        "Simulation state assembled, entering tick loop"
    );

    // 4. Run the simulation.
    let mut callback = JsonLinesCallback::new(config.logging.emit_tick_summaries);
    let result = runner::run_simulation(&mut state, config.simulation.max_ticks, &mut callback)?;
    callback.finish()?;

    // 5. Log results.
    runner::log_simulation_end(&result);
    info!(
        total_ticks = result.total_ticks,
        "gridlock-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration from `path`.
///
/// A missing file is not an error: defaults are returned together with
/// `false` so the caller can report it.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), EngineError> {
    if path.exists() {
        let config = SimulationConfig::from_file(path)?;
        config.validate()?;
        Ok((config, true))
    } else {
        Ok((SimulationConfig::default(), false))
    }
}

/// Writes each [`TickSummary`] to stdout as a single JSON line.
///
/// The callback cannot return an error mid-run, so the first failure is
/// kept, output stops, and [`JsonLinesCallback::finish`] reports it.
struct JsonLinesCallback {
    enabled: bool,
    failure: Option<String>,
}

impl JsonLinesCallback {
    const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            failure: None,
        }
    }

    fn write_line(summary: &TickSummary) -> Result<(), String> {
        let line = serde_json::to_string(summary).map_err(|e| e.to_string())?;
        let mut out = io::stdout().lock();
        writeln!(out, "{line}").map_err(|e| e.to_string())?;
        out.flush().map_err(|e| e.to_string())
    }

    fn finish(self) -> Result<(), EngineError> {
        self.failure
            .map_or(Ok(()), |message| Err(EngineError::Metrics { message }))
    }
}

impl TickCallback for JsonLinesCallback {
    fn on_tick(&mut self, summary: &TickSummary, _state: &SimulationState) {
        if !self.enabled || self.failure.is_some() {
            return;
        }
        if let Err(message) = Self::write_line(summary) {
            warn!(tick = summary.tick, error = %message, "Metrics output failed, disabling");
            self.failure = Some(message);
        }
    }
}
