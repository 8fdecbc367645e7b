//! Bounded simulation loop.
//!
//! [`run_simulation`] wraps the single-tick [`run_tick`] function, runs it
//! a fixed number of times and hands every [`TickSummary`] to a
//! [`TickCallback`]. Deciding how long to run stays with the caller.
//!
//! [`run_tick`]: crate::tick::run_tick

use tracing::{info, warn};

use crate::tick::{self, SimulationState, TickError, TickSummary};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Implementations can use this to stream metrics, record history, or
/// check invariants. The callback receives the tick summary and the
/// current simulation state.
pub trait TickCallback {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState);
}

/// A no-op tick callback for testing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _state: &SimulationState) {}
}

/// Run `max_ticks` ticks, notifying `callback` after each one.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick execution fails.
pub fn run_simulation(
    state: &mut SimulationState,
    max_ticks: u64,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut final_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;

    info!(
        max_ticks,
        start_tick = state.clock.tick(),
        agents = state.agents.len(),
        "Simulation starting"
    );

    while total_ticks < max_ticks {
        let summary = tick::run_tick(state)?;
        total_ticks = total_ticks.saturating_add(1);
        callback.on_tick(&summary, state);
        final_summary = Some(summary);
    }

    Ok(SimulationResult {
        final_summary,
        total_ticks,
    })
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            happy_cars = summary.stats.happy_cars,
            angry_cars = summary.stats.angry_cars,
            reckless_cars = summary.stats.reckless_cars,
            jammed_vehicles = summary.stats.jammed_vehicles,
            mean_happiness = summary.stats.mean_happiness,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;

    /// Records the tick numbers it sees.
    struct Recorder {
        ticks: Vec<u64>,
    }

    impl TickCallback for Recorder {
        fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
            assert_eq!(summary.tick, state.clock.tick());
            self.ticks.push(summary.tick);
        }
    }

    #[test]
    fn runs_exactly_max_ticks() {
        let mut state = SimulationState::from_config(&SimulationConfig::default()).unwrap();
        let mut recorder = Recorder { ticks: Vec::new() };
        let result = run_simulation(&mut state, 5, &mut recorder).unwrap();
        assert_eq!(result.total_ticks, 5);
        assert_eq!(recorder.ticks, vec![1, 2, 3, 4, 5]);
        assert_eq!(result.final_summary.unwrap().tick, 5);
        assert_eq!(state.clock.tick(), 5);
    }

    #[test]
    fn zero_ticks_runs_nothing() {
        let mut state = SimulationState::from_config(&SimulationConfig::default()).unwrap();
        let result = run_simulation(&mut state, 0, &mut NoOpCallback).unwrap();
        assert_eq!(result.total_ticks, 0);
        assert!(result.final_summary.is_none());
        log_simulation_end(&result);
    }

    #[test]
    fn resumes_from_the_current_tick() {
        let mut state = SimulationState::from_config(&SimulationConfig::default()).unwrap();
        run_simulation(&mut state, 3, &mut NoOpCallback).unwrap();
        let result = run_simulation(&mut state, 2, &mut NoOpCallback).unwrap();
        assert_eq!(result.final_summary.unwrap().tick, 5);
    }
}
