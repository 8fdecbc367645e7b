//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup and the simulation run.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: gridlock_core::config::ConfigError,
    },

    /// The starting population could not be built.
    #[error("population error: {source}")]
    Population {
        /// The underlying population error.
        #[from]
        source: gridlock_core::population::PopulationError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: gridlock_core::runner::RunnerError,
    },

    /// Writing tick metrics to stdout failed.
    #[error("metrics output error: {message}")]
    Metrics {
        /// Description of the output failure.
        message: String,
    },
}
