//! Configuration loading and typed config structures for the Gridlock simulation.
//!
//! The canonical configuration lives in `gridlock-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, a loader for the file, and [`SimulationConfig::validate`],
//! which rejects parameters the simulation cannot run with.

use std::path::Path;

use serde::Deserialize;

use gridlock_agents::BehaviorConfig;
use gridlock_world::RoadLayout;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable simulation.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `gridlock-config.yaml`. Every field has a
/// default matching the reference intersection model.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, grid size).
    #[serde(default)]
    pub world: WorldConfig,

    /// Signal phase durations.
    #[serde(default)]
    pub signals: SignalConfig,

    /// Population parameters.
    #[serde(default)]
    pub population: PopulationConfig,

    /// Behaviour probabilities and memory.
    #[serde(default)]
    pub behavior: BehaviorSection,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Static road tables. Defaults to the reference 23x23 map.
    #[serde(default)]
    pub layout: RoadLayout,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Check that the configuration describes a runnable simulation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the grid is too small for the
    /// layout tables, a probability lies outside `[0, 1]`, a duration is
    /// zero, or the run has no ticks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.grid_size < 1 {
            return Err(invalid(format!(
                "world.grid_size must be positive, got {}",
                self.world.grid_size
            )));
        }
        self.layout
            .validate(self.world.grid_size)
            .map_err(|err| invalid(err.to_string()))?;
        self.behavior_config()
            .validate()
            .map_err(|err| invalid(err.to_string()))?;
        let p = self.population.reckless_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(invalid(format!(
                "population.reckless_probability = {p} is outside [0, 1]"
            )));
        }
        if self.simulation.max_ticks == 0 {
            return Err(invalid("simulation.max_ticks must be at least 1".to_owned()));
        }
        Ok(())
    }

    /// Assemble the per-tick behaviour parameters.
    pub fn behavior_config(&self) -> BehaviorConfig {
        BehaviorConfig {
            green_ticks: self.signals.green_ticks,
            yellow_ticks: self.signals.yellow_ticks,
            cleared_memory_ticks: self.behavior.cleared_memory_ticks,
            reckless_turn_probability: self.behavior.reckless_turn_probability,
            reckless_respect_probability: self.behavior.reckless_respect_probability,
            car_starting_happiness: self.behavior.car_starting_happiness,
            reckless_starting_happiness: self.behavior.reckless_starting_happiness,
        }
    }
}

const fn invalid(reason: String) -> ConfigError {
    ConfigError::Invalid { reason }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Side length of the torus.
    #[serde(default = "default_grid_size")]
    pub grid_size: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            grid_size: default_grid_size(),
        }
    }
}

/// Signal phase durations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SignalConfig {
    /// Countdown given to a light when it turns green.
    #[serde(default = "default_green_ticks")]
    pub green_ticks: u32,

    /// Explicit yellow phase length (0 disables yellow).
    #[serde(default)]
    pub yellow_ticks: u32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            green_ticks: default_green_ticks(),
            yellow_ticks: 0,
        }
    }
}

/// Population configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopulationConfig {
    /// Vehicles to attempt to spawn (spawns onto an occupied lane are skipped).
    #[serde(default = "default_cars")]
    pub cars: u32,

    /// Pedestrians to attempt to place (duplicates on a waypoint are skipped).
    #[serde(default = "default_pedestrians")]
    pub pedestrians: u32,

    /// Chance that a spawned vehicle is reckless.
    #[serde(default = "default_reckless_probability")]
    pub reckless_probability: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            cars: default_cars(),
            pedestrians: default_pedestrians(),
            reckless_probability: default_reckless_probability(),
        }
    }
}

/// Behaviour parameters as they appear in YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BehaviorSection {
    /// Chance a reckless car turns at a turn point.
    #[serde(default = "default_reckless_turn_probability")]
    pub reckless_turn_probability: f64,

    /// Chance a reckless car stops for a red or yellow light.
    #[serde(default = "default_reckless_respect_probability")]
    pub reckless_respect_probability: f64,

    /// Ticks a disciplined car remembers a cleared light.
    #[serde(default = "default_cleared_memory_ticks")]
    pub cleared_memory_ticks: u32,

    /// Starting happiness of disciplined cars.
    #[serde(default = "default_car_starting_happiness")]
    pub car_starting_happiness: i64,

    /// Starting happiness of reckless cars.
    #[serde(default = "default_reckless_starting_happiness")]
    pub reckless_starting_happiness: i64,
}

impl Default for BehaviorSection {
    fn default() -> Self {
        Self {
            reckless_turn_probability: default_reckless_turn_probability(),
            reckless_respect_probability: default_reckless_respect_probability(),
            cleared_memory_ticks: default_cleared_memory_ticks(),
            car_starting_happiness: default_car_starting_happiness(),
            reckless_starting_happiness: default_reckless_starting_happiness(),
        }
    }
}

/// Simulation boundary parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Number of ticks to run.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            max_ticks: default_max_ticks(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Print one JSON line of metrics per tick on stdout.
    #[serde(default = "default_true")]
    pub emit_tick_summaries: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            emit_tick_summaries: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Gridlock".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_grid_size() -> i32 {
    23
}

const fn default_green_ticks() -> u32 {
    6
}

const fn default_cars() -> u32 {
    40
}

const fn default_pedestrians() -> u32 {
    8
}

const fn default_reckless_probability() -> f64 {
    0.1
}

const fn default_reckless_turn_probability() -> f64 {
    0.7
}

const fn default_reckless_respect_probability() -> f64 {
    0.5
}

const fn default_cleared_memory_ticks() -> u32 {
    2
}

const fn default_car_starting_happiness() -> i64 {
    1000
}

const fn default_reckless_starting_happiness() -> i64 {
    100
}

const fn default_max_ticks() -> u64 {
    200
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use gridlock_types::Position;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.world.grid_size, 23);
        assert_eq!(config.signals.green_ticks, 6);
        assert_eq!(config.population.cars, 40);
        assert_eq!(config.simulation.max_ticks, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn behavior_config_matches_defaults() {
        assert_eq!(
            SimulationConfig::default().behavior_config(),
            BehaviorConfig::default()
        );
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
world:
  name: "Rush Hour"
  seed: 7
  grid_size: 23

signals:
  green_ticks: 4
  yellow_ticks: 1

population:
  cars: 60
  pedestrians: 4
  reckless_probability: 0.25

behavior:
  reckless_turn_probability: 0.5
  reckless_respect_probability: 0.9
  cleared_memory_ticks: 3

simulation:
  max_ticks: 50

logging:
  level: "debug"
  emit_tick_summaries: false
"#;
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "Rush Hour");
        assert_eq!(config.signals.yellow_ticks, 1);
        assert_eq!(config.population.cars, 60);
        assert_eq!(config.behavior.cleared_memory_ticks, 3);
        assert_eq!(config.simulation.max_ticks, 50);
        assert!(!config.logging.emit_tick_summaries);
        // Layout omitted: reference tables.
        assert_eq!(config.layout, RoadLayout::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 9\n").unwrap();
        assert_eq!(config.world.seed, 9);
        assert_eq!(config.population.pedestrians, 8);
    }

    #[test]
    fn parse_empty_yaml() {
        assert_eq!(SimulationConfig::parse("").unwrap(), SimulationConfig::default());
    }

    #[test]
    fn layout_override_is_parsed() {
        let yaml = "layout:\n  light_positions:\n    - [11, 11]\n";
        let config = SimulationConfig::parse(yaml).unwrap();
        assert_eq!(config.layout.light_positions, vec![Position::new(11, 11)]);
        assert_eq!(config.layout.waypoints.len(), 8);
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        assert!(matches!(
            SimulationConfig::parse("world: [unterminated"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let mut config = SimulationConfig::default();
        config.population.reckless_probability = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = SimulationConfig::default();
        config.behavior.reckless_turn_probability = -0.1;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.signals.green_ticks = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.world.grid_size = 10;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.simulation.max_ticks = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("gridlock-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
            assert!(config.unwrap().validate().is_ok());
        }
    }
}
