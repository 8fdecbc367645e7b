//! Tunable parameters for agent behaviour.
//!
//! [`BehaviorConfig`] bundles the durations and probabilities the behaviours
//! read every tick. The tick driver builds it from the YAML configuration at
//! simulation start; tests construct it directly.

use crate::error::AgentError;

/// Behaviour parameters applied each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct BehaviorConfig {
    /// Ticks a light stays green after being switched on (default: 6).
    pub green_ticks: u32,

    /// Ticks of explicit yellow between green and red (default: 0, which
    /// switches straight from green to red).
    pub yellow_ticks: u32,

    /// Ticks a disciplined car remembers a cleared light (default: 2).
    pub cleared_memory_ticks: u32,

    /// Chance a reckless car swings onto a turn point's heading (default: 0.7).
    pub reckless_turn_probability: f64,

    /// Chance a reckless car stops for a red or yellow light (default: 0.5).
    pub reckless_respect_probability: f64,

    /// Happiness of a disciplined car at creation (default: 1000).
    pub car_starting_happiness: i64,

    /// Happiness of a reckless car at creation (default: 100).
    pub reckless_starting_happiness: i64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            green_ticks: 6,
            yellow_ticks: 0,
            cleared_memory_ticks: 2,
            reckless_turn_probability: 0.7,
            reckless_respect_probability: 0.5,
            car_starting_happiness: 1000,
            reckless_starting_happiness: 100,
        }
    }
}

impl BehaviorConfig {
    /// Reject parameters the behaviours cannot use.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidProbability`] for a probability outside
    /// `[0, 1]` (or NaN), and [`AgentError::InvalidTiming`] for a zero green
    /// phase or a zero cleared-light memory.
    pub fn validate(&self) -> Result<(), AgentError> {
        check_probability("reckless_turn_probability", self.reckless_turn_probability)?;
        check_probability(
            "reckless_respect_probability",
            self.reckless_respect_probability,
        )?;
        if self.green_ticks == 0 {
            return Err(AgentError::InvalidTiming {
                reason: "green_ticks must be at least 1".to_owned(),
            });
        }
        if self.cleared_memory_ticks == 0 {
            return Err(AgentError::InvalidTiming {
                reason: "cleared_memory_ticks must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), AgentError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(AgentError::InvalidProbability { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_model() {
        let cfg = BehaviorConfig::default();
        assert_eq!(cfg.green_ticks, 6);
        assert_eq!(cfg.yellow_ticks, 0);
        assert_eq!(cfg.cleared_memory_ticks, 2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let cfg = BehaviorConfig {
            reckless_turn_probability: 1.5,
            ..BehaviorConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(AgentError::InvalidProbability {
                name: "reckless_turn_probability",
                ..
            })
        ));

        let cfg = BehaviorConfig {
            reckless_respect_probability: f64::NAN,
            ..BehaviorConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_green_phase_is_rejected() {
        let cfg = BehaviorConfig {
            green_ticks: 0,
            ..BehaviorConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(AgentError::InvalidTiming { .. })));
    }
}
