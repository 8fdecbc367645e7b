//! Traffic lights and the global round-robin signal cycle.
//!
//! Exactly one light in the whole system is non-red at any time. The active
//! light counts down once per tick; when a tick finds its countdown already
//! at zero the light turns red and the next light in list order (wrapping)
//! turns green with a fresh countdown. With `green_ticks = 6` a light is
//! therefore green for seven consecutive ticks, counting the tick it was
//! switched on.
//!
//! An optional yellow phase sits between green and red. It is disabled by
//! default (`yellow_ticks = 0`).

use gridlock_types::{LightId, LightState, Position};
use tracing::debug;

use crate::error::AgentError;

/// A signal light at a fixed intersection position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrafficLight {
    /// Position in the signal cycle.
    pub id: LightId,
    /// Cell the light stands on.
    pub position: Position,
    /// Colour currently shown.
    pub state: LightState,
    /// Ticks left in the current phase (only meaningful for the active light).
    pub countdown: u32,
}

/// What a call to [`SignalController::advance`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// The active light counted down.
    Holding {
        /// The active light.
        light: LightId,
        /// Ticks remaining after this decrement.
        remaining: u32,
    },
    /// The active light went from green to yellow.
    TurnedYellow {
        /// The active light.
        light: LightId,
    },
    /// The active light went red and the next one green.
    Switched {
        /// The light that turned red.
        from: LightId,
        /// The light that turned green.
        to: LightId,
    },
}

/// Finite-state machine over all lights, with a round-robin pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalController {
    lights: Vec<TrafficLight>,
    active: usize,
    green_ticks: u32,
    yellow_ticks: u32,
}

impl SignalController {
    /// Create the controller with one light per position, in cycle order.
    ///
    /// The first light starts green with a full countdown; the rest start red.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::NoLights`] for an empty list and
    /// [`AgentError::InvalidTiming`] if `green_ticks` is zero.
    pub fn new(
        positions: &[Position],
        green_ticks: u32,
        yellow_ticks: u32,
    ) -> Result<Self, AgentError> {
        if positions.is_empty() {
            return Err(AgentError::NoLights);
        }
        if green_ticks == 0 {
            return Err(AgentError::InvalidTiming {
                reason: "green_ticks must be at least 1".to_owned(),
            });
        }
        let mut lights = Vec::with_capacity(positions.len());
        for (index, position) in positions.iter().enumerate() {
            let id = LightId::from_index(index).ok_or_else(|| AgentError::InvalidTiming {
                reason: "too many lights".to_owned(),
            })?;
            let (state, countdown) = if index == 0 {
                (LightState::Green, green_ticks)
            } else {
                (LightState::Red, 0)
            };
            lights.push(TrafficLight {
                id,
                position: *position,
                state,
                countdown,
            });
        }
        Ok(Self {
            lights,
            active: 0,
            green_ticks,
            yellow_ticks,
        })
    }

    /// Advance the cycle by one tick.
    pub fn advance(&mut self) -> SignalEvent {
        let count = self.lights.len();
        let green_ticks = self.green_ticks;
        let yellow_ticks = self.yellow_ticks;
        let from = self.active;

        let Some(light) = self.lights.get_mut(from) else {
            // Unreachable by construction: the list is never empty and
            // `active` is always taken modulo its length.
            self.active = 0;
            return SignalEvent::Holding {
                light: LightId::new(0),
                remaining: 0,
            };
        };

        if light.countdown > 0 {
            light.countdown = light.countdown.saturating_sub(1);
            return SignalEvent::Holding {
                light: light.id,
                remaining: light.countdown,
            };
        }

        if light.state == LightState::Green && yellow_ticks > 0 {
            light.state = LightState::Yellow;
            light.countdown = yellow_ticks;
            debug!(light = %light.id, position = %light.position, "Signal turned yellow");
            return SignalEvent::TurnedYellow { light: light.id };
        }

        light.state = LightState::Red;
        let from_id = light.id;
        let to = from.checked_add(1).and_then(|n| n.checked_rem(count)).unwrap_or(0);
        self.active = to;
        let to_id = match self.lights.get_mut(to) {
            Some(next) => {
                next.state = LightState::Green;
                next.countdown = green_ticks;
                debug!(from = %from_id, to = %next.id, position = %next.position, "Signal switched");
                next.id
            }
            None => from_id,
        };
        SignalEvent::Switched {
            from: from_id,
            to: to_id,
        }
    }

    /// All lights in cycle order (which is also creation order).
    pub fn lights(&self) -> &[TrafficLight] {
        &self.lights
    }

    /// Look up a light by identifier.
    pub fn light(&self, id: LightId) -> Option<&TrafficLight> {
        self.lights.get(id.index())
    }

    /// The light the round-robin pointer is on.
    pub fn active_light(&self) -> Option<&TrafficLight> {
        self.lights.get(self.active)
    }

    /// Number of lights currently showing green.
    pub fn green_count(&self) -> usize {
        self.lights
            .iter()
            .filter(|light| light.state == LightState::Green)
            .count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn positions(n: i32) -> Vec<Position> {
        (0..n).map(|i| Position::new(i, i)).collect()
    }

    fn states(ctrl: &SignalController) -> Vec<LightState> {
        ctrl.lights().iter().map(|l| l.state).collect()
    }

    #[test]
    fn first_light_starts_green_rest_red() {
        let ctrl = SignalController::new(&positions(4), 6, 0).unwrap();
        assert_eq!(
            states(&ctrl),
            vec![LightState::Green, LightState::Red, LightState::Red, LightState::Red]
        );
        assert_eq!(ctrl.lights()[0].countdown, 6);
    }

    #[test]
    fn empty_or_zero_green_is_rejected() {
        assert!(matches!(
            SignalController::new(&[], 6, 0),
            Err(AgentError::NoLights)
        ));
        assert!(SignalController::new(&positions(2), 0, 0).is_err());
    }

    #[test]
    fn switches_on_seventh_tick() {
        let mut ctrl = SignalController::new(&positions(2), 6, 0).unwrap();
        for expected in (0..6).rev() {
            assert_eq!(
                ctrl.advance(),
                SignalEvent::Holding {
                    light: LightId::new(0),
                    remaining: expected
                }
            );
            assert_eq!(ctrl.lights()[0].state, LightState::Green);
        }
        assert_eq!(
            ctrl.advance(),
            SignalEvent::Switched {
                from: LightId::new(0),
                to: LightId::new(1)
            }
        );
        assert_eq!(ctrl.lights()[0].state, LightState::Red);
        assert_eq!(ctrl.lights()[1].state, LightState::Green);
        assert_eq!(ctrl.lights()[1].countdown, 6);
    }

    #[test]
    fn single_light_rearms_itself() {
        let mut ctrl = SignalController::new(&positions(1), 6, 0).unwrap();
        for _ in 0..7 {
            ctrl.advance();
        }
        let light = &ctrl.lights()[0];
        assert_eq!(light.state, LightState::Green);
        assert_eq!(light.countdown, 6);
    }

    #[test]
    fn exactly_one_green_with_bounded_countdown() {
        let mut ctrl = SignalController::new(&positions(4), 6, 0).unwrap();
        for _ in 0..200 {
            ctrl.advance();
            assert_eq!(ctrl.green_count(), 1);
            let active = ctrl.active_light().unwrap();
            assert_eq!(active.state, LightState::Green);
            assert!(active.countdown <= 6);
            let reds = ctrl
                .lights()
                .iter()
                .filter(|l| l.state == LightState::Red)
                .count();
            assert_eq!(reds, 3);
        }
    }

    #[test]
    fn round_robin_visits_every_light_in_order() {
        let mut ctrl = SignalController::new(&positions(4), 6, 0).unwrap();
        let mut order = vec![LightId::new(0)];
        // One full cycle: seven ticks per green phase.
        for _ in 0..(7 * 4) {
            if let SignalEvent::Switched { to, .. } = ctrl.advance() {
                order.push(to);
            }
        }
        assert_eq!(
            order,
            vec![
                LightId::new(0),
                LightId::new(1),
                LightId::new(2),
                LightId::new(3),
                LightId::new(0)
            ]
        );
    }

    #[test]
    fn yellow_phase_sits_between_green_and_red() {
        let mut ctrl = SignalController::new(&positions(2), 1, 2).unwrap();
        ctrl.advance(); // 1 -> 0
        assert_eq!(ctrl.advance(), SignalEvent::TurnedYellow { light: LightId::new(0) });
        assert_eq!(ctrl.lights()[0].state, LightState::Yellow);
        assert_eq!(ctrl.green_count(), 0);
        ctrl.advance(); // 2 -> 1
        ctrl.advance(); // 1 -> 0
        assert_eq!(ctrl.lights()[0].state, LightState::Yellow);
        assert!(matches!(ctrl.advance(), SignalEvent::Switched { .. }));
        assert_eq!(states(&ctrl), vec![LightState::Red, LightState::Green]);
    }
}
