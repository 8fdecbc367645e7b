//! Pedestrians walking a fixed waypoint loop.
//!
//! A pedestrian only walks while the light nearest to it shows red, one
//! diagonal-capable step at a time toward its current waypoint, and never
//! into a cell holding a vehicle. A reckless car sharing its cell freezes
//! it for the tick.

use gridlock_types::{AgentId, LightState, Position};

use crate::agent::StepOutcome;
use crate::error::AgentError;
use crate::scene::Scene;

/// A walker cycling through a closed route of waypoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pedestrian {
    /// Current cell.
    pub position: Position,
    /// The waypoint loop, walked in order and wrapping at the end.
    pub route: Vec<Position>,
    /// Index into `route` of the waypoint being walked to.
    pub target_index: usize,
    /// Set while a reckless car shares the pedestrian's cell.
    pub blocked: bool,
}

impl Pedestrian {
    /// Create a pedestrian standing on one of the route's waypoints.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownWaypoint`] if `start` is not in `route`.
    pub fn new(start: Position, route: Vec<Position>) -> Result<Self, AgentError> {
        let target_index = route
            .iter()
            .position(|waypoint| *waypoint == start)
            .ok_or(AgentError::UnknownWaypoint { position: start })?;
        Ok(Self {
            position: start,
            route,
            target_index,
            blocked: false,
        })
    }

    /// The waypoint currently being walked to.
    pub fn target(&self) -> Option<Position> {
        self.route.get(self.target_index).copied()
    }

    /// Run one tick of behaviour.
    pub fn step(&mut self, me: AgentId, scene: &Scene<'_>) -> StepOutcome {
        self.blocked = scene.has_reckless(self.position);
        if self.blocked {
            return StepOutcome::Frozen;
        }

        let walk = scene
            .nearest_light(self.position)
            .is_some_and(|light| light.state == LightState::Red);
        if !walk {
            return StepOutcome::Idle;
        }
        let Some(target) = self.target() else {
            return StepOutcome::Idle;
        };

        let next = self.position.step_toward(target);
        let mut outcome = StepOutcome::Idle;
        if next != self.position {
            if scene.has_vehicle(next, me) {
                outcome = StepOutcome::Blocked;
            } else {
                self.position = next;
                outcome = StepOutcome::Moved { to: next };
            }
        }

        if self.position == target {
            self.target_index = self
                .target_index
                .checked_add(1)
                .and_then(|next| next.checked_rem(self.route.len()))
                .unwrap_or(0);
        }
        outcome
    }
}
