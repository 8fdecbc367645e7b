//! The closed set of agents and their per-tick dispatch.
//!
//! The population is a `Vec<Agent>` in creation order; an agent's
//! [`AgentId`] is its index. Buildings and lights are passive: buildings
//! never change and lights are driven by the signal controller, so their
//! step is a no-op. Vehicles and pedestrians decide a move and report it as
//! a [`StepOutcome`] for the driver to apply to the grid.

use gridlock_types::{AgentId, AgentKind, LightId, Personality, Position};
use rand::Rng;

use crate::car::Car;
use crate::config::BehaviorConfig;
use crate::pedestrian::Pedestrian;
use crate::reckless::RecklessCar;
use crate::scene::Scene;

/// An impassable cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Building {
    /// The cell the building covers.
    pub position: Position,
}

/// Population entry for a traffic light. The light's state lives in the
/// signal controller under `light`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightMarker {
    /// Identifier within the signal controller.
    pub light: LightId,
    /// The cell the light stands on.
    pub position: Position,
}

/// Any agent in the population.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Agent {
    /// Impassable building.
    Building(Building),
    /// Traffic light.
    TrafficLight(LightMarker),
    /// Disciplined car.
    Car(Car),
    /// Reckless car.
    RecklessCar(RecklessCar),
    /// Pedestrian.
    Pedestrian(Pedestrian),
}

/// What an agent did during its step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Nothing to do (passive agent, or a pedestrian waiting for red).
    Idle,
    /// Moved into a free cell.
    Moved {
        /// The new cell.
        to: Position,
    },
    /// A reckless car drove through a red or yellow light.
    RanLight {
        /// The disregarded light.
        light: Position,
        /// The new cell.
        to: Position,
    },
    /// Stopped for a light.
    StoppedAtLight {
        /// The light obeyed.
        light: Position,
    },
    /// Contested the next cell with another car.
    Negotiated {
        /// The other car.
        with: AgentId,
        /// Summary from the acting car's side.
        outcome: gridlock_types::NegotiationOutcome,
        /// Set when the negotiation actually let the car move.
        to: Option<Position>,
    },
    /// Could not move: building, vehicle, or grid edge in the way.
    Blocked,
    /// A pedestrian frozen by a reckless car in its cell.
    Frozen,
}

impl StepOutcome {
    /// The cell the agent ends up in if it moved.
    pub const fn destination(&self) -> Option<Position> {
        match *self {
            Self::Moved { to } | Self::RanLight { to, .. } => Some(to),
            Self::Negotiated { to, .. } => to,
            Self::Idle | Self::StoppedAtLight { .. } | Self::Blocked | Self::Frozen => None,
        }
    }
}

impl Agent {
    /// The agent's kind.
    pub const fn kind(&self) -> AgentKind {
        match self {
            Self::Building(_) => AgentKind::Building,
            Self::TrafficLight(_) => AgentKind::TrafficLight,
            Self::Car(_) => AgentKind::Car,
            Self::RecklessCar(_) => AgentKind::RecklessCar,
            Self::Pedestrian(_) => AgentKind::Pedestrian,
        }
    }

    /// The cell the agent occupies.
    pub const fn position(&self) -> Position {
        match self {
            Self::Building(b) => b.position,
            Self::TrafficLight(l) => l.position,
            Self::Car(c) => c.position,
            Self::RecklessCar(r) => r.position,
            Self::Pedestrian(p) => p.position,
        }
    }

    /// Whether the agent occupies a lane slot.
    pub const fn is_vehicle(&self) -> bool {
        self.kind().is_vehicle()
    }

    /// Whether the agent changes anything during its step.
    pub const fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Car(_) | Self::RecklessCar(_) | Self::Pedestrian(_)
        )
    }

    /// Personality this agent brings to a negotiation.
    ///
    /// Reckless cars never give way, so they negotiate as competitive.
    pub const fn negotiating_personality(&self) -> Option<Personality> {
        match self {
            Self::Car(c) => Some(c.personality),
            Self::RecklessCar(_) => Some(Personality::Competitive),
            Self::Building(_) | Self::TrafficLight(_) | Self::Pedestrian(_) => None,
        }
    }

    /// Numeric happiness of a vehicle.
    pub const fn happiness(&self) -> Option<i64> {
        match self {
            Self::Car(c) => Some(c.happiness),
            Self::RecklessCar(r) => Some(r.happiness),
            Self::Building(_) | Self::TrafficLight(_) | Self::Pedestrian(_) => None,
        }
    }

    /// Jam counter of a vehicle.
    pub const fn jam_counter(&self) -> Option<u32> {
        match self {
            Self::Car(c) => Some(c.jam_counter),
            Self::RecklessCar(r) => Some(r.jam_counter),
            Self::Building(_) | Self::TrafficLight(_) | Self::Pedestrian(_) => None,
        }
    }

    /// Run this agent's per-tick update against `scene`.
    ///
    /// `me` must be this agent's own identifier so it can tell itself apart
    /// from other occupants.
    pub fn step(
        &mut self,
        me: AgentId,
        scene: &Scene<'_>,
        config: &BehaviorConfig,
        rng: &mut impl Rng,
    ) -> StepOutcome {
        match self {
            Self::Building(_) | Self::TrafficLight(_) => StepOutcome::Idle,
            Self::Car(car) => car.step(me, scene, config),
            Self::RecklessCar(car) => car.step(me, scene, config, rng),
            Self::Pedestrian(walker) => walker.step(me, scene),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_only_for_moves() {
        let to = Position::new(1, 2);
        assert_eq!(StepOutcome::Moved { to }.destination(), Some(to));
        assert_eq!(
            StepOutcome::RanLight {
                light: Position::new(0, 0),
                to
            }
            .destination(),
            Some(to)
        );
        assert_eq!(StepOutcome::Blocked.destination(), None);
        assert_eq!(
            StepOutcome::Negotiated {
                with: AgentId::new(4),
                outcome: gridlock_types::NegotiationOutcome::Yielded,
                to: None
            }
            .destination(),
            None
        );
    }

    #[test]
    fn passive_agents_report_kind_and_position() {
        let building = Agent::Building(Building {
            position: Position::new(0, 0),
        });
        assert_eq!(building.kind(), AgentKind::Building);
        assert!(!building.is_active());
        assert!(!building.is_vehicle());
        assert_eq!(building.negotiating_personality(), None);

        let light = Agent::TrafficLight(LightMarker {
            light: LightId::new(0),
            position: Position::new(9, 15),
        });
        assert_eq!(light.position(), Position::new(9, 15));
        assert_eq!(light.happiness(), None);
    }
}
