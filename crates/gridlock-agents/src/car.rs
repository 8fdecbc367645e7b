//! Disciplined cars.
//!
//! A car keeps the heading of the edge it spawned on. Each tick it:
//!
//! 1. ages its cleared-light memory, forgetting the light after
//!    `cleared_memory_ticks`;
//! 2. picks its preferred cell: straight ahead, or a turn onto the
//!    perpendicular road when it is in the outer lane;
//! 3. consults its controlling light unless that light is remembered as
//!    cleared, recording the light as cleared once the car is beyond it,
//!    and stops on red;
//! 4. moves into the preferred cell (wrapped) if it holds no vehicle and no
//!    building;
//! 5. otherwise negotiates with the vehicle in the way, or counts itself
//!    stuck behind a building.

use gridlock_types::{
    AgentId, Direction, LightState, Mood, NegotiationAction, NegotiationOutcome, Personality,
    Position,
};
use tracing::debug;

use crate::agent::{Agent, StepOutcome};
use crate::config::BehaviorConfig;
use crate::error::AgentError;
use crate::negotiation::{announced_intention, negotiate};
use crate::scene::Scene;

/// Happiness gained by a free move.
pub const MOVE_REWARD: i64 = 5;
/// Happiness lost waiting at a red light.
pub const RED_LIGHT_PENALTY: i64 = 5;
/// Happiness lost when stuck behind a building or the grid edge.
pub const BLOCKED_PENALTY: i64 = 2;
/// Happiness gained by yielding in a negotiation that did not move the car.
pub const YIELD_REWARD: i64 = 1;
/// Happiness lost by advancing in a negotiation that did not move the car.
pub const CONTESTED_ADVANCE_PENALTY: i64 = 2;
/// Jam counter above which a car is angry regardless of anything else.
pub const ANGRY_JAM_THRESHOLD: u32 = 5;

/// A lane-following car that obeys lights and negotiates for space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    /// The edge cell the car entered from.
    pub spawn: Position,
    /// Heading, fixed for the car's lifetime.
    pub direction: Direction,
    /// Current cell.
    pub position: Position,
    /// Coarse happiness classification.
    pub mood: Mood,
    /// Numeric happiness score.
    pub happiness: i64,
    /// Consecutive ticks without a move.
    pub jam_counter: u32,
    /// Light most recently cleared.
    pub last_cleared_light: Option<Position>,
    /// Ticks since `last_cleared_light` was recorded.
    pub cleared_ticks_ago: Option<u32>,
    /// Negotiation temperament.
    pub personality: Personality,
    /// Result of the most recent negotiation.
    pub last_negotiation: Option<NegotiationOutcome>,
}

/// A nearby car and the intention it announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeighborIntention {
    /// The neighbouring car.
    pub agent: AgentId,
    /// Its current cell.
    pub position: Position,
    /// What it says it will do in a contest.
    pub intention: NegotiationAction,
}

impl Car {
    /// Create a car at its spawn cell.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::SpawnNotOnEdge`] if `spawn` is not on an edge of
    /// a grid of side `grid_size`.
    pub fn new(
        spawn: Position,
        grid_size: i32,
        personality: Personality,
        happiness: i64,
    ) -> Result<Self, AgentError> {
        let direction =
            Direction::from_spawn_edge(spawn, grid_size).ok_or(AgentError::SpawnNotOnEdge {
                spawn,
                size: grid_size,
            })?;
        Ok(Self {
            spawn,
            direction,
            position: spawn,
            mood: Mood::Happy,
            happiness,
            jam_counter: 0,
            last_cleared_light: None,
            cleared_ticks_ago: None,
            personality,
            last_negotiation: None,
        })
    }

    /// Whether the car is in the outermost lane for its heading.
    pub const fn is_outer_lane(&self, grid_size: i32) -> bool {
        let last = grid_size.saturating_sub(1);
        match self.direction {
            Direction::Up => self.position.x == last,
            Direction::Down => self.position.x == 0,
            Direction::Right => self.position.y == last,
            Direction::Left => self.position.y == 0,
        }
    }

    /// The cell the car wants next, before torus wrapping.
    pub const fn preferred_move(&self, grid_size: i32) -> Position {
        if self.is_outer_lane(grid_size) {
            self.position.step(self.direction.outer_lane_turn())
        } else {
            self.position.step(self.direction)
        }
    }

    /// Age the cleared-light memory by one tick.
    pub const fn decay_cleared_memory(&mut self, memory_ticks: u32) {
        if self.last_cleared_light.is_none() {
            return;
        }
        let Some(ago) = self.cleared_ticks_ago else {
            return;
        };
        let ago = ago.saturating_add(1);
        if ago >= memory_ticks {
            self.last_cleared_light = None;
            self.cleared_ticks_ago = None;
        } else {
            self.cleared_ticks_ago = Some(ago);
        }
    }

    /// Consult the controlling light unless it is remembered as cleared.
    ///
    /// Records the light as cleared when the car is already beyond it.
    /// Returns the light's position and colour, or `None` when no light
    /// applies.
    fn check_signal(&mut self, scene: &Scene<'_>) -> Option<(Position, LightState)> {
        let light_pos = scene.layout.controlling_light(self.spawn)?;
        if self.last_cleared_light == Some(light_pos) {
            return None;
        }
        let light = scene.controlling_light(self.spawn)?;
        if self.direction.has_passed(self.position, light.position) {
            self.last_cleared_light = Some(light.position);
            self.cleared_ticks_ago = Some(0);
        }
        Some((light.position, light.state))
    }

    /// Run one tick of behaviour. See the module docs for the order of checks.
    pub fn step(
        &mut self,
        me: AgentId,
        scene: &Scene<'_>,
        config: &BehaviorConfig,
    ) -> StepOutcome {
        self.decay_cleared_memory(config.cleared_memory_ticks);
        let size = scene.grid.size();
        let preferred = self.preferred_move(size);

        if let Some((light, LightState::Red)) = self.check_signal(scene) {
            self.jam_counter = self.jam_counter.saturating_add(1);
            self.happiness = self.happiness.saturating_sub(RED_LIGHT_PENALTY);
            self.anger_if_jammed();
            return StepOutcome::StoppedAtLight { light };
        }

        let target = scene.grid.wrap(preferred);
        let blocker = scene.vehicle_at(target, me);

        if blocker.is_none() && !scene.has_building(target) {
            self.advance_to(target);
            self.happiness = self.happiness.saturating_add(MOVE_REWARD);
            self.mood = Mood::Happy;
            return StepOutcome::Moved { to: target };
        }

        if let Some((other_id, other)) = blocker {
            return self.contest(me, other_id, other, target, scene);
        }

        self.jam_counter = self.jam_counter.saturating_add(1);
        self.happiness = self.happiness.saturating_sub(BLOCKED_PENALTY);
        self.mood = Mood::Angry;
        StepOutcome::Blocked
    }

    /// Negotiate with the vehicle occupying `target`.
    fn contest(
        &mut self,
        me: AgentId,
        other_id: AgentId,
        other: &Agent,
        target: Position,
        scene: &Scene<'_>,
    ) -> StepOutcome {
        let other_personality = other
            .negotiating_personality()
            .unwrap_or(Personality::Competitive);
        let deal = negotiate(self.personality, other_personality);
        let outcome = deal.outcome();
        self.last_negotiation = Some(outcome);
        if deal.frustrated {
            self.mood = Mood::Angry;
        }
        debug!(car = %me, other = %other_id, ?outcome, "Negotiated for contested cell");

        // Dormant while contests only start against an occupied cell.
        if deal.mine == NegotiationAction::Advance && !scene.has_vehicle(target, me) {
            self.advance_to(target);
            self.happiness = self.happiness.saturating_add(deal.reward);
            return StepOutcome::Negotiated {
                with: other_id,
                outcome,
                to: Some(target),
            };
        }

        let delta = match deal.mine {
            NegotiationAction::Yield => YIELD_REWARD,
            NegotiationAction::Advance => CONTESTED_ADVANCE_PENALTY.saturating_neg(),
        };
        self.happiness = self.happiness.saturating_add(delta);
        self.jam_counter = self.jam_counter.saturating_add(1);
        self.anger_if_jammed();
        StepOutcome::Negotiated {
            with: other_id,
            outcome,
            to: None,
        }
    }

    const fn advance_to(&mut self, target: Position) {
        self.position = target;
        self.jam_counter = 0;
    }

    const fn anger_if_jammed(&mut self) {
        if self.jam_counter > ANGRY_JAM_THRESHOLD {
            self.mood = Mood::Angry;
        }
    }

    /// Cars in the surrounding eight cells and what they announce they
    /// will do in a contest.
    pub fn intentions_nearby(&self, me: AgentId, scene: &Scene<'_>) -> Vec<NeighborIntention> {
        scene
            .grid
            .neighbors(self.position, true)
            .into_iter()
            .filter(|id| *id != me)
            .filter_map(|id| match scene.agent(id) {
                Some(Agent::Car(car)) => Some(NeighborIntention {
                    agent: id,
                    position: car.position,
                    intention: announced_intention(car.personality),
                }),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::unreachable,
    clippy::arithmetic_side_effects
)]
mod tests {
    use gridlock_world::{GridSpace, RoadLayout};

    use super::*;
    use crate::agent::{Building, LightMarker};
    use crate::reckless::RecklessCar;
    use crate::signal::SignalController;

    /// Column 5 has no entry in the approach table, so cars spawned there
    /// are uncontrolled.
    const FREE_SPAWN: Position = Position::new(5, 0);
    /// Controlled by the first light, (9, 15), which starts green.
    const NORTH_SPAWN: Position = Position::new(8, 22);

    struct Fixture {
        grid: GridSpace,
        agents: Vec<Agent>,
        signals: SignalController,
        layout: RoadLayout,
    }

    impl Fixture {
        fn new() -> Self {
            let layout = RoadLayout::default();
            let signals = SignalController::new(&layout.light_positions, 6, 0).unwrap();
            let markers: Vec<_> = signals
                .lights()
                .iter()
                .map(|light| {
                    Agent::TrafficLight(LightMarker {
                        light: light.id,
                        position: light.position,
                    })
                })
                .collect();
            let mut fixture = Self {
                grid: GridSpace::new(23).unwrap(),
                agents: Vec::new(),
                signals,
                layout,
            };
            for marker in markers {
                fixture.add(marker);
            }
            fixture
        }

        fn add(&mut self, agent: Agent) -> AgentId {
            let id = AgentId::from_index(self.agents.len()).unwrap();
            self.grid.place(id, agent.position()).unwrap();
            self.agents.push(agent);
            id
        }

        /// Run one full green phase so the first light is red.
        fn turn_first_light_red(&mut self) {
            for _ in 0..7 {
                self.signals.advance();
            }
            assert_eq!(self.signals.lights()[0].state, LightState::Red);
        }

        fn step_car(&mut self, id: AgentId) -> StepOutcome {
            let mut agent = self.agents[id.index()].clone();
            let outcome = {
                let scene = Scene::new(&self.grid, &self.agents, &self.signals, &self.layout);
                match &mut agent {
                    Agent::Car(car) => car.step(id, &scene, &BehaviorConfig::default()),
                    _ => StepOutcome::Idle,
                }
            };
            if let Some(dest) = outcome.destination() {
                self.grid.move_agent(id, dest).unwrap();
            }
            self.agents[id.index()] = agent;
            outcome
        }

        fn car(&self, id: AgentId) -> &Car {
            match &self.agents[id.index()] {
                Agent::Car(car) => car,
                other => panic!("expected car, found {other:?}"),
            }
        }
    }

    fn car_at(spawn: Position, position: Position, personality: Personality) -> Agent {
        let mut car = Car::new(spawn, 23, personality, 1000).unwrap();
        car.position = position;
        Agent::Car(car)
    }

    #[test]
    fn spawn_off_edge_fails_fast() {
        assert!(matches!(
            Car::new(Position::new(5, 5), 23, Personality::Neutral, 1000),
            Err(AgentError::SpawnNotOnEdge { .. })
        ));
    }

    #[test]
    fn heading_follows_spawn_edge() {
        let car = Car::new(Position::new(12, 0), 23, Personality::Neutral, 1000).unwrap();
        assert_eq!(car.direction, Direction::Up);
        assert_eq!(car.preferred_move(23), Position::new(12, 1));
    }

    #[test]
    fn outer_lane_turns_onto_perpendicular_road() {
        let mut car = Car::new(Position::new(12, 0), 23, Personality::Neutral, 1000).unwrap();
        car.position = Position::new(22, 4);
        assert!(car.is_outer_lane(23));
        assert_eq!(car.preferred_move(23), Position::new(23, 4));
    }

    #[test]
    fn free_cell_moves_and_rewards() {
        let mut fx = Fixture::new();
        let id = fx.add(car_at(FREE_SPAWN, Position::new(5, 2), Personality::Neutral));
        assert_eq!(fx.step_car(id), StepOutcome::Moved { to: Position::new(5, 3) });
        let car = fx.car(id);
        assert_eq!(car.happiness, 1000 + MOVE_REWARD);
        assert_eq!(car.jam_counter, 0);
        assert_eq!(car.mood, Mood::Happy);
        assert_eq!(fx.grid.position_of(id), Some(Position::new(5, 3)));
    }

    #[test]
    fn move_off_the_edge_wraps() {
        let mut fx = Fixture::new();
        let id = fx.add(car_at(FREE_SPAWN, Position::new(5, 22), Personality::Neutral));
        assert_eq!(fx.step_car(id), StepOutcome::Moved { to: Position::new(5, 0) });
    }

    #[test]
    fn red_light_stops_the_car() {
        let mut fx = Fixture::new();
        fx.turn_first_light_red();
        let id = fx.add(car_at(NORTH_SPAWN, Position::new(8, 18), Personality::Neutral));
        assert_eq!(
            fx.step_car(id),
            StepOutcome::StoppedAtLight {
                light: Position::new(9, 15)
            }
        );
        let car = fx.car(id);
        assert_eq!(car.jam_counter, 1);
        assert_eq!(car.happiness, 1000 - RED_LIGHT_PENALTY);
        assert_eq!(car.position, Position::new(8, 18));
    }

    #[test]
    fn green_light_lets_the_car_through() {
        let mut fx = Fixture::new();
        let id = fx.add(car_at(NORTH_SPAWN, Position::new(8, 18), Personality::Neutral));
        assert_eq!(fx.step_car(id), StepOutcome::Moved { to: Position::new(8, 17) });
    }

    #[test]
    fn passing_the_light_records_it() {
        let mut fx = Fixture::new();
        // Heading down and already below the light at (9, 15).
        let id = fx.add(car_at(NORTH_SPAWN, Position::new(8, 14), Personality::Neutral));
        fx.step_car(id);
        assert_eq!(fx.car(id).last_cleared_light, Some(Position::new(9, 15)));
        assert_eq!(fx.car(id).cleared_ticks_ago, Some(0));
    }

    #[test]
    fn cleared_memory_unsets_after_two_ticks() {
        let Agent::Car(mut car) = car_at(NORTH_SPAWN, Position::new(8, 14), Personality::Neutral)
        else {
            unreachable!();
        };
        car.last_cleared_light = Some(Position::new(9, 15));
        car.cleared_ticks_ago = Some(0);
        car.decay_cleared_memory(2);
        assert_eq!(car.cleared_ticks_ago, Some(1));
        assert!(car.last_cleared_light.is_some());
        car.decay_cleared_memory(2);
        assert_eq!(car.last_cleared_light, None);
        assert_eq!(car.cleared_ticks_ago, None);
    }

    #[test]
    fn remembered_light_is_ignored_even_when_red() {
        let mut fx = Fixture::new();
        fx.turn_first_light_red();
        let mut agent = car_at(NORTH_SPAWN, Position::new(8, 18), Personality::Neutral);
        if let Agent::Car(car) = &mut agent {
            car.last_cleared_light = Some(Position::new(9, 15));
            car.cleared_ticks_ago = Some(0);
        }
        let id = fx.add(agent);
        assert_eq!(fx.step_car(id), StepOutcome::Moved { to: Position::new(8, 17) });
    }

    #[test]
    fn missing_light_fails_open() {
        let mut fx = Fixture::new();
        fx.turn_first_light_red();
        fx.layout.approaches[0].light = Position::new(1, 1);
        let id = fx.add(car_at(NORTH_SPAWN, Position::new(8, 18), Personality::Neutral));
        assert_eq!(fx.step_car(id), StepOutcome::Moved { to: Position::new(8, 17) });
    }

    #[test]
    fn building_ahead_makes_the_car_angry() {
        let mut fx = Fixture::new();
        fx.add(Agent::Building(Building {
            position: Position::new(5, 3),
        }));
        let id = fx.add(car_at(FREE_SPAWN, Position::new(5, 2), Personality::Neutral));
        assert_eq!(fx.step_car(id), StepOutcome::Blocked);
        let car = fx.car(id);
        assert_eq!(car.jam_counter, 1);
        assert_eq!(car.happiness, 1000 - BLOCKED_PENALTY);
        assert_eq!(car.mood, Mood::Angry);
    }

    #[test]
    fn cooperative_yields_to_competitive() {
        let mut fx = Fixture::new();
        let ahead = fx.add(car_at(FREE_SPAWN, Position::new(5, 3), Personality::Competitive));
        let id = fx.add(car_at(FREE_SPAWN, Position::new(5, 2), Personality::Cooperative));
        assert_eq!(
            fx.step_car(id),
            StepOutcome::Negotiated {
                with: ahead,
                outcome: NegotiationOutcome::Yielded,
                to: None
            }
        );
        let car = fx.car(id);
        assert_eq!(car.happiness, 1000 + YIELD_REWARD);
        assert_eq!(car.jam_counter, 1);
        assert_eq!(car.position, Position::new(5, 2));
        assert_eq!(car.mood, Mood::Happy);
    }

    #[test]
    fn competitive_pair_never_shares_the_cell() {
        let mut fx = Fixture::new();
        fx.add(car_at(FREE_SPAWN, Position::new(5, 3), Personality::Competitive));
        let id = fx.add(car_at(FREE_SPAWN, Position::new(5, 2), Personality::Competitive));
        assert!(matches!(
            fx.step_car(id),
            StepOutcome::Negotiated {
                outcome: NegotiationOutcome::Stalemate,
                to: None,
                ..
            }
        ));
        assert_eq!(fx.car(id).happiness, 1000 - CONTESTED_ADVANCE_PENALTY);
        assert_eq!(fx.grid.cell(Position::new(5, 3)).len(), 1);
    }

    #[test]
    fn reckless_blocker_negotiates_as_competitive() {
        let blocked_cell = Position::new(5, 3);
        for (personality, expected) in [
            (Personality::Cooperative, NegotiationOutcome::Yielded),
            (Personality::Competitive, NegotiationOutcome::Stalemate),
        ] {
            let mut fx = Fixture::new();
            let mut reckless = RecklessCar::new(FREE_SPAWN, 23, 100).unwrap();
            reckless.position = blocked_cell;
            let ahead = fx.add(Agent::RecklessCar(reckless));
            let id = fx.add(car_at(FREE_SPAWN, Position::new(5, 2), personality));
            assert_eq!(
                fx.step_car(id),
                StepOutcome::Negotiated {
                    with: ahead,
                    outcome: expected,
                    to: None
                }
            );
            let vehicles = fx
                .grid
                .cell(blocked_cell)
                .iter()
                .filter(|occupant| fx.agents[occupant.index()].is_vehicle())
                .count();
            assert_eq!(vehicles, 1);
            assert_eq!(fx.car(id).position, Position::new(5, 2));
        }
    }

    #[test]
    fn neutral_pair_leaves_initiator_angry() {
        let mut fx = Fixture::new();
        fx.add(car_at(FREE_SPAWN, Position::new(5, 3), Personality::Neutral));
        let id = fx.add(car_at(FREE_SPAWN, Position::new(5, 2), Personality::Neutral));
        fx.step_car(id);
        let car = fx.car(id);
        assert_eq!(car.mood, Mood::Angry);
        assert_eq!(car.last_negotiation, Some(NegotiationOutcome::Yielded));
    }

    #[test]
    fn long_jam_forces_anger() {
        let mut fx = Fixture::new();
        fx.add(car_at(FREE_SPAWN, Position::new(5, 3), Personality::Competitive));
        let id = fx.add(car_at(FREE_SPAWN, Position::new(5, 2), Personality::Cooperative));
        for _ in 0..5 {
            fx.step_car(id);
        }
        assert_eq!(fx.car(id).mood, Mood::Happy);
        fx.step_car(id);
        assert_eq!(fx.car(id).jam_counter, 6);
        assert_eq!(fx.car(id).mood, Mood::Angry);
    }

    #[test]
    fn neighbours_announce_intentions() {
        let mut fx = Fixture::new();
        let rival = fx.add(car_at(FREE_SPAWN, Position::new(6, 3), Personality::Competitive));
        let id = fx.add(car_at(FREE_SPAWN, Position::new(5, 2), Personality::Cooperative));
        let scene = Scene::new(&fx.grid, &fx.agents, &fx.signals, &fx.layout);
        assert_eq!(
            fx.car(id).intentions_nearby(id, &scene),
            vec![NeighborIntention {
                agent: rival,
                position: Position::new(6, 3),
                intention: NegotiationAction::Advance,
            }]
        );
    }
}
