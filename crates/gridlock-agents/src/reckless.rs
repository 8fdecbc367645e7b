//! Reckless cars.
//!
//! A reckless car follows its lane like a disciplined one but bends the
//! rules at random. At a designated turn point it swings onto the point's
//! heading with probability `reckless_turn_probability`. At a red or yellow
//! light it has not already run on this pass, it stops with probability
//! `reckless_respect_probability` and otherwise drives through. It does not
//! wrap around the grid edge, never negotiates, and never enters a cell
//! holding a vehicle or a building.

use std::collections::BTreeSet;

use gridlock_types::{AgentId, Direction, Position};
use rand::Rng;
use tracing::debug;

use crate::agent::StepOutcome;
use crate::car::{BLOCKED_PENALTY, MOVE_REWARD, RED_LIGHT_PENALTY};
use crate::config::BehaviorConfig;
use crate::error::AgentError;
use crate::scene::Scene;

/// A vehicle that turns and runs lights at random.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecklessCar {
    /// The edge cell the car entered from.
    pub spawn: Position,
    /// Heading derived from the spawn edge; used to tell when a light is
    /// behind the car.
    pub approach: Direction,
    /// Current heading, changed by turn points.
    pub direction: Direction,
    /// Current cell.
    pub position: Position,
    /// Numeric happiness score.
    pub happiness: i64,
    /// Consecutive ticks without a move.
    pub jam_counter: u32,
    /// Lights already run or driven past on this pass.
    pub passed_lights: BTreeSet<Position>,
}

impl RecklessCar {
    /// Create a reckless car at its spawn cell.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::SpawnNotOnEdge`] if `spawn` is not on an edge of
    /// a grid of side `grid_size`.
    pub fn new(spawn: Position, grid_size: i32, happiness: i64) -> Result<Self, AgentError> {
        let direction =
            Direction::from_spawn_edge(spawn, grid_size).ok_or(AgentError::SpawnNotOnEdge {
                spawn,
                size: grid_size,
            })?;
        Ok(Self {
            spawn,
            approach: direction,
            direction,
            position: spawn,
            happiness,
            jam_counter: 0,
            passed_lights: BTreeSet::new(),
        })
    }

    /// Run one tick of behaviour.
    pub fn step(
        &mut self,
        me: AgentId,
        scene: &Scene<'_>,
        config: &BehaviorConfig,
        rng: &mut impl Rng,
    ) -> StepOutcome {
        if let Some(turn) = scene.layout.turn_at(self.position)
            && rng.random::<f64>() < config.reckless_turn_probability
        {
            debug!(car = %me, at = %self.position, from = ?self.direction, to = ?turn, "Reckless turn");
            self.direction = turn;
        }

        let target = self.position.step(self.direction);
        if scene.grid.is_out_of_bounds(target)
            || scene.has_vehicle(target, me)
            || scene.has_building(target)
        {
            return self.blocked();
        }

        let mut ran = None;
        if let Some(light) = scene.controlling_light(self.spawn)
            && light.state.is_restrictive()
            && !self.passed_lights.contains(&light.position)
        {
            if rng.random::<f64>() < config.reckless_respect_probability {
                self.jam_counter = self.jam_counter.saturating_add(1);
                self.happiness = self.happiness.saturating_sub(RED_LIGHT_PENALTY);
                return StepOutcome::StoppedAtLight {
                    light: light.position,
                };
            }
            debug!(car = %me, light = %light.position, state = ?light.state, "Reckless car ran the light");
            self.passed_lights.insert(light.position);
            ran = Some(light.position);
        }

        self.position = target;
        self.happiness = self.happiness.saturating_add(MOVE_REWARD);
        self.jam_counter = 0;
        if let Some(light) = scene.controlling_light(self.spawn)
            && self.approach.has_passed(target, light.position)
        {
            self.passed_lights.insert(light.position);
        }

        match ran {
            Some(light) => StepOutcome::RanLight { light, to: target },
            None => StepOutcome::Moved { to: target },
        }
    }

    const fn blocked(&mut self) -> StepOutcome {
        self.jam_counter = self.jam_counter.saturating_add(1);
        self.happiness = self.happiness.saturating_sub(BLOCKED_PENALTY);
        StepOutcome::Blocked
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::arithmetic_side_effects
)]
mod tests {
    use gridlock_types::{LightState, Personality};
    use gridlock_world::{GridSpace, RoadLayout};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::agent::{Agent, Building, LightMarker};
    use crate::car::Car;
    use crate::signal::SignalController;

    struct Fixture {
        grid: GridSpace,
        agents: Vec<Agent>,
        signals: SignalController,
        layout: RoadLayout,
        config: BehaviorConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let layout = RoadLayout::default();
            Self::with_signals(SignalController::new(&layout.light_positions, 6, 0).unwrap())
        }

        /// Reference layout, with light markers for whatever `signals` holds.
        fn with_signals(signals: SignalController) -> Self {
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
                layout: RoadLayout::default(),
                config: BehaviorConfig::default(),
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

        fn add_reckless(&mut self, spawn: Position, position: Position) -> AgentId {
            let mut car = RecklessCar::new(spawn, 23, 100).unwrap();
            car.position = position;
            self.add(Agent::RecklessCar(car))
        }

        fn step(&mut self, id: AgentId, rng: &mut SmallRng) -> StepOutcome {
            let mut agent = self.agents[id.index()].clone();
            let outcome = {
                let scene = Scene::new(&self.grid, &self.agents, &self.signals, &self.layout);
                agent.step(id, &scene, &self.config, rng)
            };
            if let Some(dest) = outcome.destination() {
                self.grid.move_agent(id, dest).unwrap();
            }
            self.agents[id.index()] = agent;
            outcome
        }

        fn reckless(&self, id: AgentId) -> &RecklessCar {
            match &self.agents[id.index()] {
                Agent::RecklessCar(car) => car,
                other => panic!("expected reckless car, found {other:?}"),
            }
        }
    }

    #[test]
    fn spawn_off_edge_fails_fast() {
        assert!(RecklessCar::new(Position::new(3, 4), 23, 100).is_err());
    }

    #[test]
    fn turns_about_seventy_percent_of_the_time() {
        let layout = RoadLayout::default();
        let grid = GridSpace::new(23).unwrap();
        let signals = SignalController::new(&layout.light_positions, 6, 0).unwrap();
        let agents: Vec<Agent> = Vec::new();
        let scene = Scene::new(&grid, &agents, &signals, &layout);
        let config = BehaviorConfig::default();
        let mut rng = SmallRng::seed_from_u64(42);

        // (13, 10) is a turn point swinging onto `Up`; approach it heading
        // left from the right edge so a turn is observable.
        let trials = 1000_u32;
        let mut turned = 0_u32;
        for _ in 0..trials {
            let mut car = RecklessCar::new(Position::new(22, 11), 23, 100).unwrap();
            car.position = Position::new(13, 10);
            car.step(AgentId::new(0), &scene, &config, &mut rng);
            if car.direction == Direction::Up {
                turned += 1;
            }
        }
        // p = 0.7, n = 1000: sigma ~= 14.5, so 3 sigma ~= 44.
        assert!((656..=744).contains(&turned), "turned {turned} of {trials}");
    }

    #[test]
    fn never_turns_with_zero_probability() {
        let mut fx = Fixture::new();
        fx.config.reckless_turn_probability = 0.0;
        let id = fx.add_reckless(Position::new(22, 11), Position::new(13, 10));
        let mut rng = SmallRng::seed_from_u64(1);
        fx.step(id, &mut rng);
        assert_eq!(fx.reckless(id).direction, Direction::Left);
        assert_eq!(fx.reckless(id).position, Position::new(12, 10));
    }

    #[test]
    fn grid_edge_blocks_without_wrapping() {
        let mut fx = Fixture::new();
        // Spawned on the right edge heading left, then placed on the left edge.
        let id = fx.add_reckless(Position::new(22, 11), Position::new(0, 11));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(fx.step(id, &mut rng), StepOutcome::Blocked);
        let car = fx.reckless(id);
        assert_eq!(car.jam_counter, 1);
        assert_eq!(car.happiness, 100 - BLOCKED_PENALTY);
        assert_eq!(car.position, Position::new(0, 11));
    }

    #[test]
    fn vehicle_ahead_blocks() {
        let mut fx = Fixture::new();
        let mut ahead = Car::new(Position::new(5, 0), 23, Personality::Cooperative, 1000).unwrap();
        ahead.position = Position::new(5, 3);
        fx.add(Agent::Car(ahead));
        let id = fx.add_reckless(Position::new(5, 0), Position::new(5, 2));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(fx.step(id, &mut rng), StepOutcome::Blocked);
        assert_eq!(fx.grid.cell(Position::new(5, 3)).len(), 1);
    }

    #[test]
    fn building_ahead_blocks() {
        let mut fx = Fixture::new();
        fx.add(Agent::Building(Building {
            position: Position::new(5, 3),
        }));
        let id = fx.add_reckless(Position::new(5, 0), Position::new(5, 2));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(fx.step(id, &mut rng), StepOutcome::Blocked);
    }

    #[test]
    fn always_respects_with_certain_probability() {
        let mut fx = Fixture::new();
        fx.config.reckless_respect_probability = 1.0;
        // Spawn (12, 0) is controlled by (13, 7), which starts red.
        let id = fx.add_reckless(Position::new(12, 0), Position::new(12, 4));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            fx.step(id, &mut rng),
            StepOutcome::StoppedAtLight {
                light: Position::new(13, 7)
            }
        );
        let car = fx.reckless(id);
        assert_eq!(car.jam_counter, 1);
        assert_eq!(car.happiness, 100 - RED_LIGHT_PENALTY);
    }

    #[test]
    fn running_a_light_is_remembered() {
        let mut fx = Fixture::new();
        fx.config.reckless_respect_probability = 0.0;
        let id = fx.add_reckless(Position::new(12, 0), Position::new(12, 4));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            fx.step(id, &mut rng),
            StepOutcome::RanLight {
                light: Position::new(13, 7),
                to: Position::new(12, 5)
            }
        );
        assert!(fx.reckless(id).passed_lights.contains(&Position::new(13, 7)));

        // Already run: even a certain respect roll no longer stops it.
        fx.config.reckless_respect_probability = 1.0;
        assert_eq!(
            fx.step(id, &mut rng),
            StepOutcome::Moved {
                to: Position::new(12, 6)
            }
        );
        assert_eq!(fx.reckless(id).happiness, 100 + 2 * MOVE_REWARD);
    }

    /// A single light at (13, 7), the one controlling spawn (12, 0), held
    /// on yellow.
    fn yellow_light_fixture() -> Fixture {
        let mut signals = SignalController::new(&[Position::new(13, 7)], 1, 3).unwrap();
        signals.advance();
        signals.advance();
        assert_eq!(signals.lights()[0].state, LightState::Yellow);
        Fixture::with_signals(signals)
    }

    #[test]
    fn yellow_light_is_treated_like_red() {
        let mut fx = yellow_light_fixture();
        fx.config.reckless_respect_probability = 1.0;
        let stopper = fx.add_reckless(Position::new(12, 0), Position::new(12, 4));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            fx.step(stopper, &mut rng),
            StepOutcome::StoppedAtLight {
                light: Position::new(13, 7)
            }
        );

        fx.config.reckless_respect_probability = 0.0;
        let runner = fx.add_reckless(Position::new(13, 0), Position::new(13, 4));
        assert_eq!(
            fx.step(runner, &mut rng),
            StepOutcome::RanLight {
                light: Position::new(13, 7),
                to: Position::new(13, 5)
            }
        );
    }

    #[test]
    fn stops_about_half_the_time_at_default_respect() {
        let fx = yellow_light_fixture();
        let scene = Scene::new(&fx.grid, &fx.agents, &fx.signals, &fx.layout);
        let config = BehaviorConfig::default();
        let mut rng = SmallRng::seed_from_u64(7);

        let trials = 1000_u32;
        let mut stops = 0_u32;
        for _ in 0..trials {
            let mut car = RecklessCar::new(Position::new(12, 0), 23, 100).unwrap();
            car.position = Position::new(12, 4);
            let outcome = car.step(AgentId::new(99), &scene, &config, &mut rng);
            if matches!(outcome, StepOutcome::StoppedAtLight { .. }) {
                stops += 1;
            }
        }
        // p = 0.5, n = 1000: sigma ~= 15.8, so 3 sigma ~= 47.
        assert!((453..=547).contains(&stops), "stopped {stops} of {trials}");
    }

    #[test]
    fn green_light_always_proceeds() {
        let mut fx = Fixture::new();
        fx.config.reckless_respect_probability = 1.0;
        // Spawn (8, 22) is controlled by (9, 15), which starts green.
        assert_eq!(fx.signals.lights()[0].state, LightState::Green);
        let id = fx.add_reckless(Position::new(8, 22), Position::new(8, 18));
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(
            fx.step(id, &mut rng),
            StepOutcome::Moved {
                to: Position::new(8, 17)
            }
        );
    }

    #[test]
    fn driving_past_a_light_marks_it_passed() {
        let mut fx = Fixture::new();
        // Heading down, moving from row 15 to row 14 puts (9, 15) behind it.
        let id = fx.add_reckless(Position::new(8, 22), Position::new(8, 15));
        let mut rng = SmallRng::seed_from_u64(1);
        fx.step(id, &mut rng);
        assert!(fx.reckless(id).passed_lights.contains(&Position::new(9, 15)));
    }
}
