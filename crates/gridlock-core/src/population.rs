//! Population seeding for the start of a simulation.
//!
//! Agents are created in a fixed order: buildings, then lights, then
//! vehicles, then pedestrians. Each agent's [`AgentId`] is its position in
//! that order, so the tick cycle's processing order is the creation order.
//!
//! - Buildings cover every cell off the cross-shaped road network.
//! - One light marker per configured light position, in cycle order.
//! - Each vehicle picks a random spawn cell; it is reckless with
//!   `population.reckless_probability`, otherwise a disciplined car with a
//!   uniformly random personality. A spawn cell already holding a vehicle
//!   is skipped.
//! - Each pedestrian picks a random waypoint; a waypoint already holding a
//!   pedestrian is skipped.

use gridlock_agents::{
    Agent, AgentError, Building, Car, LightMarker, Pedestrian, RecklessCar, SignalController,
};
use gridlock_types::{AgentId, AgentKind, Personality, Position};
use gridlock_world::{GridSpace, WorldError, building_cells};
use rand::Rng;
use tracing::{info, warn};

use crate::config::{ConfigError, SimulationConfig};

/// Errors that can occur while seeding the population.
#[derive(Debug, thiserror::Error)]
pub enum PopulationError {
    /// The configuration is unusable.
    #[error("config error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// Placing an agent on the grid failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Constructing an agent failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// Vehicles were requested but the layout lists no spawn cells.
    #[error("{requested} vehicles requested but the layout has no spawn cells")]
    NoSpawnCells {
        /// Number of vehicles requested.
        requested: u32,
    },

    /// More agents than identifiers can address.
    #[error("population exceeds the agent identifier range")]
    TooManyAgents,
}

/// The seeded world: grid, agents in creation order, and the signal
/// controller driving the lights among them.
#[derive(Debug, Clone)]
pub struct Population {
    /// The lattice with every agent placed.
    pub grid: GridSpace,
    /// All agents, indexed by [`AgentId`].
    pub agents: Vec<Agent>,
    /// Signal controller for the light markers in `agents`.
    pub signals: SignalController,
    /// Vehicles not created because their spawn cell was occupied.
    pub skipped_vehicles: u32,
    /// Pedestrians not created because their waypoint was occupied.
    pub skipped_pedestrians: u32,
}

impl Population {
    /// Count agents of one kind.
    pub fn count(&self, kind: AgentKind) -> usize {
        self.agents.iter().filter(|agent| agent.kind() == kind).count()
    }

    /// Append an agent and place it on the grid.
    fn push(&mut self, agent: Agent) -> Result<AgentId, PopulationError> {
        let id = AgentId::from_index(self.agents.len()).ok_or(PopulationError::TooManyAgents)?;
        self.grid.place(id, agent.position())?;
        self.agents.push(agent);
        Ok(id)
    }

    /// Whether any agent in the cell at `pos` satisfies `pred`.
    fn cell_has(&self, pos: Position, pred: impl Fn(&Agent) -> bool) -> bool {
        self.grid
            .cell(pos)
            .iter()
            .filter_map(|id| self.agents.get(id.index()))
            .any(pred)
    }
}

/// Build the starting population described by `config`.
///
/// The configuration is validated first. All randomness comes from `rng`,
/// so the same seed gives the same population.
///
/// # Errors
///
/// Returns [`PopulationError::Config`] if the configuration is invalid,
/// [`PopulationError::NoSpawnCells`] if vehicles cannot be placed, or a
/// wrapped world/agent error if construction fails.
pub fn seed_population(
    config: &SimulationConfig,
    rng: &mut impl Rng,
) -> Result<Population, PopulationError> {
    config.validate()?;
    let size = config.world.grid_size;
    let layout = &config.layout;
    let behavior = config.behavior_config();

    let signals = SignalController::new(
        &layout.light_positions,
        behavior.green_ticks,
        behavior.yellow_ticks,
    )?;
    let mut population = Population {
        grid: GridSpace::new(size)?,
        agents: Vec::new(),
        signals,
        skipped_vehicles: 0,
        skipped_pedestrians: 0,
    };

    // --- Buildings ---
    for position in building_cells(size) {
        population.push(Agent::Building(Building { position }))?;
    }

    // --- Lights ---
    let markers: Vec<LightMarker> = population
        .signals
        .lights()
        .iter()
        .map(|light| LightMarker {
            light: light.id,
            position: light.position,
        })
        .collect();
    for marker in markers {
        population.push(Agent::TrafficLight(marker))?;
    }

    // --- Vehicles ---
    let requested = config.population.cars;
    if requested > 0 && layout.spawn_cells.is_empty() {
        return Err(PopulationError::NoSpawnCells { requested });
    }
    for _ in 0..requested {
        let Some(spawn) = pick(&layout.spawn_cells, rng) else {
            break;
        };
        // Decide the vehicle before checking the cell so the random stream
        // does not depend on occupancy.
        let reckless = rng.random::<f64>() < config.population.reckless_probability;
        let personality = pick(&Personality::ALL, rng).unwrap_or(Personality::Neutral);
        if population.cell_has(spawn, Agent::is_vehicle) {
            warn!(%spawn, "Spawn cell already holds a vehicle, skipping");
            population.skipped_vehicles = population.skipped_vehicles.saturating_add(1);
            continue;
        }
        let agent = if reckless {
            Agent::RecklessCar(RecklessCar::new(
                spawn,
                size,
                behavior.reckless_starting_happiness,
            )?)
        } else {
            Agent::Car(Car::new(
                spawn,
                size,
                personality,
                behavior.car_starting_happiness,
            )?)
        };
        population.push(agent)?;
    }

    // --- Pedestrians ---
    for _ in 0..config.population.pedestrians {
        let Some(start) = pick(&layout.waypoints, rng) else {
            break;
        };
        if population.cell_has(start, |agent| agent.kind().is_pedestrian()) {
            warn!(%start, "Waypoint already holds a pedestrian, skipping");
            population.skipped_pedestrians = population.skipped_pedestrians.saturating_add(1);
            continue;
        }
        let walker = Pedestrian::new(start, layout.waypoints.clone())?;
        population.push(Agent::Pedestrian(walker))?;
    }

    info!(
        agents = population.agents.len(),
        buildings = population.count(AgentKind::Building),
        lights = population.count(AgentKind::TrafficLight),
        cars = population.count(AgentKind::Car),
        reckless = population.count(AgentKind::RecklessCar),
        pedestrians = population.count(AgentKind::Pedestrian),
        skipped_vehicles = population.skipped_vehicles,
        skipped_pedestrians = population.skipped_pedestrians,
        "Population seeded"
    );

    Ok(population)
}

/// Uniform random element of `items`, or `None` if it is empty.
fn pick<T: Copy>(items: &[T], rng: &mut impl Rng) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.random_range(0..items.len())).copied()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use std::collections::BTreeSet;

    use gridlock_types::LightState;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn seeded(config: &SimulationConfig, seed: u64) -> Population {
        let mut rng = SmallRng::seed_from_u64(seed);
        seed_population(config, &mut rng).unwrap()
    }

    #[test]
    fn creation_order_is_buildings_lights_vehicles_pedestrians() {
        let population = seeded(&SimulationConfig::default(), 42);
        let rank = |agent: &Agent| match agent.kind() {
            AgentKind::Building => 0,
            AgentKind::TrafficLight => 1,
            AgentKind::Car | AgentKind::RecklessCar => 2,
            AgentKind::Pedestrian => 3,
        };
        let ranks: Vec<u8> = population.agents.iter().map(rank).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn obstacles_and_lights_match_the_reference_map() {
        let population = seeded(&SimulationConfig::default(), 1);
        assert_eq!(population.count(AgentKind::Building), 288);
        assert_eq!(population.count(AgentKind::TrafficLight), 4);
        let lights = population.signals.lights();
        assert_eq!(lights[0].state, LightState::Green);
        assert_eq!(lights[0].countdown, 6);
        assert!(lights[1..].iter().all(|l| l.state == LightState::Red));
    }

    #[test]
    fn vehicles_never_share_a_spawn_cell() {
        let population = seeded(&SimulationConfig::default(), 7);
        let vehicles = population.count(AgentKind::Car) + population.count(AgentKind::RecklessCar);
        let cells: BTreeSet<Position> = population
            .agents
            .iter()
            .filter(|a| a.is_vehicle())
            .map(Agent::position)
            .collect();
        assert_eq!(cells.len(), vehicles);
        // 12 spawn cells, 40 requests.
        assert!(vehicles <= 12);
        assert_eq!(
            u32::try_from(vehicles).unwrap() + population.skipped_vehicles,
            40
        );
    }

    #[test]
    fn pedestrians_start_on_distinct_waypoints() {
        let population = seeded(&SimulationConfig::default(), 3);
        let walkers: Vec<Position> = population
            .agents
            .iter()
            .filter(|a| a.kind().is_pedestrian())
            .map(Agent::position)
            .collect();
        let distinct: BTreeSet<Position> = walkers.iter().copied().collect();
        assert_eq!(distinct.len(), walkers.len());
        let waypoints = SimulationConfig::default().layout.waypoints;
        assert!(walkers.iter().all(|p| waypoints.contains(p)));
    }

    #[test]
    fn reckless_probability_one_makes_every_vehicle_reckless() {
        let mut config = SimulationConfig::default();
        config.population.reckless_probability = 1.0;
        config.population.cars = 5;
        let population = seeded(&config, 11);
        assert_eq!(population.count(AgentKind::Car), 0);
        assert!(population.count(AgentKind::RecklessCar) > 0);
    }

    #[test]
    fn same_seed_same_population() {
        let config = SimulationConfig::default();
        assert_eq!(seeded(&config, 99).agents, seeded(&config, 99).agents);
    }

    #[test]
    fn grid_index_agrees_with_agent_positions() {
        let population = seeded(&SimulationConfig::default(), 5);
        for (index, agent) in population.agents.iter().enumerate() {
            let id = AgentId::from_index(index).unwrap();
            assert_eq!(population.grid.position_of(id), Some(agent.position()));
        }
    }

    #[test]
    fn invalid_config_fails_fast() {
        let mut config = SimulationConfig::default();
        config.world.grid_size = 9;
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            seed_population(&config, &mut rng),
            Err(PopulationError::Config { .. })
        ));
    }

    #[test]
    fn vehicles_without_spawn_cells_fail() {
        let mut config = SimulationConfig::default();
        config.layout.spawn_cells.clear();
        let mut rng = SmallRng::seed_from_u64(0);
        assert!(matches!(
            seed_population(&config, &mut rng),
            Err(PopulationError::NoSpawnCells { requested: 40 })
        ));
    }
}
