//! Tick cycle: the engine loop that drives the Gridlock simulation.
//!
//! Each tick runs through these phases:
//!
//! 1. **Clock** -- advance the tick counter.
//! 2. **Signals** -- step the round-robin signal controller once.
//! 3. **Agents** -- every active agent acts once, in creation order. Each
//!    agent sees the grid as left by the agents before it in the same tick;
//!    its move is applied to the grid before the next agent acts.
//! 4. **Metrics** -- sample population statistics after all agents moved.
//!
//! The cycle is deterministic given the same initial state and RNG seed.

use gridlock_agents::{Agent, BehaviorConfig, Scene, SignalController, SignalEvent, StepOutcome};
use gridlock_types::{AgentId, Mood, NegotiationOutcome, PopulationStats, Position};
use gridlock_world::{GridSpace, RoadLayout};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::{ClockError, WorldClock};
use crate::config::SimulationConfig;
use crate::population::{PopulationError, seed_population};

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// Applying a move to the grid failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: gridlock_world::WorldError,
    },

    /// The population outgrew the identifier range.
    #[error("agent index {0} exceeds the identifier range")]
    AgentIndex(usize),
}

/// Counts of what agents did during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickEvents {
    /// Free moves by vehicles and pedestrian steps.
    pub moves: u32,
    /// Vehicles that stopped for a light.
    pub light_stops: u32,
    /// Lights run by reckless cars.
    pub lights_run: u32,
    /// Negotiations that ended with the initiator yielding.
    pub yielded: u32,
    /// Negotiations that ended with the initiator advancing.
    pub advanced: u32,
    /// Negotiations where both cars advanced.
    pub stalemates: u32,
    /// Agents blocked by a building, vehicle or the grid edge.
    pub blocked: u32,
    /// Pedestrians frozen by a reckless car.
    pub frozen: u32,
}

impl TickEvents {
    fn record(&mut self, outcome: &StepOutcome) {
        let counter = match outcome {
            StepOutcome::Idle => return,
            StepOutcome::Moved { .. } => &mut self.moves,
            StepOutcome::RanLight { .. } => &mut self.lights_run,
            StepOutcome::StoppedAtLight { .. } => &mut self.light_stops,
            StepOutcome::Negotiated { outcome, .. } => match outcome {
                NegotiationOutcome::Yielded => &mut self.yielded,
                NegotiationOutcome::Advanced => &mut self.advanced,
                NegotiationOutcome::Stalemate => &mut self.stalemates,
            },
            StepOutcome::Blocked => &mut self.blocked,
            StepOutcome::Frozen => &mut self.frozen,
        };
        *counter = counter.saturating_add(1);
    }
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Position of the light showing green (or yellow) after the signal step.
    pub active_light: Option<Position>,
    /// Whether the signal step handed green to another light.
    pub signal_switched: bool,
    /// Population metrics sampled after all agents acted.
    pub stats: PopulationStats,
    /// What agents did this tick.
    pub events: TickEvents,
}

/// The mutable simulation state passed through the tick cycle.
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// The world clock.
    pub clock: WorldClock,
    /// The lattice.
    pub grid: GridSpace,
    /// All agents in creation order; an agent's index is its identifier.
    pub agents: Vec<Agent>,
    /// The signal controller.
    pub signals: SignalController,
    /// Static road tables.
    pub layout: RoadLayout,
    /// Behaviour parameters.
    pub behavior: BehaviorConfig,
    /// Source of all in-tick randomness.
    pub rng: SmallRng,
}

impl SimulationState {
    /// Validate `config`, seed the population from `world.seed` and return
    /// a state at tick 0.
    ///
    /// Population seeding and the tick cycle share one RNG stream.
    ///
    /// # Errors
    ///
    /// Returns [`PopulationError`] if the configuration is invalid or the
    /// population cannot be built.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, PopulationError> {
        let mut rng = SmallRng::seed_from_u64(config.world.seed);
        let population = seed_population(config, &mut rng)?;
        Ok(Self {
            clock: WorldClock::new(),
            grid: population.grid,
            agents: population.agents,
            signals: population.signals,
            layout: config.layout.clone(),
            behavior: config.behavior_config(),
            rng,
        })
    }

    /// Sample population metrics from the current agents.
    pub fn stats(&self) -> PopulationStats {
        collect_stats(&self.agents)
    }
}

/// Execute one complete tick of the simulation.
///
/// # Errors
///
/// Returns [`TickError`] if the clock overflows or a move cannot be applied
/// to the grid.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    // --- Phase 1: Clock ---
    let tick = state.clock.advance()?;

    // --- Phase 2: Signals ---
    let signal = state.signals.advance();
    let signal_switched = matches!(signal, SignalEvent::Switched { .. });
    if let SignalEvent::Switched { from, to } = signal {
        debug!(tick, %from, %to, "Green handed over");
    }

    // --- Phase 3: Agents ---
    let mut events = TickEvents::default();
    for index in 0..state.agents.len() {
        let Some(mut agent) = state
            .agents
            .get(index)
            .filter(|agent| agent.is_active())
            .cloned()
        else {
            continue;
        };
        let id = AgentId::from_index(index).ok_or(TickError::AgentIndex(index))?;
        let outcome = {
            let scene = Scene::new(&state.grid, &state.agents, &state.signals, &state.layout);
            agent.step(id, &scene, &state.behavior, &mut state.rng)
        };
        if let Some(dest) = outcome.destination() {
            state.grid.move_agent(id, dest)?;
        }
        events.record(&outcome);
        if let Some(slot) = state.agents.get_mut(index) {
            *slot = agent;
        }
    }

    // --- Phase 4: Metrics ---
    let stats = collect_stats(&state.agents);
    info!(
        tick,
        happy = stats.happy_cars,
        angry = stats.angry_cars,
        jammed = stats.jammed_vehicles,
        moves = events.moves,
        "Tick completed"
    );

    Ok(TickSummary {
        tick,
        active_light: state.signals.active_light().map(|light| light.position),
        signal_switched,
        stats,
        events,
    })
}

/// Population metrics over all agents.
pub fn collect_stats(agents: &[Agent]) -> PopulationStats {
    let mut stats = PopulationStats::default();
    let mut happiness_sum: i64 = 0;
    let mut vehicles: i64 = 0;
    for agent in agents {
        match agent {
            Agent::Car(car) => match car.mood {
                Mood::Happy => stats.happy_cars = stats.happy_cars.saturating_add(1),
                Mood::Angry => stats.angry_cars = stats.angry_cars.saturating_add(1),
            },
            Agent::RecklessCar(_) => stats.reckless_cars = stats.reckless_cars.saturating_add(1),
            Agent::Pedestrian(walker) if walker.blocked => {
                stats.blocked_pedestrians = stats.blocked_pedestrians.saturating_add(1);
            }
            Agent::Building(_) | Agent::TrafficLight(_) | Agent::Pedestrian(_) => {}
        }
        if let Some(happiness) = agent.happiness() {
            happiness_sum = happiness_sum.saturating_add(happiness);
            vehicles = vehicles.saturating_add(1);
        }
        if agent.jam_counter().is_some_and(|jam| jam > 0) {
            stats.jammed_vehicles = stats.jammed_vehicles.saturating_add(1);
        }
    }
    stats.mean_happiness = happiness_sum.checked_div(vehicles).unwrap_or(0);
    stats
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use gridlock_agents::Car;
    use gridlock_types::Personality;

    use super::*;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.population.cars = 12;
        config.population.pedestrians = 4;
        config
    }

    #[test]
    fn from_config_starts_at_tick_zero() {
        let state = SimulationState::from_config(&small_config()).unwrap();
        assert_eq!(state.clock.tick(), 0);
        assert_eq!(state.grid.agent_count(), state.agents.len());
    }

    #[test]
    fn tick_advances_clock_and_signals() {
        let mut state = SimulationState::from_config(&small_config()).unwrap();
        let first = run_tick(&mut state).unwrap();
        assert_eq!(first.tick, 1);
        assert!(!first.signal_switched);
        assert_eq!(state.signals.lights()[0].countdown, 5);
        for _ in 0..6 {
            run_tick(&mut state).unwrap();
        }
        assert_eq!(
            state.signals.active_light().unwrap().position,
            state.layout.light_positions[1]
        );
    }

    #[test]
    fn grid_mirrors_agent_positions_after_ticks() {
        let mut state = SimulationState::from_config(&small_config()).unwrap();
        for _ in 0..30 {
            run_tick(&mut state).unwrap();
        }
        for (index, agent) in state.agents.iter().enumerate() {
            let id = AgentId::from_index(index).unwrap();
            assert_eq!(state.grid.position_of(id), Some(agent.position()));
        }
    }

    #[test]
    fn passive_agents_never_move() {
        let mut state = SimulationState::from_config(&small_config()).unwrap();
        let before: Vec<_> = state
            .agents
            .iter()
            .filter(|a| !a.is_active())
            .cloned()
            .collect();
        for _ in 0..20 {
            run_tick(&mut state).unwrap();
        }
        let after: Vec<_> = state
            .agents
            .iter()
            .filter(|a| !a.is_active())
            .cloned()
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn stats_count_moods_and_mean_happiness() {
        let happy = Car::new(Position::new(5, 0), 23, Personality::Neutral, 1000).unwrap();
        let mut angry = happy.clone();
        angry.mood = Mood::Angry;
        angry.happiness = 990;
        angry.jam_counter = 3;
        let stats = collect_stats(&[Agent::Car(happy), Agent::Car(angry)]);
        assert_eq!(stats.happy_cars, 1);
        assert_eq!(stats.angry_cars, 1);
        assert_eq!(stats.jammed_vehicles, 1);
        assert_eq!(stats.mean_happiness, 995);
    }

    #[test]
    fn stats_on_empty_population_are_zero() {
        assert_eq!(collect_stats(&[]), PopulationStats::default());
    }

    #[test]
    fn events_are_counted_by_outcome() {
        let mut events = TickEvents::default();
        events.record(&StepOutcome::Moved {
            to: Position::new(0, 0),
        });
        events.record(&StepOutcome::Negotiated {
            with: AgentId::new(1),
            outcome: NegotiationOutcome::Stalemate,
            to: None,
        });
        events.record(&StepOutcome::Idle);
        assert_eq!(events.moves, 1);
        assert_eq!(events.stalemates, 1);
        assert_eq!(events.blocked, 0);
    }
}
