//! Multi-tick property checks for the full simulation.
//!
//! Each test seeds the reference world from configuration and runs the real
//! tick cycle, asserting invariants after every tick.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::panic
)]

use std::collections::BTreeMap;

use gridlock_agents::{Agent, Scene, negotiate};
use gridlock_core::config::SimulationConfig;
use gridlock_core::runner::{TickCallback, run_simulation};
use gridlock_core::tick::{SimulationState, TickSummary, run_tick};
use gridlock_types::{LightState, NegotiationAction, Personality, Position};

fn busy_config(seed: u64) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.world.seed = seed;
    config.population.reckless_probability = 0.3;
    config
}

#[test]
fn exactly_one_green_light_every_tick() {
    let mut state = SimulationState::from_config(&busy_config(1)).unwrap();
    for _ in 0..200 {
        run_tick(&mut state).unwrap();
        let lights = state.signals.lights();
        let green: Vec<_> = lights
            .iter()
            .filter(|l| l.state == LightState::Green)
            .collect();
        assert_eq!(green.len(), 1);
        assert!(green[0].countdown <= 6);
        let red = lights.iter().filter(|l| l.state == LightState::Red).count();
        assert_eq!(red, lights.len() - 1);
    }
}

#[test]
fn green_visits_every_light_in_order() {
    let mut state = SimulationState::from_config(&busy_config(2)).unwrap();
    let mut order = vec![state.signals.active_light().unwrap().position];
    for _ in 0..(7 * 4) {
        let summary = run_tick(&mut state).unwrap();
        if summary.signal_switched {
            order.push(summary.active_light.unwrap());
        }
    }
    let mut expected = state.layout.light_positions.clone();
    expected.push(expected[0]);
    assert_eq!(order, expected);
}

#[test]
fn yellow_phase_keeps_a_single_non_red_light() {
    let mut config = busy_config(3);
    config.signals.yellow_ticks = 2;
    let mut state = SimulationState::from_config(&config).unwrap();
    for _ in 0..120 {
        run_tick(&mut state).unwrap();
        let lit = state
            .signals
            .lights()
            .iter()
            .filter(|l| l.state != LightState::Red)
            .count();
        assert_eq!(lit, 1);
    }
}

/// Fails the test if two vehicles ever share a cell.
struct ExclusionCheck;

impl TickCallback for ExclusionCheck {
    fn on_tick(&mut self, summary: &TickSummary, state: &SimulationState) {
        let mut per_cell: BTreeMap<Position, u32> = BTreeMap::new();
        for agent in state.agents.iter().filter(|a| a.is_vehicle()) {
            *per_cell.entry(agent.position()).or_default() += 1;
        }
        for (cell, count) in per_cell {
            assert_eq!(count, 1, "tick {}: {count} vehicles at {cell}", summary.tick);
        }
    }
}

#[test]
fn vehicles_never_share_a_cell() {
    for seed in [5, 17, 29, 101] {
        let mut state = SimulationState::from_config(&busy_config(seed)).unwrap();
        run_simulation(&mut state, 150, &mut ExclusionCheck).unwrap();
    }
}

#[test]
fn same_seed_same_history() {
    let config = busy_config(8);
    let mut a = SimulationState::from_config(&config).unwrap();
    let mut b = SimulationState::from_config(&config).unwrap();
    for _ in 0..80 {
        assert_eq!(run_tick(&mut a).unwrap(), run_tick(&mut b).unwrap());
    }
    assert_eq!(a.agents, b.agents);
}

#[test]
fn pedestrians_only_walk_on_red_and_never_while_frozen() {
    let mut config = busy_config(13);
    config.population.pedestrians = 8;
    let mut state = SimulationState::from_config(&config).unwrap();
    for _ in 0..150 {
        let before: Vec<(usize, Position)> = state
            .agents
            .iter()
            .enumerate()
            .filter(|(_, a)| a.kind().is_pedestrian())
            .map(|(i, a)| (i, a.position()))
            .collect();
        run_tick(&mut state).unwrap();
        let scene = Scene::new(&state.grid, &state.agents, &state.signals, &state.layout);
        for (index, from) in before {
            let Agent::Pedestrian(walker) = &state.agents[index] else {
                panic!("agent {index} changed kind");
            };
            if walker.position != from {
                assert!(!walker.blocked);
                let nearest = scene.nearest_light(from).unwrap();
                assert_eq!(nearest.state, LightState::Red);
                assert!(from.manhattan_distance(walker.position) <= 2);
            }
        }
    }
}

#[test]
fn negotiation_rewards_depend_on_perspective() {
    // Cooperative initiator facing a competitive car yields and earns 2.
    let coop = negotiate(Personality::Cooperative, Personality::Competitive);
    assert_eq!(coop.mine, NegotiationAction::Yield);
    assert_eq!(coop.reward, 2);
    // The competitive car initiating against the cooperative one advances for 5.
    let comp = negotiate(Personality::Competitive, Personality::Cooperative);
    assert_eq!(comp.mine, NegotiationAction::Advance);
    assert_eq!(comp.reward, 5);
    // Cooperative always yields against anything that is not cooperative.
    for other in [Personality::Competitive, Personality::Neutral] {
        assert_eq!(
            negotiate(Personality::Cooperative, other).mine,
            NegotiationAction::Yield
        );
    }
}

#[test]
fn project_config_runs() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("gridlock-config.yaml");
    let config = SimulationConfig::from_file(&path).unwrap();
    let mut state = SimulationState::from_config(&config).unwrap();
    let result = run_simulation(&mut state, 10, &mut ExclusionCheck).unwrap();
    assert_eq!(result.total_ticks, 10);
}
