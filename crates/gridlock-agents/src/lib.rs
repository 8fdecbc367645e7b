//! Per-tick behaviour for every agent kind in the Gridlock simulation.
//!
//! This crate is the logic layer: it decides what each agent does in a tick
//! given a read-only [`Scene`] of the world, and reports the decision as a
//! [`StepOutcome`]. Applying the move to the grid is the tick driver's job
//! (`gridlock-core`).
//!
//! # Modules
//!
//! - [`agent`] -- The closed [`Agent`] enum with role predicates and dispatch.
//! - [`car`] -- Disciplined cars: lane following, signal compliance with
//!   cleared-light memory, negotiation when blocked.
//! - [`config`] -- Tunable behaviour parameters ([`BehaviorConfig`]).
//! - [`error`] -- Construction errors ([`AgentError`]).
//! - [`negotiation`] -- The one-shot two-car contest over a cell.
//! - [`pedestrian`] -- Waypoint walking gated by the nearest light.
//! - [`reckless`] -- Reckless cars: random turns and random light running.
//! - [`scene`] -- Read-only view of grid, population, lights and layout.
//! - [`signal`] -- Traffic lights and the round-robin [`SignalController`].

pub mod agent;
pub mod car;
pub mod config;
pub mod error;
pub mod negotiation;
pub mod pedestrian;
pub mod reckless;
pub mod scene;
pub mod signal;

// Re-export primary types at crate root for convenience.
pub use agent::{Agent, Building, LightMarker, StepOutcome};
pub use car::{Car, NeighborIntention};
pub use config::BehaviorConfig;
pub use error::AgentError;
pub use negotiation::{Negotiation, announced_intention, negotiate, reward};
pub use pedestrian::Pedestrian;
pub use reckless::RecklessCar;
pub use scene::Scene;
pub use signal::{SignalController, SignalEvent, TrafficLight};
