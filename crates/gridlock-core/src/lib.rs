//! World clock, configuration, population seeding and the tick cycle for
//! the Gridlock simulation.
//!
//! This crate owns the loop that drives the simulation: each tick advances
//! the clock, steps the signal controller, then lets every agent act once in
//! creation order, applying each move to the grid immediately.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter with checked advancement.
//! - [`config`] -- Configuration loading from `gridlock-config.yaml` into
//!   strongly-typed structs.
//! - [`population`] -- Seeding buildings, lights, vehicles and pedestrians.
//! - [`runner`] -- Bounded run loop with a per-tick callback.
//! - [`tick`] -- The tick cycle and per-tick metrics.

pub mod clock;
pub mod config;
pub mod population;
pub mod runner;
pub mod tick;
