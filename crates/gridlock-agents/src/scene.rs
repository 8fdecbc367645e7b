//! Read-only view of the world handed to every behaviour step.
//!
//! A [`Scene`] borrows the grid, the population, the signal controller and
//! the layout tables for the duration of one agent's step. Behaviours never
//! reach into simulation-wide state beyond what is exposed here.

use gridlock_types::{AgentId, AgentKind, Position};
use gridlock_world::{GridSpace, RoadLayout};
use tracing::debug;

use crate::agent::Agent;
use crate::signal::{SignalController, TrafficLight};

/// Borrowed snapshot of everything a behaviour may look at.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    /// The lattice.
    pub grid: &'a GridSpace,
    /// The population in creation order (index = [`AgentId`]).
    pub agents: &'a [Agent],
    /// The signal controller (read-only light registry).
    pub signals: &'a SignalController,
    /// The static road tables.
    pub layout: &'a RoadLayout,
}

impl<'a> Scene<'a> {
    /// Bundle the borrowed parts into a scene.
    pub const fn new(
        grid: &'a GridSpace,
        agents: &'a [Agent],
        signals: &'a SignalController,
        layout: &'a RoadLayout,
    ) -> Self {
        Self {
            grid,
            agents,
            signals,
            layout,
        }
    }

    /// Look up an agent by identifier.
    pub fn agent(&self, id: AgentId) -> Option<&'a Agent> {
        self.agents.get(id.index())
    }

    /// Occupants of the cell at `pos` with their agent data, in arrival order.
    pub fn occupants(&self, pos: Position) -> impl Iterator<Item = (AgentId, &'a Agent)> + 'a {
        let agents = self.agents;
        self.grid
            .cell(pos)
            .iter()
            .filter_map(move |id| agents.get(id.index()).map(|agent| (*id, agent)))
    }

    /// First vehicle in the cell at `pos` other than `me`.
    pub fn vehicle_at(&self, pos: Position, me: AgentId) -> Option<(AgentId, &'a Agent)> {
        self.occupants(pos)
            .find(|(id, agent)| *id != me && agent.is_vehicle())
    }

    /// Whether the cell at `pos` holds a vehicle other than `me`.
    pub fn has_vehicle(&self, pos: Position, me: AgentId) -> bool {
        self.vehicle_at(pos, me).is_some()
    }

    /// Whether the cell at `pos` holds a building.
    pub fn has_building(&self, pos: Position) -> bool {
        self.occupants(pos)
            .any(|(_, agent)| agent.kind() == AgentKind::Building)
    }

    /// Whether the cell at `pos` holds a reckless car.
    pub fn has_reckless(&self, pos: Position) -> bool {
        self.occupants(pos)
            .any(|(_, agent)| agent.kind() == AgentKind::RecklessCar)
    }

    /// The light standing in the cell at `pos`, if any.
    pub fn light_at(&self, pos: Position) -> Option<&'a TrafficLight> {
        self.occupants(pos).find_map(|(_, agent)| match agent {
            Agent::TrafficLight(marker) => self.signals.light(marker.light),
            _ => None,
        })
    }

    /// The light controlling vehicles that spawned at `spawn`.
    ///
    /// Fails open: an approach with no table entry, or an entry pointing at
    /// a cell without a light, is uncontrolled.
    pub fn controlling_light(&self, spawn: Position) -> Option<&'a TrafficLight> {
        let light_pos = self.layout.controlling_light(spawn)?;
        let light = self.light_at(light_pos);
        if light.is_none() {
            debug!(%spawn, light = %light_pos, "Controlling light missing, approach uncontrolled");
        }
        light
    }

    /// The light nearest to `pos` by Manhattan distance; ties go to the
    /// light created first.
    pub fn nearest_light(&self, pos: Position) -> Option<&'a TrafficLight> {
        let mut best: Option<(&'a TrafficLight, u32)> = None;
        for light in self.signals.lights() {
            let distance = pos.manhattan_distance(light.position);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((light, distance));
            }
        }
        best.map(|(light, _)| light)
    }
}
