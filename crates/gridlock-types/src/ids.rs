//! Type-safe identifier wrappers around population indices.
//!
//! Agents are stored in creation order and never removed, so an agent's
//! identifier is simply its index in the population. Wrapping the index
//! prevents accidental mixing of agent and light identifiers at compile time.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a `u32` index with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an identifier from a raw index.
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Return the index as a `usize` for slice lookups.
            pub fn index(self) -> usize {
                usize::try_from(self.0).unwrap_or(usize::MAX)
            }

            /// Build an identifier from a slice position.
            ///
            /// Returns `None` if the position does not fit in a `u32`.
            pub fn from_index(index: usize) -> Option<Self> {
                u32::try_from(index).ok().map(Self)
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an agent (its position in the population).
    AgentId
}

define_id! {
    /// Identifier of a traffic light within the signal controller's cycle.
    LightId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips_through_usize() {
        let id = AgentId::from_index(17);
        assert_eq!(id, Some(AgentId::new(17)));
        assert_eq!(AgentId::new(17).index(), 17);
    }

    #[test]
    fn display_shows_raw_index() {
        assert_eq!(LightId::new(3).to_string(), "3");
    }

    #[test]
    fn ids_order_by_creation_index() {
        assert!(AgentId::new(1) < AgentId::new(2));
    }
}
