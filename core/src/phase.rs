//! NavigationPhase - The Trip Lifecycle
//!
//! A trip moves through a closed, ordered set of phases. `Completed` is terminal.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One discrete stage of a trip.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum NavigationPhase {
    /// Driving to the pickup point
    #[default]
    ToPickup,
    /// Parked at the pickup point, waiting for the rider
    AtPickup,
    /// Rider is boarding
    PickingUp,
    /// Driving the rider to the destination
    ToDestination,
    /// Arrived at the destination
    AtDestination,
    /// Trip finished (terminal)
    Completed,
}

impl NavigationPhase {
    /// All phases in lifecycle order.
    pub const ALL: [NavigationPhase; 6] = [
        NavigationPhase::ToPickup,
        NavigationPhase::AtPickup,
        NavigationPhase::PickingUp,
        NavigationPhase::ToDestination,
        NavigationPhase::AtDestination,
        NavigationPhase::Completed,
    ];

    /// The wire tag (`to-pickup`, `at-pickup`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigationPhase::ToPickup => "to-pickup",
            NavigationPhase::AtPickup => "at-pickup",
            NavigationPhase::PickingUp => "picking-up",
            NavigationPhase::ToDestination => "to-destination",
            NavigationPhase::AtDestination => "at-destination",
            NavigationPhase::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, NavigationPhase::Completed)
    }

    /// Whether the rider is in the vehicle during this phase.
    pub fn has_rider(&self) -> bool {
        matches!(
            self,
            NavigationPhase::PickingUp
                | NavigationPhase::ToDestination
                | NavigationPhase::AtDestination
        )
    }
}

impl fmt::Display for NavigationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown phase tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown navigation phase: {0}")]
pub struct UnknownPhase(pub String);

impl FromStr for NavigationPhase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NavigationPhase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip_through_from_str() {
        for phase in NavigationPhase::ALL {
            assert_eq!(phase.as_str().parse::<NavigationPhase>(), Ok(phase));
        }
        assert!("boarding".parse::<NavigationPhase>().is_err());
    }

    #[test]
    fn test_serde_uses_kebab_case_tags() {
        let json = serde_json::to_string(&NavigationPhase::ToDestination).unwrap();
        assert_eq!(json, "\"to-destination\"");
    }

    #[test]
    fn test_only_completed_is_terminal() {
        let terminal: Vec<_> = NavigationPhase::ALL
            .into_iter()
            .filter(NavigationPhase::is_terminal)
            .collect();
        assert_eq!(terminal, vec![NavigationPhase::Completed]);
        assert_eq!(NavigationPhase::default(), NavigationPhase::ToPickup);
    }
}
