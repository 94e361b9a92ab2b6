//! Reactor lifecycle phases

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a batch reactor
///
/// ```text
/// Init --enter--> Begin --full--> Operation --cycle done--> Refuel
///                   |                 ^                        |
///                   +--not full--> Waiting <------not full-----+
///
/// any phase --lifetime reached--> End --post-core empty--> decommissioned
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Constructed, not yet in the simulation
    Init,
    /// First core fill
    Begin,
    /// Cycle running
    Operation,
    /// Batch swap due
    Refuel,
    /// Core partially filled, awaiting more fuel
    Waiting,
    /// Shutting down
    End,
}

impl Phase {
    /// Human-readable phase name
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Init => "initialization",
            Phase::Begin => "beginning",
            Phase::Operation => "operation",
            Phase::Refuel => "refueling",
            Phase::Waiting => "waiting for fuel",
            Phase::End => "ending",
        }
    }

    /// Phases whose entry restarts the cycle count
    ///
    /// Refuel keeps the count so the completed cycle length stays visible
    /// until the reloaded core starts operating again.
    pub(crate) const fn restarts_cycle(self) -> bool {
        matches!(self, Phase::Begin | Phase::Waiting | Phase::Operation)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
