//! Strategy traits for the probe sequence generator
//!
//! Every collision resolution mode is a [`CollisionResolutionStrategy`]: a pure
//! function from an operation, a key and a read-only [`ProbeContext`] to an
//! ordered list of [`Action`]s.
//!
//! The three open-addressing modes differ only in how far from the home slot
//! the i-th probe lands, so they implement the smaller [`ProbeSequence`] trait
//! and share one driver ([`super::collision_resolution::OpenAddressing`]).

use super::collision_resolution::{Action, Operation, ProbeMetrics};
use super::hash_functions::{fold_index, HashPair};
use super::table_state::{Key, Mode, TableState};
use serde::{Deserialize, Serialize};

/// When an open-addressing search or delete gives up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTermination {
    /// Probe all `table_size` positions unless the key is found
    #[default]
    FullScan,
    /// Stop at the first unoccupied slot
    StopAtEmpty,
}

impl std::str::FromStr for SearchTermination {
    type Err = crate::error::HashVizError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full_scan" | "full" => Ok(Self::FullScan),
            "stop_at_empty" | "stop" => Ok(Self::StopAtEmpty),
            other => Err(crate::error::HashVizError::configuration(format!(
                "unknown search termination '{}'",
                other
            ))),
        }
    }
}

/// Read-only inputs of one generation call
#[derive(Debug, Clone, Copy)]
pub struct ProbeContext<'a> {
    /// Current table contents
    pub state: &'a TableState,
    /// Primary and secondary hash functions
    pub hashes: &'a HashPair,
    /// Search/delete termination rule
    pub termination: SearchTermination,
}

impl<'a> ProbeContext<'a> {
    /// Context with the default termination rule
    pub fn new(state: &'a TableState, hashes: &'a HashPair) -> Self {
        Self {
            state,
            hashes,
            termination: SearchTermination::default(),
        }
    }

    /// Override the termination rule
    pub fn with_termination(mut self, termination: SearchTermination) -> Self {
        self.termination = termination;
        self
    }
}

/// A collision resolution algorithm
pub trait CollisionResolutionStrategy: Sync {
    /// Mode this strategy serves
    fn mode(&self) -> Mode;

    /// Produce the action list for one operation
    ///
    /// Implementations must not depend on anything but their arguments, so
    /// the same inputs always produce the same list.
    fn generate(&self, op: Operation, key: Key, ctx: &ProbeContext<'_>) -> Vec<Action>;
}

/// Probe offsets of an open-addressing mode
pub trait ProbeSequence: Sync {
    /// Mode this sequence serves
    fn mode(&self) -> Mode;

    /// Home slot and step metrics for a key
    fn metrics(&self, key: Key, table_size: usize, hashes: &HashPair) -> ProbeMetrics;

    /// Distance of the `iteration`-th probe from the home slot
    fn offset(&self, iteration: usize, metrics: &ProbeMetrics) -> i128;

    /// Slot index of the `iteration`-th probe
    #[inline]
    fn index(&self, iteration: usize, metrics: &ProbeMetrics, table_size: usize) -> usize {
        fold_index(metrics.home as i128 + self.offset(iteration, metrics), table_size)
    }
}
