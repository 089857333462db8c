//! Probe sequence generation
//!
//! This module turns `(operation, key, mode, table state, hash functions)` into
//! the ordered list of atomic [`Action`]s that describes how the mode resolves
//! the operation:
//!
//! - **Separate chaining**: one probe of the home bucket, then a placement,
//!   a found/not-found report or a removal.
//! - **Linear probing**: `idx = (h + i) mod m` for `i in 0..m`.
//! - **Quadratic probing**: `idx = (h + i²) mod m` for `i in 0..m`. Not every
//!   table size is fully covered; an insertion may fail with free slots left.
//! - **Double hashing**: `idx = (h1 + i·step) mod m` with `step` taken from the
//!   secondary hash and forced to 1 when it truncates to 0. Coverage is only
//!   complete when `gcd(step, m) == 1`.
//!
//! Generation never mutates the table. Applying the produced list in order
//! with [`TableState::apply`] yields exactly the state a direct execution of
//! the operation would produce.

use super::hash_functions::{normalize, truncate, HashPair};
use super::strategy_traits::{
    CollisionResolutionStrategy, ProbeContext, ProbeSequence, SearchTermination,
};
use super::table_state::{Key, Mode, TableState, TableView};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operation requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Insert a key
    Insert,
    /// Look a key up
    Search,
    /// Remove a key
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Insert => "insert",
            Operation::Search => "search",
            Operation::Delete => "delete",
        })
    }
}

/// Hash values behind a probe, carried for trace output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeMetrics {
    /// Raw primary hash output
    pub raw_hash: f64,
    /// Normalized home slot
    pub home: usize,
    /// Raw secondary hash output (double hashing only)
    pub raw_step: Option<f64>,
    /// Integer probe step after the zero guard (double hashing only)
    pub step: Option<i64>,
}

impl ProbeMetrics {
    fn primary(key: Key, table_size: usize, hashes: &HashPair) -> Self {
        let raw_hash = hashes.primary.call(key, table_size);
        Self {
            raw_hash,
            home: normalize(raw_hash, table_size),
            raw_step: None,
            step: None,
        }
    }
}

/// One atomic step of an operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Inspect a candidate slot or bucket
    Probe {
        /// Slot or bucket index
        idx: usize,
        /// Key of the operation
        key: Key,
        /// Probe number, starting at 0
        iteration: usize,
        /// Hash values behind the index
        metrics: ProbeMetrics,
    },
    /// Commit a key into the slot or bucket probed just before
    Place {
        /// Slot or bucket index
        idx: usize,
        /// Key being inserted
        key: Key,
        /// Probe number that found the slot
        iteration: usize,
        /// Hash values behind the index
        metrics: ProbeMetrics,
    },
    /// Insertion found no free slot
    Fail {
        /// Key that could not be inserted
        key: Key,
        /// Hash values of the failed insertion
        metrics: ProbeMetrics,
    },
    /// Search hit
    SearchFound {
        /// Index holding the key
        idx: usize,
        /// Key searched for
        key: Key,
    },
    /// Search miss
    SearchNotFound {
        /// Key searched for
        key: Key,
        /// Bucket inspected (chaining only)
        idx: Option<usize>,
    },
    /// Removal of a key
    DeletePlace {
        /// Index the key is removed from
        idx: usize,
        /// Key removed
        key: Key,
    },
    /// Removal of an absent key
    DeleteFail {
        /// Key that was not found
        key: Key,
    },
}

impl Action {
    /// Key of the operation the action belongs to
    pub fn key(&self) -> Key {
        match *self {
            Action::Probe { key, .. }
            | Action::Place { key, .. }
            | Action::Fail { key, .. }
            | Action::SearchFound { key, .. }
            | Action::SearchNotFound { key, .. }
            | Action::DeletePlace { key, .. }
            | Action::DeleteFail { key } => key,
        }
    }

    /// Index the action refers to, if any
    pub fn idx(&self) -> Option<usize> {
        match *self {
            Action::Probe { idx, .. }
            | Action::Place { idx, .. }
            | Action::SearchFound { idx, .. }
            | Action::DeletePlace { idx, .. } => Some(idx),
            Action::SearchNotFound { idx, .. } => idx,
            Action::Fail { .. } | Action::DeleteFail { .. } => None,
        }
    }

    /// Whether this is the last action of its operation
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Action::Probe { .. })
    }

    /// Whether applying the action changes a table
    pub fn is_mutation(&self) -> bool {
        matches!(self, Action::Place { .. } | Action::DeletePlace { .. })
    }

    /// Snake-case tag of the action
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Probe { .. } => "probe",
            Action::Place { .. } => "place",
            Action::Fail { .. } => "fail",
            Action::SearchFound { .. } => "search_found",
            Action::SearchNotFound { .. } => "search_notfound",
            Action::DeletePlace { .. } => "delete_place",
            Action::DeleteFail { .. } => "delete_fail",
        }
    }
}

/// Separate chaining
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparateChaining;

impl CollisionResolutionStrategy for SeparateChaining {
    fn mode(&self) -> Mode {
        Mode::Chain
    }

    fn generate(&self, op: Operation, key: Key, ctx: &ProbeContext<'_>) -> Vec<Action> {
        let table_size = ctx.state.table_size();
        let metrics = ProbeMetrics::primary(key, table_size, ctx.hashes);
        let idx = metrics.home;

        let present = match ctx.state.get(Mode::Chain) {
            TableView::Buckets(buckets) => buckets[idx].contains(&key),
            TableView::Slots(_) => false,
        };

        let probe = Action::Probe {
            idx,
            key,
            iteration: 0,
            metrics,
        };
        let outcome = match op {
            Operation::Insert => Action::Place {
                idx,
                key,
                iteration: 0,
                metrics,
            },
            Operation::Search if present => Action::SearchFound { idx, key },
            Operation::Search => Action::SearchNotFound { key, idx: Some(idx) },
            Operation::Delete if present => Action::DeletePlace { idx, key },
            Operation::Delete => Action::DeleteFail { key },
        };
        vec![probe, outcome]
    }
}

/// Linear probing: `h + i`
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearProbing;

impl ProbeSequence for LinearProbing {
    fn mode(&self) -> Mode {
        Mode::Linear
    }

    fn metrics(&self, key: Key, table_size: usize, hashes: &HashPair) -> ProbeMetrics {
        ProbeMetrics::primary(key, table_size, hashes)
    }

    #[inline]
    fn offset(&self, iteration: usize, _metrics: &ProbeMetrics) -> i128 {
        iteration as i128
    }
}

/// Quadratic probing: `h + i²`
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadraticProbing;

impl ProbeSequence for QuadraticProbing {
    fn mode(&self) -> Mode {
        Mode::Quad
    }

    fn metrics(&self, key: Key, table_size: usize, hashes: &HashPair) -> ProbeMetrics {
        ProbeMetrics::primary(key, table_size, hashes)
    }

    #[inline]
    fn offset(&self, iteration: usize, _metrics: &ProbeMetrics) -> i128 {
        let i = iteration as i128;
        i * i
    }
}

/// Double hashing: `h1 + i·step`
#[derive(Debug, Clone, Copy, Default)]
pub struct DoubleHashing;

impl DoubleHashing {
    /// Integer step for a raw secondary hash value; never 0
    pub fn step_from_raw(raw_step: f64) -> i64 {
        match truncate(raw_step) {
            0 => 1,
            step => step,
        }
    }
}

impl ProbeSequence for DoubleHashing {
    fn mode(&self) -> Mode {
        Mode::Double
    }

    fn metrics(&self, key: Key, table_size: usize, hashes: &HashPair) -> ProbeMetrics {
        let raw_step = hashes.secondary.call(key, table_size);
        ProbeMetrics {
            raw_step: Some(raw_step),
            step: Some(Self::step_from_raw(raw_step)),
            ..ProbeMetrics::primary(key, table_size, hashes)
        }
    }

    #[inline]
    fn offset(&self, iteration: usize, metrics: &ProbeMetrics) -> i128 {
        iteration as i128 * metrics.step.unwrap_or(1) as i128
    }
}

/// Shared driver for the open-addressing modes
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAddressing<P>(pub P);

impl<P: ProbeSequence> CollisionResolutionStrategy for OpenAddressing<P> {
    fn mode(&self) -> Mode {
        self.0.mode()
    }

    fn generate(&self, op: Operation, key: Key, ctx: &ProbeContext<'_>) -> Vec<Action> {
        let mode = self.0.mode();
        let table_size = ctx.state.table_size();
        let slots = match ctx.state.get(mode) {
            TableView::Slots(slots) => slots,
            TableView::Buckets(_) => {
                debug_assert!(false, "{} is not an open-addressing mode", mode);
                return Vec::new();
            }
        };
        let metrics = self.0.metrics(key, table_size, ctx.hashes);
        let mut actions = Vec::new();

        for iteration in 0..table_size {
            let idx = self.0.index(iteration, &metrics, table_size);
            actions.push(Action::Probe {
                idx,
                key,
                iteration,
                metrics,
            });

            let slot = slots[idx];
            match op {
                Operation::Insert if !slot.is_occupied() => {
                    actions.push(Action::Place {
                        idx,
                        key,
                        iteration,
                        metrics,
                    });
                    return actions;
                }
                Operation::Search if slot.holds(key) => {
                    actions.push(Action::SearchFound { idx, key });
                    return actions;
                }
                Operation::Delete if slot.holds(key) => {
                    actions.push(Action::DeletePlace { idx, key });
                    return actions;
                }
                Operation::Search | Operation::Delete
                    if !slot.is_occupied()
                        && ctx.termination == SearchTermination::StopAtEmpty =>
                {
                    break;
                }
                _ => {}
            }
        }

        actions.push(match op {
            Operation::Insert => Action::Fail { key, metrics },
            Operation::Search => Action::SearchNotFound { key, idx: None },
            Operation::Delete => Action::DeleteFail { key },
        });
        actions
    }
}

static CHAINING: SeparateChaining = SeparateChaining;
static LINEAR: OpenAddressing<LinearProbing> = OpenAddressing(LinearProbing);
static QUADRATIC: OpenAddressing<QuadraticProbing> = OpenAddressing(QuadraticProbing);
static DOUBLE: OpenAddressing<DoubleHashing> = OpenAddressing(DoubleHashing);

/// Strategy implementing a mode
pub fn strategy_for(mode: Mode) -> &'static dyn CollisionResolutionStrategy {
    match mode {
        Mode::Chain => &CHAINING,
        Mode::Linear => &LINEAR,
        Mode::Quad => &QUADRATIC,
        Mode::Double => &DOUBLE,
    }
}

/// Generate the action list for one operation
pub fn generate(op: Operation, key: Key, mode: Mode, ctx: &ProbeContext<'_>) -> Vec<Action> {
    strategy_for(mode).generate(op, key, ctx)
}

impl TableState {
    /// Run an operation directly, without staging it through a queue
    ///
    /// Returns the action list that was applied.
    pub fn execute(
        &mut self,
        op: Operation,
        key: Key,
        mode: Mode,
        hashes: &HashPair,
        termination: SearchTermination,
    ) -> Result<Vec<Action>> {
        let actions = {
            let ctx = ProbeContext::new(self, hashes).with_termination(termination);
            generate(op, key, mode, &ctx)
        };
        self.apply_all(mode, &actions)?;
        Ok(actions)
    }
}
