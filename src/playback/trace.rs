//! Human-readable trace of executed steps.
//!
//! Lines are kept in a fixed-capacity ring; once full, the oldest line is
//! evicted. [`describe`] renders one action against the table it is about to
//! be applied to, so probes can name the occupant they collide with.

use crate::hash_map::{Action, Mode, TableState};
use std::collections::VecDeque;

/// Default number of retained trace lines.
pub const DEFAULT_TRACE_CAPACITY: usize = 1024;

/// Fixed-capacity ring of trace lines.
#[derive(Clone, Debug)]
pub struct TraceLog {
    cap: usize,
    buf: VecDeque<String>,
}

impl TraceLog {
    /// Create a log retaining at most `cap` lines (at least one).
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            cap,
            buf: VecDeque::with_capacity(cap.min(DEFAULT_TRACE_CAPACITY)),
        }
    }

    /// Maximum number of retained lines.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append a line, evicting the oldest if at capacity.
    pub fn push<S: Into<String>>(&mut self, line: S) {
        if self.buf.len() == self.cap {
            self.buf.pop_front();
        }
        self.buf.push_back(line.into());
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Most recent line.
    pub fn last(&self) -> Option<&str> {
        self.buf.back().map(String::as_str)
    }

    /// Lines oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        self.buf.iter().map(String::as_str)
    }

    /// Owned copy of the retained lines.
    pub fn dump(&self) -> Vec<String> {
        self.buf.iter().cloned().collect()
    }
}

impl Default for TraceLog {
    fn default() -> Self {
        Self::new(DEFAULT_TRACE_CAPACITY)
    }
}

fn probing_name(mode: Mode) -> &'static str {
    match mode {
        Mode::Chain => "chain",
        Mode::Linear => "linear",
        Mode::Quad => "quadratic",
        Mode::Double => "double",
    }
}

/// Render one action as a trace line.
///
/// `state` must be the table as it is *before* the action is applied.
pub fn describe(mode: Mode, action: &Action, state: &TableState) -> String {
    let m = state.table_size();
    match *action {
        Action::Probe {
            idx,
            key,
            iteration,
            metrics,
        } => {
            if mode == Mode::Chain {
                return format!(
                    "Probe chain bucket {} for key {} (h={} -> idx {})",
                    idx, key, metrics.raw_hash, idx
                );
            }
            let occupant = state.slot(mode, idx).ok().flatten().and_then(|s| s.key());
            let step = metrics.step.unwrap_or(1);
            match (occupant, mode) {
                (Some(occ), Mode::Linear) => format!(
                    "Probe idx {} for key {}: occupied by {} -> collision. Will try (h + {}) mod {}.",
                    idx,
                    key,
                    occ,
                    iteration + 1,
                    m
                ),
                (Some(occ), Mode::Quad) => format!(
                    "Probe idx {} for key {}: occupied by {} -> collision. Will try (h + {}^2) mod {}.",
                    idx,
                    key,
                    occ,
                    iteration + 1,
                    m
                ),
                (Some(occ), _) => format!(
                    "Probe idx {} for key {}: occupied by {} -> collision. Using secondary hash step {} to compute (h1 + i*h2) mod {}.",
                    idx, key, occ, step, m
                ),
                (None, Mode::Double) => format!(
                    "Probe idx {} for key {}: empty (h1={}, h2={})",
                    idx, key, metrics.home, step
                ),
                (None, _) => format!("Probe idx {} for key {}: empty", idx, key),
            }
        }
        Action::Place { idx, key, .. } => match mode {
            Mode::Chain => format!("Placed key {} into chain bucket {}", key, idx),
            Mode::Double => format!("Placed key {} at index {} (double hashing)", key, idx),
            _ => format!("Placed key {} at index {}", key, idx),
        },
        Action::Fail { key, .. } => format!("{}: insertion failed for key {}", mode.title(), key),
        Action::SearchFound { idx, key } => match mode {
            Mode::Chain => format!("Search: found key {} in chain bucket {}", key, idx),
            _ => format!("Search: found key {} at index {}", key, idx),
        },
        Action::SearchNotFound { key, idx } => match (mode, idx) {
            (Mode::Chain, Some(idx)) => {
                format!("Search: key {} not found in chain bucket {}", key, idx)
            }
            _ => format!("Search: key {} not found ({})", key, probing_name(mode)),
        },
        Action::DeletePlace { idx, key } => match mode {
            Mode::Chain => format!("Deleted key {} from chain bucket {}", key, idx),
            _ => format!("Deleted key {} from index {}", key, idx),
        },
        Action::DeleteFail { key } => match mode {
            Mode::Chain => format!("Delete: key {} not found in chain", key),
            _ => format!("Delete: key {} not found ({})", key, probing_name(mode)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_map::{generate, HashPair, Mutation, Operation, ProbeContext};

    #[test]
    fn ring_evicts_oldest() {
        let mut log = TraceLog::new(2);
        log.push("a");
        log.push("b");
        log.push("c");
        assert_eq!(log.len(), 2);
        assert_eq!(log.dump(), vec!["b".to_string(), "c".to_string()]);
        assert_eq!(log.last(), Some("c"));

        log.clear();
        assert!(log.is_empty());
        assert_eq!(TraceLog::new(0).cap(), 1);
    }

    #[test]
    fn describes_linear_collision() {
        let mut state = TableState::new(5).unwrap();
        state.mutate(Mode::Linear, 0, Mutation::Occupy(10)).unwrap();
        let hashes = HashPair::default();
        let ctx = ProbeContext::new(&state, &hashes);
        let actions = generate(Operation::Insert, 15, Mode::Linear, &ctx);

        let lines: Vec<String> = actions
            .iter()
            .map(|a| describe(Mode::Linear, a, &state))
            .collect();
        assert_eq!(
            lines,
            vec![
                "Probe idx 0 for key 15: occupied by 10 -> collision. Will try (h + 1) mod 5.",
                "Probe idx 1 for key 15: empty",
                "Placed key 15 at index 1",
            ]
        );
    }

    #[test]
    fn describes_quadratic_and_double_probes() {
        let mut state = TableState::new(7).unwrap();
        state.mutate(Mode::Quad, 3, Mutation::Occupy(3)).unwrap();
        state.mutate(Mode::Double, 3, Mutation::Occupy(3)).unwrap();
        let hashes = HashPair::default();
        let ctx = ProbeContext::new(&state, &hashes);

        let quad = generate(Operation::Insert, 10, Mode::Quad, &ctx);
        assert_eq!(
            describe(Mode::Quad, &quad[0], &state),
            "Probe idx 3 for key 10: occupied by 3 -> collision. Will try (h + 1^2) mod 7."
        );

        let double = generate(Operation::Insert, 10, Mode::Double, &ctx);
        assert_eq!(
            describe(Mode::Double, &double[0], &state),
            "Probe idx 3 for key 10: occupied by 3 -> collision. Using secondary hash step 5 to compute (h1 + i*h2) mod 7."
        );
        assert_eq!(
            describe(Mode::Double, &double[1], &state),
            "Probe idx 1 for key 10: empty (h1=3, h2=5)"
        );
        assert_eq!(
            describe(Mode::Double, &double[2], &state),
            "Placed key 10 at index 1 (double hashing)"
        );
    }

    #[test]
    fn describes_chain_and_terminal_reports() {
        let state = TableState::new(7).unwrap();
        let hashes = HashPair::default();
        let ctx = ProbeContext::new(&state, &hashes);

        let insert = generate(Operation::Insert, 15, Mode::Chain, &ctx);
        assert_eq!(
            describe(Mode::Chain, &insert[0], &state),
            "Probe chain bucket 1 for key 15 (h=1 -> idx 1)"
        );
        assert_eq!(
            describe(Mode::Chain, &insert[1], &state),
            "Placed key 15 into chain bucket 1"
        );

        let missing = generate(Operation::Search, 15, Mode::Chain, &ctx);
        assert_eq!(
            describe(Mode::Chain, &missing[1], &state),
            "Search: key 15 not found in chain bucket 1"
        );

        assert_eq!(
            describe(Mode::Quad, &Action::SearchNotFound { key: 4, idx: None }, &state),
            "Search: key 4 not found (quadratic)"
        );
        assert_eq!(
            describe(Mode::Linear, &Action::DeleteFail { key: 4 }, &state),
            "Delete: key 4 not found (linear)"
        );
        assert_eq!(
            describe(Mode::Chain, &Action::DeleteFail { key: 4 }, &state),
            "Delete: key 4 not found in chain"
        );
    }
}
