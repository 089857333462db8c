//! Presentation seam
//!
//! The engine reports everything a front end needs through an [`EventSink`]:
//! table snapshots after mutations, trace lines, terminal operation outcomes
//! and the cell currently being inspected. Rendering is the sink's business.
//!
//! Also home to the key-input parsers used by front ends.

use crate::error::{HashVizError, Result};
use crate::hash_map::{Action, Key, Mode, TableSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal result of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Search hit
    Found,
    /// Search or delete miss
    NotFound,
    /// Key inserted
    Placed,
    /// Key removed
    Deleted,
    /// Insertion ran out of slots
    Failed,
}

/// Terminal outcome of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationOutcome {
    /// What happened
    pub kind: OutcomeKind,
    /// Mode the operation ran in
    pub mode: Mode,
    /// Key of the operation
    pub key: Key,
    /// Cell involved, when there is one
    pub idx: Option<usize>,
}

impl OperationOutcome {
    /// Outcome carried by a terminal action; `None` for probes
    pub fn from_action(mode: Mode, action: &Action) -> Option<Self> {
        let (kind, idx) = match *action {
            Action::Probe { .. } => return None,
            Action::Place { idx, .. } => (OutcomeKind::Placed, Some(idx)),
            Action::Fail { .. } => (OutcomeKind::Failed, None),
            Action::SearchFound { idx, .. } => (OutcomeKind::Found, Some(idx)),
            Action::SearchNotFound { idx, .. } => (OutcomeKind::NotFound, idx),
            Action::DeletePlace { idx, .. } => (OutcomeKind::Deleted, Some(idx)),
            Action::DeleteFail { .. } => (OutcomeKind::NotFound, None),
        };
        Some(Self {
            kind,
            mode,
            key: action.key(),
            idx,
        })
    }

    /// Whether the operation achieved what it asked for
    pub fn is_success(&self) -> bool {
        !matches!(self.kind, OutcomeKind::NotFound | OutcomeKind::Failed)
    }
}

impl fmt::Display for OperationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cell = if self.mode == Mode::Chain { "bucket" } else { "index" };
        match (self.kind, self.idx) {
            (OutcomeKind::Found, Some(idx)) => {
                write!(f, "Found {} in {} at {} {}", self.key, self.mode, cell, idx)
            }
            (OutcomeKind::Placed, Some(idx)) => {
                write!(f, "Placed {} in {} at {} {}", self.key, self.mode, cell, idx)
            }
            (OutcomeKind::Deleted, Some(idx)) => {
                write!(f, "Deleted {} from {} at {} {}", self.key, self.mode, cell, idx)
            }
            (OutcomeKind::Failed, _) => {
                write!(f, "{}: insertion failed for key {}", self.mode.title(), self.key)
            }
            _ => write!(f, "Key {} not found in {}", self.key, self.mode),
        }
    }
}

/// Receiver of engine events
///
/// Every method has an empty default body; implement what you render.
pub trait EventSink {
    /// A mode's table changed or was re-initialized
    fn on_state_changed(&mut self, _mode: Mode, _snapshot: &TableSnapshot) {}

    /// A trace line was recorded
    fn on_trace_event(&mut self, _text: &str) {}

    /// An operation reached its terminal action
    fn on_operation_outcome(&mut self, _outcome: &OperationOutcome) {}

    /// A cell is being inspected by the current step
    fn on_highlight(&mut self, _mode: Mode, _idx: usize) {}
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn on_state_changed(&mut self, mode: Mode, snapshot: &TableSnapshot) {
        (**self).on_state_changed(mode, snapshot)
    }

    fn on_trace_event(&mut self, text: &str) {
        (**self).on_trace_event(text)
    }

    fn on_operation_outcome(&mut self, outcome: &OperationOutcome) {
        (**self).on_operation_outcome(outcome)
    }

    fn on_highlight(&mut self, mode: Mode, idx: usize) {
        (**self).on_highlight(mode, idx)
    }
}

/// Sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {}

/// Sink that keeps every event, for tests and headless drivers
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    /// Snapshots in emission order
    pub states: Vec<TableSnapshot>,
    /// Trace lines in emission order
    pub traces: Vec<String>,
    /// Outcomes in emission order
    pub outcomes: Vec<OperationOutcome>,
    /// Highlighted cells in emission order
    pub highlights: Vec<(Mode, usize)>,
}

impl RecordingSink {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent snapshot
    pub fn last_state(&self) -> Option<&TableSnapshot> {
        self.states.last()
    }

    /// Most recent outcome
    pub fn last_outcome(&self) -> Option<&OperationOutcome> {
        self.outcomes.last()
    }

    /// Forget everything recorded so far
    pub fn clear(&mut self) {
        self.states.clear();
        self.traces.clear();
        self.outcomes.clear();
        self.highlights.clear();
    }
}

impl EventSink for RecordingSink {
    fn on_state_changed(&mut self, _mode: Mode, snapshot: &TableSnapshot) {
        self.states.push(snapshot.clone());
    }

    fn on_trace_event(&mut self, text: &str) {
        self.traces.push(text.to_string());
    }

    fn on_operation_outcome(&mut self, outcome: &OperationOutcome) {
        self.outcomes.push(*outcome);
    }

    fn on_highlight(&mut self, mode: Mode, idx: usize) {
        self.highlights.push((mode, idx));
    }
}

/// Parse a single integer key
pub fn parse_key(text: &str) -> Result<Key> {
    let token = text.trim();
    if token.is_empty() {
        return Err(HashVizError::invalid_key(text, "no key given"));
    }
    token
        .parse::<Key>()
        .map_err(|e| HashVizError::invalid_key(token, e.to_string()))
}

/// Parse a list of integer keys separated by commas and/or whitespace
///
/// Any token that is not an integer rejects the whole input.
pub fn parse_keys(text: &str) -> Result<Vec<Key>> {
    let keys = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(parse_key)
        .collect::<Result<Vec<_>>>()?;
    if keys.is_empty() {
        return Err(HashVizError::invalid_key(text, "no keys given"));
    }
    Ok(keys)
}
