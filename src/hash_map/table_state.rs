//! Table State Store
//!
//! Owns the four independent tables, one per [`Mode`]. The chaining table is a
//! vector of buckets; the three open-addressing tables are vectors of
//! [`Slot`]s. All four share one table size and are replaced together by
//! [`TableState::reset`]. No operation on one mode touches another.

use super::collision_resolution::Action;
use crate::error::{check_bounds, HashVizError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer key stored in the tables
pub type Key = i64;

/// Smallest supported table size
pub const MIN_TABLE_SIZE: usize = 3;

/// Largest supported table size
pub const MAX_TABLE_SIZE: usize = 65_536;

/// Table size used when none is given
pub const DEFAULT_TABLE_SIZE: usize = 10;

/// Collision resolution mode; selects a table and a probe algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Separate chaining
    #[default]
    Chain,
    /// Linear probing
    Linear,
    /// Quadratic probing
    Quad,
    /// Double hashing
    Double,
}

impl Mode {
    /// All modes in display order
    pub const ALL: [Mode; 4] = [Mode::Chain, Mode::Linear, Mode::Quad, Mode::Double];

    /// Short name used in commands, config and trace lines
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Chain => "chain",
            Mode::Linear => "linear",
            Mode::Quad => "quad",
            Mode::Double => "double",
        }
    }

    /// Human readable title
    pub fn title(&self) -> &'static str {
        match self {
            Mode::Chain => "Separate Chaining",
            Mode::Linear => "Linear Probing",
            Mode::Quad => "Quadratic Probing",
            Mode::Double => "Double Hashing",
        }
    }

    /// True for the three open-addressing modes
    pub fn is_open_addressing(&self) -> bool {
        !matches!(self, Mode::Chain)
    }

    /// Position of the mode in [`Mode::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Mode::Chain => 0,
            Mode::Linear => 1,
            Mode::Quad => 2,
            Mode::Double => 3,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = HashVizError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chain" | "chaining" => Ok(Mode::Chain),
            "linear" => Ok(Mode::Linear),
            "quad" | "quadratic" => Ok(Mode::Quad),
            "double" | "dbl" => Ok(Mode::Double),
            other => Err(HashVizError::configuration(format!(
                "unknown mode '{}' (expected chain, linear, quad or double)",
                other
            ))),
        }
    }
}

/// One open-addressing slot: a key, or empty
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    key: Option<Key>,
}

impl Slot {
    /// An unoccupied slot
    pub const EMPTY: Slot = Slot { key: None };

    /// A slot holding `key`
    pub fn occupied(key: Key) -> Self {
        Self { key: Some(key) }
    }

    /// Stored key, if any
    pub fn key(&self) -> Option<Key> {
        self.key
    }

    /// Whether the slot holds a key
    pub fn is_occupied(&self) -> bool {
        self.key.is_some()
    }

    /// Whether the slot holds exactly `key`
    pub fn holds(&self, key: Key) -> bool {
        self.key == Some(key)
    }
}

/// Borrowed view of one mode's table
#[derive(Debug, Clone, Copy)]
pub enum TableView<'a> {
    /// Chaining buckets
    Buckets(&'a [Vec<Key>]),
    /// Open-addressing slots
    Slots(&'a [Slot]),
}

/// Borrowed view of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView<'a> {
    /// A chaining bucket
    Bucket(&'a [Key]),
    /// An open-addressing slot
    Slot(Slot),
}

/// Single-cell write; the only way table contents change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Append a key to a chaining bucket
    Append(Key),
    /// Remove the first occurrence of a key from a chaining bucket
    RemoveFirst(Key),
    /// Store a key in an empty open-addressing slot
    Occupy(Key),
    /// Empty an open-addressing slot
    Vacate,
}

impl Mutation {
    fn name(&self) -> &'static str {
        match self {
            Mutation::Append(_) => "append",
            Mutation::RemoveFirst(_) => "remove",
            Mutation::Occupy(_) => "occupy",
            Mutation::Vacate => "vacate",
        }
    }
}

/// The four tables of one table generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    table_size: usize,
    chain: Vec<Vec<Key>>,
    linear: Vec<Slot>,
    quad: Vec<Slot>,
    double: Vec<Slot>,
}

impl TableState {
    /// Create four empty tables of `table_size` cells
    pub fn new(table_size: usize) -> Result<Self> {
        if !(MIN_TABLE_SIZE..=MAX_TABLE_SIZE).contains(&table_size) {
            return Err(HashVizError::invalid_table_size(table_size));
        }
        Ok(Self {
            table_size,
            chain: vec![Vec::new(); table_size],
            linear: vec![Slot::EMPTY; table_size],
            quad: vec![Slot::EMPTY; table_size],
            double: vec![Slot::EMPTY; table_size],
        })
    }

    /// Replace all four tables with empty ones of `table_size` cells
    pub fn reset(&mut self, table_size: usize) -> Result<()> {
        *self = Self::new(table_size)?;
        Ok(())
    }

    /// Number of cells per table
    #[inline]
    pub fn table_size(&self) -> usize {
        self.table_size
    }

    /// View of one mode's table
    pub fn get(&self, mode: Mode) -> TableView<'_> {
        match mode {
            Mode::Chain => TableView::Buckets(&self.chain),
            Mode::Linear => TableView::Slots(&self.linear),
            Mode::Quad => TableView::Slots(&self.quad),
            Mode::Double => TableView::Slots(&self.double),
        }
    }

    /// View of one cell
    pub fn cell(&self, mode: Mode, idx: usize) -> Result<CellView<'_>> {
        check_bounds(idx, self.table_size)?;
        Ok(match self.get(mode) {
            TableView::Buckets(buckets) => CellView::Bucket(&buckets[idx]),
            TableView::Slots(slots) => CellView::Slot(slots[idx]),
        })
    }

    /// Chaining bucket at `idx`
    pub fn bucket(&self, idx: usize) -> Result<&[Key]> {
        check_bounds(idx, self.table_size)?;
        Ok(&self.chain[idx])
    }

    /// Open-addressing slot at `idx`; `None` for the chaining mode
    pub fn slot(&self, mode: Mode, idx: usize) -> Result<Option<Slot>> {
        check_bounds(idx, self.table_size)?;
        Ok(self.slots(mode).map(|slots| slots[idx]))
    }

    /// Open-addressing slots of a mode; `None` for the chaining mode
    pub fn slots(&self, mode: Mode) -> Option<&[Slot]> {
        match self.get(mode) {
            TableView::Slots(slots) => Some(slots),
            TableView::Buckets(_) => None,
        }
    }

    fn slots_mut(&mut self, mode: Mode) -> Option<&mut Vec<Slot>> {
        match mode {
            Mode::Chain => None,
            Mode::Linear => Some(&mut self.linear),
            Mode::Quad => Some(&mut self.quad),
            Mode::Double => Some(&mut self.double),
        }
    }

    /// Write a single cell
    pub fn mutate(&mut self, mode: Mode, idx: usize, mutation: Mutation) -> Result<()> {
        check_bounds(idx, self.table_size)?;

        match (mode, mutation) {
            (Mode::Chain, Mutation::Append(key)) => {
                self.chain[idx].push(key);
                Ok(())
            }
            (Mode::Chain, Mutation::RemoveFirst(key)) => {
                let bucket = &mut self.chain[idx];
                if let Some(pos) = bucket.iter().position(|&k| k == key) {
                    bucket.remove(pos);
                }
                Ok(())
            }
            (Mode::Chain, other) => Err(HashVizError::mode_mismatch(mode.name(), other.name())),
            (_, Mutation::Occupy(key)) => {
                let slots = self
                    .slots_mut(mode)
                    .ok_or_else(|| HashVizError::mode_mismatch(mode.name(), "occupy"))?;
                if let Some(occupant) = slots[idx].key() {
                    return Err(HashVizError::slot_occupied(idx, occupant));
                }
                slots[idx] = Slot::occupied(key);
                Ok(())
            }
            (_, Mutation::Vacate) => {
                let slots = self
                    .slots_mut(mode)
                    .ok_or_else(|| HashVizError::mode_mismatch(mode.name(), "vacate"))?;
                slots[idx] = Slot::EMPTY;
                Ok(())
            }
            (_, other) => Err(HashVizError::mode_mismatch(mode.name(), other.name())),
        }
    }

    /// Apply the side effect of one action
    ///
    /// Returns `true` when a cell changed. Probes and terminal reports leave
    /// the tables untouched.
    pub fn apply(&mut self, mode: Mode, action: &Action) -> Result<bool> {
        let (idx, mutation) = match *action {
            Action::Place { idx, key, .. } => {
                let mutation = if mode.is_open_addressing() {
                    Mutation::Occupy(key)
                } else {
                    Mutation::Append(key)
                };
                (idx, mutation)
            }
            Action::DeletePlace { idx, key } => {
                let mutation = if mode.is_open_addressing() {
                    Mutation::Vacate
                } else {
                    Mutation::RemoveFirst(key)
                };
                (idx, mutation)
            }
            _ => return Ok(false),
        };
        self.mutate(mode, idx, mutation)?;
        Ok(true)
    }

    /// Apply a whole action list in order
    pub fn apply_all(&mut self, mode: Mode, actions: &[Action]) -> Result<()> {
        for action in actions {
            self.apply(mode, action)?;
        }
        Ok(())
    }

    /// Number of keys stored in a mode's table
    pub fn len(&self, mode: Mode) -> usize {
        match self.get(mode) {
            TableView::Buckets(buckets) => buckets.iter().map(Vec::len).sum(),
            TableView::Slots(slots) => slots.iter().filter(|s| s.is_occupied()).count(),
        }
    }

    /// Whether a mode's table holds no keys
    pub fn is_empty(&self, mode: Mode) -> bool {
        self.len(mode) == 0
    }

    /// Keys per cell; may exceed 1.0 for chaining
    pub fn load_factor(&self, mode: Mode) -> f64 {
        self.len(mode) as f64 / self.table_size as f64
    }

    /// Whether every slot of an open-addressing table is occupied
    ///
    /// Chaining tables are never full.
    pub fn is_full(&self, mode: Mode) -> bool {
        match self.slots(mode) {
            Some(slots) => slots.iter().all(Slot::is_occupied),
            None => false,
        }
    }

    /// Owned copy of a mode's table for the presentation layer
    pub fn snapshot(&self, mode: Mode) -> TableSnapshot {
        let cells = match self.get(mode) {
            TableView::Buckets(buckets) => SnapshotCells::Buckets(buckets.to_vec()),
            TableView::Slots(slots) => SnapshotCells::Slots(slots.to_vec()),
        };
        TableSnapshot {
            mode,
            table_size: self.table_size,
            cells,
        }
    }
}

/// Owned cell contents of a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotCells {
    /// Chaining buckets
    Buckets(Vec<Vec<Key>>),
    /// Open-addressing slots
    Slots(Vec<Slot>),
}

/// Owned copy of one mode's table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Mode the table belongs to
    pub mode: Mode,
    /// Number of cells
    pub table_size: usize,
    /// Cell contents
    pub cells: SnapshotCells,
}

impl fmt::Display for TableSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.mode.title())?;
        match &self.cells {
            SnapshotCells::Buckets(buckets) => {
                for (i, bucket) in buckets.iter().enumerate() {
                    write!(f, "{} --> ", i)?;
                    for key in bucket {
                        write!(f, "{} -> ", key)?;
                    }
                    writeln!(f, "NULL")?;
                }
            }
            SnapshotCells::Slots(slots) => {
                for (i, slot) in slots.iter().enumerate() {
                    match slot.key() {
                        Some(key) => writeln!(f, "{} --> {}", i, key)?,
                        None => writeln!(f, "{} --> NULL", i)?,
                    }
                }
            }
        }
        Ok(())
    }
}
