//! Hash tables under four collision resolution strategies
//!
//! This module holds everything needed to simulate one operation:
//! - [`expression`]: sandboxed parser for user supplied hash formulas
//! - [`hash_functions`]: compiled hash functions, defaults and index normalization
//! - [`table_state`]: the four independent tables and their single-cell mutations
//! - [`strategy_traits`]: the pluggable strategy interfaces
//! - [`collision_resolution`]: the probe sequence generator for each mode

pub mod collision_resolution;
pub mod expression;
pub mod hash_functions;
pub mod strategy_traits;
pub mod table_state;

pub use collision_resolution::{
    generate, strategy_for, Action, DoubleHashing, LinearProbing, OpenAddressing, Operation,
    ProbeMetrics, QuadraticProbing, SeparateChaining,
};
pub use expression::{BinaryOp, Expr, Param};
pub use hash_functions::{
    fold_index, normalize, truncate, HashFunction, HashPair, DEFAULT_PRIMARY_EXPR,
    DEFAULT_SECONDARY_EXPR,
};
pub use strategy_traits::{
    CollisionResolutionStrategy, ProbeContext, ProbeSequence, SearchTermination,
};
pub use table_state::{
    CellView, Key, Mode, Mutation, Slot, SnapshotCells, TableSnapshot, TableState, TableView,
    DEFAULT_TABLE_SIZE, MAX_TABLE_SIZE, MIN_TABLE_SIZE,
};
