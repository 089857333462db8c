//! # Hashviz: Step-by-Step Hash Table Collision Resolution
//!
//! This crate simulates how hash tables resolve collisions and replays every
//! probe as an observable step, so the behavior of different strategies can
//! be followed and compared side by side.
//!
//! ## Key Features
//!
//! - **Four Strategies**: Separate chaining, linear probing, quadratic probing and double hashing
//! - **User Hash Formulas**: Sandboxed arithmetic expressions over `key` and `tableSize`
//! - **Pure Probe Generation**: Operations become ordered action lists before anything is mutated
//! - **Deterministic Playback**: Play, pause, step and reset driven by an injectable clock
//! - **Readable Traces**: Every step produces a natural-language trace line
//! - **Pluggable Presentation**: Snapshots, traces and outcomes flow through an event sink
//!
//! ## Quick Start
//!
//! ```rust
//! use hashviz::{ManualClock, Mode, RecordingSink, Visualizer, VisualizerConfig};
//!
//! let config = VisualizerConfig::builder()
//!     .table_size(7)
//!     .build()
//!     .unwrap();
//! let mut viz = Visualizer::with_parts(config, ManualClock::new(), RecordingSink::new()).unwrap();
//!
//! // Queue three colliding keys, then replay them one action at a time
//! viz.request_insert(&[7, 14, 21], Mode::Chain).unwrap();
//! while viz.step().unwrap().is_some() {}
//! assert_eq!(viz.table().bucket(0).unwrap(), &[7, 14, 21]);
//!
//! // Every executed step left a trace line
//! for line in viz.trace().lines() {
//!     println!("{}", line);
//! }
//!
//! // Render the table the way the console front end does
//! println!("{}", viz.snapshot(Mode::Chain));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod error;
pub mod hash_map;
pub mod logger;
pub mod playback;
pub mod presentation;
pub mod visualizer;

// Re-export core types
pub use config::{Config, VisualizerConfig};
pub use error::{HashVizError, Result};
pub use hash_map::{
    Action, HashFunction, HashPair, Key, Mode, Operation, SearchTermination, Slot, TableSnapshot,
    TableState,
};
pub use playback::{Clock, ManualClock, PlaybackState, SystemClock, TraceLog};
pub use presentation::{
    parse_key, parse_keys, EventSink, NullSink, OperationOutcome, OutcomeKind, RecordingSink,
};
pub use visualizer::Visualizer;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library (currently just logs the version)
pub fn init() {
    log::debug!("Initializing hashviz v{}", VERSION);
}
