//! Playback of generated action lists
//!
//! - [`clock`]: injectable millisecond time sources
//! - [`queue`]: per-mode FIFO queues of pending actions
//! - [`trace`]: the bounded trace log and action descriptions
//! - [`scheduler`]: the play/pause/step state machine

pub mod clock;
pub mod queue;
pub mod scheduler;
pub mod trace;

pub use clock::{Clock, ManualClock, SystemClock};
pub use queue::ActionQueues;
pub use scheduler::{AppliedStep, PlaybackState, Scheduler};
pub use trace::{describe, TraceLog, DEFAULT_TRACE_CAPACITY};
