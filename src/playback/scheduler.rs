//! Step-by-step playback of queued actions.
//!
//! The scheduler drains one action at a time from the active mode's queue,
//! applies it to the table store and records a trace line. Timed playback is
//! driven by [`Scheduler::take_due`]: the caller polls it and steps once for
//! every elapsed interval.
//!
//! ```text
//!            play()                   queue drained
//!   Idle ─────────────▶ Running ─────────────────────▶ Exhausted
//!    ▲                    │                               │
//!    └──── pause() ───────┘◀──────────── play() ──────────┘
//! ```

use super::clock::Clock;
use super::queue::ActionQueues;
use super::trace::{describe, TraceLog};
use crate::error::Result;
use crate::hash_map::{Action, Mode, TableState};

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Not advancing on its own
    #[default]
    Idle,
    /// Advancing once per interval
    Running,
    /// A step found the active queue empty; playback stopped
    Exhausted,
}

/// An action that was just executed
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedStep {
    /// Mode whose table the action ran against
    pub mode: Mode,
    /// The executed action
    pub action: Action,
    /// Trace line recorded for it
    pub text: String,
    /// Whether the table changed
    pub changed: bool,
}

/// Drains per-mode action queues into the table store
#[derive(Debug)]
pub struct Scheduler<C: Clock> {
    clock: C,
    interval_ms: u64,
    state: PlaybackState,
    next_due: Option<u64>,
    queues: ActionQueues,
    trace: TraceLog,
}

impl<C: Clock> Scheduler<C> {
    /// Create an idle scheduler
    pub fn new(clock: C, interval_ms: u64, trace_capacity: usize) -> Self {
        Self {
            clock,
            interval_ms,
            state: PlaybackState::Idle,
            next_due: None,
            queues: ActionQueues::new(),
            trace: TraceLog::new(trace_capacity),
        }
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Whether timed playback is active
    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    /// Milliseconds between timed steps
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Change the step interval; a running timer restarts with the new period
    pub fn set_interval(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
        if self.is_running() {
            self.next_due = Some(self.deadline());
        }
    }

    /// Time source
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Pending actions
    pub fn queues(&self) -> &ActionQueues {
        &self.queues
    }

    /// Trace of executed steps
    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    /// Append a free-form trace line
    pub fn note<S: Into<String>>(&mut self, line: S) {
        self.trace.push(line);
    }

    /// Replace a mode's queue with a freshly generated action list
    pub fn load(&mut self, mode: Mode, actions: Vec<Action>) {
        self.queues.clear(mode);
        self.queues.enqueue(mode, actions);
    }

    /// Append to a mode's queue
    pub fn enqueue(&mut self, mode: Mode, actions: Vec<Action>) {
        self.queues.enqueue(mode, actions);
    }

    /// Drop a mode's pending actions
    pub fn clear_queue(&mut self, mode: Mode) {
        self.queues.clear(mode);
    }

    /// Drop the trace
    pub fn clear_trace(&mut self) {
        self.trace.clear();
    }

    fn deadline(&self) -> u64 {
        self.clock.now_millis().saturating_add(self.interval_ms)
    }

    /// Start timed playback; no effect while already running
    pub fn play(&mut self) {
        if self.is_running() {
            return;
        }
        self.state = PlaybackState::Running;
        self.next_due = Some(self.deadline());
        log::debug!("playback started, interval {}ms", self.interval_ms);
    }

    /// Stop timed playback; no effect unless running
    pub fn pause(&mut self) {
        if self.is_running() {
            self.state = PlaybackState::Idle;
            self.next_due = None;
            log::debug!("playback paused");
        }
    }

    /// Stop playback and drop every queue and the trace
    pub fn reset(&mut self) {
        self.state = PlaybackState::Idle;
        self.next_due = None;
        self.queues.clear_all();
        self.trace.clear();
    }

    /// Consume one elapsed interval
    ///
    /// Returns `true` when a timed step is due. Call repeatedly to catch up on
    /// several missed intervals.
    pub fn take_due(&mut self) -> bool {
        match self.next_due {
            Some(due) if self.is_running() && self.clock.now_millis() >= due => {
                self.next_due = Some(due.saturating_add(self.interval_ms));
                true
            }
            _ => false,
        }
    }

    /// Execute the next pending action of `mode`
    ///
    /// An empty queue stops playback and returns `Ok(None)` without touching
    /// the table or the trace. A failed application leaves the table
    /// unchanged and records nothing.
    pub fn step(&mut self, mode: Mode, table: &mut TableState) -> Result<Option<AppliedStep>> {
        let action = match self.queues.pop(mode) {
            Some(action) => action,
            None => {
                if self.state != PlaybackState::Exhausted {
                    log::debug!("{} queue drained", mode);
                }
                self.state = PlaybackState::Exhausted;
                self.next_due = None;
                return Ok(None);
            }
        };

        let text = describe(mode, &action, table);
        let changed = table.apply(mode, &action).map_err(|e| {
            log::warn!("dropping {} action for key {}: {}", action.kind(), action.key(), e);
            e
        })?;
        self.trace.push(text.clone());
        Ok(Some(AppliedStep {
            mode,
            action,
            text,
            changed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash_map::{generate, HashPair, Operation, ProbeContext, Slot};
    use crate::playback::clock::ManualClock;

    fn insert_actions(state: &TableState, key: i64, mode: Mode) -> Vec<Action> {
        let hashes = HashPair::default();
        let ctx = ProbeContext::new(state, &hashes);
        generate(Operation::Insert, key, mode, &ctx)
    }

    #[test]
    fn step_applies_in_order() {
        let mut table = TableState::new(5).unwrap();
        let mut scheduler = Scheduler::new(ManualClock::new(), 100, 16);
        scheduler.load(Mode::Linear, insert_actions(&table, 7, Mode::Linear));

        let probe = scheduler.step(Mode::Linear, &mut table).unwrap().unwrap();
        assert!(!probe.changed);
        assert_eq!(table.slot(Mode::Linear, 2).unwrap(), Some(Slot::EMPTY));

        let place = scheduler.step(Mode::Linear, &mut table).unwrap().unwrap();
        assert!(place.changed);
        assert_eq!(place.text, "Placed key 7 at index 2");
        assert_eq!(table.slot(Mode::Linear, 2).unwrap(), Some(Slot::occupied(7)));
        assert_eq!(scheduler.trace().len(), 2);
    }

    #[test]
    fn empty_step_exhausts_without_side_effects() {
        let mut table = TableState::new(5).unwrap();
        let before = table.clone();
        let mut scheduler = Scheduler::new(ManualClock::new(), 100, 16);
        scheduler.play();

        assert_eq!(scheduler.step(Mode::Chain, &mut table).unwrap(), None);
        assert_eq!(scheduler.state(), PlaybackState::Exhausted);
        assert!(scheduler.trace().is_empty());
        assert_eq!(table, before);

        assert_eq!(scheduler.step(Mode::Chain, &mut table).unwrap(), None);
        assert!(scheduler.trace().is_empty());
    }

    #[test]
    fn play_is_idempotent_and_ticks_per_interval() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new(clock.clone(), 100, 16);
        assert!(!scheduler.take_due());

        scheduler.play();
        clock.advance_by(50);
        scheduler.play();
        clock.advance_by(50);
        assert!(scheduler.take_due());
        assert!(!scheduler.take_due());

        clock.advance_by(250);
        assert!(scheduler.take_due());
        assert!(scheduler.take_due());
        assert!(!scheduler.take_due());

        scheduler.pause();
        clock.advance_by(1000);
        assert!(!scheduler.take_due());
        assert_eq!(scheduler.state(), PlaybackState::Idle);
    }

    #[test]
    fn set_interval_restarts_running_timer() {
        let clock = ManualClock::new();
        let mut scheduler = Scheduler::new(clock.clone(), 500, 16);
        scheduler.play();
        clock.advance_by(400);
        scheduler.set_interval(200);
        clock.advance_by(150);
        assert!(!scheduler.take_due());
        clock.advance_by(50);
        assert!(scheduler.take_due());
    }

    #[test]
    fn failed_application_records_nothing() {
        let mut table = TableState::new(5).unwrap();
        let mut scheduler = Scheduler::new(ManualClock::new(), 100, 16);
        let stale = insert_actions(&table, 7, Mode::Linear);
        scheduler.enqueue(Mode::Linear, stale.clone());
        scheduler.enqueue(Mode::Linear, stale);

        for _ in 0..2 {
            scheduler.step(Mode::Linear, &mut table).unwrap();
        }
        // Second copy of the probe is harmless, the placement collides
        assert!(scheduler.step(Mode::Linear, &mut table).unwrap().is_some());
        assert!(scheduler.step(Mode::Linear, &mut table).is_err());
        assert_eq!(scheduler.trace().len(), 3);
        assert_eq!(table.slot(Mode::Linear, 2).unwrap(), Some(Slot::occupied(7)));
    }

    #[test]
    fn reset_clears_queues_and_trace() {
        let table = TableState::new(5).unwrap();
        let mut scheduler = Scheduler::new(ManualClock::new(), 100, 16);
        scheduler.load(Mode::Chain, insert_actions(&table, 1, Mode::Chain));
        scheduler.note("Prepared 1 insertions (mode=chain)");
        scheduler.play();

        scheduler.reset();
        assert_eq!(scheduler.state(), PlaybackState::Idle);
        assert!(scheduler.queues().is_empty(Mode::Chain));
        assert!(scheduler.trace().is_empty());
    }
}
