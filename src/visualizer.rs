//! The visualizer engine
//!
//! [`Visualizer`] owns the four tables, the compiled hash functions, the
//! playback scheduler and an [`EventSink`]. Requests generate action lists
//! and queue them; nothing touches a table until the queue is stepped, either
//! manually with [`Visualizer::step`] or by timed playback through
//! [`Visualizer::poll`].
//!
//! # Examples
//!
//! ```rust
//! use hashviz::{ManualClock, Mode, RecordingSink, Visualizer, VisualizerConfig};
//! # fn main() -> hashviz::Result<()> {
//! let config = VisualizerConfig::builder().table_size(5).build()?;
//! let mut viz = Visualizer::with_parts(config, ManualClock::new(), RecordingSink::new())?;
//!
//! viz.request_insert(&[10, 15, 20], Mode::Linear)?;
//! viz.drain()?;
//! assert_eq!(viz.table().slot(Mode::Linear, 2)?.and_then(|s| s.key()), Some(20));
//! # Ok(())
//! # }
//! ```

use crate::config::{Config, VisualizerConfig};
use crate::error::{HashVizError, Result};
use crate::hash_map::{
    generate, Action, HashPair, Key, Mode, Operation, ProbeContext, TableSnapshot, TableState,
};
use crate::playback::{Clock, PlaybackState, Scheduler, SystemClock, TraceLog};
use crate::presentation::{EventSink, NullSink, OperationOutcome};

/// Step-by-step hash table visualizer
pub struct Visualizer<C: Clock = SystemClock, S: EventSink = NullSink> {
    config: VisualizerConfig,
    table: TableState,
    hashes: HashPair,
    mode: Mode,
    scheduler: Scheduler<C>,
    sink: S,
}

impl Visualizer {
    /// Visualizer on the wall clock that discards events
    pub fn new(config: VisualizerConfig) -> Result<Self> {
        Self::with_parts(config, SystemClock::new(), NullSink)
    }
}

impl<C: Clock, S: EventSink> Visualizer<C, S> {
    /// Visualizer with an explicit clock and event sink
    pub fn with_parts(config: VisualizerConfig, clock: C, sink: S) -> Result<Self> {
        config.validate()?;
        let table = TableState::new(config.table_size)?;
        let hashes = HashPair::compile(&config.primary_expr, &config.secondary_expr);
        let scheduler = Scheduler::new(clock, config.step_interval_ms, config.trace_capacity);
        let mut viz = Self {
            mode: config.initial_mode,
            config,
            table,
            hashes,
            scheduler,
            sink,
        };
        viz.publish_all();
        log::info!("{}", viz.notice());
        Ok(viz)
    }

    /// Rebuild every table and recompile the hash functions
    ///
    /// Invalid formulas fall back to the defaults. A table size outside the
    /// supported range is rejected and leaves the visualizer untouched.
    pub fn initialize(
        &mut self,
        table_size: usize,
        primary_expr: &str,
        secondary_expr: &str,
    ) -> Result<()> {
        let table = TableState::new(table_size)?;
        self.hashes = HashPair::compile(primary_expr, secondary_expr);
        self.table = table;
        self.config.table_size = table_size;
        self.config.primary_expr = primary_expr.to_string();
        self.config.secondary_expr = secondary_expr.to_string();
        self.scheduler.reset();
        self.publish_all();
        log::info!("{}", self.notice());
        Ok(())
    }

    /// Queue the insertion of `keys` into `mode`'s table
    ///
    /// Each key's actions are generated as if the earlier keys of the batch
    /// had already been placed. Clears the mode's queue and the trace first.
    /// Returns the number of queued actions.
    pub fn request_insert(&mut self, keys: &[Key], mode: Mode) -> Result<usize> {
        if keys.is_empty() {
            return Err(HashVizError::invalid_key("", "no keys given"));
        }
        self.set_mode(mode);
        self.scheduler.clear_trace();

        let mut shadow = self.table.clone();
        let mut batch = Vec::new();
        for &key in keys {
            let actions = {
                let ctx = self.context(&shadow);
                generate(Operation::Insert, key, mode, &ctx)
            };
            shadow.apply_all(mode, &actions)?;
            batch.extend(actions);
        }

        let queued = batch.len();
        self.scheduler.load(mode, batch);
        self.note(format!("Prepared {} insertions (mode={})", keys.len(), mode));
        self.after_request();
        Ok(queued)
    }

    /// Queue a lookup of `key` in `mode`'s table
    pub fn request_search(&mut self, key: Key, mode: Mode) -> usize {
        self.request_single(Operation::Search, key, mode)
    }

    /// Queue the removal of `key` from `mode`'s table
    pub fn request_delete(&mut self, key: Key, mode: Mode) -> usize {
        self.request_single(Operation::Delete, key, mode)
    }

    fn request_single(&mut self, op: Operation, key: Key, mode: Mode) -> usize {
        self.set_mode(mode);
        let actions = {
            let ctx = self.context(&self.table);
            generate(op, key, mode, &ctx)
        };
        let queued = actions.len();
        log::debug!("queued {} {} for key {} ({} actions)", mode, op, key, queued);
        self.scheduler.load(mode, actions);
        self.after_request();
        queued
    }

    fn after_request(&mut self) {
        if self.config.auto_play {
            self.scheduler.play();
        }
    }

    fn context<'a>(&'a self, state: &'a TableState) -> ProbeContext<'a> {
        ProbeContext::new(state, &self.hashes).with_termination(self.config.search_termination)
    }

    /// Execute the next queued action of the current mode
    ///
    /// Returns `Ok(None)` and stops playback when the queue is empty.
    pub fn step(&mut self) -> Result<Option<Action>> {
        let mode = self.mode;
        let applied = match self.scheduler.step(mode, &mut self.table)? {
            Some(applied) => applied,
            None => return Ok(None),
        };
        log::debug!("{}: {}", mode, applied.text);

        if let Action::Probe { idx, .. } | Action::SearchFound { idx, .. } = applied.action {
            self.sink.on_highlight(mode, idx);
        }
        self.sink.on_trace_event(&applied.text);
        if applied.changed {
            let snapshot = self.table.snapshot(mode);
            self.sink.on_state_changed(mode, &snapshot);
        }
        if let Some(outcome) = OperationOutcome::from_action(mode, &applied.action) {
            self.sink.on_operation_outcome(&outcome);
        }
        Ok(Some(applied.action))
    }

    /// Start timed playback; no effect while running
    pub fn play(&mut self) {
        self.scheduler.play();
    }

    /// Stop timed playback; no effect while paused
    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    /// Pause, rebuild the tables from the current configuration and clear
    /// every queue and the trace
    pub fn reset(&mut self) -> Result<()> {
        let primary = self.config.primary_expr.clone();
        let secondary = self.config.secondary_expr.clone();
        self.initialize(self.config.table_size, &primary, &secondary)
    }

    /// Run every step that has come due on the clock
    ///
    /// Returns the number of executed actions.
    pub fn poll(&mut self) -> Result<usize> {
        let mut executed = 0;
        while self.scheduler.take_due() {
            match self.step()? {
                Some(_) => executed += 1,
                None => break,
            }
        }
        Ok(executed)
    }

    /// Step until the current mode's queue is empty
    pub fn drain(&mut self) -> Result<usize> {
        let mut executed = 0;
        while self.step()?.is_some() {
            executed += 1;
        }
        Ok(executed)
    }

    /// Switch the mode that stepping and rendering refer to
    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            log::debug!("mode {} -> {}", self.mode, mode);
            self.mode = mode;
            let snapshot = self.table.snapshot(mode);
            self.sink.on_state_changed(mode, &snapshot);
        }
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Change the step interval
    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.config.step_interval_ms = interval_ms;
        self.scheduler.set_interval(interval_ms);
    }

    /// Change the step interval from a speed slider level
    pub fn set_speed_level(&mut self, level: u32) {
        self.set_interval_ms(VisualizerConfig::speed_to_interval(level));
    }

    /// One-line summary of the current table
    pub fn notice(&self) -> String {
        format!(
            "Created hash table with size {} and mode {}",
            self.table.table_size(),
            self.mode
        )
    }

    /// Search every table for `key` without animation
    ///
    /// Returns, per mode, the index holding the key.
    pub fn compare_search(&self, key: Key) -> [(Mode, Option<usize>); 4] {
        let ctx = self.context(&self.table);
        Mode::ALL.map(|mode| {
            let found = generate(Operation::Search, key, mode, &ctx)
                .last()
                .and_then(|action| match *action {
                    Action::SearchFound { idx, .. } => Some(idx),
                    _ => None,
                });
            (mode, found)
        })
    }

    /// Owned copy of a mode's table
    pub fn snapshot(&self, mode: Mode) -> TableSnapshot {
        self.table.snapshot(mode)
    }

    /// Table store
    pub fn table(&self) -> &TableState {
        &self.table
    }

    /// Compiled hash functions
    pub fn hashes(&self) -> &HashPair {
        &self.hashes
    }

    /// Effective configuration
    pub fn config(&self) -> &VisualizerConfig {
        &self.config
    }

    /// Trace of executed steps
    pub fn trace(&self) -> &TraceLog {
        self.scheduler.trace()
    }

    /// Playback state
    pub fn playback_state(&self) -> PlaybackState {
        self.scheduler.state()
    }

    /// Number of queued actions of a mode
    pub fn pending(&self, mode: Mode) -> usize {
        self.scheduler.queues().len(mode)
    }

    /// Time source
    pub fn clock(&self) -> &C {
        self.scheduler.clock()
    }

    /// Event sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutable event sink
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the visualizer, returning its sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    fn note(&mut self, line: String) {
        self.sink.on_trace_event(&line);
        self.scheduler.note(line);
    }

    fn publish_all(&mut self) {
        for mode in Mode::ALL {
            let snapshot = self.table.snapshot(mode);
            self.sink.on_state_changed(mode, &snapshot);
        }
    }
}
