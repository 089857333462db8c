//! Visualizer session configuration.

use super::{parse_env_bool, parse_env_var, Config};
use crate::error::{HashVizError, Result};
use crate::hash_map::{
    Mode, SearchTermination, DEFAULT_PRIMARY_EXPR, DEFAULT_SECONDARY_EXPR, DEFAULT_TABLE_SIZE,
    MAX_TABLE_SIZE, MIN_TABLE_SIZE,
};
use crate::playback::DEFAULT_TRACE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default milliseconds between timed steps.
pub const DEFAULT_STEP_INTERVAL_MS: u64 = 500;

/// Longest accepted step interval.
pub const MAX_STEP_INTERVAL_MS: u64 = 60_000;

/// Fastest speed slider level.
pub const MAX_SPEED_LEVEL: u32 = 10;

/// Configuration of one visualizer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Number of buckets/slots per table
    pub table_size: usize,
    /// Primary hash expression over `key` and `tableSize`
    pub primary_expr: String,
    /// Secondary hash expression used by double hashing
    pub secondary_expr: String,
    /// Milliseconds between timed steps
    pub step_interval_ms: u64,
    /// Start playback as soon as a request is queued
    pub auto_play: bool,
    /// When open-addressing search and delete give up
    pub search_termination: SearchTermination,
    /// Mode active after initialization
    pub initial_mode: Mode,
    /// Number of retained trace lines
    pub trace_capacity: usize,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            table_size: DEFAULT_TABLE_SIZE,
            primary_expr: DEFAULT_PRIMARY_EXPR.to_string(),
            secondary_expr: DEFAULT_SECONDARY_EXPR.to_string(),
            step_interval_ms: DEFAULT_STEP_INTERVAL_MS,
            auto_play: false,
            search_termination: SearchTermination::FullScan,
            initial_mode: Mode::Chain,
            trace_capacity: DEFAULT_TRACE_CAPACITY,
        }
    }
}

impl Config for VisualizerConfig {
    fn validate(&self) -> Result<()> {
        if !(MIN_TABLE_SIZE..=MAX_TABLE_SIZE).contains(&self.table_size) {
            return Err(HashVizError::invalid_table_size(self.table_size));
        }
        if self.step_interval_ms > MAX_STEP_INTERVAL_MS {
            return Err(HashVizError::configuration(format!(
                "step_interval_ms must be at most {}",
                MAX_STEP_INTERVAL_MS
            )));
        }
        if self.trace_capacity == 0 {
            return Err(HashVizError::configuration(
                "trace_capacity must be greater than 0",
            ));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.table_size = parse_env_var(&format!("{}TABLE_SIZE", prefix), config.table_size);
        config.primary_expr =
            parse_env_var(&format!("{}PRIMARY_EXPR", prefix), config.primary_expr);
        config.secondary_expr =
            parse_env_var(&format!("{}SECONDARY_EXPR", prefix), config.secondary_expr);
        config.step_interval_ms =
            parse_env_var(&format!("{}STEP_INTERVAL_MS", prefix), config.step_interval_ms);
        config.auto_play = parse_env_bool(&format!("{}AUTO_PLAY", prefix), config.auto_play);
        config.search_termination = parse_env_var(
            &format!("{}SEARCH_TERMINATION", prefix),
            config.search_termination,
        );
        config.initial_mode = parse_env_var(&format!("{}MODE", prefix), config.initial_mode);
        config.trace_capacity =
            parse_env_var(&format!("{}TRACE_CAPACITY", prefix), config.trace_capacity);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            step_interval_ms: 100,
            auto_play: true,
            ..Self::default()
        }
    }

    fn memory_preset() -> Self {
        Self {
            table_size: 7,
            trace_capacity: 128,
            ..Self::default()
        }
    }

    fn realtime_preset() -> Self {
        Self {
            step_interval_ms: 0,
            auto_play: true,
            ..Self::default()
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            HashVizError::configuration(format!("Failed to serialize visualizer config: {}", e))
        })?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            HashVizError::configuration(format!("Failed to parse visualizer config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}

impl VisualizerConfig {
    /// Create a new visualizer configuration builder.
    pub fn builder() -> VisualizerConfigBuilder {
        VisualizerConfigBuilder::new()
    }

    /// Step interval for a speed slider level in `0..=MAX_SPEED_LEVEL`:
    /// `1000 - level * 80`. Higher levels are clamped.
    pub fn speed_to_interval(level: u32) -> u64 {
        1000 - u64::from(level.min(MAX_SPEED_LEVEL)) * 80
    }

    /// Table size from free-form user input.
    ///
    /// Leading digits are read; missing or zero input falls back to
    /// [`DEFAULT_TABLE_SIZE`] and anything smaller than [`MIN_TABLE_SIZE`] is
    /// raised to it. Oversized input is returned as is and rejected later by
    /// [`crate::hash_map::TableState::new`].
    pub fn table_size_from_input(raw: &str) -> usize {
        let raw = raw.trim();
        let (negative, digits) = match raw.as_bytes().first() {
            Some(b'-') => (true, &raw[1..]),
            Some(b'+') => (false, &raw[1..]),
            _ => (false, raw),
        };
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        let value = match digits[..end].parse::<u128>() {
            Ok(0) | Err(_) => return DEFAULT_TABLE_SIZE,
            Ok(_) if negative => return MIN_TABLE_SIZE,
            Ok(v) => usize::try_from(v).unwrap_or(usize::MAX),
        };
        value.max(MIN_TABLE_SIZE)
    }
}

/// Builder for constructing visualizer configurations.
#[derive(Debug, Clone, Default)]
pub struct VisualizerConfigBuilder {
    config: VisualizerConfig,
}

impl VisualizerConfigBuilder {
    /// Create a builder starting from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the table size.
    pub fn table_size(mut self, size: usize) -> Self {
        self.config.table_size = size;
        self
    }

    /// Set the primary hash expression.
    pub fn primary_expr<S: Into<String>>(mut self, expr: S) -> Self {
        self.config.primary_expr = expr.into();
        self
    }

    /// Set the secondary hash expression.
    pub fn secondary_expr<S: Into<String>>(mut self, expr: S) -> Self {
        self.config.secondary_expr = expr.into();
        self
    }

    /// Set the step interval in milliseconds.
    pub fn step_interval_ms(mut self, ms: u64) -> Self {
        self.config.step_interval_ms = ms;
        self
    }

    /// Enable or disable automatic playback.
    pub fn auto_play(mut self, enabled: bool) -> Self {
        self.config.auto_play = enabled;
        self
    }

    /// Set the open-addressing search termination rule.
    pub fn search_termination(mut self, termination: SearchTermination) -> Self {
        self.config.search_termination = termination;
        self
    }

    /// Set the initial mode.
    pub fn initial_mode(mut self, mode: Mode) -> Self {
        self.config.initial_mode = mode;
        self
    }

    /// Set the trace capacity.
    pub fn trace_capacity(mut self, capacity: usize) -> Self {
        self.config.trace_capacity = capacity;
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<VisualizerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
