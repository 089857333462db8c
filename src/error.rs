//! Error handling for the hashviz library
//!
//! This module provides the error type shared by the expression compiler, the
//! table store, the playback scheduler and the configuration layer.
//!
//! Note that the normal terminal outcomes of an operation (a key that is not
//! found, an insertion that runs out of slots) are *not* errors. They are
//! reported as actions and outcomes; see [`crate::presentation::OutcomeKind`].

use thiserror::Error;

/// Main error type for the hashviz library
#[derive(Error, Debug)]
pub enum HashVizError {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A hash expression could not be parsed or did not evaluate to a finite number
    #[error("Invalid hash expression '{expression}': {message}")]
    InvalidExpression {
        /// The expression as supplied by the caller
        expression: String,
        /// What went wrong
        message: String,
    },

    /// Key input that is missing or not an integer
    #[error("Invalid key input '{input}': {message}")]
    InvalidKey {
        /// Raw input text
        input: String,
        /// What went wrong
        message: String,
    },

    /// Table size outside the supported range
    #[error("Invalid table size {size}: must be between {min} and {max}")]
    InvalidTableSize {
        /// The rejected size
        size: usize,
        /// Smallest accepted size
        min: usize,
        /// Largest accepted size
        max: usize,
    },

    /// Index out of bounds access
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// Attempt to place a key into a slot that already holds one
    #[error("Slot {index} is already occupied by key {occupant}")]
    SlotOccupied {
        /// Slot index
        index: usize,
        /// Key currently stored in the slot
        occupant: i64,
    },

    /// A mutation addressed a table of the wrong shape (bucket vs. slot)
    #[error("Mutation {mutation} does not apply to {mode} table")]
    ModeMismatch {
        /// Mode name
        mode: &'static str,
        /// Mutation name
        mutation: &'static str,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl HashVizError {
    /// Create an invalid expression error
    pub fn invalid_expression<E: Into<String>, S: Into<String>>(expression: E, message: S) -> Self {
        Self::InvalidExpression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create an invalid key error
    pub fn invalid_key<I: Into<String>, S: Into<String>>(input: I, message: S) -> Self {
        Self::InvalidKey {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create an invalid table size error
    pub fn invalid_table_size(size: usize) -> Self {
        Self::InvalidTableSize {
            size,
            min: crate::hash_map::MIN_TABLE_SIZE,
            max: crate::hash_map::MAX_TABLE_SIZE,
        }
    }

    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create a slot occupied error
    pub fn slot_occupied(index: usize, occupant: i64) -> Self {
        Self::SlotOccupied { index, occupant }
    }

    /// Create a mode mismatch error
    pub fn mode_mismatch(mode: &'static str, mutation: &'static str) -> Self {
        Self::ModeMismatch { mode, mutation }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Expression errors are recovered locally by falling back to the default
    /// hash function; everything else is reported to the caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::InvalidExpression { .. } => true,
            Self::InvalidKey { .. } => false,
            Self::InvalidTableSize { .. } => false,
            Self::OutOfBounds { .. } => false,
            Self::SlotOccupied { .. } => false,
            Self::ModeMismatch { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::InvalidExpression { .. } => "compilation",
            Self::InvalidKey { .. } => "validation",
            Self::InvalidTableSize { .. } => "validation",
            Self::OutOfBounds { .. } => "bounds",
            Self::SlotOccupied { .. } => "state",
            Self::ModeMismatch { .. } => "state",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, HashVizError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(HashVizError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}
