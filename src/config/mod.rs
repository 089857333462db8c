//! Configuration APIs for hashviz
//!
//! Every configurable component exposes a type implementing [`Config`]:
//! validation, initialization from environment variables, JSON file
//! persistence and a small set of presets.
//!
//! # Core Configuration Types
//!
//! - [`VisualizerConfig`]: table size, hash expressions, playback speed and
//!   search termination of a visualizer session
//!
//! # Builder Patterns
//!
//! ```rust
//! use hashviz::config::VisualizerConfig;
//! use hashviz::hash_map::Mode;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = VisualizerConfig::builder()
//!     .table_size(11)
//!     .primary_expr("(3 * key + 1) % tableSize")
//!     .initial_mode(Mode::Double)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Preset Configurations
//!
//! ```rust
//! use hashviz::config::{Config, VisualizerConfig};
//!
//! // Fast playback for demonstrations
//! let config = VisualizerConfig::performance_preset();
//!
//! // Small table, short trace
//! let config = VisualizerConfig::memory_preset();
//!
//! // Zero interval: every poll drains the queue
//! let config = VisualizerConfig::realtime_preset();
//! ```
//!
//! # Environment Initialization
//!
//! ```rust
//! use hashviz::config::{Config, VisualizerConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads HASHVIZ_TABLE_SIZE, HASHVIZ_PRIMARY_EXPR, ...
//! let config = VisualizerConfig::from_env()?;
//!
//! // Custom prefix
//! let config = VisualizerConfig::from_env_with_prefix("MYAPP_")?;
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod visualizer;

#[cfg(test)]
mod tests;

pub use visualizer::{VisualizerConfig, VisualizerConfigBuilder};

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, `Err` with details if invalid.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables.
    ///
    /// Environment variables use the format `HASHVIZ_{FIELD}`, for example
    /// `HASHVIZ_TABLE_SIZE=11`.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix("HASHVIZ_")
    }

    /// Initialize configuration from environment variables with a custom prefix.
    ///
    /// Unset or unparsable variables keep their default value.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset favouring fast playback.
    fn performance_preset() -> Self;

    /// Preset favouring a small footprint.
    fn memory_preset() -> Self;

    /// Preset with no delay between steps.
    fn realtime_preset() -> Self;

    /// Balanced preset; the default configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Utility function to parse environment variable with fallback to default.
///
/// # Arguments
///
/// * `var_name` - The environment variable name
/// * `default` - The default value if the variable is unset or unparsable
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Utility function to parse boolean environment variable.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive) as true,
/// everything else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}
