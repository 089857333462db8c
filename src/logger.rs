//! Process-wide logger setup for the binary and demos.

use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

/// Install the process-wide logger.
///
/// Defaults to `info` with millisecond timestamps; `RUST_LOG` overrides.
/// Safe to call repeatedly.
pub fn initialize_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();

        builder
            .filter_level(LevelFilter::Info)
            .filter_module("hashviz::playback", LevelFilter::Info)
            .filter_module("hashviz::hash_map", LevelFilter::Info)
            .format_timestamp_millis()
            .parse_default_env();

        // Another logger may already be installed by the host.
        let _ = builder.try_init();
    });
}
