//! Global subscriber setup.

use market_core::error::{MarketError, Result};
use tokio::sync::mpsc::UnboundedSender;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::tracing_layer::{InvocationEvent, InvocationEventLayer};

/// Noisy dependencies kept at `warn` whatever the verbosity.
const QUIET_TARGETS: [&str; 4] = ["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

/// Filter for `-v` occurrences. `RUST_LOG` wins when it is set.
pub fn env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbosity))
}

fn default_filter(verbosity: u8) -> EnvFilter {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    QUIET_TARGETS
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::new(level), EnvFilter::add_directive)
}

/// Installs the global subscriber: human-readable logs on stderr, plus the
/// invocation event stream when `events` is given.
///
/// The event stream is not subject to the verbosity filter.
pub fn init_logging(verbosity: u8, events: Option<UnboundedSender<InvocationEvent>>) -> Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2)
        .with_filter(env_filter(verbosity));

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(events.map(InvocationEventLayer::new))
        .try_init()
        .map_err(|e| MarketError::internal(format!("Failed to initialize logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(0).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(default_filter(1).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(default_filter(2).max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(default_filter(9).max_level_hint(), Some(LevelFilter::TRACE));
    }
}
