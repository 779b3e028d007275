//! Tracing subscriber setup.
//!
//! `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=projector_switch=trace`.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter used when `RUST_LOG` is unset or invalid.
pub fn default_filter() -> String {
    let level = if cfg!(debug_assertions) { "debug" } else { "info" };
    format!("warn,projector_switch={level}")
}

/// Install the global subscriber. Call once, before the first log line.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact();

    // A second call (tests, re-entry) keeps the first subscriber.
    if tracing_subscriber::registry().with(filter).with(layer).try_init().is_err() {
        return;
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting projector switch");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_quiets_dependencies() {
        let filter = default_filter();
        assert!(filter.starts_with("warn,projector_switch="));
        assert!(filter.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn init_twice_is_harmless() {
        init();
        init();
    }
}
