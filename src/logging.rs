//! Structured logging on stderr and scoped output suppression.
//!
//! Stdout carries exactly one JSON document, so every diagnostic goes to
//! stderr. A reloadable level gate sits in front of the filter stack;
//! [`suppress`] closes it for the lifetime of the returned guard and the
//! previous level comes back when the guard drops, on every exit path.

use crate::constants::LOG_TARGET;
use crate::error::{ForecastError, Result};
use std::sync::OnceLock;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

static GATE: OnceLock<reload::Handle<LevelFilter, Registry>> = OnceLock::new();

/// Set up structured logging at the given level (`RUST_LOG` wins when set)
pub fn setup_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", LOG_TARGET, log_level)));

    let (gate, handle) = reload::Layer::new(LevelFilter::TRACE);

    tracing_subscriber::registry()
        .with(gate)
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| ForecastError::Configuration {
            message: format!("failed to initialise logging: {}", e),
        })?;

    // A second subscriber cannot be installed, so the first handle is the live one.
    let _ = GATE.set(handle);

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Restores the previous log level when dropped
#[must_use = "output is only suppressed while the guard is alive"]
pub struct SuppressGuard {
    previous: Option<LevelFilter>,
}

/// Silence all log output until the returned guard is dropped.
///
/// A no-op when logging was never initialised.
pub fn suppress() -> SuppressGuard {
    let previous = GATE.get().and_then(|handle| {
        let current = handle.clone_current()?;
        handle.reload(LevelFilter::OFF).ok()?;
        Some(current)
    });

    SuppressGuard { previous }
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        if let (Some(handle), Some(previous)) = (GATE.get(), self.previous.take()) {
            let _ = handle.reload(previous);
        }
    }
}

/// Whether output is currently suppressed
pub fn is_suppressed() -> bool {
    GATE.get()
        .and_then(|handle| handle.clone_current())
        .is_some_and(|level| level == LevelFilter::OFF)
}
