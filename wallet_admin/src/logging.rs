//! Structured logging configuration.
//!
//! The store library logs through the `log` facade; the subscriber installed
//! here picks those records up alongside the CLI's own `tracing` events.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Commands slower than this are reported at warn level
const SLOW_COMMAND_MS: u64 = 1000;

/// Initialize structured logging
///
/// Log levels are configurable via the `RUST_LOG` env var. Output goes to
/// stderr so stdout carries only command results.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::debug!("Structured logging initialized");
}

/// Log the outcome and duration of a CLI command
///
/// # Arguments
///
/// * `command` - Command name
/// * `duration_ms` - Duration in milliseconds
/// * `succeeded` - Whether the command returned successfully
pub fn log_command(command: &str, duration_ms: u64, succeeded: bool) {
    if !succeeded {
        tracing::error!(
            command = command,
            duration_ms = duration_ms,
            "Command failed"
        );
    } else if duration_ms > SLOW_COMMAND_MS {
        tracing::warn!(
            command = command,
            duration_ms = duration_ms,
            "PERFORMANCE: Slow command"
        );
    } else {
        tracing::info!(
            command = command,
            duration_ms = duration_ms,
            "Command completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_command() {
        // Just ensure it doesn't panic without a subscriber
        log_command("stats", 12, true);
        log_command("demo", 2500, true);
        log_command("adjust", 3, false);
    }
}
