//! Logging setup shared by the `serve`, `collect` and `poll` commands.
//!
//! Logs go to stderr so `collect --json` and `search --json` can keep stdout
//! for data.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Filter applied when neither `--log-level` nor `RUST_LOG` is set.
///
/// The HTTP client and html parser stacks are chatty at debug level.
pub const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn,html5ever=warn,selectors=warn";

/// Initialize the global tracing subscriber.
///
/// # Arguments
/// * `log_level` - Filter directive override (e.g. `"debug"`,
///   `"trendcast_collectors=trace"`); falls back to `RUST_LOG`, then
///   [`DEFAULT_FILTER`]
/// * `no_color` - Disable ANSI colors
///
/// # Example
/// ```no_run
/// use trendcast_core::logging::init_logging;
///
/// init_logging(None, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> AppResult<()> {
    let filter_str = match log_level {
        Some(level) => level.to_string(),
        None => std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
    };

    let env_filter = EnvFilter::try_new(&filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", filter_str, e)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(!no_color && supports_color());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}

/// Color is used only on an interactive stderr without `NO_COLOR`.
fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    std::io::stderr().is_terminal()
}
