//! Logging setup
//!
//! Logs go to stderr so stdout stays clean for the printed records.

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "repoinf=warn";

/// Initialize the global tracing subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: filter directives (default: `repoinf=warn`)
/// - `REPOINF_LOG_FORMAT`: `json` for JSON lines, anything else for pretty output
///
/// # Example
///
/// ```text
/// RUST_LOG=repoinf_core=debug REPOINF_LOG_FORMAT=json repoinf repo .
/// ```
pub fn init_logging() -> Result<()> {
    let log_format = std::env::var("REPOINF_LOG_FORMAT")
        .unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    match log_format.as_str() {
        "json" => {
            // Machine-readable: one JSON object per event
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}
