// file: src/logging/logger.rs
// version: 1.0.0
// guid: d13f5a72-9e4c-4b08-a6d1-2c7e8b0f4a96

//! Logger initialization and configuration

use crate::error::{Result, UploadError};
use tracing::Instrument;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the filter for the given verbosity; `RUST_LOG` wins when set
fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Initialize the logging system
///
/// Logs go to stderr so the upload tool keeps stdout to itself.
pub fn init_logger(verbose: bool, quiet: bool, json: bool) -> Result<()> {
    let filter = build_filter(verbose, quiet);
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    };

    result.map_err(|e| UploadError::config(format!("Failed to initialize logger: {}", e)))
}

/// Run a future inside an `operation` span
pub async fn with_async_operation_span<F, Fut, R>(operation: &str, f: F) -> R
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = R>,
{
    let span = tracing::info_span!("operation", name = operation);
    f().instrument(span).await
}
