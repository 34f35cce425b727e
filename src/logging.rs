use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

use crate::error::{CatalogError, Result};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; `default_filter` applies when it is unset.
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .try_init()
        .map_err(|e| CatalogError::Task(format!("failed to initialize tracing: {e}")))
}
