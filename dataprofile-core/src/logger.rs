use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber writing to stderr. `RUST_LOG` takes precedence over
/// the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let registry = tracing_subscriber::registry().with(filter_layer);
    if config.json {
        registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(true)
                    .json(),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .init();
    }
}
