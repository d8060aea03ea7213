use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "friendly_chat_lib=info";

/// Install the global fmt subscriber. `RUST_LOG` wins over `filter`; later calls are no-ops.
pub fn init_logging(filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.unwrap_or(DEFAULT_LOG_FILTER)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init();
}
