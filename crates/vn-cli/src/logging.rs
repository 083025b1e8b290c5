use tracing_subscriber::EnvFilter;

pub(crate) const LOG_ENV: &str = "VN_LOG";

/// Installs the stderr subscriber. `fallback` applies when `VN_LOG` is unset
/// or unparsable. Later calls are no-ops.
pub(crate) fn init_tracing(fallback: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
