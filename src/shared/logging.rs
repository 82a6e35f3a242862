use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber, filtered by `RUST_LOG` (default
/// `info`). Safe to call more than once.
pub fn init_tracing() {
  let _ = tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    )
    .try_init();
}
