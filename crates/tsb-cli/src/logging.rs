use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. `log_level` is used as the
/// `EnvFilter` default when `RUST_LOG` is unset; `json` switches to
/// structured (newline-delimited JSON) output for log aggregation.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
