//! Process-wide tracing subscriber for hosts embedding the session.

use tracing_subscriber::{fmt, EnvFilter};

/// Opt-in switch for JSON lines on stderr.
const JSON_ENV: &str = "BEEWALLET_LOG_JSON";

fn json_requested() -> bool {
    std::env::var(JSON_ENV).is_ok_and(|value| value == "1")
}

/// Install the stderr subscriber. `RUST_LOG` overrides the `info` default.
/// A second call leaves the first subscriber in place.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json_requested() {
        builder.json().try_init()
    } else {
        builder.with_target(true).try_init()
    };
    if installed.is_ok() {
        tracing::debug!(json = json_requested(), "logging initialised");
    }
}
