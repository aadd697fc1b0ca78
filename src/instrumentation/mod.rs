pub mod logger;

pub use logger::{summary, InteractionKind, InteractionLog, Outcome};

use tracing_subscriber::EnvFilter;

/// Logs go to stderr so rendered output on stdout stays clean.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
