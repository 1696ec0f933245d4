//! Diagnostics go to standard error; standard output carries only the decision.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the `EnvFilter` directives
pub const LOG_ENV: &str = "SKILL_ACTIVATOR_LOG";

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (e.g. in tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}
