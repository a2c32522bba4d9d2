//! Log setup for the `bistro` binary.
//!
//! Filter directives come from `BISTRO_LOG` (same syntax as `RUST_LOG`);
//! without it everything at `info` and above is shown. Logs go to stderr so
//! that reports printed on stdout stay clean.

use std::io::{self, IsTerminal as _};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "BISTRO_LOG";

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(ENV_LOG)
        .from_env_lossy()
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init() {
    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(false)
        .try_init();

    if result.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
