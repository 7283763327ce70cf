//! Log output for the binary.
//!
//! The report goes to stdout, so log lines are written to stderr where they
//! cannot end up inside a redirected report. `RUST_LOG` picks the level.

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Formatting subscriber writing to `writer`, filtered by `filter`.
pub fn subscriber<W>(writer: W, filter: EnvFilter) -> impl tracing::Subscriber + Send + Sync
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .finish()
}

/// Install the stderr subscriber as the global default.
pub fn init() -> Result<(), SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(subscriber(
        std::io::stderr,
        EnvFilter::from_default_env(),
    ))
}
