//! Tracing subscriber setup.
//!
//! The interactive UI owns stderr, so its logs go to a file. `--print` mode
//! leaves the terminal alone and logs to stderr instead.
//!
//! The level comes from `RUST_LOG` and defaults to `info`:
//!
//! ```bash
//! RUST_LOG=texrev=debug,texrev_core=debug texrev main.tex fixed.tex
//! ```

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Appends log records to `path`, creating the file if needed.
pub fn init_file(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(create_env_filter()?)
        .try_init()
        .map_err(io::Error::other)
}

pub fn init_stderr() -> io::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(create_env_filter()?)
        .try_init()
        .map_err(io::Error::other)
}

fn create_env_filter() -> io::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(io::Error::other)
}
