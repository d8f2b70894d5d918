// SPDX-License-Identifier: MIT
//
// Log file setup. The terminal is in raw mode while the editor runs, so
// tracing output goes to a file: <state dir>/quill/quill.log, or the system
// temp dir where there is no state dir. RUST_LOG overrides the default
// `info` filter. Any failure here just leaves logging off.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "info";

/// The log file path, creating its folder if needed.
fn log_path() -> Option<PathBuf> {
    let dir = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("quill");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join("quill.log"))
}

/// Install the global subscriber. Returns the log path when logging is on.
pub fn init() -> Option<PathBuf> {
    let path = log_path()?;
    let file = File::create(&path).ok()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let layer = fmt::layer().with_writer(Arc::new(file)).with_ansi(false);
    tracing_subscriber::registry().with(filter).with(layer).try_init().ok()?;
    Some(path)
}
