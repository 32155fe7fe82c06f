//! Locate the fenced code block under a cursor and execute it.
//!
//! The pipeline is: read the document, [`fence::parse_blocks`], [`fence::pick_block`] with the
//! cursor, then [`dispatch::execute`] the chosen block under a deadline and a caller-owned
//! cancellation token.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod exit_codes;
pub mod fence;

pub use crate::config::{Config, ExecutionConfig, RunnerSettings};
pub use crate::dispatch::{Backend, RunResult, execute};
pub use crate::error::{Error, Result};
pub use crate::fence::{Block, parse_blocks, pick_block};
pub use tokio_util::sync::CancellationToken;

use std::path::Path;

/// Read `path`, pick the block nearest `cursor` (a byte offset), and run it.
pub async fn run(
    path: impl AsRef<Path>,
    cursor: usize,
    config: &ExecutionConfig,
    settings: &RunnerSettings,
    cancel: &CancellationToken,
) -> Result<RunResult> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let path = path.as_ref();
    let text = tokio::fs::read_to_string(path).await.map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    run_text(&text, cursor, config, settings, cancel).await
}

/// Same as [`run`] for a document that is already in memory.
pub async fn run_text(
    text: &str,
    cursor: usize,
    config: &ExecutionConfig,
    settings: &RunnerSettings,
    cancel: &CancellationToken,
) -> Result<RunResult> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }

    let blocks = parse_blocks(text);
    if blocks.is_empty() {
        return Err(Error::NoBlockFound);
    }
    let block = pick_block(&blocks, cursor).ok_or(Error::NoBlockSelectable)?;
    execute(block, config, settings, cancel).await
}

/// Blocking wrapper around [`run`] for callers without a Tokio runtime.
pub fn run_blocking(
    path: impl AsRef<Path>,
    cursor: usize,
    config: &ExecutionConfig,
    settings: &RunnerSettings,
    cancel: &CancellationToken,
) -> Result<RunResult> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|source| Error::ExecutionFailure { source })?;
    runtime.block_on(run(path, cursor, config, settings, cancel))
}
