//! Execution of a selected code block.
//!
//! The block's language tag picks one of four backends, which then runs under a single
//! deadline computed at dispatch time:
//!
//! - **shell** (`bash`, `sh`, `shell`): inline command through the first available shell
//! - **script** (`python`, `py`): the configured interpreter over a temporary script file
//! - **reformat** (`json`): pretty-printed in-process
//! - **external** (`sql`): the configured command with the block on stdin
//!
//! # Exit codes
//!
//! Every backend reports through the same [`RunResult`] shape:
//! - `0` on success, or the process's own code when it exits non-zero
//! - `124` when the deadline passed (output so far plus a timeout notice)
//! - `130` when the caller cancelled (output so far plus a cancellation notice)
//! - `1` when the program could not be started or another I/O error occurred
//!
//! # Configuration
//!
//! Tags and the deadline come from [`RunnerSettings`]:
//!
//! ```toml
//! [runner]
//! timeout = 30000  # ms
//!
//! [runner.languages]
//! shell = ["bash", "sh", "shell", "zsh"]
//! ```

pub mod backend;
pub mod external;
pub mod process;
pub mod reformat;
pub mod script;
pub mod shell;

pub use backend::{Backend, LanguageTable};
pub use process::{Deadline, Outcome};

use crate::config::{ExecutionConfig, RunnerSettings};
use crate::error::{Error, Result};
use crate::fence::Block;
use chrono::{DateTime, Local};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// Outcome of running one block, ready for a caller to serialize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    /// Lower-cased language tag of the block
    pub language: String,
    /// Interleaved stdout and stderr, plus any timeout/cancel/error notice
    pub output: String,
    pub exit_code: i32,
    /// When dispatch started
    pub ran_at: DateTime<Local>,
    /// Byte offset just past the block, for placing output after it
    pub block_end: usize,
}

/// Run `block` through the backend its language selects.
///
/// Timeouts and cancellation produce a normal `RunResult` (exit 124 / 130). Errors are
/// reserved for an unsupported language, missing sql configuration, an unparseable
/// command, or a host without any usable shell.
pub async fn execute(
    block: &Block,
    config: &ExecutionConfig,
    settings: &RunnerSettings,
    cancel: &CancellationToken,
) -> Result<RunResult> {
    let backend = Backend::resolve(&block.language, &settings.languages).ok_or_else(|| Error::UnsupportedLanguage {
        language: block.language.clone(),
    })?;

    let ran_at = Local::now();
    let deadline = Deadline::after(settings.timeout());
    log::debug!(
        "Dispatching '{}' block at {:?} to {backend} backend",
        block.language,
        block.range()
    );

    let outcome = match backend {
        Backend::Shell => {
            shell::run(
                &block.code,
                config.shell_path(),
                &settings.windows_shells,
                deadline,
                cancel,
            )
            .await?
        }
        Backend::Script => script::run(&block.code, config.python_interpreter(), deadline, cancel).await,
        Backend::Reformat => reformat::reformat_json(&block.code),
        Backend::External => external::run(&block.code, config.sql_command(), deadline, cancel).await?,
    };

    log::info!(
        "Ran '{}' block with {backend} backend: exit code {}",
        block.language,
        outcome.exit_code
    );

    Ok(RunResult {
        language: block.language.to_lowercase(),
        output: outcome.output,
        exit_code: outcome.exit_code,
        ran_at,
        block_end: block.end,
    })
}
