//! Handler for the `run-block` command.

use colored::*;
use std::path::Path;
use std::time::Duration;

use runblock_lib::config::Config;
use runblock_lib::exit_codes::exit;
use runblock_lib::{CancellationToken, RunResult};

/// Run the block under the cursor and print its `RunResult` as JSON.
///
/// The block's own failure is part of the JSON; only errors that prevent a result
/// (missing file, unsupported language, no shell) exit non-zero.
pub fn handle_run_block(file: &Path, cursor: usize, config_path: Option<&Path>, timeout_ms: Option<u64>) {
    let (config, source) = Config::load(config_path).unwrap_or_else(|e| {
        eprintln!("{}: {e}", "Error".red().bold());
        exit::failure();
    });
    log::debug!("Using configuration from {}", source.display());

    let mut settings = config.runner;
    if let Some(ms) = timeout_ms {
        settings = settings.with_timeout(Duration::from_millis(ms));
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("{}: Failed to create Tokio runtime: {}", "Error".red().bold(), e);
        exit::failure();
    });

    let result = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let watcher = tokio::spawn(cancel_on_interrupt(cancel.clone()));
        let result = runblock_lib::run(file, cursor, &config.runblock, &settings, &cancel).await;
        watcher.abort();
        result
    });

    match result {
        Ok(result) => print_result(&result),
        Err(e) => {
            eprintln!("{}: run-block: {e}", "Error".red().bold());
            exit::failure();
        }
    }
}

fn print_result(result: &RunResult) {
    match serde_json::to_string_pretty(result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("{}: Failed to serialize result: {e}", "Error".red().bold());
            exit::failure();
        }
    }
}

/// Cancel `cancel` on Ctrl-C (and SIGTERM on unix).
async fn cancel_on_interrupt(cancel: CancellationToken) {
    if wait_for_interrupt().await {
        log::warn!("Interrupt received; cancelling block");
        cancel.cancel();
    }
}

#[cfg(unix)]
async fn wait_for_interrupt() -> bool {
    use tokio::signal::unix::{SignalKind, signal};

    let Ok(mut terminate) = signal(SignalKind::terminate()) else {
        return tokio::signal::ctrl_c().await.is_ok();
    };
    tokio::select! {
        res = tokio::signal::ctrl_c() => res.is_ok(),
        Some(()) = terminate.recv() => true,
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> bool {
    tokio::signal::ctrl_c().await.is_ok()
}
