//! Interpreter-script backend: write the block to a temporary file and run the interpreter on it.

use super::process::{Attempt, Deadline, Outcome, supervise};
use std::io::{self, Write};
use tempfile::TempPath;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

const SCRIPT_PREFIX: &str = "runblock-";
const SCRIPT_SUFFIX: &str = ".py";

/// Write `code` to a fresh temporary `.py` file. The file is closed; dropping the
/// returned path removes it.
fn write_script(code: &str) -> io::Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix(SCRIPT_PREFIX)
        .suffix(SCRIPT_SUFFIX)
        .tempfile()?;
    file.write_all(code.as_bytes())?;
    file.flush()?;
    Ok(file.into_temp_path())
}

/// Run `code` with `interpreter`, passing the temporary script path as the only argument.
pub async fn run(code: &str, interpreter: &str, deadline: Deadline, cancel: &CancellationToken) -> Outcome {
    let script = match write_script(code) {
        Ok(path) => path,
        Err(e) => return Outcome::failure(String::new(), &format!("failed to write script: {e}")),
    };
    log::debug!("Wrote script to {}", script.display());

    let mut command = Command::new(interpreter);
    command.arg(&*script);

    let outcome = match supervise(command, None, deadline, cancel).await {
        Attempt::Ran(outcome) => outcome,
        Attempt::NotFound(e) | Attempt::LaunchError(e) => {
            Outcome::failure(String::new(), &format!("failed to start {interpreter}: {e}"))
        }
    };

    if let Err(e) = script.close() {
        log::warn!("Failed to remove temporary script: {e}");
    }
    outcome
}
