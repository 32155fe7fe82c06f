//! External-command backend: run a configured command with the block on stdin.

use super::process::{Attempt, Deadline, Outcome, supervise};
use crate::error::{Error, Result};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Split a configured command line shell-style into program and arguments.
pub fn parse_command(command_line: &str) -> Result<(String, Vec<String>)> {
    let invalid = |reason: &str| Error::InvalidCommand {
        command: command_line.to_string(),
        reason: reason.to_string(),
    };

    let mut tokens = shlex::split(command_line)
        .ok_or_else(|| invalid("unbalanced quotes or trailing escape"))?
        .into_iter();
    let program = tokens.next().ok_or_else(|| invalid("no program given"))?;
    Ok((program, tokens.collect()))
}

/// The configured command, or `SqlUnsupported` when it is missing or blank.
pub fn require_command(configured: Option<&str>) -> Result<&str> {
    configured
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(Error::SqlUnsupported)
}

/// Run `code` through the configured command. Fails before spawning when no usable command
/// is configured.
pub async fn run(
    code: &str,
    configured: Option<&str>,
    deadline: Deadline,
    cancel: &CancellationToken,
) -> Result<Outcome> {
    let command_line = require_command(configured)?;
    let (program, args) = parse_command(command_line)?;

    let mut command = Command::new(&program);
    command.args(&args);

    Ok(match supervise(command, Some(code), deadline, cancel).await {
        Attempt::Ran(outcome) => outcome,
        Attempt::NotFound(e) | Attempt::LaunchError(e) => {
            Outcome::failure(String::new(), &format!("failed to start {program}: {e}"))
        }
    })
}
