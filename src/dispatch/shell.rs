//! Shell backend: run the block as an inline command through the first shell that exists.

use super::process::{Attempt, Deadline, Outcome, supervise};
use crate::error::{Error, Result};
use std::path::Path;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Extra candidates tried on Windows hosts after `bash` and `sh`
pub const WINDOWS_SHELL_CANDIDATES: &[&str] = &[
    r"C:\Program Files\Git\bin\bash.exe",
    r"C:\Program Files\Git\usr\bin\bash.exe",
    "wsl.exe",
];

/// Ordered, de-duplicated shells to try: the configured one, `bash`, `sh`, then the
/// Windows extras when running on Windows.
pub fn shell_candidates(configured: Option<&str>, windows_shells: &[String]) -> Vec<String> {
    candidates_for_host(configured, windows_shells, cfg!(windows))
}

fn candidates_for_host(configured: Option<&str>, windows_shells: &[String], on_windows: bool) -> Vec<String> {
    let mut raw: Vec<&str> = Vec::with_capacity(3 + windows_shells.len());
    raw.extend(configured);
    raw.extend(["bash", "sh"]);
    if on_windows {
        raw.extend(windows_shells.iter().map(String::as_str));
    }

    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for candidate in raw.into_iter().map(str::trim) {
        if !candidate.is_empty() && !out.iter().any(|seen| seen == candidate) {
            out.push(candidate.to_string());
        }
    }
    out
}

/// Build the invocation for one candidate: `/C` for cmd, `bash -lc` through wsl, `-lc` otherwise.
fn shell_command(shell: &str, code: &str) -> Command {
    let name = Path::new(shell)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(shell)
        .to_lowercase();

    let mut command = Command::new(shell);
    match name.as_str() {
        "wsl.exe" | "wsl" => command.args(["bash", "-lc", code]),
        "cmd.exe" | "cmd" => command.args(["/C", code]),
        _ => command.args(["-lc", code]),
    };
    command
}

/// Run `code` through the first candidate shell that exists.
///
/// Missing shells are skipped silently. The first shell that starts decides the outcome, as
/// does the first launch error that is not "not found".
pub async fn run(
    code: &str,
    configured: Option<&str>,
    windows_shells: &[String],
    deadline: Deadline,
    cancel: &CancellationToken,
) -> Result<Outcome> {
    let candidates = shell_candidates(configured, windows_shells);

    for shell in &candidates {
        match supervise(shell_command(shell, code), None, deadline, cancel).await {
            Attempt::NotFound(e) => {
                log::debug!("Shell candidate '{shell}' not found: {e}");
            }
            Attempt::LaunchError(e) => {
                log::debug!("Shell candidate '{shell}' failed to launch: {e}");
                return Ok(Outcome::failure(String::new(), &e));
            }
            Attempt::Ran(outcome) => {
                log::debug!("Shell '{shell}' exited with {}", outcome.exit_code);
                return Ok(outcome);
            }
        }
    }

    Err(Error::NoShellFound { tried: candidates })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn windows_defaults() -> Vec<String> {
        WINDOWS_SHELL_CANDIDATES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_candidates_configured_first() {
        let candidates = candidates_for_host(Some("/bin/zsh"), &windows_defaults(), false);
        assert_eq!(candidates, vec!["/bin/zsh", "bash", "sh"]);
    }

    #[test]
    fn test_candidates_skip_blank_and_duplicates() {
        assert_eq!(candidates_for_host(Some("  "), &[], false), vec!["bash", "sh"]);
        assert_eq!(candidates_for_host(Some(" bash "), &[], false), vec!["bash", "sh"]);
        assert_eq!(candidates_for_host(None, &[], false), vec!["bash", "sh"]);
    }

    #[test]
    fn test_candidates_windows_extras_only_on_windows() {
        let candidates = candidates_for_host(Some("cmd.exe"), &windows_defaults(), true);
        assert_eq!(
            candidates,
            vec![
                "cmd.exe",
                "bash",
                "sh",
                r"C:\Program Files\Git\bin\bash.exe",
                r"C:\Program Files\Git\usr\bin\bash.exe",
                "wsl.exe",
            ]
        );
    }

    fn argv(command: &Command) -> Vec<String> {
        command
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_invocation_shapes() {
        assert_eq!(argv(&shell_command("bash", "echo hi")), vec!["-lc", "echo hi"]);
        assert_eq!(argv(&shell_command("/usr/bin/zsh", "echo hi")), vec!["-lc", "echo hi"]);
        assert_eq!(argv(&shell_command("CMD.EXE", "dir")), vec!["/C", "dir"]);
        assert_eq!(argv(&shell_command("cmd", "dir")), vec!["/C", "dir"]);
        assert_eq!(argv(&shell_command("wsl.exe", "ls")), vec!["bash", "-lc", "ls"]);
        assert_eq!(argv(&shell_command("WSL", "ls")), vec!["bash", "-lc", "ls"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_configured_shell_falls_through() {
        let outcome = run(
            "echo hi",
            Some("/nonexistent/runblock-shell"),
            &[],
            Deadline::after(Duration::from_secs(10)),
            &CancellationToken::new(),
        )
        .await
        .expect("bash or sh should be available");
        assert_eq!(outcome.exit_code, 0);
        assert!(outcome.output.contains("hi"), "{}", outcome.output);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_failure_does_not_try_next_candidate() {
        let outcome = run(
            "echo first; exit 3",
            Some("sh"),
            &[],
            Deadline::after(Duration::from_secs(10)),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert_eq!(outcome.exit_code, 3);
        assert_eq!(outcome.output.matches("first").count(), 1);
    }
}
