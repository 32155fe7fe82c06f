//! JSON reformat backend. Runs in-process; nothing is spawned.

use super::process::Outcome;
use crate::exit_codes::FAILURE;

/// Pretty-print `code` as JSON with two-space indentation and object keys sorted at every level.
///
/// A parse error becomes the output with exit code 1.
pub fn reformat_json(code: &str) -> Outcome {
    let pretty = serde_json::from_str::<serde_json::Value>(code).and_then(|mut value| {
        value.sort_all_objects();
        serde_json::to_string_pretty(&value)
    });
    match pretty {
        Ok(text) => Outcome::success(text),
        Err(e) => Outcome::exited(e.to_string(), FAILURE),
    }
}
