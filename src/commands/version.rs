//! Handler for the `version` command.

/// Print version information as JSON.
pub fn handle_version() {
    let info = serde_json::json!({ "version": env!("CARGO_PKG_VERSION") });
    println!("{info}");
}
