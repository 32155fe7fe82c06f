//! Handler for the `blocks` command.

use colored::*;
use std::fs;
use std::path::Path;

use runblock_lib::exit_codes::exit;
use runblock_lib::fence::parse_blocks;

/// Print every fenced block in `file` as a JSON array.
pub fn handle_blocks(file: &Path) {
    let content = fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("{}: Failed to read {}: {e}", "Error".red().bold(), file.display());
        exit::failure();
    });

    let blocks = parse_blocks(&content);
    match serde_json::to_string_pretty(&blocks) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("{}: Failed to serialize blocks: {e}", "Error".red().bold());
            exit::failure();
        }
    }
}
