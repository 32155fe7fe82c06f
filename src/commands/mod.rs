//! Command handlers for the runblock CLI.
//!
//! Each subcommand has its own module with a public handler function
//! that `main()` dispatches to.

pub mod blocks;
pub mod run_block;
pub mod version;
