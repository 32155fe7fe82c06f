//! Exit codes shared by the dispatcher and the `runblock` binary.
//!
//! The dispatcher reports a block's outcome through these values inside a
//! `RunResult`; the binary uses the first three for its own process status.

/// Success - the block (or the command) completed cleanly
pub const SUCCESS: i32 = 0;

/// Generic failure - launch error, I/O error, invalid JSON, or a library error in the CLI
pub const FAILURE: i32 = 1;

/// Usage error - bad flags or arguments
pub const USAGE: i32 = 2;

/// The block ran past its deadline and was killed (same value as GNU `timeout`)
pub const TIMED_OUT: i32 = 124;

/// The caller cancelled the run and the block was killed (128 + SIGINT)
pub const CANCELLED: i32 = 130;

/// Helper functions for consistent exit behavior
pub mod exit {
    use super::{FAILURE, USAGE};

    /// Exit with failure code (1)
    pub fn failure() -> ! {
        std::process::exit(FAILURE);
    }

    /// Exit with usage error code (2)
    pub fn usage() -> ! {
        std::process::exit(USAGE);
    }
}
