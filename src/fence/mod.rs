//! Fenced code block discovery.
//!
//! [`parse_blocks`] scans a document for backtick or tilde fences and returns every
//! terminated block with its byte ranges; [`pick_block`] chooses the one a cursor refers to.
//!
//! ```
//! use runblock_lib::fence::{parse_blocks, pick_block};
//!
//! let doc = "notes\n```sh\necho hi\n```\n";
//! let blocks = parse_blocks(doc);
//! let block = pick_block(&blocks, 0).unwrap();
//! assert_eq!(block.language, "sh");
//! assert_eq!(block.code, "echo hi");
//! ```

pub mod parser;
pub mod selector;

pub use parser::parse_blocks;
pub use selector::pick_block;

use serde::Serialize;
use std::ops::Range;

/// One fenced region of a document.
///
/// `start..end` covers both fence lines (including the closing line's newline, when present);
/// `code_start..code_end` covers only the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    /// Language tag exactly as written after the opening fence (may be empty).
    pub language: String,
    /// Body text with one trailing newline removed and CRLF folded to LF.
    pub code: String,
    pub start: usize,
    pub end: usize,
    pub code_start: usize,
    pub code_end: usize,
    /// The fence character used (` or ~).
    pub fence_char: char,
    /// Length of the opening fence (3 or more).
    pub fence_length: usize,
}

impl Block {
    /// Whether `cursor` falls within the whole fenced region, inclusive on both ends.
    pub fn contains(&self, cursor: usize) -> bool {
        (self.start..=self.end).contains(&cursor)
    }

    /// Distance from the opening fence to `cursor`.
    pub fn distance_from(&self, cursor: usize) -> usize {
        self.start.abs_diff(cursor)
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn code_range(&self) -> Range<usize> {
        self.code_start..self.code_end
    }
}
