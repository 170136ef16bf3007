//! Top-level block scanner for stylesheet text.
//!
//! The scanner walks the input once and yields `(header, body)` pairs for every
//! top-level rule. It knows about whitespace, `/* */` comments between rules
//! and brace nesting, and nothing else:
//!
//! ```text
//! outside ──/*──▶ comment ──*/──▶ outside
//!    │
//!    └─ header text ──{──▶ body (depth n) ──}, depth 0──▶ emit, outside
//! ```
//!
//! Malformed input never errors. An unterminated comment, a header with no
//! opening brace, or a body whose braces never balance ends the scan, and
//! whatever follows is dropped.
//!
//! An unbalanced final block is dropped whole. The one-off Python splitter
//! this tool replaces kept it instead, with everything after the opening
//! brace except the last character as its body, so outputs of the two differ
//! for such input.
//!
//! Braces inside quoted strings (`content: "{"`) are counted like any other
//! brace. Stylesheets that rely on that will be cut short.

use crate::types::Block;

const COMMENT_OPEN: &str = "/*";
const COMMENT_CLOSE: &str = "*/";

/// Parse every top-level block in `input`, in source order.
pub fn parse_blocks(input: &str) -> Vec<Block> {
    BlockScanner::new(input).collect()
}

/// Lazy iterator over the top-level blocks of a stylesheet.
pub struct BlockScanner<'a> {
    input: &'a str,
    cursor: usize,
    done: bool,
}

impl<'a> BlockScanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            cursor: 0,
            done: false,
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.input[self.cursor..];
        self.cursor += rest.len() - rest.trim_start().len();
    }

    /// Skips a comment at the cursor. Returns `false` when the comment never closes.
    fn skip_comment(&mut self) -> bool {
        let start = self.cursor + COMMENT_OPEN.len();
        match self.input[start..].find(COMMENT_CLOSE) {
            Some(offset) => {
                self.cursor = start + offset + COMMENT_CLOSE.len();
                true
            }
            None => false,
        }
    }

    fn scan_block(&mut self) -> Option<Block> {
        let bytes = self.input.as_bytes();
        let open = find_opening_brace(bytes, self.cursor)?;
        let close = find_matching_brace(bytes, open)?;

        let header = self.input[self.cursor..open].trim();
        let body = &self.input[open + 1..close];
        self.cursor = close + 1;

        Some(Block::new(header, body))
    }
}

impl<'a> Iterator for BlockScanner<'a> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        if self.done {
            return None;
        }

        loop {
            self.skip_whitespace();
            if self.cursor >= self.input.len() {
                break;
            }

            if self.input[self.cursor..].starts_with(COMMENT_OPEN) {
                if self.skip_comment() {
                    continue;
                }
                break;
            }

            match self.scan_block() {
                Some(block) => return Some(block),
                None => break,
            }
        }

        self.done = true;
        None
    }
}

/// Position of the first `{` at or after `from` that is not escaped with a backslash.
fn find_opening_brace(bytes: &[u8], from: usize) -> Option<usize> {
    let mut escaped = false;
    for (offset, &byte) in bytes[from..].iter().enumerate() {
        match byte {
            b'\\' if !escaped => escaped = true,
            b'{' if !escaped => return Some(from + offset),
            _ => escaped = false,
        }
    }
    None
}

/// Position of the `}` that brings the depth opened at `open` back to zero.
fn find_matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}
