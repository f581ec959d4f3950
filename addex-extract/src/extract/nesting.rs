//! Block-keyword nesting counter
//!
//! A signed counter driven by the first token of each statement line:
//! block-opening keywords increment, the closing keyword decrements. The
//! scanner closes a definition when the counter returns to zero. A negative
//! counter means the transcript closed a block that was never opened, which
//! aborts the run.

use addex_config::KeywordConfig;
use std::fmt;

/// Fatal nesting failure.
#[derive(Debug, Clone)]
pub enum NestingError {
    /// A close keyword appeared with no block open.
    Underflow { line: String },
}

impl fmt::Display for NestingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestingError::Underflow { line } => {
                write!(f, "block nesting underflow at line: {}", line.trim())
            }
        }
    }
}

impl std::error::Error for NestingError {}

/// Tracks block nesting depth across the lines of one definition.
#[derive(Debug)]
pub struct NestingCounter {
    depth: i32,
    open_keywords: Vec<String>,
    close_keyword: String,
}

impl NestingCounter {
    pub fn new(keywords: &KeywordConfig) -> Self {
        Self {
            depth: 0,
            open_keywords: keywords.block_open.clone(),
            close_keyword: keywords.block_close.clone(),
        }
    }

    /// Update the depth from one statement line and return the new depth.
    pub fn observe(&mut self, line: &str) -> Result<i32, NestingError> {
        if let Some(first) = line.split_whitespace().next() {
            if self.open_keywords.iter().any(|kw| kw == first) {
                self.depth += 1;
            } else if first == self.close_keyword {
                self.depth -= 1;
                if self.depth < 0 {
                    return Err(NestingError::Underflow {
                        line: line.to_string(),
                    });
                }
            }
        }
        Ok(self.depth)
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// True when every opened block has been closed.
    pub fn is_balanced(&self) -> bool {
        self.depth == 0
    }

    pub fn reset(&mut self) {
        self.depth = 0;
    }
}
