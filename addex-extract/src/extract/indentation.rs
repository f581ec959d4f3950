//! Indentation engine
//!
//! Leading whitespace is recomputed for every emitted line from block
//! structure alone; whatever indentation the transcript carried is
//! discarded. Close keywords dedent before the line is padded, open
//! keywords indent after, so `else`/`elseif` sit at the level of their
//! `if`. A negative level aborts the run.

use addex_config::KeywordConfig;
use std::fmt;

/// Fatal indentation failure.
#[derive(Debug, Clone)]
pub enum IndentError {
    /// Dedent below column zero.
    Underflow { line: String },
}

impl fmt::Display for IndentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndentError::Underflow { line } => {
                write!(f, "indentation underflow at line: {}", line.trim())
            }
        }
    }
}

impl std::error::Error for IndentError {}

/// Tracks the indentation level, in columns, across one definition.
#[derive(Debug)]
pub struct Indenter {
    level: i32,
    width: i32,
    open_keywords: Vec<String>,
    close_keywords: Vec<String>,
}

impl Indenter {
    pub fn new(keywords: &KeywordConfig, width: usize) -> Self {
        Self {
            level: 0,
            width: width as i32,
            open_keywords: keywords.indent_open.clone(),
            close_keywords: keywords.indent_close.clone(),
        }
    }

    /// Strip the line's own leading whitespace and pad it to the current
    /// level, updating the level from the line's first token.
    pub fn apply(&mut self, line: &str) -> Result<String, IndentError> {
        let line = line.trim();
        let first = line.split_whitespace().next();

        if let Some(first) = first {
            if self.close_keywords.iter().any(|kw| kw == first) {
                self.level -= self.width;
            }
        }

        let padded = if self.level > 0 {
            format!("{}{}", " ".repeat(self.level as usize), line)
        } else {
            line.to_string()
        };

        if let Some(first) = first {
            if self.open_keywords.iter().any(|kw| kw == first) {
                self.level += self.width;
            }
        }

        if self.level < 0 {
            return Err(IndentError::Underflow {
                line: line.to_string(),
            });
        }
        Ok(padded)
    }

    pub fn reset(&mut self) {
        self.level = 0;
    }
}
