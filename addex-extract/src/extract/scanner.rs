//! Boundary scanner
//!
//! Walks the transcript line by line and segments it into chapters and
//! individual definition bodies despite pagination artifacts. The scanner
//! carries the per-walk state (active folder, listing-section flag, open
//! definition buffers, nesting and indentation counters) as locals of the
//! scan loop and returns everything in the registry; nothing survives the
//! call as process-wide state.
//!
//! Wrapped continuations are rejoined by looking ahead to the next numbered
//! or blank line, and lines the pagination merged together are split back
//! apart at the next sequential statement number. Inside an open definition
//! only numbered statement lines contribute to the body; anything else was
//! either already joined as a continuation or is garbage.

use crate::extract::indentation::{IndentError, Indenter};
use crate::extract::nesting::{NestingCounter, NestingError};
use crate::extract::normalize::Normalizer;
use crate::extract::patterns::{self, CallDetector, LineShape};
use crate::extract::registry::{Definition, DefinitionRegistry};
use addex_config::AddexConfig;
use std::collections::BTreeSet;
use std::fmt;

/// Fatal structural failure during the scan.
#[derive(Debug, Clone)]
pub enum ScanError {
    Nesting(NestingError),
    Indentation(IndentError),
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Nesting(err) => write!(f, "{}", err),
            ScanError::Indentation(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<NestingError> for ScanError {
    fn from(err: NestingError) -> Self {
        ScanError::Nesting(err)
    }
}

impl From<IndentError> for ScanError {
    fn from(err: IndentError) -> Self {
        ScanError::Indentation(err)
    }
}

/// The transcript walker. One instance scans one transcript.
pub struct Scanner<'a> {
    config: &'a AddexConfig,
    normalizer: Normalizer,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a AddexConfig) -> Self {
        Self {
            config,
            normalizer: Normalizer::new(config),
        }
    }

    /// Scan the full transcript and build the definition registry.
    ///
    /// A definition still open at end of input never produced a close event;
    /// its buffered lines are dropped without diagnostic.
    pub fn scan(&self, source: &str) -> Result<DefinitionRegistry, ScanError> {
        let lines = repair_carriage_returns(source.lines());

        let mut registry = DefinitionRegistry::new();
        let mut detector = CallDetector::new();
        let mut in_listing = false;
        let mut folder = String::new();
        let mut pending_name: Option<String> = None;
        let mut open = false;
        let mut body: Vec<String> = Vec::new();
        let mut calls: BTreeSet<String> = BTreeSet::new();
        let mut nesting = NestingCounter::new(&self.config.keywords);
        let mut indenter = Indenter::new(&self.config.keywords, self.config.output.indent_width);

        for (idx, line) in lines.iter().enumerate() {
            // Listing entries overlap with numbered statements, so they are
            // matched ahead of the shape table, only while the section is
            // active.
            if in_listing {
                if let Some(name) = patterns::listing_entry_name(line) {
                    registry.register_known_name(name);
                    detector.register(name);
                    continue;
                }
            }

            match patterns::classify(line, self.config) {
                LineShape::Boilerplate => continue,
                LineShape::ListingStart => in_listing = true,
                LineShape::ListingEnd => in_listing = false,
                LineShape::ChapterHeader { folder: mapped } => {
                    folder = mapped.to_string();
                }
                LineShape::AlgorithmHeader { name } | LineShape::TypeHeader { name } => {
                    pending_name = Some(name.to_string());
                }
                LineShape::DefinitionStart => {
                    open = true;
                    body.clear();
                    calls.clear();
                    nesting.reset();
                    indenter.reset();
                }
                LineShape::Blank | LineShape::Statement => {}
            }

            if open && !patterns::is_blank(line) {
                let continuations = gather_continuations(&lines, idx);
                let joined = self.join_wrapped(line, &continuations);
                for segment in split_merged(&joined) {
                    let cleaned = self.normalizer.normalize(&segment);
                    nesting.observe(&cleaned)?;
                    let indented = indenter.apply(&cleaned)?;
                    for callee in detector.calls_in(&indented) {
                        calls.insert(callee.to_string());
                    }
                    body.push(indented);
                }
            }

            if open && nesting.is_balanced() && !body.is_empty() {
                open = false;
                match pending_name.take() {
                    Some(name) => {
                        let file_name = format!("{}{}", name, self.config.output.extension);
                        tracing::debug!(%name, %folder, "definition closed");
                        registry.insert(Definition::new(
                            name,
                            file_name,
                            folder.clone(),
                            std::mem::take(&mut body),
                            std::mem::take(&mut calls),
                        ));
                    }
                    None => {
                        tracing::warn!(
                            lines = body.len(),
                            "definition closed with no declaration header; dropped"
                        );
                        body.clear();
                        calls.clear();
                    }
                }
                nesting.reset();
                indenter.reset();
            }
        }

        if open {
            tracing::debug!(
                lines = body.len(),
                "transcript ended inside an open definition; buffered lines dropped"
            );
        }
        Ok(registry)
    }

    /// Join wrapped continuations onto a numbered statement line.
    ///
    /// Lines containing the close keyword never join (a wrapped `end` does
    /// not occur); boilerplate or a reference marker in the look-ahead stops
    /// the join.
    fn join_wrapped(&self, line: &str, continuations: &[&str]) -> String {
        let words: Vec<&str> = line.split_whitespace().collect();
        let first_is_number = words
            .first()
            .is_some_and(|w| w.chars().all(|c| c.is_ascii_digit()));
        if !first_is_number || words.iter().any(|w| *w == self.config.keywords.block_close) {
            return line.to_string();
        }

        let mut joined = line.trim_end_matches('\n').to_string();
        for continuation in continuations {
            if patterns::is_boilerplate(continuation, self.config)
                || continuation.contains(&self.config.document.reference_marker)
            {
                return joined;
            }
            let starts_with_number = continuation
                .split_whitespace()
                .next()
                .is_some_and(|w| w.chars().all(|c| c.is_ascii_digit()));
            if !starts_with_number {
                joined.push(' ');
                joined.push_str(continuation.trim());
            }
        }
        joined
    }
}

/// Rejoin lines the paste step broke with a bare carriage return between
/// non-space text.
fn repair_carriage_returns<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    lines
        .map(|line| {
            let broken = line
                .as_bytes()
                .windows(3)
                .any(|w| !w[0].is_ascii_whitespace() && w[1] == b'\r' && !w[2].is_ascii_whitespace());
            if broken {
                line.split('\r')
                    .collect::<Vec<_>>()
                    .join(" ")
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// Collect the immediately following lines up to the next blank line or the
/// next line whose first token is numeric.
fn gather_continuations<'a>(lines: &'a [String], idx: usize) -> Vec<&'a str> {
    let mut collected = Vec::new();
    for line in &lines[idx + 1..] {
        let Some(first) = line.split_whitespace().next() else {
            break;
        };
        if first.chars().all(|c| c.is_ascii_digit()) {
            break;
        }
        collected.push(line.as_str());
    }
    collected
}

/// Split a line the pagination merged back into one statement per numbered
/// segment.
///
/// The first token must be a statement number N; if the token `N+1` appears
/// mid-line the line is cut there (and again at `N+2`, and so on). A line
/// whose first token is not numeric contributes nothing.
fn split_merged(line: &str) -> Vec<String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = words.first() else {
        return Vec::new();
    };
    let Ok(number) = first.parse::<u64>() else {
        return Vec::new();
    };

    let mut expected = (number + 1).to_string();
    if !words.iter().any(|w| *w == expected) {
        return vec![line.to_string()];
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    for word in &words {
        if **word == expected {
            segments.push(current);
            current = (*word).to_string();
            expected = (expected.parse::<u64>().unwrap() + 1).to_string();
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    segments.push(current);
    segments
}
