//! Extraction pipeline
//!
//! `Extraction` loads a transcript from a file or string and runs the three
//! stages in order: scan, context propagation, rewrite. All fatal conditions
//! surface as an [`ExtractError`] before any output exists, so a failed run
//! never leaves a partially rewritten registry behind.

use crate::extract::context::{self, ContextState, PropagationError};
use crate::extract::registry::{Definition, DefinitionRegistry};
use crate::extract::rewrite::{self, RewriteError};
use crate::extract::scanner::{ScanError, Scanner};
use addex_config::AddexConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Any failure of the extraction run.
#[derive(Debug)]
pub enum ExtractError {
    /// IO error when reading the transcript.
    Io(String),
    Scan(ScanError),
    Propagation(PropagationError),
    Rewrite(RewriteError),
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::Io(msg) => write!(f, "IO error: {}", msg),
            ExtractError::Scan(err) => write!(f, "scan error: {}", err),
            ExtractError::Propagation(err) => write!(f, "propagation error: {}", err),
            ExtractError::Rewrite(err) => write!(f, "rewrite error: {}", err),
        }
    }
}

impl std::error::Error for ExtractError {}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Io(err.to_string())
    }
}

impl From<ScanError> for ExtractError {
    fn from(err: ScanError) -> Self {
        ExtractError::Scan(err)
    }
}

impl From<PropagationError> for ExtractError {
    fn from(err: PropagationError) -> Self {
        ExtractError::Propagation(err)
    }
}

impl From<RewriteError> for ExtractError {
    fn from(err: RewriteError) -> Self {
        ExtractError::Rewrite(err)
    }
}

/// Final result of a run: the rewritten records ready for emission, plus
/// the converged per-definition context state.
#[derive(Debug, Serialize)]
pub struct ExtractionOutput {
    pub definitions: BTreeMap<String, Definition>,
    pub states: BTreeMap<String, ContextState>,
}

/// Transcript loader and stage runner.
///
/// The transcript is read fully into memory before the forward scan begins;
/// the scanner needs line-list random access for its look-ahead.
pub struct Extraction {
    source: String,
    config: AddexConfig,
}

impl Extraction {
    /// Load a transcript from a UTF-8 text file.
    pub fn from_path(path: impl AsRef<Path>, config: AddexConfig) -> Result<Self, ExtractError> {
        let source = fs::read_to_string(path)?;
        Ok(Self { source, config })
    }

    /// Use an in-memory transcript.
    pub fn from_string(source: impl Into<String>, config: AddexConfig) -> Self {
        Self {
            source: source.into(),
            config,
        }
    }

    /// Run scan, propagation and rewrite, in that order.
    pub fn run(self) -> Result<ExtractionOutput, ExtractError> {
        let registry = Scanner::new(&self.config).scan(&self.source)?;
        tracing::info!(
            definitions = registry.len(),
            known_names = registry.known_names().len(),
            "scan complete"
        );

        let mut states = context::seed_states(&registry, &self.config.context.variant_folders);
        let passes = context::propagate(&registry, &mut states)?;
        tracing::info!(passes, "context propagation converged");

        let definitions = rewrite::rewrite(&registry, &states)?;
        Ok(ExtractionOutput {
            definitions,
            states,
        })
    }
}
