//! Shared configuration loader for the addex toolchain.
//!
//! `defaults/addex.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files
//! on top of those defaults via [`Loader`] before deserializing into
//! [`AddexConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/addex.default.toml");

/// Top-level configuration consumed by addex applications.
#[derive(Debug, Clone, Deserialize)]
pub struct AddexConfig {
    pub document: DocumentConfig,
    pub context: ContextConfig,
    pub keywords: KeywordConfig,
    pub output: OutputConfig,
    pub chapters: Vec<ChapterMapping>,
}

/// Fixed markers identifying boilerplate and section boundaries in the
/// transcript.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    /// Substring present in every running header/footer line (document id).
    pub id_marker: String,
    /// Document title, the other boilerplate marker.
    pub title: String,
    /// Marker opening the algorithm listing section.
    pub algorithms_list_start: String,
    /// Marker closing the algorithm listing section.
    pub algorithms_list_end: String,
    /// Marker that terminates wrapped-line joining.
    pub reference_marker: String,
    /// Stray leading tokens the OCR pass is known to produce.
    pub leading_artifacts: Vec<String>,
}

/// The implicit-context tables: which bare names denote process-wide state,
/// and which destination folders double as context variants.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    pub globals: Vec<String>,
    pub variant_folders: Vec<String>,
}

/// Block and indentation keyword sets.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordConfig {
    /// First tokens that open a block (drive the nesting counter up).
    pub block_open: Vec<String>,
    /// First token that closes a block.
    pub block_close: String,
    /// First tokens after which the indentation level increases.
    pub indent_open: Vec<String>,
    /// First tokens before which the indentation level decreases.
    pub indent_close: Vec<String>,
}

/// Destination tree parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub root: String,
    pub extension: String,
    pub indent_width: usize,
}

/// One chapter-header to destination-folder mapping.
///
/// Stored as an array of tables rather than a TOML map: the `config` crate
/// lowercases map keys, which would corrupt the header text.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterMapping {
    pub header: String,
    pub folder: String,
}

impl AddexConfig {
    /// Look up the destination folder for an exact chapter-header line.
    pub fn chapter_folder(&self, header: &str) -> Option<&str> {
        self.chapters
            .iter()
            .find(|chapter| chapter.header == header)
            .map(|chapter| chapter.folder.as_str())
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<AddexConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<AddexConfig, ConfigError> {
    Loader::new().build()
}
