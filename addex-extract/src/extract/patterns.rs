//! Recognized line shapes
//!
//! Every line shape the scanner reacts to is defined here as a named pattern
//! with a small accessor, so the recognized set is enumerable and testable in
//! one place instead of being scattered through the scan loop.
//!
//! Listing entries (`<number> <word> <number>`) overlap with ordinary
//! numbered statement lines, so [`listing_entry_name`] is not part of
//! [`classify`]: the scanner consults it only while the algorithm-listing
//! section is active.

use addex_config::AddexConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// `<number> <word> <number>` — an entry inside the algorithm listing.
static LISTING_ENTRY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\s+\w+\s+\d+").unwrap());

/// `Algorithm <number> <identifier>` declaration header.
static ALGORITHM_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Algorithm\s+\d+\s+\w+").unwrap());

/// `Type <number> | <identifier>` declaration header.
static TYPE_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Type\s+\d+\s+\|\s+\w+").unwrap());

/// `1 function|type|abstract ...` — the first numbered statement of a definition.
static DEFINITION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*1\s+(function|type|abstract)").unwrap());

/// Blank or whitespace-only line.
static BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").unwrap());

/// Context-free classification of a transcript line.
///
/// Shapes are tried in the order the scanner acts on them; the first match
/// wins. Anything unrecognized is a [`LineShape::Statement`], which the
/// scanner passes through or ignores depending on whether a definition is
/// open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineShape<'a> {
    /// Running header/footer boilerplate, always skipped.
    Boilerplate,
    /// Marker opening the algorithm listing section.
    ListingStart,
    /// Marker closing the algorithm listing section.
    ListingEnd,
    /// Exact chapter-header line; carries the destination folder.
    ChapterHeader { folder: &'a str },
    /// `Algorithm <n> <identifier>` header; carries the identifier.
    AlgorithmHeader { name: &'a str },
    /// `Type <n> | <identifier>` header; carries the identifier.
    TypeHeader { name: &'a str },
    /// First numbered statement of a new definition.
    DefinitionStart,
    /// Whitespace-only line.
    Blank,
    /// Any other line.
    Statement,
}

/// Classify one raw transcript line against the fixed shape table.
pub fn classify<'a>(line: &'a str, config: &'a AddexConfig) -> LineShape<'a> {
    if is_boilerplate(line, config) {
        return LineShape::Boilerplate;
    }
    if line.contains(&config.document.algorithms_list_start) {
        return LineShape::ListingStart;
    }
    if line.contains(&config.document.algorithms_list_end) {
        return LineShape::ListingEnd;
    }
    if let Some(folder) = config.chapter_folder(line.trim_end()) {
        return LineShape::ChapterHeader { folder };
    }
    if ALGORITHM_HEADER.is_match(line) {
        if let Some(name) = line.split_whitespace().nth(2) {
            return LineShape::AlgorithmHeader { name };
        }
    }
    if TYPE_HEADER.is_match(line) {
        if let Some(name) = line.split_whitespace().nth(3) {
            return LineShape::TypeHeader { name };
        }
    }
    if DEFINITION_START.is_match(line) {
        return LineShape::DefinitionStart;
    }
    if BLANK.is_match(line) {
        return LineShape::Blank;
    }
    LineShape::Statement
}

/// True for running header/footer lines (document id or title).
pub fn is_boilerplate(line: &str, config: &AddexConfig) -> bool {
    line.contains(&config.document.id_marker) || line.contains(&config.document.title)
}

/// The definition name recorded by a listing entry, if the line is one.
pub fn listing_entry_name(line: &str) -> Option<&str> {
    if LISTING_ENTRY.is_match(line) {
        line.split_whitespace().nth(1)
    } else {
        None
    }
}

/// True when the line is whitespace-only.
pub fn is_blank(line: &str) -> bool {
    BLANK.is_match(line)
}

/// Pattern matching a call of `name`: the name followed directly by `(`,
/// preceded by start-of-line, whitespace, or any character other than a word
/// character, `:` or `{`. The prefix restriction avoids matching substrings
/// of longer identifiers, type annotations and declaration braces.
fn call_pattern(name: &str) -> Regex {
    Regex::new(&format!(r"(?:^|\s|[^\w:{{]){}\(", regex::escape(name))).unwrap()
}

/// Like [`call_pattern`] but also consuming trailing whitespace and closing
/// parens, so a call-site rewrite can distinguish empty argument lists.
pub fn call_site_pattern(name: &str) -> Regex {
    Regex::new(&format!(r"(?:^|\s|[^\w:{{]){}\(\s*\)*", regex::escape(name))).unwrap()
}

/// Compiled call patterns for every known definition name.
///
/// Names arrive one by one while the scanner reads the listing section;
/// each gets its pattern compiled once on registration.
#[derive(Debug, Default)]
pub struct CallDetector {
    patterns: HashMap<String, Regex>,
}

impl CallDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known definition name. Re-registering is a no-op.
    pub fn register(&mut self, name: &str) {
        if !self.patterns.contains_key(name) {
            self.patterns.insert(name.to_string(), call_pattern(name));
        }
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    /// Names of all registered definitions called in `line`.
    pub fn calls_in<'a>(&'a self, line: &str) -> Vec<&'a str> {
        self.patterns
            .iter()
            .filter(|(_, pattern)| pattern.is_match(line))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addex_config::load_defaults;

    #[test]
    fn test_classify_headers_and_markers() {
        let config = load_defaults().unwrap();
        assert_eq!(
            classify("LIST OF ALGORITHMS", &config),
            LineShape::ListingStart
        );
        assert_eq!(classify("LIST OF TYPES", &config), LineShape::ListingEnd);
        assert_eq!(
            classify("2 Surveillance and Tracking Module Description", &config),
            LineShape::ChapterHeader { folder: "STM" }
        );
        assert_eq!(
            classify("Algorithm 12 TrackScore", &config),
            LineShape::AlgorithmHeader { name: "TrackScore" }
        );
        assert_eq!(
            classify("Type 3 | SensorReport", &config),
            LineShape::TypeHeader {
                name: "SensorReport"
            }
        );
        assert_eq!(
            classify("  1 function TrackScore()", &config),
            LineShape::DefinitionStart
        );
        assert_eq!(classify("   ", &config), LineShape::Blank);
        assert_eq!(classify("5 x = y + 1", &config), LineShape::Statement);
    }

    #[test]
    fn test_boilerplate_beats_everything() {
        let config = load_defaults().unwrap();
        assert_eq!(
            classify("ACAS_ADU_18_001 page 12", &config),
            LineShape::Boilerplate
        );
        assert_eq!(
            classify("Algorithm Design Description v4", &config),
            LineShape::Boilerplate
        );
    }

    #[test]
    fn test_listing_entry_shape() {
        assert_eq!(listing_entry_name("12 TrackScore 234"), Some("TrackScore"));
        assert_eq!(listing_entry_name("TrackScore 234"), None);
        assert_eq!(listing_entry_name("12 TrackScore"), None);
    }

    #[test]
    fn test_call_detection_requires_open_paren() {
        let mut detector = CallDetector::new();
        detector.register("TrackScore");
        assert_eq!(detector.calls_in("x = TrackScore(t)"), vec!["TrackScore"]);
        assert!(detector.calls_in("x = TrackScore + 1").is_empty());
        // Substring of a longer identifier is not a call.
        assert!(detector.calls_in("x = MyTrackScore(t)").is_empty());
        // Type annotation and declaration-brace prefixes are not calls.
        assert!(detector.calls_in("x::TrackScore(t)").is_empty());
        assert!(detector.calls_in("{TrackScore(t)").is_empty());
    }

    #[test]
    fn test_call_detected_at_line_start() {
        let mut detector = CallDetector::new();
        detector.register("Reset");
        assert_eq!(detector.calls_in("Reset()"), vec!["Reset"]);
    }
}
