//! Per-line textual cleanup
//!
//! Each raw transcript line passes through a fixed sequence of rules: page
//! references and line numbers are stripped, OCR/encoding artifacts
//! repaired, the `params.<field>...` idiom rewritten into string-keyed
//! mapping access on an explicit `this` receiver, and bare occurrences of
//! the global-context names qualified with `this.`. An empty return value
//! means the line is dropped.
//!
//! The rules are stateless; nesting and indentation are tracked by the
//! caller.

use addex_config::AddexConfig;
use once_cell::sync::Lazy;
use regex::Regex;

static PAGE_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(p\. \d+\)").unwrap());
static PAGE_REF_APPENDIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(p\. E-\d+\)").unwrap());
static LEADING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+").unwrap());
static BLANK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*$").unwrap());
static TRAILING_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-\s*$").unwrap());
static UNDERSCORE_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"_-\s*").unwrap());
/// Greedy `[...]` index suffix on a field name.
static INDEX_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*\]").unwrap());

/// The explicit receiver injected for implicit global/context accesses.
const RECEIVER: &str = "this";

/// Line normalizer configured with the document's artifact tokens and
/// global-context names.
#[derive(Debug)]
pub struct Normalizer {
    /// `^<token>\s*` patterns for known stray leading tokens.
    artifact_patterns: Vec<Regex>,
    /// `global <name>` declaration texts whose lines are elided.
    global_declarations: Vec<String>,
    /// Bare-occurrence pattern per global-context name, with the preceding
    /// character captured. A name preceded by `.`, a word character or `"`
    /// is already qualified (or is a string key) and is left alone.
    global_patterns: Vec<(String, Regex)>,
}

impl Normalizer {
    pub fn new(config: &AddexConfig) -> Self {
        let artifact_patterns = config
            .document
            .leading_artifacts
            .iter()
            .map(|token| Regex::new(&format!(r"^{}\s*", regex::escape(token))).unwrap())
            .collect();
        let global_declarations = config
            .context
            .globals
            .iter()
            .map(|name| format!("global {}", name))
            .collect();
        let global_patterns = config
            .context
            .globals
            .iter()
            .map(|name| {
                let pattern = Regex::new(&format!(r#"([^.\w"]){}"#, regex::escape(name))).unwrap();
                (name.clone(), pattern)
            })
            .collect();
        Self {
            artifact_patterns,
            global_declarations,
            global_patterns,
        }
    }

    /// Apply the full rule sequence to one raw line.
    ///
    /// Returns the cleaned line, or an empty string when the line is to be
    /// dropped (blank after cleanup, or a global declaration).
    pub fn normalize(&self, line: &str) -> String {
        // Page-reference tags and leading numbering.
        let mut line = PAGE_REF.replace_all(line, "").into_owned();
        line = PAGE_REF_APPENDIX.replace_all(&line, "").into_owned();
        line = LEADING_NUMBER.replace(&line, "").into_owned();
        for pattern in &self.artifact_patterns {
            line = pattern.replace(&line, "").into_owned();
        }
        if BLANK.is_match(&line) {
            line.clear();
        }
        // Encoding artifacts: UTF-8 mojibake and cp1252 stragglers.
        line = line.replace("â€™", "'");
        line = line.replace('\u{0092}', "'");
        line = line.replace('\u{0091}', "'");
        line = line.replace('\u{0094}', "'");
        line = line.replace("if(", "if (");
        // Dash artifacts.
        line = TRAILING_DASH.replace(&line, "").into_owned();
        line = UNDERSCORE_DASH.replace_all(&line, "_").into_owned();
        // Global declarations are elided; the registry entry is implicit.
        if self
            .global_declarations
            .iter()
            .any(|decl| line.contains(decl))
        {
            line.clear();
        }
        line = rewrite_params_access(&line);
        line = self.qualify_globals(&line);
        collapse_bracket_spacing(&line)
    }

    /// Rule 8: qualify bare global-context names with the receiver.
    fn qualify_globals(&self, line: &str) -> String {
        let mut line = line.to_string();
        for (name, pattern) in &self.global_patterns {
            line = pattern
                .replace_all(&line, |caps: &regex::Captures| {
                    format!("{}{}.{}", &caps[1], RECEIVER, name)
                })
                .into_owned();
        }
        line
    }
}

/// Rule 7: rewrite the `params` idiom into string-keyed mapping access.
///
/// `params.<f1>.<f2>...` becomes `this.params["<f1>"]["<f2>"]...`; an
/// explicit `params()` call with no field chain (or immediately followed by
/// `,`) becomes the bare `this.params`. `[...]` index suffixes pass through
/// unchanged, and a trailing `;` inside the chain is preserved. A `)` closing
/// the chain lies outside the replaced span and survives on its own.
fn rewrite_params_access(line: &str) -> String {
    // The chained form is normalized to a call form first so both spellings
    // share one rewrite path.
    let line = line.replace("params.", "params().");
    let Some(idx) = line.find("params()") else {
        return line;
    };
    let after = &line[idx + "params()".len()..];
    let chain = after.split(')').next().unwrap_or("");
    let fields = chain.trim_matches('.');
    if after.starts_with(',') || fields.is_empty() {
        return line.replace("params()", "this.params");
    }
    let mut replacement = String::from("this.params");
    for field in fields.split('.') {
        let field = field.trim_start_matches(',').trim();
        if let Some(suffix) = INDEX_SUFFIX.find(field) {
            let name = field.replace(suffix.as_str(), "");
            replacement.push_str(&format!("[\"{}\"]", name));
            replacement.push_str(suffix.as_str());
        } else if field.contains(';') {
            let name = field.trim_end_matches(';').trim_end();
            replacement.push_str(&format!("[\"{}\"];", name));
        } else {
            replacement.push_str(&format!("[\"{}\"]", field));
        }
    }
    let target = format!("params(){}", chain);
    line.replace(&target, &replacement)
}

/// Rule 9: collapse spaces inside parens. Idempotent.
fn collapse_bracket_spacing(line: &str) -> String {
    line.replace("( ", "(").replace(" )", ")")
}
