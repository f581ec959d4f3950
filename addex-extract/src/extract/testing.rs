//! Testing utilities
//!
//! Hand-writing transcript fixtures is error-prone: a missing listing entry
//! or a wrong statement number silently changes what the scanner sees, and
//! the test ends up asserting against the wrong input. `TranscriptBuilder`
//! assembles structurally valid transcripts (listing section, chapter
//! headers, declaration headers, numbered statements) so tests only state
//! what differs between cases.

/// Builder for synthetic transcripts in the document's layout.
#[derive(Debug, Default)]
pub struct TranscriptBuilder {
    lines: Vec<String>,
}

impl TranscriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the two listing sections, registering `names` as known
    /// algorithms.
    pub fn listing(mut self, names: &[&str]) -> Self {
        self.lines.push("LIST OF ALGORITHMS".to_string());
        for (idx, name) in names.iter().enumerate() {
            self.lines.push(format!("{} {} {}", idx + 1, name, 10 + idx));
        }
        self.lines.push("LIST OF TYPES".to_string());
        self
    }

    /// Append an exact chapter-header line.
    pub fn chapter(mut self, header: &str) -> Self {
        self.lines.push(header.to_string());
        self
    }

    /// Append an `Algorithm <n> <name>` declaration header.
    pub fn algorithm(mut self, number: usize, name: &str) -> Self {
        self.lines.push(format!("Algorithm {} {}", number, name));
        self
    }

    /// Append a `Type <n> | <name>` declaration header.
    pub fn type_decl(mut self, number: usize, name: &str) -> Self {
        self.lines.push(format!("Type {} | {}", number, name));
        self
    }

    /// Append a run of statements numbered from 1.
    pub fn statements(mut self, statements: &[&str]) -> Self {
        for (idx, statement) in statements.iter().enumerate() {
            self.lines.push(format!("{} {}", idx + 1, statement));
        }
        self
    }

    /// Append one raw line verbatim.
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Append a blank line.
    pub fn blank(mut self) -> Self {
        self.lines.push(String::new());
        self
    }

    pub fn build(self) -> String {
        let mut transcript = self.lines.join("\n");
        transcript.push('\n');
        transcript
    }
}
