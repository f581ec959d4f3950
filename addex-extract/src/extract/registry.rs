//! Definition records
//!
//! One record per extracted function/type: its identity (name, destination
//! file and folder) is fixed at creation; the body is an ordered list of
//! normalized, indented lines; `calls` holds the other known definitions
//! referenced as calls in the body, with self-references excluded.
//!
//! Records carry no context-parameter state. That lives in a separate state
//! map owned by the propagation pass and is merged back only when the
//! rewriter produces the final records, which keeps the scan output
//! immutable while the analysis iterates.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One extracted function or type body, destined for its own output file.
#[derive(Debug, Clone, Serialize)]
pub struct Definition {
    pub name: String,
    pub file_name: String,
    pub folder: String,
    pub body: Vec<String>,
    pub calls: BTreeSet<String>,
}

impl Definition {
    /// Build a record, dropping any self-reference from the call set.
    pub fn new(
        name: String,
        file_name: String,
        folder: String,
        body: Vec<String>,
        mut calls: BTreeSet<String>,
    ) -> Self {
        calls.remove(&name);
        Self {
            name,
            file_name,
            folder,
            body,
            calls,
        }
    }

    /// True when any body line already references the explicit receiver.
    pub fn references_receiver(&self) -> bool {
        self.body.iter().any(|line| line.contains("this."))
    }
}

/// All records of one run, keyed by definition name, plus the known-name
/// list captured from the transcript's listing section.
#[derive(Debug, Default, Serialize)]
pub struct DefinitionRegistry {
    definitions: BTreeMap<String, Definition>,
    known_names: Vec<String>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a name from the listing section. Duplicates are ignored.
    pub fn register_known_name(&mut self, name: &str) {
        if !self.known_names.iter().any(|known| known == name) {
            self.known_names.push(name.to_string());
        }
    }

    pub fn known_names(&self) -> &[String] {
        &self.known_names
    }

    pub fn insert(&mut self, definition: Definition) {
        self.definitions.insert(definition.name.clone(), definition);
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
