//! Context-parameter rewriting
//!
//! Once propagation has stabilized, each definition that requires the
//! context parameter gets it threaded explicitly: a typed `this::<Variant>`
//! first parameter on its declaration line, and an untyped `this` first
//! argument at every call site of a context-requiring callee.
//!
//! The pass consumes the immutable scan records plus the converged state
//! map and produces fresh records; nothing is rewritten in place.

use crate::extract::context::ContextState;
use crate::extract::patterns::call_site_pattern;
use crate::extract::registry::{Definition, DefinitionRegistry};
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// First tokens of a declaration line.
const DECLARATION_KEYWORDS: [&str; 3] = ["function", "type", "abstract"];

/// Fatal inconsistencies between a definition and its converged state.
#[derive(Debug, Clone)]
pub enum RewriteError {
    /// Marked as context-requiring but never reached from a variant-typed
    /// caller.
    MissingVariant { name: String },
    /// Carries a variant without requiring the context parameter at all.
    OrphanVariant { name: String },
}

impl fmt::Display for RewriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteError::MissingVariant { name } => write!(
                f,
                "definition `{}` requires a context parameter but no variant was resolved",
                name
            ),
            RewriteError::OrphanVariant { name } => write!(
                f,
                "definition `{}` carries a context variant without requiring a context parameter",
                name
            ),
        }
    }
}

impl std::error::Error for RewriteError {}

/// Check every definition's converged state and produce the rewritten
/// records.
pub fn rewrite(
    registry: &DefinitionRegistry,
    states: &BTreeMap<String, ContextState>,
) -> Result<BTreeMap<String, Definition>, RewriteError> {
    let default_state = ContextState::default();

    // All consistency checks run before any record is produced, so a fatal
    // state never yields partial output.
    for def in registry.definitions() {
        let state = states.get(&def.name).unwrap_or(&default_state);
        if state.variant.is_some() && !state.needs_context {
            return Err(RewriteError::OrphanVariant {
                name: def.name.clone(),
            });
        }
        if state.needs_context && state.variant.is_none() {
            return Err(RewriteError::MissingVariant {
                name: def.name.clone(),
            });
        }
    }

    let mut site_patterns: HashMap<&str, Regex> = HashMap::new();
    let mut rewritten = BTreeMap::new();
    for def in registry.definitions() {
        let state = states.get(&def.name).unwrap_or(&default_state);
        let mut body = def.body.clone();

        if let Some(variant) = state.variant.as_deref() {
            rewrite_declaration(&mut body, &def.name, variant);
        }
        for line in body.iter_mut() {
            for callee in &def.calls {
                let needs = states
                    .get(callee)
                    .map(|s| s.needs_context)
                    .unwrap_or(false);
                if !needs {
                    continue;
                }
                let pattern = site_patterns
                    .entry(callee.as_str())
                    .or_insert_with(|| call_site_pattern(callee));
                *line = rewrite_call_sites(line, callee, pattern);
            }
        }
        rewritten.insert(
            def.name.clone(),
            Definition {
                body,
                ..def.clone()
            },
        );
    }
    Ok(rewritten)
}

/// Insert the typed context parameter into the declaration line: the first
/// body line opening with a declaration keyword and mentioning `name(`.
fn rewrite_declaration(body: &mut [String], name: &str, variant: &str) {
    let open = format!("{}(", name);
    for line in body.iter_mut() {
        let is_declaration = line
            .split_whitespace()
            .next()
            .is_some_and(|first| DECLARATION_KEYWORDS.contains(&first));
        if !is_declaration || !line.contains(&open) {
            continue;
        }
        let replacement = if line.contains(&format!("{}()", name)) {
            // Had no parameters.
            format!("{}(this::{}", name, variant)
        } else {
            // Had existing parameters.
            format!("{}(this::{}, ", name, variant)
        };
        *line = line.replace(&open, &replacement);
        return;
    }
}

/// Rewrite every call site of `callee` in one line to pass `this` first.
///
/// Three site shapes: `callee()` gains the lone argument, `callee( ` splices
/// before the existing space, anything else prepends `this, `.
fn rewrite_call_sites(line: &str, callee: &str, pattern: &Regex) -> String {
    pattern
        .replace_all(line, |caps: &regex::Captures| {
            let site = caps.get(0).map_or("", |m| m.as_str());
            if site.contains("()") {
                site.replace(&format!("{}()", callee), &format!("{}(this)", callee))
            } else if site.contains("( ") {
                site.replace(&format!("{}( ", callee), &format!("{}(this,", callee))
            } else {
                site.replace(&format!("{}(", callee), &format!("{}(this, ", callee))
            }
        })
        .into_owned()
}
