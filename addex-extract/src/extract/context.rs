//! Context-parameter propagation
//!
//! After the registry is built, a fixed-point iteration over its call graph
//! decides which definitions require the implicit context parameter and
//! which concrete variant each one resolves to. Three monotone rules apply
//! per (caller, callee) edge:
//!
//!   - a caller of a context-requiring definition requires context itself;
//!   - a caller with no variant inherits its callee's variant;
//!   - a context-requiring callee with no variant inherits its caller's.
//!
//! Each rule only ever sets a previously-unset field on a finite node set,
//! so the iteration terminates, is idempotent once converged, and reaches
//! the same fixed point regardless of edge visitation order within a pass.

use crate::extract::registry::DefinitionRegistry;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Mutable per-definition analysis state, kept apart from the immutable
/// [`Definition`](crate::extract::registry::Definition) records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextState {
    /// This definition requires the implicit context parameter.
    pub needs_context: bool,
    /// Which concrete context shape the parameter resolves to, once known.
    pub variant: Option<String>,
}

/// Fatal propagation-input failures.
#[derive(Debug, Clone)]
pub enum PropagationError {
    EmptyRegistry,
    NoKnownNames,
}

impl fmt::Display for PropagationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropagationError::EmptyRegistry => {
                write!(f, "context propagation invoked with an empty definition registry")
            }
            PropagationError::NoKnownNames => {
                write!(f, "context propagation invoked with an empty known-name list")
            }
        }
    }
}

impl std::error::Error for PropagationError {}

/// Seed the state map from the immutable records.
///
/// A definition needs context when its body already references the explicit
/// receiver (the normalizer injects it for global and `params` accesses);
/// its variant seeds from the destination folder when that folder is one of
/// the configured variant folders.
pub fn seed_states(
    registry: &DefinitionRegistry,
    variant_folders: &[String],
) -> BTreeMap<String, ContextState> {
    registry
        .definitions()
        .map(|def| {
            let needs_context = def.references_receiver();
            let variant = if needs_context && variant_folders.iter().any(|f| f == &def.folder) {
                Some(def.folder.clone())
            } else {
                None
            };
            (
                def.name.clone(),
                ContextState {
                    needs_context,
                    variant,
                },
            )
        })
        .collect()
}

/// Run the fixed-point iteration, mutating `states` in place.
///
/// Only definitions named in the known-name set participate as callers;
/// edges to names with no extracted record are skipped. Returns the number
/// of full passes, counting the final all-quiet one.
pub fn propagate(
    registry: &DefinitionRegistry,
    states: &mut BTreeMap<String, ContextState>,
) -> Result<usize, PropagationError> {
    if registry.is_empty() {
        return Err(PropagationError::EmptyRegistry);
    }
    if registry.known_names().is_empty() {
        return Err(PropagationError::NoKnownNames);
    }

    let mut passes = 0;
    loop {
        passes += 1;
        let mut changes = 0;
        for caller_name in registry.known_names() {
            let Some(caller_def) = registry.get(caller_name) else {
                continue;
            };
            for callee_name in &caller_def.calls {
                if !states.contains_key(callee_name) {
                    continue;
                }
                let callee = states[callee_name].clone();
                let caller = states
                    .get_mut(caller_name)
                    .expect("every extracted definition is seeded");
                // Requirement and variant flow upward through the edge.
                if callee.needs_context && !caller.needs_context {
                    caller.needs_context = true;
                    changes += 1;
                }
                if callee.variant.is_some() && caller.variant.is_none() {
                    caller.variant = callee.variant.clone();
                    changes += 1;
                }
                // A resolved caller pins its context-requiring callees.
                let caller_variant = caller.variant.clone();
                if let Some(variant) = caller_variant {
                    let callee = states
                        .get_mut(callee_name)
                        .expect("presence checked above");
                    if callee.needs_context && callee.variant.is_none() {
                        callee.variant = Some(variant);
                        changes += 1;
                    }
                }
            }
        }
        tracing::debug!(pass = passes, changes, "context propagation pass");
        if changes == 0 {
            break;
        }
    }
    Ok(passes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::registry::Definition;

    fn definition(name: &str, folder: &str, body: &[&str], calls: &[&str]) -> Definition {
        Definition::new(
            name.to_string(),
            format!("{}.jl", name),
            folder.to_string(),
            body.iter().map(|l| l.to_string()).collect(),
            calls.iter().map(|c| c.to_string()).collect(),
        )
    }

    fn variant_folders() -> Vec<String> {
        vec!["STM".to_string(), "TRM".to_string()]
    }

    #[test]
    fn test_seeding_requires_receiver_and_variant_folder() {
        let mut registry = DefinitionRegistry::new();
        registry.insert(definition("A", "STM", &["x = this.params[\"a\"]"], &[]));
        registry.insert(definition("B", "MathUtilities", &["x = this.own.psi"], &[]));
        registry.insert(definition("C", "STM", &["x = 1"], &[]));

        let states = seed_states(&registry, &variant_folders());
        assert_eq!(states["A"].variant.as_deref(), Some("STM"));
        assert!(states["B"].needs_context);
        assert_eq!(states["B"].variant, None);
        assert_eq!(states["C"], ContextState::default());
    }

    #[test]
    fn test_requirement_and_variant_flow_upward() {
        let mut registry = DefinitionRegistry::new();
        registry.insert(definition("A", "MathUtilities", &["B()"], &["B"]));
        registry.insert(definition("B", "STM", &["x = this.target_db"], &[]));
        registry.register_known_name("A");
        registry.register_known_name("B");

        let mut states = seed_states(&registry, &variant_folders());
        propagate(&registry, &mut states).unwrap();
        assert!(states["A"].needs_context);
        assert_eq!(states["A"].variant.as_deref(), Some("STM"));
    }

    #[test]
    fn test_variant_flows_downward_to_requiring_callee() {
        let mut registry = DefinitionRegistry::new();
        // A is resolved to TRM; B needs context but sits in a neutral folder.
        registry.insert(definition(
            "A",
            "TRM",
            &["x = this.modecIntervals", "B()"],
            &["B"],
        ));
        registry.insert(definition("B", "MathUtilities", &["y = this.own.alt"], &[]));
        registry.register_known_name("A");
        registry.register_known_name("B");

        let mut states = seed_states(&registry, &variant_folders());
        propagate(&registry, &mut states).unwrap();
        assert_eq!(states["B"].variant.as_deref(), Some("TRM"));
    }

    #[test]
    fn test_propagation_is_idempotent() {
        let mut registry = DefinitionRegistry::new();
        registry.insert(definition("A", "MathUtilities", &["B()"], &["B"]));
        registry.insert(definition("B", "STM", &["x = this.target_db"], &[]));
        registry.register_known_name("A");
        registry.register_known_name("B");

        let mut states = seed_states(&registry, &variant_folders());
        propagate(&registry, &mut states).unwrap();
        let converged = states.clone();
        let passes = propagate(&registry, &mut states).unwrap();
        assert_eq!(passes, 1);
        assert_eq!(states, converged);
    }

    #[test]
    fn test_missing_inputs_are_fatal() {
        let registry = DefinitionRegistry::new();
        let mut states = BTreeMap::new();
        assert!(matches!(
            propagate(&registry, &mut states),
            Err(PropagationError::EmptyRegistry)
        ));

        let mut registry = DefinitionRegistry::new();
        registry.insert(definition("A", "STM", &["x = 1"], &[]));
        let mut states = seed_states(&registry, &variant_folders());
        assert!(matches!(
            propagate(&registry, &mut states),
            Err(PropagationError::NoKnownNames)
        ));
    }

    #[test]
    fn test_listed_but_never_extracted_callee_is_skipped() {
        let mut registry = DefinitionRegistry::new();
        registry.insert(definition("A", "STM", &["Ghost()"], &["Ghost"]));
        registry.register_known_name("A");
        registry.register_known_name("Ghost");

        let mut states = seed_states(&registry, &variant_folders());
        propagate(&registry, &mut states).unwrap();
        assert!(!states.contains_key("Ghost"));
        assert!(!states["A"].needs_context);
    }
}
