//! The ordered statement emitter.
//!
//! Drops and creations are released by fixpoint iteration: an object may be
//! dropped once no dependent of it is still waiting to be dropped, and
//! created once everything it depends on has been created. Without
//! dependency ordering a single pass in key order suffices. A pass that
//! releases nothing while work remains means the dependency graph has a
//! cycle, which is an error.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::catalog::object::SchemaObject;
use crate::changes::ChangeFlags;
use crate::diff::differences;
use crate::error::MigrationError;
use crate::statements::Statements;

/// Diff two keyed snapshots of one category and emit the statements.
pub fn statements_for_changes<T: SchemaObject>(
    from: &BTreeMap<String, T>,
    target: &BTreeMap<String, T>,
    flags: ChangeFlags,
) -> Result<Statements, MigrationError> {
    let diff = differences(from, target);
    statements_from_differences(
        &diff.added,
        &diff.removed,
        &diff.modified,
        &BTreeSet::new(),
        from,
        flags,
    )
}

/// Emit statements for pre-partitioned diff results.
///
/// `replaceable` keys are modified objects migrated by their creation
/// statement alone; their drop is suppressed. `old` is the source snapshot,
/// used to resolve the drop statement of modified objects.
///
/// Within one iteration the order is observable and fixed: removals first,
/// then additions, then modifications (each drop immediately followed by
/// the eligible create), all in key order.
pub fn statements_from_differences<T: SchemaObject>(
    added: &BTreeMap<String, &T>,
    removed: &BTreeMap<String, &T>,
    modified: &BTreeMap<String, &T>,
    replaceable: &BTreeSet<String>,
    old: &BTreeMap<String, T>,
    flags: ChangeFlags,
) -> Result<Statements, MigrationError> {
    let mut pending_drops: BTreeSet<String> = BTreeSet::new();
    if !flags.creations_only {
        pending_drops.extend(removed.keys().cloned());
        if flags.modifications {
            pending_drops.extend(
                modified
                    .keys()
                    .filter(|k| !replaceable.contains(*k))
                    .cloned(),
            );
        }
    }

    let mut pending_creations: BTreeSet<String> = BTreeSet::new();
    if !flags.drops_only {
        pending_creations.extend(added.keys().cloned());
        if flags.modifications {
            pending_creations.extend(modified.keys().cloned());
        }
    }

    let mut statements = Statements::new();
    loop {
        let before = pending_drops.len() + pending_creations.len();

        if !flags.creations_only {
            for (key, v) in removed {
                if has_remaining_dependents(*v, &pending_drops, flags) {
                    continue;
                }
                if pending_drops.remove(key) {
                    statements.push(drop_form(old, key, *v).drop_statement());
                }
            }
        }

        if !flags.drops_only {
            for (key, v) in added {
                if has_uncreated_dependencies(*v, &pending_creations, flags) {
                    continue;
                }
                if pending_creations.remove(key) {
                    statements.push(v.create_statement());
                }
            }
        }

        if flags.modifications {
            for (key, v) in modified {
                if !flags.creations_only
                    && !has_remaining_dependents(*v, &pending_drops, flags)
                    && pending_drops.remove(key)
                {
                    statements.push(drop_form(old, key, *v).drop_statement());
                }
                if !flags.drops_only
                    && !has_uncreated_dependencies(*v, &pending_creations, flags)
                    && pending_creations.remove(key)
                {
                    statements.push(v.create_statement());
                }
            }
        }

        let after = pending_drops.len() + pending_creations.len();
        if after == 0 {
            break;
        }
        if after == before {
            let pending: Vec<String> = pending_drops
                .union(&pending_creations)
                .cloned()
                .collect();
            return Err(MigrationError::DependencyCycle { pending });
        }
        trace!(pending = after, "dependency ordering pass");
    }

    Ok(statements)
}

fn drop_form<'a, T: SchemaObject>(
    old: &'a BTreeMap<String, T>,
    key: &str,
    fallback: &'a T,
) -> &'a T {
    old.get(key).unwrap_or(fallback)
}

fn has_remaining_dependents<T: SchemaObject>(
    v: &T,
    pending_drops: &BTreeSet<String>,
    flags: ChangeFlags,
) -> bool {
    flags.dependency_ordering && v.dependents().iter().any(|d| pending_drops.contains(d))
}

fn has_uncreated_dependencies<T: SchemaObject>(
    v: &T,
    pending_creations: &BTreeSet<String>,
    flags: ChangeFlags,
) -> bool {
    flags.dependency_ordering
        && v.dependent_on()
            .iter()
            .any(|d| pending_creations.contains(d))
}
