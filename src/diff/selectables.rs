//! Combined reconciliation of tables, views, materialized views, and
//! functions.
//!
//! Two dependency-ordered phases bracket the table work: everything that
//! must disappear (dropped or rebuilt views/functions) goes first, table
//! alterations happen in the middle, and creations come last. Modified
//! objects that can overwrite their old form in place keep their drop
//! suppressed; everything else propagates to its transitive dependents,
//! which are rebuilt even when unchanged themselves.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::catalog::enum_type::EnumType;
use crate::catalog::object::SchemaObject;
use crate::catalog::selectable::{RelationKind, Selectable};
use crate::changes::ChangeFlags;
use crate::diff::differences;
use crate::diff::emitter::statements_from_differences;
use crate::diff::tables::table_changes;
use crate::error::MigrationError;
use crate::statements::Statements;

/// Statements reconciling the full selectable graph.
pub fn selectable_changes(
    selectables_from: &BTreeMap<String, Selectable>,
    selectables_target: &BTreeMap<String, Selectable>,
    enums_from: &BTreeMap<String, EnumType>,
    enums_target: &BTreeMap<String, EnumType>,
    add_dependents_for_modified: bool,
) -> Result<Statements, MigrationError> {
    let tables_from = filter_selectables(selectables_from, true);
    let tables_target = filter_selectables(selectables_target, true);
    let other_from = filter_selectables(selectables_from, false);
    let other_target = filter_selectables(selectables_target, false);

    let table_diff = differences(&tables_from, &tables_target);
    let other_diff = differences(&other_from, &other_target);

    let added_other = other_diff.added;
    let removed_other = other_diff.removed;
    let mut modified_other = other_diff.modified;
    let mut unmodified_other = other_diff.unmodified;

    let mut replaceable: BTreeSet<String> = BTreeSet::new();
    let mut not_replaceable: BTreeSet<String> = BTreeSet::new();

    if add_dependents_for_modified {
        let mut changed_all: BTreeMap<String, &Selectable> = BTreeMap::new();
        changed_all.extend(table_diff.modified.iter().map(|(k, v)| (k.clone(), *v)));
        changed_all.extend(modified_other.iter().map(|(k, v)| (k.clone(), *v)));
        let modified_keys: BTreeSet<String> = changed_all.keys().cloned().collect();
        changed_all.extend(table_diff.removed.iter().map(|(k, v)| (k.clone(), *v)));
        changed_all.extend(removed_other.iter().map(|(k, v)| (k.clone(), *v)));

        for (key, changed) in &changed_all {
            let Some(old) = selectables_from.get(key) else {
                continue;
            };

            if modified_keys.contains(key) && changed.can_replace(old) {
                if !changed.is_table() {
                    replaceable.insert(key.clone());
                }
                continue;
            }

            for dependent in changed.dependents_all() {
                if let Some(promoted) = unmodified_other.remove(dependent) {
                    debug!("rebuilding {} because {} changed", dependent, key);
                    modified_other.insert(dependent.clone(), promoted);
                }
                not_replaceable.insert(dependent.clone());
            }
        }
    }

    replaceable = replaceable.difference(&not_replaceable).cloned().collect();

    let mut statements = Statements::new();

    statements.extend(statements_from_differences(
        &added_other,
        &removed_other,
        &modified_other,
        &replaceable,
        selectables_from,
        ChangeFlags {
            drops_only: true,
            dependency_ordering: true,
            ..ChangeFlags::default()
        },
    )?);

    statements.extend(table_changes(
        &tables_from,
        &tables_target,
        enums_from,
        enums_target,
    ));

    let has_function_changes = added_other
        .values()
        .chain(modified_other.values())
        .any(|v| v.relationtype == RelationKind::Function);
    if has_function_changes {
        // Functions may reference peers created later in the same phase.
        statements.push("SET check_function_bodies = off;");
    }

    statements.extend(statements_from_differences(
        &added_other,
        &removed_other,
        &modified_other,
        &replaceable,
        selectables_from,
        ChangeFlags {
            creations_only: true,
            dependency_ordering: true,
            ..ChangeFlags::default()
        },
    )?);

    Ok(statements)
}

fn filter_selectables(
    selectables: &BTreeMap<String, Selectable>,
    tables: bool,
) -> BTreeMap<String, Selectable> {
    selectables
        .iter()
        .filter(|(_, v)| v.is_table() == tables)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
