//! Enum reconciliation.
//!
//! PostgreSQL cannot drop a type while columns use it, and cannot remove or
//! reorder enum elements in place. Redefined enums are therefore recreated,
//! bracketed by casting every referencing column to varchar beforehand and
//! back to the enum afterwards.

use std::collections::BTreeMap;

use crate::catalog::enum_type::EnumType;
use crate::catalog::object::SchemaObject;
use crate::catalog::selectable::Selectable;
use crate::diff::{differences, differences_with};
use crate::statements::Statements;

/// Statements reconciling every modified enum with the modified tables
/// whose columns reference one: pre-casts, recreations, post-casts, in
/// that order.
pub fn enum_modifications(
    tables_from: &BTreeMap<String, Selectable>,
    tables_target: &BTreeMap<String, Selectable>,
    enums_from: &BTreeMap<String, EnumType>,
    enums_target: &BTreeMap<String, EnumType>,
) -> Statements {
    let enums_modified = differences(enums_from, enums_target).modified;
    let tables_modified = differences(tables_from, tables_target).modified;

    let mut pre = Statements::new();
    let mut recreate = Statements::new();
    let mut post = Statements::new();

    for (key, after) in &tables_modified {
        let Some(before) = tables_from.get(key) else {
            continue;
        };
        let before_columns = before.columns_by_name();
        let after_columns = after.columns_by_name();
        let columns_modified =
            differences_with(&before_columns, &after_columns, |a, b| a == b).modified;

        for (name, column) in &columns_modified {
            let Some(before_column) = before_columns.get(name) else {
                continue;
            };
            if column.is_enum
                && column.is_enum == before_column.is_enum
                && column.dbtypestr == before_column.dbtypestr
                && column.enum_definition() != before_column.enum_definition()
            {
                let table = after.quoted_identity();
                pre.push(before_column.change_enum_to_string_statement(&table));
                post.push(before_column.change_string_to_enum_statement(&table));
            }
        }
    }

    for e in enums_modified.values() {
        recreate.push(e.drop_statement());
        recreate.push(e.create_statement());
    }

    pre.extend(recreate);
    pre.extend(post);
    pre
}
