//! Table reconciliation: removals, additions, enum coordination, and
//! column-level alterations for modified tables.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::enum_type::EnumType;
use crate::catalog::object::SchemaObject;
use crate::catalog::selectable::Selectable;
use crate::diff::enums::enum_modifications;
use crate::diff::{differences, differences_with};
use crate::statements::Statements;

/// Statements turning `tables_from` into `tables_target`.
///
/// Removed tables are dropped and added tables created in key order; the
/// enum reconciliation is spliced in before any column-level work so that
/// recreated enum types exist again by the time columns are altered. A
/// table whose partitioning changed can only be migrated by drop and
/// recreate, which supersedes all other changes to it.
pub fn table_changes(
    tables_from: &BTreeMap<String, Selectable>,
    tables_target: &BTreeMap<String, Selectable>,
    enums_from: &BTreeMap<String, EnumType>,
    enums_target: &BTreeMap<String, EnumType>,
) -> Statements {
    let diff = differences(tables_from, tables_target);

    let mut statements = Statements::new();
    for v in diff.removed.values() {
        statements.push(v.drop_statement());
    }
    for v in diff.added.values() {
        statements.push(v.create_statement());
    }

    statements.extend(enum_modifications(
        tables_from,
        tables_target,
        enums_from,
        enums_target,
    ));

    let mut recreated: BTreeSet<String> = BTreeSet::new();
    for (key, after) in &diff.modified {
        let Some(before) = tables_from.get(key) else {
            continue;
        };

        if after.is_partitioned() != before.is_partitioned() {
            statements.push(after.drop_statement());
            statements.push(after.create_statement());
            recreated.insert(key.clone());
            continue;
        }

        if after.parent_table != before.parent_table {
            for statement in after.attach_detach_statements(before) {
                statements.push(statement);
            }
        }
    }

    for (key, after) in &diff.modified {
        if recreated.contains(key) {
            continue;
        }
        let Some(before) = tables_from.get(key) else {
            continue;
        };
        if !after.is_alterable {
            continue;
        }

        let before_columns = before.columns_by_name();
        let after_columns = after.columns_by_name();
        let columns = differences_with(&before_columns, &after_columns, |a, b| a == b);

        for column in columns.removed.values() {
            statements.push(after.alter_table_statement(&column.drop_column_clause()));
        }
        for column in columns.added.values() {
            statements.push(after.alter_table_statement(&column.add_column_clause()));
        }
        for (name, column) in &columns.modified {
            if let Some(before_column) = before_columns.get(name) {
                for statement in column.alter_table_statements(before_column, after) {
                    statements.push(statement);
                }
            }
        }

        if after.rowsecurity != before.rowsecurity {
            statements.push(after.alter_rls_statement());
        }
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::object::SchemaObject;
    use crate::catalog::selectable::{Column, RelationKind};

    fn make_column(name: &str, dbtypestr: &str) -> Column {
        Column {
            name: name.to_string(),
            dbtypestr: dbtypestr.to_string(),
            default: None,
            not_null: false,
            is_enum: false,
            enum_name: None,
            enum_values: vec![],
        }
    }

    fn make_table(name: &str, columns: Vec<Column>) -> Selectable {
        Selectable {
            schema: "public".to_string(),
            name: name.to_string(),
            relationtype: RelationKind::Table,
            definition: String::new(),
            columns,
            identity_arguments: None,
            result_type: None,
            partition_by: None,
            parent_table: None,
            partition_bound: None,
            rowsecurity: false,
            is_alterable: true,
            dependent_on: BTreeSet::new(),
            dependents: BTreeSet::new(),
            dependents_all: BTreeSet::new(),
        }
    }

    fn snapshot(tables: Vec<Selectable>) -> BTreeMap<String, Selectable> {
        tables.into_iter().map(|t| (t.identity(), t)).collect()
    }

    fn no_enums() -> BTreeMap<String, EnumType> {
        BTreeMap::new()
    }

    #[test]
    fn test_column_addition_and_removal() {
        let from = snapshot(vec![make_table(
            "t",
            vec![make_column("a", "integer"), make_column("b", "text")],
        )]);
        let target = snapshot(vec![make_table(
            "t",
            vec![make_column("a", "integer"), make_column("c", "boolean")],
        )]);

        let statements = table_changes(&from, &target, &no_enums(), &no_enums());
        let rendered: Vec<&String> = statements.iter().collect();
        assert_eq!(
            rendered,
            vec![
                "ALTER TABLE \"public\".\"t\" DROP COLUMN \"b\";",
                "ALTER TABLE \"public\".\"t\" ADD COLUMN \"c\" boolean;",
            ]
        );
    }

    #[test]
    fn test_column_type_change() {
        let from = snapshot(vec![make_table("t", vec![make_column("a", "integer")])]);
        let target = snapshot(vec![make_table("t", vec![make_column("a", "bigint")])]);

        let statements = table_changes(&from, &target, &no_enums(), &no_enums());
        let rendered: Vec<&String> = statements.iter().collect();
        assert_eq!(
            rendered,
            vec![
                "ALTER TABLE \"public\".\"t\" ALTER COLUMN \"a\" SET DATA TYPE bigint USING \"a\"::bigint;",
            ]
        );
    }

    #[test]
    fn test_partition_toggle_recreates_table() {
        let from = snapshot(vec![make_table("t", vec![make_column("a", "integer")])]);
        let mut partitioned = make_table("t", vec![make_column("a", "integer")]);
        partitioned.partition_by = Some("RANGE (\"a\")".to_string());
        let target = snapshot(vec![partitioned]);

        let statements = table_changes(&from, &target, &no_enums(), &no_enums());
        let rendered: Vec<&String> = statements.iter().collect();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0], "DROP TABLE \"public\".\"t\";");
        assert!(rendered[1].starts_with("CREATE TABLE \"public\".\"t\""));
    }

    #[test]
    fn test_reparenting_emits_attach_detach() {
        let mut old_child = make_table("part", vec![]);
        old_child.parent_table = Some("public.old_parent".to_string());
        let mut new_child = old_child.clone();
        new_child.parent_table = Some("public.new_parent".to_string());
        new_child.partition_bound = Some("FOR VALUES IN (2)".to_string());
        new_child.is_alterable = false;

        let from = snapshot(vec![old_child]);
        let target = snapshot(vec![new_child]);

        let statements = table_changes(&from, &target, &no_enums(), &no_enums());
        let rendered: Vec<&String> = statements.iter().collect();
        assert_eq!(
            rendered,
            vec![
                "ALTER TABLE \"public\".\"old_parent\" DETACH PARTITION \"public\".\"part\";",
                "ALTER TABLE \"public\".\"new_parent\" ATTACH PARTITION \"public\".\"part\" FOR VALUES IN (2);",
            ]
        );
    }

    #[test]
    fn test_rls_toggle() {
        let from = snapshot(vec![make_table("t", vec![make_column("a", "integer")])]);
        let mut secured = make_table("t", vec![make_column("a", "integer")]);
        secured.rowsecurity = true;
        let target = snapshot(vec![secured]);

        let statements = table_changes(&from, &target, &no_enums(), &no_enums());
        let rendered: Vec<&String> = statements.iter().collect();
        assert_eq!(
            rendered,
            vec!["ALTER TABLE \"public\".\"t\" ENABLE ROW LEVEL SECURITY;"]
        );
    }

    #[test]
    fn test_not_alterable_table_skips_column_work() {
        let from = snapshot(vec![make_table("t", vec![make_column("a", "integer")])]);
        let mut frozen = make_table("t", vec![make_column("a", "bigint")]);
        frozen.is_alterable = false;
        let target = snapshot(vec![frozen]);

        let statements = table_changes(&from, &target, &no_enums(), &no_enums());
        assert!(statements.is_empty());
    }

    #[test]
    fn test_pure_removal_and_addition() {
        let from = snapshot(vec![make_table("gone", vec![make_column("a", "integer")])]);
        let target = snapshot(vec![make_table("new", vec![make_column("a", "integer")])]);

        let statements = table_changes(&from, &target, &no_enums(), &no_enums());
        let rendered: Vec<&String> = statements.iter().collect();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0], "DROP TABLE \"public\".\"gone\";");
        assert!(rendered[1].starts_with("CREATE TABLE \"public\".\"new\""));
    }
}
