//! Query-targetable objects: tables, views, materialized views, functions.
//!
//! These share one snapshot map because they participate in one dependency
//! graph (a view can select from a table, a function, or another view), and
//! the diff layer reconciles them together: dependent drops first, table
//! alterations in the middle, dependent creations last.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::object::{ObjectKind, SchemaObject};
use crate::render::{quote_ident, quote_path, quote_qualified};

fn default_true() -> bool {
    true
}

/// Discriminates selectables using the pg relkind codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    #[serde(rename = "r")]
    Table,
    #[serde(rename = "v")]
    View,
    #[serde(rename = "m")]
    MaterializedView,
    #[serde(rename = "f")]
    Function,
}

/// A table or view column.
///
/// `enum_values` is denormalized from the enum the column references (if
/// any) when the snapshot is loaded, so that redefining an enum shows up
/// as a column modification on every table using it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Rendered type text, e.g. `integer`, `character varying(80)`, or the
    /// (possibly schema-qualified) name of an enum type.
    pub dbtypestr: String,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub is_enum: bool,
    /// Identity (`schema.name`) of the referenced enum type.
    #[serde(default)]
    pub enum_name: Option<String>,
    #[serde(default)]
    pub enum_values: Vec<String>,
}

impl Column {
    /// The referenced enum as (identity, elements), if any.
    pub fn enum_definition(&self) -> Option<(&str, &[String])> {
        self.enum_name
            .as_deref()
            .map(|name| (name, self.enum_values.as_slice()))
    }

    /// `"name" type [DEFAULT ...] [NOT NULL]`, as used inside CREATE TABLE
    /// and ADD COLUMN.
    pub fn definition_clause(&self) -> String {
        let mut clause = format!("{} {}", quote_ident(&self.name), self.dbtypestr);
        if let Some(default) = &self.default {
            clause.push_str(&format!(" DEFAULT {}", default));
        }
        if self.not_null {
            clause.push_str(" NOT NULL");
        }
        clause
    }

    pub fn add_column_clause(&self) -> String {
        format!("ADD COLUMN {}", self.definition_clause())
    }

    pub fn drop_column_clause(&self) -> String {
        format!("DROP COLUMN {}", quote_ident(&self.name))
    }

    /// ALTER TABLE statements migrating `old` into this column.
    ///
    /// A type change is only emitted when the rendered type text changed;
    /// a column whose enum type was redefined (same type text, different
    /// elements) is coerced by the enum reconciliation instead.
    pub fn alter_table_statements(&self, old: &Column, table: &Selectable) -> Vec<String> {
        let mut statements = Vec::new();

        if self.dbtypestr != old.dbtypestr {
            statements.push(table.alter_table_statement(&format!(
                "ALTER COLUMN {} SET DATA TYPE {} USING {}::{}",
                quote_ident(&self.name),
                self.dbtypestr,
                quote_ident(&self.name),
                self.dbtypestr
            )));
        }

        match (&old.default, &self.default) {
            (Some(_), None) => {
                statements.push(table.alter_table_statement(&format!(
                    "ALTER COLUMN {} DROP DEFAULT",
                    quote_ident(&self.name)
                )));
            }
            (None, Some(default)) => {
                statements.push(table.alter_table_statement(&format!(
                    "ALTER COLUMN {} SET DEFAULT {}",
                    quote_ident(&self.name),
                    default
                )));
            }
            (Some(before), Some(after)) if before != after => {
                statements.push(table.alter_table_statement(&format!(
                    "ALTER COLUMN {} SET DEFAULT {}",
                    quote_ident(&self.name),
                    after
                )));
            }
            _ => {}
        }

        match (old.not_null, self.not_null) {
            (false, true) => {
                statements.push(table.alter_table_statement(&format!(
                    "ALTER COLUMN {} SET NOT NULL",
                    quote_ident(&self.name)
                )));
            }
            (true, false) => {
                statements.push(table.alter_table_statement(&format!(
                    "ALTER COLUMN {} DROP NOT NULL",
                    quote_ident(&self.name)
                )));
            }
            _ => {}
        }

        statements
    }

    /// Cast the column to varchar so its enum type can be recreated.
    /// `table` is the quoted qualified table name.
    pub fn change_enum_to_string_statement(&self, table: &str) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE varchar USING {}::varchar;",
            table,
            quote_ident(&self.name),
            quote_ident(&self.name)
        )
    }

    /// Cast the column back to its enum type after recreation.
    pub fn change_string_to_enum_statement(&self, table: &str) -> String {
        format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE {} USING {}::{};",
            table,
            quote_ident(&self.name),
            self.dbtypestr,
            quote_ident(&self.name),
            self.dbtypestr
        )
    }
}

/// A query-targetable schema object.
///
/// One struct covers all four relation kinds; the table-specific fields
/// (`columns`, partitioning, row security) are unused for functions, and
/// the function-specific fields are unused for relations. `definition`
/// holds the view body (its `SELECT ...`) for views and materialized
/// views, and the full `CREATE OR REPLACE FUNCTION ...` text for
/// functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selectable {
    pub schema: String,
    pub name: String,
    pub relationtype: RelationKind,
    #[serde(default)]
    pub definition: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// Function identity arguments, e.g. `integer, text`.
    #[serde(default)]
    pub identity_arguments: Option<String>,
    /// Function result type, e.g. `SETOF public.users`.
    #[serde(default)]
    pub result_type: Option<String>,
    /// Partition strategy of a partitioned table, e.g. `RANGE ("created_at")`.
    #[serde(default)]
    pub partition_by: Option<String>,
    /// Identity (`schema.name`) of the parent this table is a partition of.
    #[serde(default)]
    pub parent_table: Option<String>,
    /// Bound clause of a partition child, e.g. `FOR VALUES FROM (1) TO (10)`
    /// or `DEFAULT`.
    #[serde(default)]
    pub partition_bound: Option<String>,
    #[serde(default)]
    pub rowsecurity: bool,
    /// Whether column-level changes may be applied with ALTER TABLE.
    #[serde(default = "default_true")]
    pub is_alterable: bool,
    /// Identities of selectables this object references. The reverse edges
    /// and their transitive closure are derived at snapshot load.
    #[serde(default)]
    pub dependent_on: BTreeSet<String>,
    #[serde(skip)]
    pub dependents: BTreeSet<String>,
    #[serde(skip)]
    pub dependents_all: BTreeSet<String>,
}

impl Selectable {
    pub fn is_table(&self) -> bool {
        self.relationtype == RelationKind::Table
    }

    pub fn is_partitioned(&self) -> bool {
        self.partition_by.is_some()
    }

    pub fn quoted_identity(&self) -> String {
        quote_qualified(&self.schema, &self.name)
    }

    pub fn columns_by_name(&self) -> BTreeMap<String, Column> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), c.clone()))
            .collect()
    }

    pub fn alter_table_statement(&self, clause: &str) -> String {
        format!("ALTER TABLE {} {};", self.quoted_identity(), clause)
    }

    pub fn alter_rls_statement(&self) -> String {
        let action = if self.rowsecurity { "ENABLE" } else { "DISABLE" };
        format!(
            "ALTER TABLE {} {} ROW LEVEL SECURITY;",
            self.quoted_identity(),
            action
        )
    }

    /// Detach from the old parent and/or attach to the new one.
    pub fn attach_detach_statements(&self, before: &Selectable) -> Vec<String> {
        let mut statements = Vec::new();
        if let Some(parent) = &before.parent_table {
            statements.push(format!(
                "ALTER TABLE {} DETACH PARTITION {};",
                quote_path(parent),
                before.quoted_identity()
            ));
        }
        if let Some(parent) = &self.parent_table {
            let bound = self.partition_bound.as_deref().unwrap_or("DEFAULT");
            statements.push(format!(
                "ALTER TABLE {} ATTACH PARTITION {} {};",
                quote_path(parent),
                self.quoted_identity(),
                bound
            ));
        }
        statements
    }

    fn create_table_statement(&self) -> String {
        if let Some(parent) = &self.parent_table {
            let bound = self.partition_bound.as_deref().unwrap_or("DEFAULT");
            return format!(
                "CREATE TABLE {} PARTITION OF {} {};",
                self.quoted_identity(),
                quote_path(parent),
                bound
            );
        }

        let columns = self
            .columns
            .iter()
            .map(|c| format!("    {}", c.definition_clause()))
            .join(",\n");
        let mut sql = format!("CREATE TABLE {} (\n{}\n)", self.quoted_identity(), columns);
        if let Some(spec) = &self.partition_by {
            sql.push_str(&format!(" PARTITION BY {}", spec));
        }
        sql.push(';');
        sql
    }

    fn normalized_definition(&self) -> &str {
        self.definition.trim_end().trim_end_matches(';')
    }
}

impl SchemaObject for Selectable {
    fn identity(&self) -> String {
        match (&self.relationtype, &self.identity_arguments) {
            (RelationKind::Function, Some(args)) => {
                format!("{}.{}({})", self.schema, self.name, args)
            }
            _ => format!("{}.{}", self.schema, self.name),
        }
    }

    fn kind(&self) -> ObjectKind {
        match self.relationtype {
            RelationKind::Table => ObjectKind::Table,
            RelationKind::View => ObjectKind::View,
            RelationKind::MaterializedView => ObjectKind::MaterializedView,
            RelationKind::Function => ObjectKind::Function,
        }
    }

    fn equal_to(&self, other: &Self) -> bool {
        self.schema == other.schema
            && self.name == other.name
            && self.relationtype == other.relationtype
            && self.definition == other.definition
            && self.columns == other.columns
            && self.identity_arguments == other.identity_arguments
            && self.result_type == other.result_type
            && self.partition_by == other.partition_by
            && self.parent_table == other.parent_table
            && self.partition_bound == other.partition_bound
            && self.rowsecurity == other.rowsecurity
    }

    fn dependents(&self) -> &BTreeSet<String> {
        &self.dependents
    }

    fn dependents_all(&self) -> &BTreeSet<String> {
        &self.dependents_all
    }

    fn dependent_on(&self) -> &BTreeSet<String> {
        &self.dependent_on
    }

    fn create_statement(&self) -> String {
        match self.relationtype {
            RelationKind::Table => self.create_table_statement(),
            RelationKind::View => format!(
                "CREATE OR REPLACE VIEW {} AS\n{};",
                self.quoted_identity(),
                self.normalized_definition()
            ),
            RelationKind::MaterializedView => format!(
                "CREATE MATERIALIZED VIEW {} AS\n{};",
                self.quoted_identity(),
                self.normalized_definition()
            ),
            RelationKind::Function => format!("{};", self.normalized_definition()),
        }
    }

    fn drop_statement(&self) -> String {
        match self.relationtype {
            RelationKind::Table => format!("DROP TABLE {};", self.quoted_identity()),
            RelationKind::View => format!("DROP VIEW {};", self.quoted_identity()),
            RelationKind::MaterializedView => {
                format!("DROP MATERIALIZED VIEW {};", self.quoted_identity())
            }
            RelationKind::Function => format!(
                "DROP FUNCTION {}({});",
                self.quoted_identity(),
                self.identity_arguments.as_deref().unwrap_or_default()
            ),
        }
    }

    /// Views can be replaced as long as existing columns keep their name
    /// and type and new columns are only appended; functions as long as
    /// their signature is unchanged. Tables and materialized views always
    /// need an explicit drop.
    fn can_replace(&self, old: &Self) -> bool {
        if self.relationtype != old.relationtype {
            return false;
        }
        match self.relationtype {
            RelationKind::Function => {
                self.identity_arguments == old.identity_arguments
                    && self.result_type == old.result_type
            }
            RelationKind::View => {
                old.columns.len() <= self.columns.len()
                    && old
                        .columns
                        .iter()
                        .zip(self.columns.iter())
                        .all(|(o, n)| o.name == n.name && o.dbtypestr == n.dbtypestr)
            }
            _ => false,
        }
    }
}
