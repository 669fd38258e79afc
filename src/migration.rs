//! The migration assembler: collects statements across categories in the
//! canonical order and renders the final script.

use tracing::info;

use crate::catalog::Catalog;
use crate::changes::{ChangeFlags, Changes};
use crate::error::MigrationError;
use crate::statements::Statements;

/// A migration from one snapshot to another.
///
/// Statements accumulate in the order they are added; `sql` renders them
/// and enforces the safety flag.
pub struct Migration<'a> {
    source: &'a Catalog,
    target: &'a Catalog,
    pub statements: Statements,
}

impl<'a> Migration<'a> {
    pub fn new(source: &'a Catalog, target: &'a Catalog) -> Self {
        Self {
            source,
            target,
            statements: Statements::new(),
        }
    }

    pub fn changes(&self) -> Changes<'a> {
        Changes::new(self.source, self.target)
    }

    pub fn add(&mut self, statements: Statements) {
        self.statements.extend(statements);
    }

    pub fn add_sql(&mut self, sql: impl Into<String>) {
        self.statements.push(sql);
    }

    pub fn set_safety(&mut self, safety_on: bool) {
        self.statements.safe = safety_on;
    }

    pub fn clear(&mut self) {
        let safety_on = self.statements.safe;
        self.statements = Statements::new();
        self.statements.safe = safety_on;
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn add_extension_changes(
        &mut self,
        creates: bool,
        drops: bool,
    ) -> Result<(), MigrationError> {
        let changes = self.changes();
        if creates {
            self.add(changes.extensions(ChangeFlags::creations())?);
        }
        if drops {
            self.add(changes.extensions(ChangeFlags::drops())?);
        }
        Ok(())
    }

    /// Collect every category's changes in the canonical order.
    ///
    /// Creations of namespace-level objects come first, then the drops of
    /// everything attached to tables, then the selectable reconciliation,
    /// and finally the recreations of the attached objects. Nothing is
    /// committed to the statement buffer unless every category succeeds.
    pub fn add_all_changes(&mut self, include_privileges: bool) -> Result<(), MigrationError> {
        info!("Collecting schema changes...");
        let changes = self.changes();
        let enum_creations = ChangeFlags {
            creations_only: true,
            modifications: false,
            ..ChangeFlags::default()
        };
        let enum_drops = ChangeFlags {
            drops_only: true,
            modifications: false,
            ..ChangeFlags::default()
        };

        let mut collected = Statements::new();
        collected.extend(changes.schemas(ChangeFlags::creations())?);
        collected.extend(changes.extensions(ChangeFlags::creations())?);
        collected.extend(changes.collations(ChangeFlags::creations())?);
        collected.extend(changes.enums(enum_creations)?);
        collected.extend(changes.sequences(ChangeFlags::creations())?);
        collected.extend(changes.triggers(ChangeFlags::drops())?);
        collected.extend(changes.rlspolicies(ChangeFlags::drops())?);
        if include_privileges {
            collected.extend(changes.privileges(ChangeFlags::drops())?);
        }
        collected.extend(changes.non_pk_constraints(ChangeFlags::drops())?);
        collected.extend(changes.pk_constraints(ChangeFlags::drops())?);
        collected.extend(changes.indexes(ChangeFlags::drops())?);
        collected.extend(changes.selectables(true)?);
        collected.extend(changes.sequences(ChangeFlags::drops())?);
        collected.extend(changes.enums(enum_drops)?);
        collected.extend(changes.extensions(ChangeFlags::drops())?);
        collected.extend(changes.indexes(ChangeFlags::creations())?);
        collected.extend(changes.pk_constraints(ChangeFlags::creations())?);
        collected.extend(changes.non_pk_constraints(ChangeFlags::creations())?);
        if include_privileges {
            collected.extend(changes.privileges(ChangeFlags::creations())?);
        }
        collected.extend(changes.rlspolicies(ChangeFlags::creations())?);
        collected.extend(changes.triggers(ChangeFlags::creations())?);
        collected.extend(changes.collations(ChangeFlags::drops())?);
        collected.extend(changes.schemas(ChangeFlags::drops())?);

        info!(statements = collected.len(), "Change collection complete");
        self.statements.extend(collected);
        Ok(())
    }

    pub fn sql(&self) -> Result<String, MigrationError> {
        self.statements.sql()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SnapshotObjects;
    use crate::catalog::extension::Extension;
    use crate::catalog::schema::Schema;

    #[test]
    fn test_identity_diff_produces_no_statements() {
        let catalog = Catalog::from_objects(SnapshotObjects {
            schemas: vec![Schema {
                name: "public".to_string(),
            }],
            ..Default::default()
        })
        .unwrap();

        let mut migration = Migration::new(&catalog, &catalog);
        migration.add_all_changes(true).unwrap();
        assert!(migration.is_empty());
        assert_eq!(migration.sql().unwrap(), "");
    }

    #[test]
    fn test_clear_keeps_safety_setting() {
        let catalog = Catalog::empty();
        let mut migration = Migration::new(&catalog, &catalog);
        migration.set_safety(false);
        migration.add_sql("DROP TABLE \"t\";");
        migration.clear();
        assert!(migration.is_empty());
        assert!(!migration.statements.safe);
    }

    #[test]
    fn test_add_extension_changes() {
        let make_extension = |name: &str| Extension {
            name: name.to_string(),
            schema: "public".to_string(),
            version: None,
        };
        let source = Catalog::from_objects(SnapshotObjects {
            extensions: vec![make_extension("citext")],
            ..Default::default()
        })
        .unwrap();
        let target = Catalog::from_objects(SnapshotObjects {
            extensions: vec![make_extension("pgcrypto")],
            ..Default::default()
        })
        .unwrap();

        let mut creates_only = Migration::new(&source, &target);
        creates_only.add_extension_changes(true, false).unwrap();
        assert_eq!(
            creates_only.sql().unwrap(),
            "CREATE EXTENSION IF NOT EXISTS \"pgcrypto\" WITH SCHEMA \"public\";\n\n"
        );

        let mut drops_only = Migration::new(&source, &target);
        drops_only.set_safety(false);
        drops_only.add_extension_changes(false, true).unwrap();
        assert_eq!(
            drops_only.sql().unwrap(),
            "DROP EXTENSION \"citext\";\n\n"
        );

        let mut both = Migration::new(&source, &target);
        both.set_safety(false);
        both.add_extension_changes(true, true).unwrap();
        let rendered: Vec<&String> = both.statements.iter().collect();
        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].starts_with("CREATE EXTENSION"));
        assert!(rendered[1].starts_with("DROP EXTENSION"));
    }

    #[test]
    fn test_add_sql_appends_verbatim() {
        let catalog = Catalog::empty();
        let mut migration = Migration::new(&catalog, &catalog);
        migration.add_sql("SELECT 1;");
        assert_eq!(migration.sql().unwrap(), "SELECT 1;\n\n");
    }
}
