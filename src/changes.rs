//! Per-category entry points over a pair of snapshots.

use std::collections::BTreeMap;

use crate::catalog::Catalog;
use crate::catalog::constraint::Constraint;
use crate::diff::emitter::statements_for_changes;
use crate::diff::selectables::selectable_changes;
use crate::error::MigrationError;
use crate::statements::Statements;

/// Behavior switches shared by every category entry point.
///
/// `add_dependents_for_modified` is accepted everywhere for interface
/// uniformity but only the selectables reconciliation consults it; the
/// plain category diffs ignore it.
#[derive(Debug, Clone, Copy)]
pub struct ChangeFlags {
    pub creations_only: bool,
    pub drops_only: bool,
    pub modifications: bool,
    pub dependency_ordering: bool,
    pub add_dependents_for_modified: bool,
}

impl Default for ChangeFlags {
    fn default() -> Self {
        Self {
            creations_only: false,
            drops_only: false,
            modifications: true,
            dependency_ordering: false,
            add_dependents_for_modified: false,
        }
    }
}

impl ChangeFlags {
    pub fn creations() -> Self {
        Self {
            creations_only: true,
            ..Self::default()
        }
    }

    pub fn drops() -> Self {
        Self {
            drops_only: true,
            ..Self::default()
        }
    }
}

/// Computes statements per object category between two snapshots.
pub struct Changes<'a> {
    pub source: &'a Catalog,
    pub target: &'a Catalog,
}

impl<'a> Changes<'a> {
    pub fn new(source: &'a Catalog, target: &'a Catalog) -> Self {
        Self { source, target }
    }

    pub fn schemas(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.schemas, &self.target.schemas, flags)
    }

    pub fn extensions(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.extensions, &self.target.extensions, flags)
    }

    pub fn collations(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.collations, &self.target.collations, flags)
    }

    pub fn enums(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.enums, &self.target.enums, flags)
    }

    pub fn sequences(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.sequences, &self.target.sequences, flags)
    }

    pub fn constraints(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.constraints, &self.target.constraints, flags)
    }

    /// Primary keys are emitted at a different point of the canonical
    /// sequence than other constraints, so the two subsets diff separately.
    pub fn pk_constraints(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(
            &filter_constraints(&self.source.constraints, true),
            &filter_constraints(&self.target.constraints, true),
            flags,
        )
    }

    pub fn non_pk_constraints(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(
            &filter_constraints(&self.source.constraints, false),
            &filter_constraints(&self.target.constraints, false),
            flags,
        )
    }

    pub fn indexes(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.indexes, &self.target.indexes, flags)
    }

    pub fn triggers(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.triggers, &self.target.triggers, flags)
    }

    pub fn rlspolicies(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.rlspolicies, &self.target.rlspolicies, flags)
    }

    pub fn privileges(&self, flags: ChangeFlags) -> Result<Statements, MigrationError> {
        statements_for_changes(&self.source.privileges, &self.target.privileges, flags)
    }

    /// Reconcile tables, views, materialized views, and functions together.
    pub fn selectables(
        &self,
        add_dependents_for_modified: bool,
    ) -> Result<Statements, MigrationError> {
        selectable_changes(
            &self.source.selectables,
            &self.target.selectables,
            &self.source.enums,
            &self.target.enums,
            add_dependents_for_modified,
        )
    }
}

fn filter_constraints(
    constraints: &BTreeMap<String, Constraint>,
    primary: bool,
) -> BTreeMap<String, Constraint> {
    constraints
        .iter()
        .filter(|(_, c)| c.is_primary_key() == primary)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SnapshotObjects;
    use crate::catalog::constraint::PRIMARY_KEY;

    fn make_constraint(table: &str, name: &str, constraint_type: &str) -> Constraint {
        Constraint {
            schema: "public".to_string(),
            table: table.to_string(),
            name: name.to_string(),
            constraint_type: constraint_type.to_string(),
            definition: format!("{} (\"id\")", constraint_type),
        }
    }

    #[test]
    fn test_default_flags() {
        let flags = ChangeFlags::default();
        assert!(!flags.creations_only);
        assert!(!flags.drops_only);
        assert!(flags.modifications);
        assert!(!flags.dependency_ordering);
        assert!(!flags.add_dependents_for_modified);
    }

    #[test]
    fn test_pk_and_non_pk_constraints_diff_separately() {
        let source = Catalog::empty();
        let target = Catalog::from_objects(SnapshotObjects {
            constraints: vec![
                make_constraint("users", "users_pkey", PRIMARY_KEY),
                make_constraint("users", "users_org_fkey", "FOREIGN KEY"),
            ],
            ..Default::default()
        })
        .unwrap();

        let changes = Changes::new(&source, &target);

        let pk = changes.pk_constraints(ChangeFlags::creations()).unwrap();
        assert_eq!(pk.len(), 1);
        assert!(pk.iter().next().unwrap().contains("users_pkey"));

        let non_pk = changes
            .non_pk_constraints(ChangeFlags::creations())
            .unwrap();
        assert_eq!(non_pk.len(), 1);
        assert!(non_pk.iter().next().unwrap().contains("users_org_fkey"));
    }
}
