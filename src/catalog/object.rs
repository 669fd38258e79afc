use std::collections::BTreeSet;

use once_cell::sync::Lazy;

/// Shared empty edge set for kinds that carry no dependency information.
static NO_EDGES: Lazy<BTreeSet<String>> = Lazy::new(BTreeSet::new);

/// The category a schema object belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Schema,
    Extension,
    Enum,
    Sequence,
    Table,
    View,
    MaterializedView,
    Function,
    Constraint,
    Index,
    Trigger,
    RlsPolicy,
    Collation,
    Privilege,
}

/// A database object the diff engine can reason about.
///
/// `identity` is the object's qualified name, unique within its category;
/// it is the key used in snapshot maps and in the dependency edge sets.
/// Formats: `name` for schemas/extensions, `schema.name` for schema-scoped
/// objects, `schema.table.name` for table-scoped objects,
/// `schema.name(args)` for functions with identity arguments, and
/// `schema.name:grantee:privilege` for privileges.
///
/// `equal_to` is deep semantic equality and must not consult dependency
/// edges: an object is not "modified" because something else started
/// referencing it.
pub trait SchemaObject {
    fn identity(&self) -> String;

    fn kind(&self) -> ObjectKind;

    fn equal_to(&self, other: &Self) -> bool;

    /// Identities that directly reference this object.
    fn dependents(&self) -> &BTreeSet<String> {
        &NO_EDGES
    }

    /// Transitive closure of [`SchemaObject::dependents`].
    fn dependents_all(&self) -> &BTreeSet<String> {
        self.dependents()
    }

    /// Identities this object directly references.
    fn dependent_on(&self) -> &BTreeSet<String> {
        &NO_EDGES
    }

    fn create_statement(&self) -> String;

    fn drop_statement(&self) -> String;

    /// Whether emitting `create_statement` alone, without dropping `old`,
    /// is enough to migrate from `old` to this object.
    fn can_replace(&self, _old: &Self) -> bool {
        false
    }
}
