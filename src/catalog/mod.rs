use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub mod collation;
pub mod constraint;
pub mod enum_type;
pub mod extension;
pub mod index;
pub mod object;
pub mod policy;
pub mod privilege;
pub mod schema;
pub mod selectable;
pub mod sequence;
pub mod trigger;

use crate::error::MigrationError;
use object::SchemaObject;

/// The raw shape of a snapshot as produced by an introspector: one list of
/// objects per kind. Every field is optional in the serialized form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotObjects {
    #[serde(default)]
    pub schemas: Vec<schema::Schema>,
    #[serde(default)]
    pub extensions: Vec<extension::Extension>,
    #[serde(default)]
    pub enums: Vec<enum_type::EnumType>,
    #[serde(default)]
    pub sequences: Vec<sequence::Sequence>,
    #[serde(default)]
    pub collations: Vec<collation::Collation>,
    #[serde(default)]
    pub selectables: Vec<selectable::Selectable>,
    #[serde(default)]
    pub constraints: Vec<constraint::Constraint>,
    #[serde(default)]
    pub indexes: Vec<index::Index>,
    #[serde(default)]
    pub triggers: Vec<trigger::Trigger>,
    #[serde(default)]
    pub rlspolicies: Vec<policy::RlsPolicy>,
    #[serde(default)]
    pub privileges: Vec<privilege::Privilege>,
}

/// A fully indexed schema snapshot.
///
/// Every map is keyed by the object's qualified name; `BTreeMap` keeps the
/// keys sorted, which the diff layer relies on for deterministic output.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub schemas: BTreeMap<String, schema::Schema>,
    pub extensions: BTreeMap<String, extension::Extension>,
    pub enums: BTreeMap<String, enum_type::EnumType>,
    pub sequences: BTreeMap<String, sequence::Sequence>,
    pub collations: BTreeMap<String, collation::Collation>,
    pub selectables: BTreeMap<String, selectable::Selectable>,
    pub constraints: BTreeMap<String, constraint::Constraint>,
    pub indexes: BTreeMap<String, index::Index>,
    pub triggers: BTreeMap<String, trigger::Trigger>,
    pub rlspolicies: BTreeMap<String, policy::RlsPolicy>,
    pub privileges: BTreeMap<String, privilege::Privilege>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a snapshot from its JSON interchange form.
    pub fn from_json(raw: &str) -> Result<Self, MigrationError> {
        let objects: SnapshotObjects = serde_json::from_str(raw)
            .map_err(|e| MigrationError::Introspection(e.to_string()))?;
        Self::from_objects(objects)
    }

    /// Index a snapshot by qualified name and derive the dependency edges.
    ///
    /// Selectables declare only `dependent_on`; the reverse edges and their
    /// transitive closure are computed here. Enum element lists are copied
    /// into the columns referencing them so that redefining an enum marks
    /// every using table as modified.
    pub fn from_objects(objects: SnapshotObjects) -> Result<Self, MigrationError> {
        let mut catalog = Self {
            schemas: index_objects(objects.schemas, "schema")?,
            extensions: index_objects(objects.extensions, "extension")?,
            enums: index_objects(objects.enums, "enum")?,
            sequences: index_objects(objects.sequences, "sequence")?,
            collations: index_objects(objects.collations, "collation")?,
            selectables: index_objects(objects.selectables, "selectable")?,
            constraints: index_objects(objects.constraints, "constraint")?,
            indexes: index_objects(objects.indexes, "index")?,
            triggers: index_objects(objects.triggers, "trigger")?,
            rlspolicies: index_objects(objects.rlspolicies, "policy")?,
            privileges: index_objects(objects.privileges, "privilege")?,
        };

        catalog.link_dependents()?;
        catalog.link_enum_columns();
        debug!(
            selectables = catalog.selectables.len(),
            enums = catalog.enums.len(),
            "snapshot indexed"
        );
        Ok(catalog)
    }

    fn link_dependents(&mut self) -> Result<(), MigrationError> {
        for (identity, s) in &self.selectables {
            if s.dependent_on.contains(identity) {
                return Err(MigrationError::Introspection(format!(
                    "{identity} declares a dependency on itself"
                )));
            }
        }

        let mut reverse: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (identity, s) in &self.selectables {
            for dep in &s.dependent_on {
                if !self.selectables.contains_key(dep) {
                    warn!(
                        "{} depends on {} which is not in the snapshot (may be filtered)",
                        identity, dep
                    );
                    continue;
                }
                reverse
                    .entry(dep.clone())
                    .or_default()
                    .insert(identity.clone());
            }
        }

        let closures: BTreeMap<String, BTreeSet<String>> = self
            .selectables
            .keys()
            .map(|k| (k.clone(), transitive_dependents(k, &reverse)))
            .collect();

        for (identity, s) in self.selectables.iter_mut() {
            s.dependents = reverse.get(identity).cloned().unwrap_or_default();
            s.dependents_all = closures.get(identity).cloned().unwrap_or_default();
        }
        Ok(())
    }

    fn link_enum_columns(&mut self) {
        for s in self.selectables.values_mut() {
            let identity = format!("{}.{}", s.schema, s.name);
            for column in s.columns.iter_mut() {
                if !column.is_enum {
                    continue;
                }
                let Some(enum_name) = column.enum_name.clone() else {
                    continue;
                };
                match self.enums.get(&enum_name) {
                    Some(e) => column.enum_values = e.elements.clone(),
                    None => warn!(
                        "column {}.{} references enum {} which is not in the snapshot",
                        identity, column.name, enum_name
                    ),
                }
            }
        }
    }
}

fn index_objects<T: SchemaObject>(
    items: Vec<T>,
    kind: &str,
) -> Result<BTreeMap<String, T>, MigrationError> {
    let mut map = BTreeMap::new();
    for item in items {
        let identity = item.identity();
        if map.insert(identity.clone(), item).is_some() {
            return Err(MigrationError::Introspection(format!(
                "duplicate {kind} entry: {identity}"
            )));
        }
    }
    Ok(map)
}

fn transitive_dependents(
    start: &str,
    reverse: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeSet<String> {
    let mut all = BTreeSet::new();
    let mut stack: Vec<String> = reverse
        .get(start)
        .map(|d| d.iter().cloned().collect())
        .unwrap_or_default();
    while let Some(next) = stack.pop() {
        if all.insert(next.clone())
            && let Some(more) = reverse.get(&next)
        {
            stack.extend(more.iter().cloned());
        }
    }
    all
}
