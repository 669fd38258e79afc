//! Snapshot diffing: the keyed diff primitive plus the per-concern
//! reconciliation passes built on top of it.

pub mod emitter;
pub mod enums;
pub mod selectables;
pub mod tables;

use std::collections::BTreeMap;

use crate::catalog::object::SchemaObject;

/// The four partitions of a keyed diff. Values borrow the input maps;
/// `added`, `modified`, and `unmodified` hold the target-side object,
/// `removed` the source-side one. All partitions stay key-sorted.
#[derive(Debug)]
pub struct Differences<'a, T> {
    pub added: BTreeMap<String, &'a T>,
    pub removed: BTreeMap<String, &'a T>,
    pub modified: BTreeMap<String, &'a T>,
    pub unmodified: BTreeMap<String, &'a T>,
}

/// Partition two keyed maps using the objects' semantic equality.
pub fn differences<'a, T: SchemaObject>(
    a: &'a BTreeMap<String, T>,
    b: &'a BTreeMap<String, T>,
) -> Differences<'a, T> {
    differences_with(a, b, |x, y| x.equal_to(y))
}

/// Partition two keyed maps with an explicit equality predicate.
pub fn differences_with<'a, T>(
    a: &'a BTreeMap<String, T>,
    b: &'a BTreeMap<String, T>,
    same: impl Fn(&T, &T) -> bool,
) -> Differences<'a, T> {
    let mut diff = Differences {
        added: BTreeMap::new(),
        removed: BTreeMap::new(),
        modified: BTreeMap::new(),
        unmodified: BTreeMap::new(),
    };

    for (key, target) in b {
        match a.get(key) {
            None => {
                diff.added.insert(key.clone(), target);
            }
            Some(source) => {
                if same(source, target) {
                    diff.unmodified.insert(key.clone(), target);
                } else {
                    diff.modified.insert(key.clone(), target);
                }
            }
        }
    }

    for (key, source) in a {
        if !b.contains_key(key) {
            diff.removed.insert(key.clone(), source);
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::Schema;

    fn map_of(names: &[&str]) -> BTreeMap<String, Schema> {
        names
            .iter()
            .map(|n| {
                (
                    n.to_string(),
                    Schema {
                        name: n.to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_differences_partitions() {
        let a = map_of(&["kept", "removed"]);
        let b = map_of(&["added", "kept"]);

        let d = differences(&a, &b);
        assert_eq!(d.added.keys().collect::<Vec<_>>(), vec!["added"]);
        assert_eq!(d.removed.keys().collect::<Vec<_>>(), vec!["removed"]);
        assert!(d.modified.is_empty());
        assert_eq!(d.unmodified.keys().collect::<Vec<_>>(), vec!["kept"]);
    }

    #[test]
    fn test_modified_holds_target_side() {
        let a: BTreeMap<String, i32> = BTreeMap::from([("x".to_string(), 1)]);
        let b: BTreeMap<String, i32> = BTreeMap::from([("x".to_string(), 2)]);

        let d = differences_with(&a, &b, |x, y| x == y);
        assert_eq!(d.modified["x"], &2);
    }

    #[test]
    fn test_identity_diff_is_all_unmodified() {
        let a = map_of(&["one", "two"]);
        let d = differences(&a, &a);
        assert!(d.added.is_empty());
        assert!(d.removed.is_empty());
        assert!(d.modified.is_empty());
        assert_eq!(d.unmodified.len(), 2);
    }
}
