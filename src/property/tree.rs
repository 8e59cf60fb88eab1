//! String-keyed property tree with dotted-path access.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::value::PropertyValue;

/// Separator between segments of a property path (`a.b.c`).
pub const PATH_SEPARATOR: char = '.';

/// A nested mapping with string keys, ordered by key.
///
/// Key ordering is fixed so that serializing the same tree twice always
/// produces identical bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyTree(BTreeMap<String, PropertyValue>);

impl PropertyTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the tree has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.0.get(key)
    }

    /// Returns `true` if the top-level key is present (even when `null`).
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Sets a top-level key, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: PropertyValue,
    ) -> Option<PropertyValue> {
        self.0.insert(key.into(), value)
    }

    /// Removes a top-level key.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.0.remove(key)
    }

    /// Iterates over top-level entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertyValue)> {
        self.0.iter()
    }

    /// Follows a dotted path through nested mappings.
    ///
    /// Returns `None` as soon as a segment is missing or an intermediate
    /// value is not a mapping. A present `null` leaf is returned as
    /// `Some(&PropertyValue::Null)`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&PropertyValue> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_tree()?.0.get(segment)?;
        }
        Some(current)
    }

    /// Stores `value` at a dotted path, creating intermediate mappings.
    ///
    /// An intermediate node that exists but is not a mapping is replaced
    /// by a fresh mapping. Sibling keys along the way are left untouched.
    pub fn insert_path(&mut self, path: &str, value: PropertyValue) {
        let Some((head, rest)) = path.split_once(PATH_SEPARATOR) else {
            self.0.insert(path.to_string(), value);
            return;
        };
        let slot =
            self.0.entry(head.to_string()).or_insert_with(|| PropertyValue::Map(Self::new()));
        if let PropertyValue::Map(child) = slot {
            child.insert_path(rest, value);
        } else {
            let mut child = Self::new();
            child.insert_path(rest, value);
            *slot = PropertyValue::Map(child);
        }
    }

    /// Deep-merges `overlay` into this tree.
    ///
    /// Mappings present on both sides are merged key by key; any other
    /// overlay value replaces what was there.
    pub fn merge(&mut self, overlay: &PropertyTree) {
        for (key, value) in &overlay.0 {
            match (self.0.get_mut(key), value) {
                (Some(PropertyValue::Map(base)), PropertyValue::Map(incoming)) => {
                    base.merge(incoming);
                }
                _ => {
                    self.0.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

impl FromIterator<(String, PropertyValue)> for PropertyTree {
    fn from_iter<I: IntoIterator<Item = (String, PropertyValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PropertyTree {
    type Item = (String, PropertyValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, PropertyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'de> Deserialize<'de> for PropertyTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match PropertyValue::deserialize(deserializer)? {
            PropertyValue::Map(tree) => Ok(tree),
            PropertyValue::Null => Ok(Self::new()),
            other => Err(D::Error::custom(format!("expected a mapping, found {}", other.kind()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn tree(yaml: &str) -> PropertyTree {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn insert_path_builds_nested_branch() {
        let mut props = PropertyTree::new();
        props.insert_path("a.b", PropertyValue::from(5));
        assert_eq!(props, tree("a:\n  b: 5\n"));
    }

    #[test]
    fn insert_path_keeps_siblings() {
        let mut props = PropertyTree::new();
        props.insert_path("db.host", PropertyValue::from("localhost"));
        props.insert_path("db.port", PropertyValue::from(5432));
        props.insert_path("name", PropertyValue::from("x"));
        assert_eq!(props, tree("db:\n  host: localhost\n  port: 5432\nname: x\n"));
    }

    #[test]
    fn insert_path_replaces_scalar_intermediate() {
        let mut props = tree("a: 1\n");
        props.insert_path("a.b", PropertyValue::from(2));
        assert_eq!(props, tree("a:\n  b: 2\n"));
    }

    #[test]
    fn lookup_follows_dotted_path() {
        let props = tree("a:\n  b:\n    c: deep\n  n: ~\n");
        assert_eq!(props.lookup("a.b.c"), Some(&PropertyValue::from("deep")));
        assert_eq!(props.lookup("a.n"), Some(&PropertyValue::Null));
        assert_eq!(props.lookup("a.b.missing"), None);
        assert_eq!(props.lookup("a.b.c.d"), None);
        assert!(props.lookup("a").unwrap().as_tree().is_some());
    }

    #[test]
    fn merge_overlays_nested_values() {
        let mut base = tree("a:\n  b: 1\n  c: 2\nlist: [1, 2]\n");
        base.merge(&tree("a:\n  c: 3\n  d: 4\nlist: [9]\n"));
        assert_eq!(base, tree("a:\n  b: 1\n  c: 3\n  d: 4\nlist: [9]\n"));
    }

    #[test]
    fn null_document_is_empty_tree() {
        assert!(tree("~").is_empty());
    }

    #[test]
    fn scalar_document_is_rejected() {
        let err = serde_yaml::from_str::<PropertyTree>("42").unwrap_err();
        assert!(err.to_string().contains("expected a mapping, found number"));
    }
}
