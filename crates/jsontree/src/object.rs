//! Insertion-ordered key/value collection.
//!
//! Backed by an `IndexMap`, which keeps the ordered pair storage and the
//! key -> position index consistent on every insert and removal. Removal
//! uses `shift_remove` so the remaining pairs keep their relative order.

use crate::node::Node;
use indexmap::IndexMap;

/// An ordered collection of unique `String` keys mapped to nodes.
#[derive(Debug, Clone, Default)]
pub struct Object {
    entries: IndexMap<String, Node>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries.get_mut(key)
    }

    /// Owned copy of the value at `key`, or `Undefined` if absent.
    pub fn value(&self, key: &str) -> Node {
        self.entries.get(key).cloned().unwrap_or(Node::Undefined)
    }

    /// Insert or replace. A replaced key keeps its position.
    /// Returns true if the key was new.
    pub fn set(&mut self, key: impl Into<String>, node: impl Into<Node>) -> bool {
        self.entries.insert(key.into(), node.into()).is_none()
    }

    /// Apply `visit` to the value at `key`. Returns whether the key was found.
    pub fn modify(&mut self, key: &str, visit: impl FnOnce(&mut Node)) -> bool {
        match self.entries.get_mut(key) {
            Some(node) => {
                visit(node);
                true
            }
            None => false,
        }
    }

    /// Visit every pair in insertion order.
    pub fn for_each(&self, mut visit: impl FnMut(&str, &Node)) {
        for (k, v) in &self.entries {
            visit(k, v);
        }
    }

    /// Visit every pair in insertion order, mutably.
    pub fn for_each_mut(&mut self, mut visit: impl FnMut(&str, &mut Node)) {
        for (k, v) in &mut self.entries {
            visit(k, v);
        }
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    /// Remove and return the value at `key`.
    pub fn take(&mut self, key: &str) -> Option<Node> {
        self.entries.shift_remove(key)
    }

    /// Remove every pair for which `predicate` holds. Returns the count removed.
    pub fn remove_if(&mut self, mut predicate: impl FnMut(&str, &Node) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|k, v| !predicate(k, v));
        before - self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, Node> {
        self.entries.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Node> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, String, Node> {
        self.entries.iter_mut()
    }
}

/// Pair-wise comparison in insertion order.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|(a, b)| a == b)
    }
}

impl<K: Into<String>, N: Into<Node>> FromIterator<(K, N)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, N)>>(iter: I) -> Self {
        let mut object = Object::new();
        object.extend(iter);
        object
    }
}

impl<K: Into<String>, N: Into<Node>> Extend<(K, N)> for Object {
    fn extend<I: IntoIterator<Item = (K, N)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl IntoIterator for Object {
    type Item = (String, Node);
    type IntoIter = indexmap::map::IntoIter<String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = (&'a String, &'a Node);
    type IntoIter = indexmap::map::Iter<'a, String, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Object {
        [("a", 1), ("b", 2), ("c", 3)].into_iter().collect()
    }

    #[test]
    fn replace_keeps_position() {
        let mut obj = sample();
        assert!(!obj.set("a", 10));
        assert_eq!(obj.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(obj.get("a"), Some(&Node::Integer(10)));
    }

    #[test]
    fn remove_keeps_order_of_rest() {
        let mut obj = sample();
        assert!(obj.remove("b"));
        assert_eq!(obj.keys().collect::<Vec<_>>(), ["a", "c"]);
        // index stays consistent after shifting
        assert_eq!(obj.get("c"), Some(&Node::Integer(3)));
        assert!(obj.set("b", 4));
        assert_eq!(obj.keys().collect::<Vec<_>>(), ["a", "c", "b"]);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let a: Object = [("x", 1), ("y", 2)].into_iter().collect();
        let b: Object = [("y", 2), ("x", 1)].into_iter().collect();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
