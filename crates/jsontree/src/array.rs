//! Ordered, 0-indexed sequence of nodes.

use crate::error::{Error, Result};
use crate::node::Node;
use std::ops::{Index, IndexMut};

/// An ordered sequence container. Owns every element.
///
/// No operation reorders existing elements except the position being
/// inserted into or removed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array {
    items: Vec<Node>,
}

impl Array {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.items.get_mut(index)
    }

    /// Append at the end.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.items.push(node.into());
    }

    /// Insert before `position`; `position == len` appends.
    pub fn insert(&mut self, position: usize, node: impl Into<Node>) -> Result<()> {
        if position > self.items.len() {
            return Err(Error::IndexOutOfRange {
                index: position,
                len: self.items.len(),
            });
        }
        self.items.insert(position, node.into());
        Ok(())
    }

    /// Remove and return the element at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Node> {
        self.check(index)?;
        Ok(self.items.remove(index))
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, node: impl Into<Node>) -> Result<Node> {
        self.check(index)?;
        Ok(std::mem::replace(&mut self.items[index], node.into()))
    }

    /// Visit every element in index order.
    pub fn for_each(&self, mut visit: impl FnMut(&Node)) {
        self.items.iter().for_each(|n| visit(n));
    }

    /// Visit every element in index order, mutably.
    pub fn for_each_mut(&mut self, mut visit: impl FnMut(&mut Node)) {
        self.items.iter_mut().for_each(|n| visit(n));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Node> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.items
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.items.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }
}

/// Panics if `index` is out of range, like `Vec`. Use [`Array::get`] for a
/// checked read.
impl Index<usize> for Array {
    type Output = Node;

    fn index(&self, index: usize) -> &Node {
        &self.items[index]
    }
}

impl IndexMut<usize> for Array {
    fn index_mut(&mut self, index: usize) -> &mut Node {
        &mut self.items[index]
    }
}

impl From<Vec<Node>> for Array {
    fn from(items: Vec<Node>) -> Self {
        Self { items }
    }
}

impl From<Array> for Vec<Node> {
    fn from(array: Array) -> Self {
        array.items
    }
}

impl<N: Into<Node>> FromIterator<N> for Array {
    fn from_iter<I: IntoIterator<Item = N>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<N: Into<Node>> Extend<N> for Array {
    fn extend<I: IntoIterator<Item = N>>(&mut self, iter: I) {
        self.items.extend(iter.into_iter().map(Into::into));
    }
}

impl IntoIterator for Array {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a> IntoIterator for &'a mut Array {
    type Item = &'a mut Node;
    type IntoIter = std::slice::IterMut<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}
