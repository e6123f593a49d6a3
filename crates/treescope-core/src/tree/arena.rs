use std::slice::Iter;

use crate::tree::ids::NodeIndex;

/// Holds all hierarchy nodes in preorder; cache friendly and index addressed.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    storage: Vec<T>,
}

impl<T> Arena<T> {
    /// Create a new empty storage with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            storage: Vec::with_capacity(capacity),
        }
    }

    /// Allocate a new item and return the associated NodeIndex
    pub fn allocate(&mut self, item: T) -> NodeIndex {
        let index = NodeIndex::from(self.storage.len());
        self.storage.push(item);
        index
    }

    /// Retrieve an associated item from the Arena
    pub fn get(&self, index: NodeIndex) -> Option<&T> {
        self.storage.get(index.index())
    }

    /// Retrieve an associated item from the Arena as a mutable borrow
    pub fn get_mut(&mut self, index: NodeIndex) -> Option<&mut T> {
        self.storage.get_mut(index.index())
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.storage
    }

    pub fn iter(&self) -> Iter<'_, T> {
        self.storage.iter()
    }
}

impl<'a, T> IntoIterator for &'a Arena<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.storage.iter()
    }
}
