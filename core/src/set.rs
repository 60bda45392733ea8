//! Pluggable sets used as visited/unvisited markers by graph walks.
//!
//! Nodes are not assumed hashable, so the default set compares with a
//! caller-provided equality function. Every operation is fallible: a set may
//! be backed by something remote.

use std::collections::HashSet;
use std::hash::Hash;

use crate::cursor::{BoxCursor, SliceCursor};
use crate::error::GraphError;

/// Equality used by sets that cannot hash their elements.
pub type SetEquals<T> = fn(&T, &T) -> bool;

pub trait AbstractSet<T> {
    fn len(&self) -> Result<usize, GraphError>;

    fn is_empty(&self) -> Result<bool, GraphError> {
        Ok(self.len()? == 0)
    }

    /// Insert `value` unless an equal element is already present.
    fn add(&mut self, value: T) -> Result<(), GraphError>;

    fn has(&self, value: &T) -> Result<bool, GraphError>;

    /// Remove the element equal to `value`, if any.
    fn remove(&mut self, value: &T) -> Result<(), GraphError>;

    /// Any element of the set, `None` when empty.
    fn peek(&self) -> Result<Option<T>, GraphError>;

    /// Snapshot cursor over the current elements.
    fn to_cursor(&self) -> Result<BoxCursor<'_, T>, GraphError>;
}

/// Vector-backed set with linear equality scans.
#[derive(Clone)]
pub struct SliceSet<T> {
    values: Vec<T>,
    equals: SetEquals<T>,
}

impl<T> SliceSet<T> {
    pub fn new(equals: SetEquals<T>) -> Self {
        Self { values: Vec::new(), equals }
    }

    fn position(&self, value: &T) -> Option<usize> {
        self.values.iter().position(|v| (self.equals)(v, value))
    }
}

impl<T: Clone> AbstractSet<T> for SliceSet<T> {
    fn len(&self) -> Result<usize, GraphError> {
        Ok(self.values.len())
    }

    fn add(&mut self, value: T) -> Result<(), GraphError> {
        if self.position(&value).is_none() {
            self.values.push(value);
        }
        Ok(())
    }

    fn has(&self, value: &T) -> Result<bool, GraphError> {
        Ok(self.position(value).is_some())
    }

    fn remove(&mut self, value: &T) -> Result<(), GraphError> {
        if let Some(p) = self.position(value) {
            self.values.swap_remove(p);
        }
        Ok(())
    }

    fn peek(&self) -> Result<Option<T>, GraphError> {
        Ok(self.values.last().cloned())
    }

    fn to_cursor(&self) -> Result<BoxCursor<'_, T>, GraphError> {
        Ok(Box::new(SliceCursor::new(self.values.clone())))
    }
}

/// Hash-backed set for element types that opt into value equality.
#[derive(Debug, Clone, Default)]
pub struct HashedSet<T: Eq + Hash> {
    values: HashSet<T>,
}

impl<T: Eq + Hash> HashedSet<T> {
    pub fn new() -> Self {
        Self { values: HashSet::new() }
    }
}

impl<T: Eq + Hash + Clone> AbstractSet<T> for HashedSet<T> {
    fn len(&self) -> Result<usize, GraphError> {
        Ok(self.values.len())
    }

    fn add(&mut self, value: T) -> Result<(), GraphError> {
        self.values.insert(value);
        Ok(())
    }

    fn has(&self, value: &T) -> Result<bool, GraphError> {
        Ok(self.values.contains(value))
    }

    fn remove(&mut self, value: &T) -> Result<(), GraphError> {
        self.values.remove(value);
        Ok(())
    }

    fn peek(&self) -> Result<Option<T>, GraphError> {
        Ok(self.values.iter().next().cloned())
    }

    fn to_cursor(&self) -> Result<BoxCursor<'_, T>, GraphError> {
        Ok(Box::new(self.values.iter().cloned().collect::<SliceCursor<T>>()))
    }
}
