//! Pull-based cursors.
//!
//! A cursor starts *before* its first element. `advance()` moves forward and
//! reports whether a current element exists; `current()` reads it. Keeping the
//! two steps apart lets a data source report a failure independently from
//! "no more data". Reading before the first successful `advance()` or after
//! exhaustion fails with [`GraphError::NoCurrentValue`].

use std::collections::HashMap;

use crate::error::{ErrorList, GraphError};

pub trait Cursor {
    type Item;

    /// Move to the next element. `Ok(false)` once exhausted.
    fn advance(&mut self) -> Result<bool, GraphError>;

    /// The element under the cursor.
    fn current(&self) -> Result<Self::Item, GraphError>;
}

/// Type-erased cursor, as returned by graph engines.
pub type BoxCursor<'a, T> = Box<dyn Cursor<Item = T> + 'a>;

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Item = C::Item;

    fn advance(&mut self) -> Result<bool, GraphError> {
        (**self).advance()
    }

    fn current(&self) -> Result<Self::Item, GraphError> {
        (**self).current()
    }
}

/// A missing cursor behaves as an empty one.
impl<C: Cursor> Cursor for Option<C> {
    type Item = C::Item;

    fn advance(&mut self) -> Result<bool, GraphError> {
        match self {
            Some(inner) => inner.advance(),
            None => Ok(false),
        }
    }

    fn current(&self) -> Result<Self::Item, GraphError> {
        match self {
            Some(inner) => inner.current(),
            None => Err(GraphError::NoCurrentValue),
        }
    }
}

/// Drain a cursor into a `Vec`, stopping at the first error.
pub fn collect<C: Cursor + ?Sized>(cursor: &mut C) -> Result<Vec<C::Item>, GraphError> {
    let mut values = Vec::new();
    while cursor.advance()? {
        values.push(cursor.current()?);
    }
    Ok(values)
}

/// Cursor that never yields.
#[derive(Debug)]
pub struct EmptyCursor<T>(std::marker::PhantomData<T>);

impl<T> EmptyCursor<T> {
    pub fn new() -> Self {
        Self(std::marker::PhantomData)
    }
}

impl<T> Default for EmptyCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Cursor for EmptyCursor<T> {
    type Item = T;

    fn advance(&mut self) -> Result<bool, GraphError> {
        Ok(false)
    }

    fn current(&self) -> Result<T, GraphError> {
        Err(GraphError::NoCurrentValue)
    }
}

/// Cursor over an owned, fixed sequence.
#[derive(Debug, Clone)]
pub struct SliceCursor<T> {
    values: Vec<T>,
    /// Position of the current element; `None` before the first advance.
    position: Option<usize>,
}

impl<T> SliceCursor<T> {
    pub fn new(values: Vec<T>) -> Self {
        Self { values, position: None }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T> FromIterator<T> for SliceCursor<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T: Clone> Cursor for SliceCursor<T> {
    type Item = T;

    fn advance(&mut self) -> Result<bool, GraphError> {
        let next = match self.position {
            None => 0,
            // Park one past the end so repeated calls stay exhausted.
            Some(p) => (p + 1).min(self.values.len()),
        };
        self.position = Some(next);
        Ok(next < self.values.len())
    }

    fn current(&self) -> Result<T, GraphError> {
        self.position
            .and_then(|p| self.values.get(p))
            .cloned()
            .ok_or(GraphError::NoCurrentValue)
    }
}

/// Applies a pure transform to every element of a source cursor.
pub struct MapCursor<C, F> {
    source: C,
    mapper: F,
}

impl<C, F> MapCursor<C, F> {
    pub fn new(source: C, mapper: F) -> Self {
        Self { source, mapper }
    }
}

impl<C, F, U> Cursor for MapCursor<C, F>
where
    C: Cursor,
    F: Fn(C::Item) -> U,
{
    type Item = U;

    fn advance(&mut self) -> Result<bool, GraphError> {
        self.source.advance()
    }

    fn current(&self) -> Result<U, GraphError> {
        self.source.current().map(&self.mapper)
    }
}

/// Maps source elements through a fallible transform and keeps those that
/// satisfy an optional predicate.
///
/// `advance` keeps pulling from the source until a mapped value passes the
/// filter. Errors met on the way do not stop the search: they are joined and
/// kept. If a later value matches, `advance` still answers `Ok(true)` and the
/// errors stay available through [`MapFilterCursor::take_errors`]; if the
/// source runs out, they are returned as a single `Joined` error.
pub struct MapFilterCursor<C, U, M, P> {
    source: C,
    mapper: M,
    filter: Option<P>,
    current: Option<U>,
    errors: ErrorList,
}

impl<C, U, M> MapFilterCursor<C, U, M, fn(&U) -> bool> {
    /// Map-only variant: every successfully mapped value is kept.
    pub fn unfiltered(source: C, mapper: M) -> Self {
        Self::new(source, mapper, None)
    }
}

impl<C, U, M, P> MapFilterCursor<C, U, M, P> {
    pub fn new(source: C, mapper: M, filter: Option<P>) -> Self {
        Self {
            source,
            mapper,
            filter,
            current: None,
            errors: ErrorList::new(),
        }
    }

    /// Errors skipped while looking for matches so far.
    pub fn take_errors(&mut self) -> ErrorList {
        self.errors.take()
    }
}

impl<C, U, M, P> Cursor for MapFilterCursor<C, U, M, P>
where
    C: Cursor,
    U: Clone,
    M: Fn(C::Item) -> Result<U, GraphError>,
    P: Fn(&U) -> bool,
{
    type Item = U;

    fn advance(&mut self) -> Result<bool, GraphError> {
        self.current = None;
        loop {
            match self.source.advance() {
                Ok(true) => {}
                Ok(false) => return self.errors.take().into_result().map(|_| false),
                Err(err) => {
                    // A failing source cannot tell whether more data follows.
                    self.errors.push(err);
                    return Err(GraphError::Joined(self.errors.take()));
                }
            }

            let mapped = self.source.current().and_then(&self.mapper);
            match mapped {
                Ok(value) => {
                    let keep = self.filter.as_ref().map_or(true, |accept| accept(&value));
                    if keep {
                        self.current = Some(value);
                        return Ok(true);
                    }
                }
                Err(err) => self.errors.push(err),
            }
        }
    }

    fn current(&self) -> Result<U, GraphError> {
        self.current.clone().ok_or(GraphError::NoCurrentValue)
    }
}

/// Walks indices `0..=max_index` over a sparse index map, yielding the
/// default value wherever the map has no entry.
#[derive(Debug, Clone)]
pub struct IndexedCursor<V> {
    values: HashMap<usize, V>,
    default: V,
    max_index: usize,
    index: Option<usize>,
}

impl<V> IndexedCursor<V> {
    pub fn new(max_index: usize, values: HashMap<usize, V>, default: V) -> Self {
        Self { values, default, max_index, index: None }
    }
}

impl<V: Clone> Cursor for IndexedCursor<V> {
    type Item = V;

    fn advance(&mut self) -> Result<bool, GraphError> {
        match self.index {
            None => {
                self.index = Some(0);
                Ok(true)
            }
            Some(i) if i < self.max_index => {
                self.index = Some(i + 1);
                Ok(true)
            }
            Some(_) => {
                self.index = Some(self.max_index + 1);
                Ok(false)
            }
        }
    }

    fn current(&self) -> Result<V, GraphError> {
        match self.index {
            Some(i) if i <= self.max_index => {
                Ok(self.values.get(&i).unwrap_or(&self.default).clone())
            }
            _ => Err(GraphError::NoCurrentValue),
        }
    }
}
