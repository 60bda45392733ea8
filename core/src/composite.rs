//! Cursors that grow while they are consumed.
//!
//! [`CompositeCursor`] chains sub-cursors and lets its owner insert more of
//! them mid-iteration. [`DynamicCursor`] does the same over raw values and is
//! the work queue used by graph walks: `push_next` gives depth-first order,
//! `push_last` breadth-first order. Both support `halt`, which drops all
//! pending work; a halted cursor stays exhausted and refuses new work.

use std::collections::VecDeque;

use crate::cursor::{BoxCursor, Cursor, EmptyCursor};
use crate::error::{ErrorList, GraphError};

/// A cursor whose pending elements can be extended during iteration.
pub trait GrowableCursor: Cursor {
    /// Process `value` right after the current element.
    fn push_next(&mut self, value: Self::Item) -> Result<(), GraphError>;

    /// Process `value` after everything already pending.
    fn push_last(&mut self, value: Self::Item) -> Result<(), GraphError>;

    /// Discard the current element and all pending work.
    fn halt(&mut self);
}

/// Ordered sequence of cursors consumed in turn.
pub struct CompositeCursor<'a, T> {
    current: BoxCursor<'a, T>,
    pending: VecDeque<BoxCursor<'a, T>>,
    halted: bool,
    errors: ErrorList,
}

impl<'a, T: 'a> CompositeCursor<'a, T> {
    pub fn new(first: BoxCursor<'a, T>) -> Self {
        Self {
            current: first,
            pending: VecDeque::new(),
            halted: false,
            errors: ErrorList::new(),
        }
    }

    /// Composite with nothing to read yet.
    pub fn empty() -> Self {
        Self::new(Box::new(EmptyCursor::new()))
    }

    /// Drop what remains of the current cursor and read `cursor` instead.
    pub fn replace_current(&mut self, cursor: BoxCursor<'a, T>) -> Result<(), GraphError> {
        self.check_live()?;
        self.current = cursor;
        Ok(())
    }

    /// Read `cursor` first; the current cursor resumes once it is exhausted.
    pub fn postpone_current(&mut self, cursor: BoxCursor<'a, T>) -> Result<(), GraphError> {
        self.check_live()?;
        let previous = std::mem::replace(&mut self.current, cursor);
        self.pending.push_front(previous);
        Ok(())
    }

    /// Read `cursor` right after the current one.
    pub fn add_next(&mut self, cursor: BoxCursor<'a, T>) -> Result<(), GraphError> {
        self.check_live()?;
        self.pending.push_front(cursor);
        Ok(())
    }

    /// Read `cursor` after every pending cursor.
    pub fn add_last(&mut self, cursor: BoxCursor<'a, T>) -> Result<(), GraphError> {
        self.check_live()?;
        self.pending.push_back(cursor);
        Ok(())
    }

    pub fn halt(&mut self) {
        self.halted = true;
        self.current = Box::new(EmptyCursor::new());
        self.pending.clear();
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Errors from pending cursors that failed while searching for the next
    /// element.
    pub fn take_errors(&mut self) -> ErrorList {
        self.errors.take()
    }

    fn check_live(&self) -> Result<(), GraphError> {
        if self.halted {
            Err(GraphError::CursorHalted)
        } else {
            Ok(())
        }
    }
}

impl<'a, T: 'a> Cursor for CompositeCursor<'a, T> {
    type Item = T;

    fn advance(&mut self) -> Result<bool, GraphError> {
        if self.halted {
            return Ok(false);
        }

        if self.current.advance()? {
            return Ok(true);
        }

        // Current is done: promote the first pending cursor that has data.
        while let Some(mut candidate) = self.pending.pop_front() {
            match candidate.advance() {
                Ok(true) => {
                    self.current = candidate;
                    return Ok(true);
                }
                Ok(false) => {}
                Err(err) => self.errors.push(err),
            }
        }

        self.current = Box::new(EmptyCursor::new());
        self.errors.take().into_result().map(|_| false)
    }

    fn current(&self) -> Result<T, GraphError> {
        if self.halted {
            return Err(GraphError::NoCurrentValue);
        }
        self.current.current()
    }
}

/// Growable queue of raw values with cursor semantics.
#[derive(Debug, Clone)]
pub struct DynamicCursor<T> {
    current: Option<T>,
    pending: VecDeque<T>,
    halted: bool,
}

impl<T> DynamicCursor<T> {
    pub fn new() -> Self {
        Self {
            current: None,
            pending: VecDeque::new(),
            halted: false,
        }
    }

    /// Number of values still waiting behind the current one.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

impl<T> Default for DynamicCursor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<T> for DynamicCursor<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            current: None,
            pending: iter.into_iter().collect(),
            halted: false,
        }
    }
}

impl<T: Clone> Cursor for DynamicCursor<T> {
    type Item = T;

    fn advance(&mut self) -> Result<bool, GraphError> {
        self.current = self.pending.pop_front();
        Ok(self.current.is_some())
    }

    fn current(&self) -> Result<T, GraphError> {
        self.current.clone().ok_or(GraphError::NoCurrentValue)
    }
}

impl<T: Clone> GrowableCursor for DynamicCursor<T> {
    fn push_next(&mut self, value: T) -> Result<(), GraphError> {
        if self.halted {
            return Err(GraphError::CursorHalted);
        }
        self.pending.push_front(value);
        Ok(())
    }

    fn push_last(&mut self, value: T) -> Result<(), GraphError> {
        if self.halted {
            return Err(GraphError::CursorHalted);
        }
        self.pending.push_back(value);
        Ok(())
    }

    fn halt(&mut self) {
        self.halted = true;
        self.current = None;
        self.pending.clear();
    }
}
