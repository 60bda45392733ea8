//! Error types shared by cursors, engines and algorithms.
//!
//! Absence (unknown node, missing link) is never an error: engines answer with
//! `Option` or do nothing. Errors are either fatal input errors that abort the
//! call, or element-level failures that loop algorithms collect into an
//! [`ErrorList`] and hand back next to their best-effort result.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Preferential attachment sizes that do not describe a growth.
    #[error("invalid sizes: initial {initial}, max {max}")]
    InvalidSizes { initial: usize, max: usize },

    #[error("invalid probability {0}: expected a value in [0, 1]")]
    InvalidProbability(f64),

    /// The link generator produced a link whose direction disagrees with
    /// the requested generation mode.
    #[error("inconsistent link type: expected {} links", direction_name(.expected_directed))]
    InconsistentLinkDirection { expected_directed: bool },

    /// `current()` called before the first `advance()` or after exhaustion.
    #[error("no current value")]
    NoCurrentValue,

    #[error("cursor was halted")]
    CursorHalted,

    #[error("index {index} out of bounds for size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    /// A node enumerated by the graph has no neighborhood.
    #[error("node listed by the graph has no neighborhood")]
    MissingNeighborhood,

    /// A link endpoint that the graph does not enumerate as a node.
    #[error("link endpoint is not a node of the graph")]
    UnknownEndpoint,

    /// Failure reported by a pluggable data source (remote set, lazy cursor).
    #[error("data source error: {0}")]
    Source(String),

    #[error(transparent)]
    Joined(ErrorList),
}

fn direction_name(directed: &bool) -> &'static str {
    if *directed {
        "directed"
    } else {
        "undirected"
    }
}

/// Ordered aggregate of errors, joined rather than dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorList(Vec<GraphError>);

impl ErrorList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an error. Nested lists are flattened.
    pub fn push(&mut self, err: GraphError) {
        match err {
            GraphError::Joined(list) => self.0.extend(list.0),
            other => self.0.push(other),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GraphError> {
        self.0.iter()
    }

    /// Move the collected errors out, leaving this list empty.
    pub fn take(&mut self) -> ErrorList {
        ErrorList(std::mem::take(&mut self.0))
    }

    /// `Ok(())` when empty, a single `Joined` error otherwise.
    pub fn into_result(self) -> Result<(), GraphError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(GraphError::Joined(self))
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error(s)", self.0.len())?;
        for (i, err) in self.0.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}

impl From<Vec<GraphError>> for ErrorList {
    fn from(errors: Vec<GraphError>) -> Self {
        let mut list = ErrorList::new();
        for err in errors {
            list.push(err);
        }
        list
    }
}

impl IntoIterator for ErrorList {
    type Item = GraphError;
    type IntoIter = std::vec::IntoIter<GraphError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Best-effort outcome of a pass over many elements.
///
/// `errors` is empty when every element was processed cleanly.
#[derive(Debug, Clone)]
pub struct Accumulated<T> {
    pub value: T,
    pub errors: ErrorList,
}

impl<T> Accumulated<T> {
    pub fn clean(value: T) -> Self {
        Self { value, errors: ErrorList::new() }
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Strict view: any accumulated error turns into `Err(Joined)`.
    pub fn into_result(self) -> Result<T, GraphError> {
        self.errors.into_result()?;
        Ok(self.value)
    }
}
