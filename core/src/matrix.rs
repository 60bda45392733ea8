//! Square sparse matrix used for graph projections.

use std::collections::HashMap;

use crate::cursor::IndexedCursor;
use crate::error::GraphError;

/// Square matrix stored as a map of lines, each a map of columns.
/// Unset cells read as the default value.
#[derive(Debug, Clone)]
pub struct MapMatrix<V> {
    size: usize,
    default: V,
    lines: HashMap<usize, HashMap<usize, V>>,
}

impl<V: Clone> MapMatrix<V> {
    pub fn new(size: usize, default: V) -> Self {
        Self {
            size,
            default,
            lines: HashMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    pub fn set(&mut self, line: usize, column: usize, value: V) -> Result<(), GraphError> {
        self.check(line)?;
        self.check(column)?;
        self.put(line, column, value);
        Ok(())
    }

    pub fn get(&self, line: usize, column: usize) -> Result<V, GraphError> {
        self.check(line)?;
        self.check(column)?;
        Ok(self
            .lines
            .get(&line)
            .and_then(|columns| columns.get(&column))
            .unwrap_or(&self.default)
            .clone())
    }

    /// Cursor over `line`, one value per column.
    pub fn line(&self, line: usize) -> Result<IndexedCursor<V>, GraphError> {
        self.check(line)?;
        let values = self.lines.get(&line).cloned().unwrap_or_default();
        Ok(IndexedCursor::new(self.size - 1, values, self.default.clone()))
    }

    /// Cursor over `column`, one value per line.
    pub fn column(&self, column: usize) -> Result<IndexedCursor<V>, GraphError> {
        self.check(column)?;
        let values = self
            .lines
            .iter()
            .filter_map(|(&line, columns)| columns.get(&column).map(|v| (line, v.clone())))
            .collect();
        Ok(IndexedCursor::new(self.size - 1, values, self.default.clone()))
    }

    /// Number of explicitly set cells.
    pub fn stored_len(&self) -> usize {
        self.lines.values().map(HashMap::len).sum()
    }

    /// Unchecked write; callers guarantee both indices are below `size`.
    pub(crate) fn put(&mut self, line: usize, column: usize, value: V) {
        self.lines.entry(line).or_default().insert(column, value);
    }

    fn check(&self, index: usize) -> Result<(), GraphError> {
        if index < self.size {
            Ok(())
        } else {
            Err(GraphError::IndexOutOfBounds { index, size: self.size })
        }
    }
}
