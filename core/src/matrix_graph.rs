//! Dense adjacency engine.
//!
//! Links are stored once per unordered index pair `(min, max)`. Each entry
//! remembers whether it runs from `min` to `max`, which is all a directed
//! link needs; undirected entries are read from both ends.

use std::collections::HashMap;

use crate::cursor::{BoxCursor, SliceCursor};
use crate::error::GraphError;
use crate::graph::{Graph, IndexMapping};
use crate::matrix::MapMatrix;
use crate::model::{Link, Neighborhood, Node};

#[derive(Debug, Clone, Copy, Default)]
struct Degrees {
    incoming: usize,
    outgoing: usize,
    undirected: usize,
}

#[derive(Debug, Clone)]
struct Entry<L> {
    link: L,
    /// Stored orientation runs from the lower index to the higher one.
    forward: bool,
}

impl<L> Entry<L> {
    /// Index the link leaves from, given its cell.
    fn origin(&self, cell: (usize, usize)) -> usize {
        if self.forward {
            cell.0
        } else {
            cell.1
        }
    }

    /// Index the link arrives at, given its cell.
    fn target(&self, cell: (usize, usize)) -> usize {
        if self.forward {
            cell.1
        } else {
            cell.0
        }
    }
}

fn cell(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Matrix-shaped engine for small or dense graphs.
#[derive(Debug, Clone)]
pub struct MatrixGraph<N, L> {
    mapping: IndexMapping<N, Degrees>,
    cells: HashMap<(usize, usize), Vec<Entry<L>>>,
}

impl<N: Node, L: Link<N>> MatrixGraph<N, L> {
    pub fn new() -> Self {
        Self {
            mapping: IndexMapping::new(),
            cells: HashMap::new(),
        }
    }

    /// Same projection as [`crate::MapGraph::to_matrix`]: undirected links
    /// fill both cells of their pair, directed links only their own.
    pub fn to_matrix<S, F>(&self, project: F) -> (Vec<N>, MapMatrix<S>)
    where
        S: Clone,
        F: Fn(&[L]) -> S,
    {
        let (nodes, renumbering) = self.mapping.compaction();
        let mut grouped: HashMap<(usize, usize), Vec<L>> = HashMap::new();
        for (&key, entries) in &self.cells {
            let (Some(&low), Some(&high)) = (renumbering.get(&key.0), renumbering.get(&key.1))
            else {
                continue;
            };
            for entry in entries {
                if entry.link.is_directed() {
                    let pair = if entry.forward { (low, high) } else { (high, low) };
                    grouped.entry(pair).or_default().push(entry.link.clone());
                } else {
                    grouped.entry((low, high)).or_default().push(entry.link.clone());
                    if low != high {
                        grouped.entry((high, low)).or_default().push(entry.link.clone());
                    }
                }
            }
        }

        let mut matrix = MapMatrix::new(nodes.len(), project(&[]));
        for ((line, column), links) in grouped {
            matrix.put(line, column, project(&links));
        }
        (nodes, matrix)
    }

    fn degrees_mut(&mut self, index: usize) -> Option<&mut Degrees> {
        self.mapping.record_mut(index)
    }

    /// Links in the cells of `index` accepted by `keep`.
    fn links_at<F>(&self, index: usize, keep: F) -> Vec<L>
    where
        F: Fn(&Entry<L>, (usize, usize)) -> bool,
    {
        let mut links = Vec::new();
        for (other, _, _) in self.mapping.iter() {
            let key = cell(index, other);
            let Some(entries) = self.cells.get(&key) else {
                continue;
            };
            links.extend(entries.iter().filter(|e| keep(e, key)).map(|e| e.link.clone()));
        }
        links
    }

    /// Links readable from `index`: its outgoing directed and undirected ones.
    fn links_from(&self, index: usize) -> Vec<L> {
        self.links_at(index, |e, key| !e.link.is_directed() || e.origin(key) == index)
    }

    /// Directed links arriving at `index`.
    fn links_to(&self, index: usize) -> Vec<L> {
        self.links_at(index, |e, key| e.link.is_directed() && e.target(key) == index)
    }
}

impl<N: Node, L: Link<N>> Default for MatrixGraph<N, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node, L: Link<N>> Graph<N, L> for MatrixGraph<N, L> {
    fn add_node(&mut self, node: N) {
        self.mapping.ensure(node, Degrees::default);
    }

    fn add_link(&mut self, link: L) {
        if self.has_link(&link) {
            return;
        }

        let source = self.mapping.ensure(link.source().clone(), Degrees::default);
        let destination = self.mapping.ensure(link.destination().clone(), Degrees::default);
        let directed = link.is_directed();

        if let Some(d) = self.degrees_mut(source) {
            if directed {
                d.outgoing += 1;
            } else {
                d.undirected += 1;
            }
        }
        if let Some(d) = self.degrees_mut(destination) {
            if directed {
                d.incoming += 1;
            } else {
                d.undirected += 1;
            }
        }

        self.cells
            .entry(cell(source, destination))
            .or_default()
            .push(Entry { link, forward: source <= destination });
    }

    fn remove_link(&mut self, link: &L) {
        let (Some(source), Some(destination)) = (
            self.mapping.index_of(link.source()),
            self.mapping.index_of(link.destination()),
        ) else {
            return;
        };

        let key = cell(source, destination);
        let Some(entries) = self.cells.get_mut(&key) else {
            return;
        };
        let Some(position) = entries.iter().position(|e| e.link.same_link(link)) else {
            return;
        };
        entries.remove(position);
        if entries.is_empty() {
            self.cells.remove(&key);
        }

        let directed = link.is_directed();
        if let Some(d) = self.degrees_mut(source) {
            if directed {
                d.outgoing -= 1;
            } else {
                d.undirected -= 1;
            }
        }
        if let Some(d) = self.degrees_mut(destination) {
            if directed {
                d.incoming -= 1;
            } else {
                d.undirected -= 1;
            }
        }
    }

    fn remove_node(&mut self, node: &N) {
        let Some((removed, _, _)) = self.mapping.remove(node) else {
            return;
        };

        let touching: Vec<(usize, usize)> = self
            .cells
            .keys()
            .filter(|(low, high)| *low == removed || *high == removed)
            .copied()
            .collect();

        for key in touching {
            let Some(entries) = self.cells.remove(&key) else {
                continue;
            };
            let other = if key.0 == removed { key.1 } else { key.0 };
            if other == removed {
                continue;
            }
            for entry in entries {
                let from_removed = entry.origin(key) == removed;
                let directed = entry.link.is_directed();
                if let Some(d) = self.degrees_mut(other) {
                    match (directed, from_removed) {
                        (false, _) => d.undirected -= 1,
                        (true, true) => d.incoming -= 1,
                        (true, false) => d.outgoing -= 1,
                    }
                }
            }
        }
    }

    fn has_link(&self, link: &L) -> bool {
        let (Some(source), Some(destination)) = (
            self.mapping.index_of(link.source()),
            self.mapping.index_of(link.destination()),
        ) else {
            return false;
        };
        self.cells
            .get(&cell(source, destination))
            .is_some_and(|entries| entries.iter().any(|e| e.link.same_link(link)))
    }

    fn all_nodes(&self) -> Result<BoxCursor<'_, N>, GraphError> {
        Ok(Box::new(SliceCursor::new(self.mapping.nodes())))
    }

    fn neighbors(&self, node: &N) -> Result<Option<Neighborhood<'_, N, L>>, GraphError> {
        let Some(index) = self.mapping.index_of(node) else {
            return Ok(None);
        };
        let Some((center, degrees)) = self.mapping.get(index) else {
            return Ok(None);
        };
        let hood = Neighborhood::new(
            center.clone(),
            degrees.incoming,
            degrees.outgoing,
            degrees.undirected,
            move || Box::new(SliceCursor::new(self.links_from(index))),
        )
        .with_incoming_links(move || Box::new(SliceCursor::new(self.links_to(index))));
        Ok(Some(hood))
    }

    fn node_count(&self) -> usize {
        self.mapping.len()
    }

    fn link_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }
}
