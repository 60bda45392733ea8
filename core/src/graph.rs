use std::collections::{BTreeMap, HashMap};

use crate::cursor::{BoxCursor, SliceCursor};
use crate::error::GraphError;
use crate::matrix::MapMatrix;
use crate::model::{Link, Neighborhood, Node};

/// Mutable adjacency engine.
///
/// Absence is never an error here: mutations on unknown nodes or links are
/// no-ops and lookups answer `None`. The `Result` returns exist for engines
/// backed by a fallible store.
pub trait Graph<N: Node, L: Link<N>> {
    /// Insert `node` unless a same node is already present.
    fn add_node(&mut self, node: N);

    /// Insert `link` and its endpoints. A same link already stored changes
    /// nothing, counters included.
    fn add_link(&mut self, link: L);

    fn remove_link(&mut self, link: &L);

    /// Remove `node` with every link touching it.
    fn remove_node(&mut self, node: &N);

    fn has_link(&self, link: &L) -> bool;

    /// One emission per live node, in no particular order.
    fn all_nodes(&self) -> Result<BoxCursor<'_, N>, GraphError>;

    /// `None` when `node` is not in the graph.
    fn neighbors(&self, node: &N) -> Result<Option<Neighborhood<'_, N, L>>, GraphError>;

    fn node_count(&self) -> usize;

    /// Each undirected link counts once.
    fn link_count(&self) -> usize;
}

/// Arena assigning dense indices to nodes, with one record per node.
///
/// Nodes are located by linear `same_node` scans. A freed slot is never
/// handed out again; contiguous numbering is only produced on demand by
/// [`IndexMapping::compaction`].
#[derive(Debug, Clone)]
pub(crate) struct IndexMapping<N, R> {
    slots: Vec<Option<(N, R)>>,
    live: usize,
}

impl<N: Node, R> IndexMapping<N, R> {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new(), live: 0 }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { slots: Vec::with_capacity(capacity), live: 0 }
    }

    pub(crate) fn index_of(&self, node: &N) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some((n, _)) if n.same_node(node)))
    }

    /// Index of `node`, assigning the next one with a fresh record if needed.
    pub(crate) fn ensure(&mut self, node: N, record: impl FnOnce() -> R) -> usize {
        if let Some(index) = self.index_of(&node) {
            return index;
        }
        self.slots.push(Some((node, record())));
        self.live += 1;
        self.slots.len() - 1
    }

    pub(crate) fn remove(&mut self, node: &N) -> Option<(usize, N, R)> {
        let index = self.index_of(node)?;
        let (node, record) = self.slots[index].take()?;
        self.live -= 1;
        Some((index, node, record))
    }

    pub(crate) fn get(&self, index: usize) -> Option<(&N, &R)> {
        self.slots
            .get(index)
            .and_then(|slot| slot.as_ref())
            .map(|(n, r)| (n, r))
    }

    pub(crate) fn record_mut(&mut self, index: usize) -> Option<&mut R> {
        self.slots
            .get_mut(index)
            .and_then(|slot| slot.as_mut())
            .map(|(_, r)| r)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &N, &R)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|(n, r)| (i, n, r)))
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = (usize, &mut R)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|(_, r)| (i, r)))
    }

    pub(crate) fn nodes(&self) -> Vec<N> {
        self.iter().map(|(_, n, _)| n.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Live nodes in index order and the arena index -> contiguous index map.
    pub(crate) fn compaction(&self) -> (Vec<N>, HashMap<usize, usize>) {
        let mut nodes = Vec::with_capacity(self.live);
        let mut renumbering = HashMap::with_capacity(self.live);
        for (index, node, _) in self.iter() {
            renumbering.insert(index, nodes.len());
            nodes.push(node.clone());
        }
        (nodes, renumbering)
    }
}

/// Per-node adjacency: degree counters plus links grouped by the index of the
/// node across the link.
#[derive(Debug, Clone)]
struct AdjacencyRecord<L> {
    incoming: usize,
    outgoing: usize,
    undirected: usize,
    links: BTreeMap<usize, Vec<L>>,
    /// Index -> number of directed links it sends here.
    sources: BTreeMap<usize, usize>,
}

impl<L> AdjacencyRecord<L> {
    fn new() -> Self {
        Self {
            incoming: 0,
            outgoing: 0,
            undirected: 0,
            links: BTreeMap::new(),
            sources: BTreeMap::new(),
        }
    }
}

/// Sparse adjacency engine.
///
/// A directed link A→B lives in A's record under B. An undirected link A–B
/// lives in both records, so either endpoint lists it without a second
/// structure. B also indexes A as a source, which is how links arriving at
/// B are found. Counters are updated on every mutation.
#[derive(Debug, Clone)]
pub struct MapGraph<N, L> {
    mapping: IndexMapping<N, AdjacencyRecord<L>>,
}

impl<N: Node, L: Link<N>> MapGraph<N, L> {
    pub fn new() -> Self {
        Self { mapping: IndexMapping::new() }
    }

    /// Pre-allocate for a known node count.
    pub fn with_capacity(node_count: usize) -> Self {
        Self { mapping: IndexMapping::with_capacity(node_count) }
    }

    /// Project every linked ordered pair to a value.
    ///
    /// Returns the live nodes in row order and a matrix over contiguous
    /// indices; cells without links hold `project(&[])`.
    pub fn to_matrix<S, F>(&self, project: F) -> (Vec<N>, MapMatrix<S>)
    where
        S: Clone,
        F: Fn(&[L]) -> S,
    {
        let (nodes, renumbering) = self.mapping.compaction();
        let mut matrix = MapMatrix::new(nodes.len(), project(&[]));
        for (index, _, record) in self.mapping.iter() {
            let Some(&line) = renumbering.get(&index) else {
                continue;
            };
            for (other, links) in &record.links {
                if let Some(&column) = renumbering.get(other) {
                    matrix.put(line, column, project(links));
                }
            }
        }
        (nodes, matrix)
    }

    fn record_mut(&mut self, index: usize) -> Option<&mut AdjacencyRecord<L>> {
        self.mapping.record_mut(index)
    }

    /// Remove the stored link same as `link` from record `from` under `to`.
    fn take_link(&mut self, from: usize, to: usize, link: &L) -> bool {
        let Some(record) = self.record_mut(from) else {
            return false;
        };
        let Some(links) = record.links.get_mut(&to) else {
            return false;
        };
        let Some(position) = links.iter().position(|l| l.same_link(link)) else {
            return false;
        };
        links.remove(position);
        if links.is_empty() {
            record.links.remove(&to);
        }
        true
    }
}

impl<N: Node, L: Link<N>> Default for MapGraph<N, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Node, L: Link<N>> Graph<N, L> for MapGraph<N, L> {
    fn add_node(&mut self, node: N) {
        self.mapping.ensure(node, AdjacencyRecord::new);
    }

    fn add_link(&mut self, link: L) {
        if self.has_link(&link) {
            return;
        }

        let source = self.mapping.ensure(link.source().clone(), AdjacencyRecord::new);
        let destination = self.mapping.ensure(link.destination().clone(), AdjacencyRecord::new);
        let directed = link.is_directed();

        if let Some(record) = self.record_mut(destination) {
            if directed {
                record.incoming += 1;
                *record.sources.entry(source).or_default() += 1;
            } else {
                record.undirected += 1;
                if source != destination {
                    record.links.entry(source).or_default().push(link.clone());
                }
            }
        }
        if let Some(record) = self.record_mut(source) {
            if directed {
                record.outgoing += 1;
            } else {
                record.undirected += 1;
            }
            record.links.entry(destination).or_default().push(link);
        }
    }

    fn remove_link(&mut self, link: &L) {
        let (Some(source), Some(destination)) = (
            self.mapping.index_of(link.source()),
            self.mapping.index_of(link.destination()),
        ) else {
            return;
        };

        if !self.take_link(source, destination, link) {
            return;
        }

        if link.is_directed() {
            if let Some(record) = self.record_mut(source) {
                record.outgoing -= 1;
            }
            if let Some(record) = self.record_mut(destination) {
                record.incoming -= 1;
                if let Some(count) = record.sources.get_mut(&source) {
                    *count -= 1;
                    if *count == 0 {
                        record.sources.remove(&source);
                    }
                }
            }
        } else {
            if source != destination {
                self.take_link(destination, source, link);
            }
            if let Some(record) = self.record_mut(source) {
                record.undirected -= 1;
            }
            if let Some(record) = self.record_mut(destination) {
                record.undirected -= 1;
            }
        }
    }

    fn remove_node(&mut self, node: &N) {
        let Some((removed, _, record)) = self.mapping.remove(node) else {
            return;
        };

        // Links stored by others under the removed index: directed links
        // pointing at it and mirrors of its undirected links.
        for (_, other) in self.mapping.records_mut() {
            other.sources.remove(&removed);
            if let Some(links) = other.links.remove(&removed) {
                for link in links {
                    if link.is_directed() {
                        other.outgoing -= 1;
                    } else {
                        other.undirected -= 1;
                    }
                }
            }
        }

        // Its own directed links were counted as incoming on the other side.
        for (destination, links) in record.links {
            if destination == removed {
                continue;
            }
            let outgoing = links.iter().filter(|l| l.is_directed()).count();
            if let Some(other) = self.record_mut(destination) {
                other.incoming -= outgoing;
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
        self.mapping
            .get(source)
            .and_then(|(_, record)| record.links.get(&destination))
            .is_some_and(|links| links.iter().any(|l| l.same_link(link)))
    }

    fn all_nodes(&self) -> Result<BoxCursor<'_, N>, GraphError> {
        Ok(Box::new(SliceCursor::new(self.mapping.nodes())))
    }

    fn neighbors(&self, node: &N) -> Result<Option<Neighborhood<'_, N, L>>, GraphError> {
        let Some(index) = self.mapping.index_of(node) else {
            return Ok(None);
        };
        let Some((center, record)) = self.mapping.get(index) else {
            return Ok(None);
        };
        let hood = Neighborhood::new(
            center.clone(),
            record.incoming,
            record.outgoing,
            record.undirected,
            move || Box::new(record.links.values().flatten().cloned().collect::<SliceCursor<L>>()),
        )
        .with_incoming_links(move || {
            let arriving = record
                .sources
                .keys()
                .filter_map(|source| self.mapping.get(*source))
                .filter_map(|(_, sender)| sender.links.get(&index))
                .flatten()
                .filter(|link| link.is_directed())
                .cloned();
            Box::new(arriving.collect::<SliceCursor<L>>())
        });
        Ok(Some(hood))
    }

    fn node_count(&self) -> usize {
        self.mapping.len()
    }

    fn link_count(&self) -> usize {
        let (directed, undirected) = self
            .mapping
            .iter()
            .fold((0, 0), |(d, u), (_, _, r)| (d + r.outgoing, u + r.undirected));
        directed + undirected / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::collect;
    use crate::model::{DirectedLink, IdNode, UndirectedLink, ValuedLink};

    type Undirected = MapGraph<IdNode, UndirectedLink<IdNode>>;
    type Directed = MapGraph<IdNode, DirectedLink<IdNode>>;

    fn node(id: &str) -> IdNode {
        IdNode::new(id)
    }

    fn edge(a: &str, b: &str) -> UndirectedLink<IdNode> {
        UndirectedLink::new(node(a), node(b))
    }

    fn arc(a: &str, b: &str) -> DirectedLink<IdNode> {
        DirectedLink::new(node(a), node(b))
    }

    /// Undirected chain n0 - n1 - ... - n(len-1).
    fn make_chain(len: usize) -> Undirected {
        let mut g = Undirected::new();
        for i in 1..len {
            g.add_link(edge(&format!("n{}", i - 1), &format!("n{}", i)));
        }
        g
    }

    /// Directed star: center -> leaf0..leafN.
    fn make_star(leaves: usize) -> Directed {
        let mut g = Directed::new();
        for i in 0..leaves {
            g.add_link(arc("center", &format!("leaf{}", i)));
        }
        g
    }

    fn degrees<L: Link<IdNode>>(g: &MapGraph<IdNode, L>, id: &str) -> (usize, usize, usize) {
        let hood = g.neighbors(&node(id)).unwrap().unwrap();
        (hood.incoming_degree(), hood.outgoing_degree(), hood.undirected_degree())
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let mut g = Undirected::new();
        g.add_node(node("a"));
        g.add_node(node("a"));
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.link_count(), 0);
    }

    #[test]
    fn test_isolated_versus_absent() {
        let mut g = Undirected::new();
        g.add_node(node("solo"));

        let hood = g.neighbors(&node("solo")).unwrap().unwrap();
        assert!(hood.is_isolated());
        assert!(collect(&mut hood.links()).unwrap().is_empty());

        assert!(g.neighbors(&node("ghost")).unwrap().is_none());
    }

    #[test]
    fn test_undirected_link_visible_from_both_ends() {
        let g = make_chain(2);
        assert_eq!(degrees(&g, "n0"), (0, 0, 1));
        assert_eq!(degrees(&g, "n1"), (0, 0, 1));

        let from_n1 = collect(&mut g.neighbors(&node("n1")).unwrap().unwrap().links()).unwrap();
        assert_eq!(from_n1.len(), 1);
        assert!(from_n1[0].same_link(&edge("n1", "n0")));
        assert!(g.has_link(&edge("n1", "n0")));
        assert_eq!(g.link_count(), 1);
    }

    #[test]
    fn test_directed_counters() {
        let g = make_star(3);
        assert_eq!(degrees(&g, "center"), (0, 3, 0));
        assert_eq!(degrees(&g, "leaf1"), (1, 0, 0));
        assert!(g.has_link(&arc("center", "leaf0")));
        assert!(!g.has_link(&arc("leaf0", "center")));
        assert_eq!(g.link_count(), 3);

        // Incoming links are not part of the outward view.
        let leaf = g.neighbors(&node("leaf0")).unwrap().unwrap();
        assert!(!leaf.is_isolated());
        assert!(collect(&mut leaf.links()).unwrap().is_empty());
        let arriving = collect(&mut leaf.incoming_links()).unwrap();
        assert_eq!(arriving.len(), 1);
        assert!(arriving[0].same_link(&arc("center", "leaf0")));

        let center = g.neighbors(&node("center")).unwrap().unwrap();
        assert!(collect(&mut center.incoming_links()).unwrap().is_empty());
    }

    #[test]
    fn test_incoming_links_follow_removals() {
        let mut g = Directed::new();
        g.add_link(arc("a", "c"));
        g.add_link(arc("b", "c"));
        g.add_link(arc("c", "a"));

        let incoming = |g: &Directed, id: &str| {
            let hood = g.neighbors(&node(id)).unwrap().unwrap();
            let mut sources: Vec<String> = collect(&mut hood.incoming_links())
                .unwrap()
                .iter()
                .map(|l| l.source().id().to_string())
                .collect();
            sources.sort();
            sources
        };
        assert_eq!(incoming(&g, "c"), vec!["a", "b"]);
        assert_eq!(incoming(&g, "a"), vec!["c"]);

        g.remove_link(&arc("a", "c"));
        assert_eq!(incoming(&g, "c"), vec!["b"]);

        g.remove_node(&node("b"));
        assert!(incoming(&g, "c").is_empty());
        g.remove_node(&node("c"));
        assert!(incoming(&g, "a").is_empty());
    }

    #[test]
    fn test_undirected_links_are_not_incoming() {
        let g = make_chain(3);
        let hood = g.neighbors(&node("n1")).unwrap().unwrap();
        assert!(collect(&mut hood.incoming_links()).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_link_changes_nothing() {
        let mut g = make_chain(2);
        g.add_link(edge("n0", "n1"));
        g.add_link(edge("n1", "n0"));
        assert_eq!(degrees(&g, "n0"), (0, 0, 1));
        assert_eq!(degrees(&g, "n1"), (0, 0, 1));
        assert_eq!(g.link_count(), 1);
    }

    #[test]
    fn test_parallel_links_with_distinct_values() {
        let mut g = MapGraph::<IdNode, ValuedLink<IdNode, u32>>::new();
        g.add_link(ValuedLink::directed(node("a"), node("b"), 1));
        g.add_link(ValuedLink::directed(node("a"), node("b"), 2));
        g.add_link(ValuedLink::directed(node("a"), node("b"), 1));
        assert_eq!(degrees(&g, "a"), (0, 2, 0));
        assert_eq!(degrees(&g, "b"), (2, 0, 0));

        g.remove_link(&ValuedLink::directed(node("a"), node("b"), 1));
        assert_eq!(degrees(&g, "a"), (0, 1, 0));
        assert_eq!(degrees(&g, "b"), (1, 0, 0));
    }

    #[test]
    fn test_remove_link() {
        let mut g = make_chain(3);
        g.remove_link(&edge("n2", "n1"));
        assert_eq!(degrees(&g, "n1"), (0, 0, 1));
        assert_eq!(degrees(&g, "n2"), (0, 0, 0));
        assert!(!g.has_link(&edge("n1", "n2")));

        // Absent link, absent endpoint: no-ops.
        g.remove_link(&edge("n2", "n1"));
        g.remove_link(&edge("n0", "ghost"));
        assert_eq!(degrees(&g, "n0"), (0, 0, 1));
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn test_remove_node_updates_neighbors() {
        let mut g = make_chain(3);
        g.remove_node(&node("n1"));
        assert!(g.neighbors(&node("n1")).unwrap().is_none());
        assert_eq!(degrees(&g, "n0"), (0, 0, 0));
        assert_eq!(degrees(&g, "n2"), (0, 0, 0));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.link_count(), 0);

        g.remove_node(&node("ghost"));
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn test_remove_node_directed_both_ways() {
        let mut g = Directed::new();
        g.add_link(arc("a", "b"));
        g.add_link(arc("b", "c"));
        g.add_link(arc("c", "b"));

        g.remove_node(&node("b"));
        assert_eq!(degrees(&g, "a"), (0, 0, 0));
        assert_eq!(degrees(&g, "c"), (0, 0, 0));
        assert_eq!(g.link_count(), 0);
    }

    #[test]
    fn test_self_loops() {
        let mut g = Undirected::new();
        g.add_link(edge("a", "a"));
        assert_eq!(degrees(&g, "a"), (0, 0, 2));
        assert_eq!(g.link_count(), 1);
        {
            let hood = g.neighbors(&node("a")).unwrap().unwrap();
            assert_eq!(collect(&mut hood.links()).unwrap().len(), 1);
        }
        g.remove_link(&edge("a", "a"));
        assert_eq!(degrees(&g, "a"), (0, 0, 0));

        let mut d = Directed::new();
        d.add_link(arc("a", "a"));
        assert_eq!(degrees(&d, "a"), (1, 1, 0));
        d.remove_node(&node("a"));
        assert_eq!(d.node_count(), 0);
    }

    #[test]
    fn test_all_nodes_after_removal() {
        let mut g = make_chain(4);
        g.remove_node(&node("n2"));
        let mut ids: Vec<String> = collect(&mut g.all_nodes().unwrap())
            .unwrap()
            .into_iter()
            .map(|n| n.id().to_string())
            .collect();
        ids.sort();
        assert_eq!(ids, vec!["n0", "n1", "n3"]);
    }

    #[test]
    fn test_to_matrix_renumbers_after_removal() {
        let mut g = make_chain(4);
        g.remove_node(&node("n0"));
        let (nodes, matrix) = g.to_matrix(|links| links.len());
        assert_eq!(matrix.size(), 3);
        assert_eq!(nodes.iter().map(IdNode::id).collect::<Vec<_>>(), vec!["n1", "n2", "n3"]);
        assert_eq!(matrix.get(0, 1), Ok(1));
        assert_eq!(matrix.get(1, 0), Ok(1));
        assert_eq!(matrix.get(1, 2), Ok(1));
        assert_eq!(matrix.get(0, 2), Ok(0));
    }

    #[test]
    fn test_to_matrix_empty_graph() {
        let g = Directed::new();
        let (nodes, matrix) = g.to_matrix(|links| !links.is_empty());
        assert!(nodes.is_empty());
        assert_eq!(matrix.size(), 0);
    }

    #[test]
    fn test_slot_not_reused_after_removal() {
        let mut g = Undirected::new();
        g.add_node(node("a"));
        g.add_node(node("b"));
        g.remove_node(&node("a"));
        g.add_node(node("c"));
        assert_eq!(g.mapping.index_of(&node("b")), Some(1));
        assert_eq!(g.mapping.index_of(&node("c")), Some(2));
    }
}
