use tracing::{debug, warn};

use crate::composite::GrowableCursor;
use crate::cursor::{BoxCursor, Cursor, EmptyCursor, MapFilterCursor};
use crate::error::{Accumulated, ErrorList, GraphError};
use crate::graph::Graph;
use crate::model::{Link, Neighborhood, Node};
use crate::set::{AbstractSet, SetEquals};

/// One connected component: a node from it and its node count.
#[derive(Debug, Clone)]
pub struct ComponentSize<N> {
    pub representative: N,
    pub size: usize,
}

/// Drain `cursor` into `sink`, recording element errors in `errors`.
///
/// A failing `advance` ends the drain, a failing `current` only skips that
/// element.
fn drain_into<C, F>(cursor: &mut C, errors: &mut ErrorList, mut sink: F)
where
    C: Cursor + ?Sized,
    F: FnMut(C::Item, &mut ErrorList),
{
    loop {
        match cursor.advance() {
            Ok(true) => {}
            Ok(false) => return,
            Err(err) => {
                errors.push(err);
                return;
            }
        }
        match cursor.current() {
            Ok(value) => sink(value, errors),
            Err(err) => errors.push(err),
        }
    }
}

/// Size every connected component of `graph` with a breadth-first walk.
///
/// `new_set` builds the set of nodes still to visit from the node equality;
/// `new_queue` builds the work queue of each walk. Failing to build either,
/// or to enumerate the graph, aborts. Errors met on single elements are
/// returned next to the components found.
///
/// Walks cross directed links both ways, so on directed graphs the result is
/// the weakly connected components and does not depend on the set or on the
/// order nodes are picked in.
pub fn connected_components_size<N, L, G, S, Q, FS, FQ>(
    graph: &G,
    new_set: FS,
    mut new_queue: FQ,
) -> Result<Accumulated<Vec<ComponentSize<N>>>, GraphError>
where
    N: Node,
    L: Link<N>,
    G: Graph<N, L> + ?Sized,
    S: AbstractSet<N>,
    Q: GrowableCursor<Item = N>,
    FS: FnOnce(SetEquals<N>) -> Result<S, GraphError>,
    FQ: FnMut() -> Result<Q, GraphError>,
{
    let mut errors = ErrorList::new();
    let mut unvisited = new_set(N::same_node)?;
    let mut nodes = graph.all_nodes()?;
    drain_into(&mut nodes, &mut errors, |node, errors| {
        if let Err(err) = unvisited.add(node) {
            errors.push(err);
        }
    });

    let mut components = Vec::new();
    loop {
        let start = match unvisited.peek() {
            Ok(Some(node)) => node,
            Ok(None) => break,
            Err(err) => {
                errors.push(err);
                break;
            }
        };

        let mut queue = new_queue()?;
        let mut size = 0;
        match queue.push_last(start.clone()) {
            Ok(()) => size = walk_component(graph, &mut unvisited, &mut queue, &mut errors),
            Err(err) => errors.push(err),
        }

        // Guarantees progress even if the walk never dequeued its start.
        if matches!(unvisited.has(&start), Ok(true)) {
            if let Err(err) = unvisited.remove(&start) {
                errors.push(err);
                break;
            }
        }

        if size > 0 {
            components.push(ComponentSize { representative: start, size });
        }
    }

    debug!(components = components.len(), errors = errors.len(), "connected components sized");
    if !errors.is_empty() {
        warn!(errors = errors.len(), "component sizing finished with element errors");
    }
    Ok(Accumulated { value: components, errors })
}

/// Breadth-first walk from the queued start; returns how many nodes it
/// visited. A node is marked visited when dequeued, so one queued twice is
/// skipped the second time.
fn walk_component<N, L, G, S, Q>(
    graph: &G,
    unvisited: &mut S,
    queue: &mut Q,
    errors: &mut ErrorList,
) -> usize
where
    N: Node,
    L: Link<N>,
    G: Graph<N, L> + ?Sized,
    S: AbstractSet<N>,
    Q: GrowableCursor<Item = N>,
{
    let mut size = 0;
    loop {
        match queue.advance() {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                errors.push(err);
                break;
            }
        }
        let node = match queue.current() {
            Ok(node) => node,
            Err(err) => {
                errors.push(err);
                continue;
            }
        };

        match unvisited.has(&node) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                errors.push(err);
                continue;
            }
        }
        if let Err(err) = unvisited.remove(&node) {
            errors.push(err);
            continue;
        }
        size += 1;

        let hood = match graph.neighbors(&node) {
            Ok(Some(hood)) => hood,
            Ok(None) => {
                errors.push(GraphError::MissingNeighborhood);
                continue;
            }
            Err(err) => {
                errors.push(err);
                continue;
            }
        };

        for mut links in [hood.links(), hood.incoming_links()] {
            drain_into(&mut links, errors, |link, errors| {
                let other = link.opposite(&node);
                match unvisited.has(other) {
                    Ok(true) => {
                        if let Err(err) = queue.push_last(other.clone()) {
                            errors.push(err);
                        }
                    }
                    Ok(false) => {}
                    Err(err) => errors.push(err),
                }
            });
        }
    }
    size
}

/// Neighborhoods of the nodes one link away from `origin`, skipping those
/// that are isolated.
///
/// `None` when `origin` is not in the graph; an empty cursor when it is
/// isolated. A link endpoint without a neighborhood surfaces as an error
/// from the returned cursor, joined with any others met before a match.
pub fn destination_neighbors<'a, N, L, G>(
    origin: &N,
    graph: &'a G,
) -> Result<Option<BoxCursor<'a, Neighborhood<'a, N, L>>>, GraphError>
where
    N: Node + 'a,
    L: Link<N> + 'a,
    G: Graph<N, L> + ?Sized,
{
    let Some(hood) = graph.neighbors(origin)? else {
        return Ok(None);
    };
    if hood.is_isolated() {
        return Ok(Some(Box::new(EmptyCursor::new())));
    }

    let center = hood.center().clone();
    let mapper = move |link: L| -> Result<Neighborhood<'a, N, L>, GraphError> {
        graph
            .neighbors(link.opposite(&center))?
            .ok_or(GraphError::MissingNeighborhood)
    };
    let linked = |neighborhood: &Neighborhood<'a, N, L>| !neighborhood.is_isolated();

    Ok(Some(Box::new(MapFilterCursor::new(hood.links(), mapper, Some(linked)))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::DynamicCursor;
    use crate::cursor::collect;
    use crate::graph::MapGraph;
    use crate::matrix_graph::MatrixGraph;
    use crate::model::{DirectedLink, IdNode, UndirectedLink};
    use crate::set::{HashedSet, SliceSet};
    use crate::test_support::UnreadableNode;

    type Undirected = MapGraph<IdNode, UndirectedLink<IdNode>>;

    fn node(id: &str) -> IdNode {
        IdNode::new(id)
    }

    fn edge(a: &str, b: &str) -> UndirectedLink<IdNode> {
        UndirectedLink::new(node(a), node(b))
    }

    /// One isolated node, a 3-node path and a 4-node cycle.
    fn make_clusters<G: Graph<IdNode, UndirectedLink<IdNode>>>(g: &mut G) {
        g.add_node(node("alone"));
        g.add_link(edge("p0", "p1"));
        g.add_link(edge("p1", "p2"));
        g.add_link(edge("c0", "c1"));
        g.add_link(edge("c1", "c2"));
        g.add_link(edge("c2", "c3"));
        g.add_link(edge("c3", "c0"));
    }

    fn sorted_sizes<L: Link<IdNode>>(g: &impl Graph<IdNode, L>) -> Vec<usize> {
        let result = connected_components_size(
            g,
            |equals| Ok(SliceSet::new(equals)),
            || Ok(DynamicCursor::new()),
        )
        .unwrap();
        assert!(result.is_clean());
        let mut sizes: Vec<usize> = result.value.iter().map(|c| c.size).collect();
        sizes.sort();
        sizes
    }

    fn sorted_ids(hoods: &[Neighborhood<'_, IdNode, UndirectedLink<IdNode>>]) -> Vec<String> {
        let mut ids: Vec<String> = hoods.iter().map(|h| h.center().id().to_string()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_components_sparse() {
        let mut g = Undirected::new();
        make_clusters(&mut g);
        assert_eq!(sorted_sizes(&g), vec![1, 3, 4]);
    }

    #[test]
    fn test_components_dense() {
        let mut g = MatrixGraph::<IdNode, UndirectedLink<IdNode>>::new();
        make_clusters(&mut g);
        assert_eq!(sorted_sizes(&g), vec![1, 3, 4]);
    }

    #[test]
    fn test_components_with_hashed_set() {
        let mut g = Undirected::new();
        make_clusters(&mut g);
        let result = connected_components_size(
            &g,
            |_| Ok(HashedSet::new()),
            || Ok(DynamicCursor::new()),
        )
        .unwrap();
        assert_eq!(result.value.iter().map(|c| c.size).sum::<usize>(), 8);
        assert_eq!(result.value.len(), 3);
    }

    #[test]
    fn test_components_empty_graph() {
        let g = Undirected::new();
        assert!(sorted_sizes(&g).is_empty());
    }

    #[test]
    fn test_components_representative_belongs_to_component() {
        let mut g = Undirected::new();
        make_clusters(&mut g);
        let result = connected_components_size(
            &g,
            |equals| Ok(SliceSet::new(equals)),
            || Ok(DynamicCursor::new()),
        )
        .unwrap();
        for component in result.value {
            let id = component.representative.id().to_string();
            let expected = match id.chars().next() {
                Some('a') => 1,
                Some('p') => 3,
                _ => 4,
            };
            assert_eq!(component.size, expected, "component of {}", id);
        }
    }

    #[test]
    fn test_components_setup_failure_aborts() {
        let g = Undirected::new();
        let result = connected_components_size(
            &g,
            |_| Err::<SliceSet<IdNode>, _>(GraphError::Source("no set".into())),
            || Ok(DynamicCursor::new()),
        );
        assert!(matches!(result, Err(GraphError::Source(_))));
    }

    /// a -> b -> c plus d -> e <- f: two weak components whatever the start.
    fn make_directed<G: Graph<IdNode, DirectedLink<IdNode>>>(g: &mut G) {
        g.add_link(DirectedLink::new(node("a"), node("b")));
        g.add_link(DirectedLink::new(node("b"), node("c")));
        g.add_link(DirectedLink::new(node("d"), node("e")));
        g.add_link(DirectedLink::new(node("f"), node("e")));
    }

    fn sorted_hashed_sizes<L: Link<IdNode>>(g: &impl Graph<IdNode, L>) -> Vec<usize> {
        let result =
            connected_components_size(g, |_| Ok(HashedSet::new()), || Ok(DynamicCursor::new()))
                .unwrap();
        assert!(result.is_clean());
        let mut sizes: Vec<usize> = result.value.iter().map(|c| c.size).collect();
        sizes.sort();
        sizes
    }

    #[test]
    fn test_components_directed_chain_is_one_component() {
        let mut g = MapGraph::<IdNode, DirectedLink<IdNode>>::new();
        g.add_link(DirectedLink::new(node("a"), node("b")));
        g.add_link(DirectedLink::new(node("b"), node("c")));
        assert_eq!(sorted_sizes(&g), vec![3]);
        assert_eq!(sorted_hashed_sizes(&g), vec![3]);

        let mut d = MatrixGraph::<IdNode, DirectedLink<IdNode>>::new();
        d.add_link(DirectedLink::new(node("a"), node("b")));
        d.add_link(DirectedLink::new(node("b"), node("c")));
        assert_eq!(sorted_sizes(&d), vec![3]);
        assert_eq!(sorted_hashed_sizes(&d), vec![3]);
    }

    #[test]
    fn test_components_directed_are_weak() {
        let mut sparse = MapGraph::<IdNode, DirectedLink<IdNode>>::new();
        make_directed(&mut sparse);
        assert_eq!(sorted_sizes(&sparse), vec![3, 3]);
        assert_eq!(sorted_hashed_sizes(&sparse), vec![3, 3]);

        let mut dense = MatrixGraph::<IdNode, DirectedLink<IdNode>>::new();
        make_directed(&mut dense);
        assert_eq!(sorted_sizes(&dense), vec![3, 3]);
        assert_eq!(sorted_hashed_sizes(&dense), vec![3, 3]);
    }

    #[test]
    fn test_components_keep_going_past_unreadable_node() {
        let mut inner = Undirected::new();
        inner.add_link(edge("a", "b"));
        inner.add_link(edge("b", "c"));
        inner.add_node(node("d"));
        let g = UnreadableNode::new(inner, node("d"));

        let result = connected_components_size(
            &g,
            |equals| Ok(SliceSet::new(equals)),
            || Ok(DynamicCursor::new()),
        )
        .unwrap();
        assert_eq!(result.errors.len(), 1);
        assert!(!result.is_clean());
        let mut sizes: Vec<usize> = result.value.iter().map(|c| c.size).collect();
        sizes.sort();
        assert_eq!(sizes, vec![1, 3]);
    }

    #[test]
    fn test_destination_neighbors() {
        let mut g = Undirected::new();
        g.add_link(edge("source", "dest1"));
        g.add_link(edge("source", "dest2"));
        g.add_link(edge("dest1", "dest3"));
        g.add_node(node("isolated"));

        // Absent node.
        assert!(destination_neighbors(&node("ghost"), &g).unwrap().is_none());

        // Isolated node: empty, not absent.
        let mut empty = destination_neighbors(&node("isolated"), &g).unwrap().unwrap();
        assert_eq!(empty.advance(), Ok(false));

        let mut from_dest1 = destination_neighbors(&node("dest1"), &g).unwrap().unwrap();
        let hoods = collect(&mut from_dest1).unwrap();
        assert_eq!(sorted_ids(&hoods), vec!["dest3", "source"]);

        let mut from_source = destination_neighbors(&node("source"), &g).unwrap().unwrap();
        let hoods = collect(&mut from_source).unwrap();
        assert_eq!(sorted_ids(&hoods), vec!["dest1", "dest2"]);
        let source_degree: Vec<usize> = hoods.iter().map(|h| h.undirected_degree()).collect();
        assert!(source_degree.iter().all(|&d| d >= 1));
    }

    #[test]
    fn test_destination_neighbors_directed() {
        let mut g = MapGraph::<IdNode, DirectedLink<IdNode>>::new();
        g.add_link(DirectedLink::new(node("a"), node("b")));
        g.add_link(DirectedLink::new(node("c"), node("a")));

        let mut from_a = destination_neighbors(&node("a"), &g).unwrap().unwrap();
        let hoods = collect(&mut from_a).unwrap();
        assert_eq!(hoods.len(), 1);
        assert_eq!(hoods[0].center().id(), "b");
        assert_eq!(hoods[0].incoming_degree(), 1);

        // Only incoming links: nothing to follow.
        let mut from_b = destination_neighbors(&node("b"), &g).unwrap().unwrap();
        assert_eq!(from_b.advance(), Ok(false));
    }
}
