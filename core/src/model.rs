//! Node and link contracts, neighborhoods, and the stock node/link types.
//!
//! Nodes are compared with [`Node::same_node`], never by hashing or address:
//! two distinct values may denote the same vertex. Links carry their own
//! sameness test; undirected links must ignore orientation.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

use crate::cursor::{BoxCursor, EmptyCursor};

pub trait Node: Clone {
    /// Whether `other` denotes the same vertex.
    fn same_node(&self, other: &Self) -> bool;
}

/// Edge between two nodes. Undirected links still expose a source and a
/// destination: the orientation they were built with.
pub trait Link<N: Node>: Clone {
    fn source(&self) -> &N;
    fn destination(&self) -> &N;
    fn is_directed(&self) -> bool;

    /// For undirected links, `(a, b)` and `(b, a)` must be the same link.
    fn same_link(&self, other: &Self) -> bool;

    /// The endpoint across the link from `node`.
    fn opposite(&self, node: &N) -> &N {
        if self.source().same_node(node) {
            self.destination()
        } else {
            self.source()
        }
    }
}

/// Endpoint match for undirected links, in either orientation.
pub fn same_endpoints_unordered<N: Node>(a: (&N, &N), b: (&N, &N)) -> bool {
    (a.0.same_node(b.0) && a.1.same_node(b.1)) || (a.0.same_node(b.1) && a.1.same_node(b.0))
}

/// Degree counters of one node plus a lazily built cursor over its links.
///
/// Counters are maintained by the engine on every mutation, not derived when
/// read. The link cursor yields the links stored from the center's point of
/// view: outgoing directed links and undirected links. Directed links
/// pointing at the center have their own cursor.
pub struct Neighborhood<'g, N, L> {
    center: N,
    incoming: usize,
    outgoing: usize,
    undirected: usize,
    links: Rc<dyn Fn() -> BoxCursor<'g, L> + 'g>,
    incoming_links: Rc<dyn Fn() -> BoxCursor<'g, L> + 'g>,
}

impl<'g, N, L: 'g> Neighborhood<'g, N, L> {
    pub fn new<F>(center: N, incoming: usize, outgoing: usize, undirected: usize, links: F) -> Self
    where
        F: Fn() -> BoxCursor<'g, L> + 'g,
    {
        Self {
            center,
            incoming,
            outgoing,
            undirected,
            links: Rc::new(links),
            incoming_links: Rc::new(no_links::<L>),
        }
    }

    /// Attach the cursor factory for directed links pointing at the center.
    pub fn with_incoming_links<F>(mut self, links: F) -> Self
    where
        F: Fn() -> BoxCursor<'g, L> + 'g,
    {
        self.incoming_links = Rc::new(links);
        self
    }

    /// Neighborhood of a node with no links at all.
    pub fn isolated(center: N) -> Self {
        Self::new(center, 0, 0, 0, no_links::<L>)
    }
}

fn no_links<'g, L: 'g>() -> BoxCursor<'g, L> {
    Box::new(EmptyCursor::new())
}

impl<'g, N, L> Neighborhood<'g, N, L> {
    pub fn center(&self) -> &N {
        &self.center
    }

    /// Directed links pointing at the center.
    pub fn incoming_degree(&self) -> usize {
        self.incoming
    }

    /// Directed links leaving the center.
    pub fn outgoing_degree(&self) -> usize {
        self.outgoing
    }

    pub fn undirected_degree(&self) -> usize {
        self.undirected
    }

    pub fn total_degree(&self) -> usize {
        self.incoming + self.outgoing + self.undirected
    }

    pub fn is_isolated(&self) -> bool {
        self.total_degree() == 0
    }

    /// Fresh cursor over the center's links, built on demand.
    pub fn links(&self) -> BoxCursor<'g, L> {
        (self.links)()
    }

    /// Fresh cursor over the directed links pointing at the center; empty
    /// when the engine attached none.
    pub fn incoming_links(&self) -> BoxCursor<'g, L> {
        (self.incoming_links)()
    }
}

impl<N: Clone, L> Clone for Neighborhood<'_, N, L> {
    fn clone(&self) -> Self {
        Self {
            center: self.center.clone(),
            incoming: self.incoming,
            outgoing: self.outgoing,
            undirected: self.undirected,
            links: Rc::clone(&self.links),
            incoming_links: Rc::clone(&self.incoming_links),
        }
    }
}

impl<N: fmt::Debug, L> fmt::Debug for Neighborhood<'_, N, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neighborhood")
            .field("center", &self.center)
            .field("incoming", &self.incoming)
            .field("outgoing", &self.outgoing)
            .field("undirected", &self.undirected)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Node identified by a string id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdNode {
    id: String,
}

impl IdNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Node with a fresh v4 UUID.
    pub fn random() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Node for IdNode {
    fn same_node(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Node with an id, a set of labels and string properties.
///
/// Only the id takes part in node sameness.
#[derive(Debug, Clone, Default)]
pub struct LabelledNode {
    id: String,
    labels: BTreeSet<String>,
    properties: HashMap<String, String>,
}

impl LabelledNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn random() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn add_label(&mut self, label: impl Into<String>) {
        self.labels.insert(label.into());
    }

    pub fn remove_label(&mut self, label: &str) {
        self.labels.remove(label);
    }

    /// Labels in sorted order.
    pub fn labels(&self) -> Vec<&str> {
        self.labels.iter().map(String::as_str).collect()
    }

    /// Sorted labels joined with commas.
    pub fn joined_labels(&self) -> String {
        self.labels().join(",")
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn remove_property(&mut self, key: &str) {
        self.properties.remove(key);
    }

    /// Property keys, in no particular order.
    pub fn property_keys(&self) -> Vec<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }
}

impl Node for LabelledNode {
    fn same_node(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// The simplest undirected link.
#[derive(Debug, Clone)]
pub struct UndirectedLink<N> {
    source: N,
    destination: N,
}

impl<N: Node> UndirectedLink<N> {
    pub fn new(source: N, destination: N) -> Self {
        Self { source, destination }
    }
}

impl<N: Node> Link<N> for UndirectedLink<N> {
    fn source(&self) -> &N {
        &self.source
    }

    fn destination(&self) -> &N {
        &self.destination
    }

    fn is_directed(&self) -> bool {
        false
    }

    fn same_link(&self, other: &Self) -> bool {
        same_endpoints_unordered(
            (&self.source, &self.destination),
            (&other.source, &other.destination),
        )
    }
}

/// The simplest directed link.
#[derive(Debug, Clone)]
pub struct DirectedLink<N> {
    source: N,
    destination: N,
}

impl<N: Node> DirectedLink<N> {
    pub fn new(source: N, destination: N) -> Self {
        Self { source, destination }
    }
}

impl<N: Node> Link<N> for DirectedLink<N> {
    fn source(&self) -> &N {
        &self.source
    }

    fn destination(&self) -> &N {
        &self.destination
    }

    fn is_directed(&self) -> bool {
        true
    }

    fn same_link(&self, other: &Self) -> bool {
        self.source.same_node(&other.source) && self.destination.same_node(&other.destination)
    }
}

/// Link carrying a value, directed or not.
///
/// Two valued links are the same when direction flag and value are equal and
/// the endpoints match under the direction rules.
#[derive(Debug, Clone)]
pub struct ValuedLink<N, V> {
    source: N,
    destination: N,
    value: V,
    directed: bool,
}

impl<N: Node, V: Clone + PartialEq> ValuedLink<N, V> {
    pub fn directed(source: N, destination: N, value: V) -> Self {
        Self { source, destination, value, directed: true }
    }

    pub fn undirected(source: N, destination: N, value: V) -> Self {
        Self { source, destination, value, directed: false }
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

impl<N: Node, V: Clone + PartialEq> Link<N> for ValuedLink<N, V> {
    fn source(&self) -> &N {
        &self.source
    }

    fn destination(&self) -> &N {
        &self.destination
    }

    fn is_directed(&self) -> bool {
        self.directed
    }

    fn same_link(&self, other: &Self) -> bool {
        if self.directed != other.directed || self.value != other.value {
            return false;
        }
        if self.directed {
            self.source.same_node(&other.source) && self.destination.same_node(&other.destination)
        } else {
            same_endpoints_unordered(
                (&self.source, &self.destination),
                (&other.source, &other.destination),
            )
        }
    }
}

/// Directed link with a relationship type and string properties.
///
/// Type and endpoints define sameness; properties do not.
#[derive(Debug, Clone)]
pub struct TypedLink<N> {
    source: N,
    destination: N,
    link_type: String,
    properties: BTreeMap<String, String>,
}

impl<N: Node> TypedLink<N> {
    pub fn new(link_type: impl Into<String>, source: N, destination: N) -> Self {
        Self {
            source,
            destination,
            link_type: link_type.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn link_type(&self) -> &str {
        &self.link_type
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn remove_property(&mut self, key: &str) {
        self.properties.remove(key);
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }
}

impl<N: Node> Link<N> for TypedLink<N> {
    fn source(&self) -> &N {
        &self.source
    }

    fn destination(&self) -> &N {
        &self.destination
    }

    fn is_directed(&self) -> bool {
        true
    }

    fn same_link(&self, other: &Self) -> bool {
        self.link_type == other.link_type
            && self.source.same_node(&other.source)
            && self.destination.same_node(&other.destination)
    }
}
