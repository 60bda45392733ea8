//! linkgraph-core: Generic in-memory graph engine.
//!
//! Nodes and links are caller-defined types compared through semantic
//! equality (`same_node` / `same_link`), stored in one of two adjacency
//! engines that keep per-node degree counters up to date on every mutation.
//! Algorithms only see the [`Graph`] contract: neighborhoods and lazy
//! cursors, never engine internals.
//!
//! Also provides connected component sizing, network statistics, G(n,p) and
//! preferential attachment generators, and a walk for external exporters.

mod composite;
mod cursor;
mod error;
mod export;
mod graph;
mod matrix;
mod matrix_graph;
mod model;
mod random;
mod set;
mod statistics;
#[cfg(test)]
mod test_support;
mod traversal;
mod values;

pub use composite::{CompositeCursor, DynamicCursor, GrowableCursor};
pub use cursor::{
    collect, BoxCursor, Cursor, EmptyCursor, IndexedCursor, MapCursor, MapFilterCursor,
    SliceCursor,
};
pub use error::{Accumulated, ErrorList, GraphError};
pub use export::{collect_export, ExportedLink, ExportedNode, GraphExport};
pub use graph::{Graph, MapGraph};
pub use matrix::MapMatrix;
pub use matrix_graph::MatrixGraph;
pub use model::{
    same_endpoints_unordered, DirectedLink, IdNode, LabelledNode, Link, Neighborhood, Node,
    TypedLink, UndirectedLink, ValuedLink,
};
pub use random::{complete_undirected_graph, RandomGenerator};
pub use set::{AbstractSet, HashedSet, SetEquals, SliceSet};
pub use statistics::{network_statistics, NetworkStatistics};
pub use traversal::{connected_components_size, destination_neighbors, ComponentSize};
pub use values::DirectedValuesGraph;
