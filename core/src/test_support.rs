//! Graph wrappers shared by the unit tests.

use crate::cursor::BoxCursor;
use crate::error::GraphError;
use crate::graph::Graph;
use crate::model::{Link, Neighborhood, Node};

/// Delegates to `inner` but cannot read the neighborhood of `broken`.
pub(crate) struct UnreadableNode<N, G> {
    inner: G,
    broken: N,
}

impl<N, G> UnreadableNode<N, G> {
    pub(crate) fn new(inner: G, broken: N) -> Self {
        Self { inner, broken }
    }
}

impl<N: Node, L: Link<N>, G: Graph<N, L>> Graph<N, L> for UnreadableNode<N, G> {
    fn add_node(&mut self, node: N) {
        self.inner.add_node(node);
    }

    fn add_link(&mut self, link: L) {
        self.inner.add_link(link);
    }

    fn remove_link(&mut self, link: &L) {
        self.inner.remove_link(link);
    }

    fn remove_node(&mut self, node: &N) {
        self.inner.remove_node(node);
    }

    fn has_link(&self, link: &L) -> bool {
        self.inner.has_link(link)
    }

    fn all_nodes(&self) -> Result<BoxCursor<'_, N>, GraphError> {
        self.inner.all_nodes()
    }

    fn neighbors(&self, node: &N) -> Result<Option<Neighborhood<'_, N, L>>, GraphError> {
        if node.same_node(&self.broken) {
            return Err(GraphError::Source("neighborhood unreadable".into()));
        }
        self.inner.neighbors(node)
    }

    fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    fn link_count(&self) -> usize {
        self.inner.link_count()
    }
}
