//! Random graph generators.
//!
//! Generators never build nodes or links themselves: callers pass a node
//! factory and a link factory, and the graph is filled through the [`Graph`]
//! contract. Any engine with a `Default` works as the target.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::error::GraphError;
use crate::graph::Graph;
use crate::model::{Link, Node};

/// Complete undirected graph over `size` fresh nodes.
///
/// Fails if the link factory produces a directed link.
pub fn complete_undirected_graph<N, L, G, NF, LF>(
    size: usize,
    mut node_gen: NF,
    mut link_gen: LF,
) -> Result<G, GraphError>
where
    N: Node,
    L: Link<N>,
    G: Graph<N, L> + Default,
    NF: FnMut() -> N,
    LF: FnMut(&N, &N) -> L,
{
    let mut graph = G::default();
    let nodes: Vec<N> = (0..size).map(|_| node_gen()).collect();
    for node in &nodes {
        graph.add_node(node.clone());
    }

    for (i, source) in nodes.iter().enumerate() {
        for destination in &nodes[i + 1..] {
            let link = link_gen(source, destination);
            if link.is_directed() {
                return Err(GraphError::InconsistentLinkDirection { expected_directed: false });
            }
            graph.add_link(link);
        }
    }
    Ok(graph)
}

/// Random graph builder owning its random source.
///
/// Seed it with [`RandomGenerator::seeded`] for reproducible graphs.
#[derive(Debug, Clone)]
pub struct RandomGenerator<R = StdRng> {
    rng: R,
}

impl RandomGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> RandomGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// G(n,p) over ordered pairs: each `(i, j)` with `i != j` is linked with
    /// probability `probability`.
    pub fn directed_gnp<N, L, G, NF, LF>(
        &mut self,
        size: usize,
        probability: f64,
        node_gen: NF,
        link_gen: LF,
    ) -> Result<G, GraphError>
    where
        N: Node,
        L: Link<N>,
        G: Graph<N, L> + Default,
        NF: FnMut() -> N,
        LF: FnMut(&N, &N) -> L,
    {
        self.gnp(true, size, probability, node_gen, link_gen)
    }

    /// G(n,p) over unordered pairs: only `i < j` is drawn, so a pair is
    /// never tried twice.
    pub fn undirected_gnp<N, L, G, NF, LF>(
        &mut self,
        size: usize,
        probability: f64,
        node_gen: NF,
        link_gen: LF,
    ) -> Result<G, GraphError>
    where
        N: Node,
        L: Link<N>,
        G: Graph<N, L> + Default,
        NF: FnMut() -> N,
        LF: FnMut(&N, &N) -> L,
    {
        self.gnp(false, size, probability, node_gen, link_gen)
    }

    fn gnp<N, L, G, NF, LF>(
        &mut self,
        directed: bool,
        size: usize,
        probability: f64,
        mut node_gen: NF,
        mut link_gen: LF,
    ) -> Result<G, GraphError>
    where
        N: Node,
        L: Link<N>,
        G: Graph<N, L> + Default,
        NF: FnMut() -> N,
        LF: FnMut(&N, &N) -> L,
    {
        if !(0.0..=1.0).contains(&probability) {
            return Err(GraphError::InvalidProbability(probability));
        }

        let mut graph = G::default();
        let nodes: Vec<N> = (0..size).map(|_| node_gen()).collect();
        for node in &nodes {
            graph.add_node(node.clone());
        }

        let mut links = 0usize;
        for (i, source) in nodes.iter().enumerate() {
            for (j, destination) in nodes.iter().enumerate() {
                if i == j || (!directed && i > j) {
                    continue;
                }
                if !self.rng.gen_bool(probability) {
                    continue;
                }
                let link = link_gen(source, destination);
                if link.is_directed() != directed {
                    return Err(GraphError::InconsistentLinkDirection {
                        expected_directed: directed,
                    });
                }
                graph.add_link(link);
                links += 1;
            }
        }

        debug!(size, probability, directed, links, "generated G(n,p) graph");
        Ok(graph)
    }

    /// Preferential attachment: a complete core of `initial_size` nodes, then
    /// one node at a time up to `max_size`, each attached by one undirected
    /// link to a node drawn with probability proportional to its degree.
    ///
    /// The degree table is kept in insertion order and updated in place, so
    /// a given draw always selects the same node.
    pub fn undirected_barabasi_albert<N, L, G, NF, LF>(
        &mut self,
        initial_size: usize,
        max_size: usize,
        mut node_gen: NF,
        mut link_gen: LF,
    ) -> Result<G, GraphError>
    where
        N: Node,
        L: Link<N>,
        G: Graph<N, L> + Default,
        NF: FnMut() -> N,
        LF: FnMut(&N, &N) -> L,
    {
        if initial_size == 0 || max_size == 0 || initial_size > max_size {
            return Err(GraphError::InvalidSizes { initial: initial_size, max: max_size });
        }

        let mut core: Vec<N> = Vec::with_capacity(initial_size);
        let mut graph: G = complete_undirected_graph(
            initial_size,
            || {
                let node = node_gen();
                core.push(node.clone());
                node
            },
            &mut link_gen,
        )?;

        let mut degrees: Vec<(N, usize)> = Vec::with_capacity(max_size);
        degrees.extend(core.into_iter().map(|n| (n, initial_size - 1)));
        let mut degree_sum = initial_size * (initial_size - 1);

        for step in initial_size..max_size {
            let target = if degree_sum == 0 {
                // Single-node core: nothing to weigh yet.
                0
            } else {
                let draw = self.rng.gen_range(0..degree_sum);
                pick_by_degree(&degrees, draw)
            };

            let node = node_gen();
            let link = link_gen(&node, &degrees[target].0);
            if link.is_directed() {
                return Err(GraphError::InconsistentLinkDirection { expected_directed: false });
            }
            graph.add_node(node.clone());
            graph.add_link(link);

            trace!(step, target, target_degree = degrees[target].1, "attached node");
            degrees[target].1 += 1;
            degrees.push((node, 1));
            degree_sum += 2;
        }

        debug!(initial_size, max_size, degree_sum, "generated preferential attachment graph");
        Ok(graph)
    }
}

/// Index of the node whose cumulative degree range contains `draw`.
fn pick_by_degree<N>(degrees: &[(N, usize)], draw: usize) -> usize {
    let mut cumulated = 0;
    for (index, (_, degree)) in degrees.iter().enumerate() {
        cumulated += degree;
        if draw < cumulated {
            return index;
        }
    }
    degrees.len().saturating_sub(1)
}
