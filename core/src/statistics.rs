//! Degree distribution, densities and average degrees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cursor::Cursor;
use crate::error::{Accumulated, ErrorList, GraphError};
use crate::graph::Graph;
use crate::model::{Link, Neighborhood, Node};

/// Aggregate figures of one pass over a graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStatistics {
    /// Degree -> share of nodes with that degree.
    pub degree_distribution: BTreeMap<usize, f64>,
    pub nodes_size: usize,
    pub directed_links_size: usize,
    pub undirected_links_size: usize,
}

impl NetworkStatistics {
    /// Directed links per node, `-1` for an empty graph.
    pub fn average_directed_degree(&self) -> f64 {
        if self.nodes_size == 0 {
            return -1.0;
        }
        self.directed_links_size as f64 / self.nodes_size as f64
    }

    /// Undirected link ends per node, `-1` for an empty graph.
    pub fn average_undirected_degree(&self) -> f64 {
        if self.nodes_size == 0 {
            return -1.0;
        }
        2.0 * self.undirected_links_size as f64 / self.nodes_size as f64
    }

    /// Share of the `n(n-1)` possible directed links, `0` below two nodes.
    pub fn directed_density(&self) -> f64 {
        if self.nodes_size < 2 {
            return 0.0;
        }
        let n = self.nodes_size as f64;
        self.directed_links_size as f64 / (n * (n - 1.0))
    }

    /// Share of the `n(n-1)/2` possible undirected links, `0` below two nodes.
    pub fn undirected_density(&self) -> f64 {
        if self.nodes_size < 2 {
            return 0.0;
        }
        let n = self.nodes_size as f64;
        2.0 * self.undirected_links_size as f64 / (n * (n - 1.0))
    }
}

/// Single pass over `graph`, binning nodes by `degree` of their neighborhood.
///
/// Enumeration failure aborts. A node whose neighborhood cannot be read is
/// skipped and its error kept; such nodes count in neither the histogram
/// nor the node total.
pub fn network_statistics<'a, N, L, G, F>(
    graph: &'a G,
    degree: F,
) -> Result<Accumulated<NetworkStatistics>, GraphError>
where
    N: Node,
    L: Link<N>,
    G: Graph<N, L> + ?Sized,
    F: Fn(&Neighborhood<'a, N, L>) -> usize,
{
    let mut errors = ErrorList::new();
    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    let mut stats = NetworkStatistics::default();
    // Each undirected link is seen from both ends.
    let mut undirected_ends = 0;

    let mut nodes = graph.all_nodes()?;
    loop {
        match nodes.advance() {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                errors.push(err);
                break;
            }
        }
        let node = match nodes.current() {
            Ok(node) => node,
            Err(err) => {
                errors.push(err);
                continue;
            }
        };
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

        *histogram.entry(degree(&hood)).or_default() += 1;
        stats.nodes_size += 1;
        stats.directed_links_size += hood.outgoing_degree();
        undirected_ends += hood.undirected_degree();
    }

    stats.undirected_links_size = undirected_ends / 2;
    if stats.nodes_size > 0 {
        let total = stats.nodes_size as f64;
        stats.degree_distribution = histogram
            .into_iter()
            .map(|(d, count)| (d, count as f64 / total))
            .collect();
    }

    debug!(
        nodes = stats.nodes_size,
        directed = stats.directed_links_size,
        undirected = stats.undirected_links_size,
        "network statistics computed"
    );
    if !errors.is_empty() {
        warn!(errors = errors.len(), "network statistics finished with element errors");
    }
    Ok(Accumulated { value: stats, errors })
}
