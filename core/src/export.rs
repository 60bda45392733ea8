//! Graph walk feeding an external serializer.
//!
//! Only `all_nodes` and `neighbors` are used. Nodes get contiguous indices in
//! enumeration order and links are reported with those indices, so the
//! serializer never sees engine internals.

use std::collections::BTreeMap;

use tracing::warn;

use crate::cursor::Cursor;
use crate::error::{Accumulated, ErrorList, GraphError};
use crate::graph::Graph;
use crate::model::{Link, Node};

/// What the node callback hands back for one node. Both parts may be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportedNode {
    pub label: String,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportedLink {
    pub source: usize,
    pub destination: usize,
    pub label: String,
}

/// Nodes indexed by position, links by node index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphExport {
    pub nodes: Vec<ExportedNode>,
    pub links: Vec<ExportedLink>,
}

/// Walk `graph` once per node, calling `node_fn` for each node and `link_fn`
/// for each link with resolved endpoint indices.
///
/// An undirected link is reported once, from its source endpoint.
pub fn collect_export<N, L, G, NF, LF>(
    graph: &G,
    mut node_fn: NF,
    mut link_fn: LF,
) -> Result<Accumulated<GraphExport>, GraphError>
where
    N: Node,
    L: Link<N>,
    G: Graph<N, L> + ?Sized,
    NF: FnMut(&N) -> ExportedNode,
    LF: FnMut(usize, usize, &L) -> String,
{
    let mut errors = ErrorList::new();
    let mut nodes = Vec::new();
    let mut cursor = graph.all_nodes()?;
    loop {
        match cursor.advance() {
            Ok(true) => {}
            Ok(false) => break,
            Err(err) => {
                errors.push(err);
                break;
            }
        }
        match cursor.current() {
            Ok(node) => nodes.push(node),
            Err(err) => errors.push(err),
        }
    }

    let index_of = |node: &N| nodes.iter().position(|n| n.same_node(node));
    let mut export = GraphExport::default();

    for node in &nodes {
        export.nodes.push(node_fn(node));

        let hood = match graph.neighbors(node) {
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

        let mut links = hood.links();
        loop {
            match links.advance() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => {
                    errors.push(err);
                    break;
                }
            }
            let link = match links.current() {
                Ok(link) => link,
                Err(err) => {
                    errors.push(err);
                    continue;
                }
            };
            if !link.is_directed() && !link.source().same_node(node) {
                continue;
            }
            match (index_of(link.source()), index_of(link.destination())) {
                (Some(source), Some(destination)) => export.links.push(ExportedLink {
                    source,
                    destination,
                    label: link_fn(source, destination, &link),
                }),
                _ => errors.push(GraphError::UnknownEndpoint),
            }
        }
    }

    if !errors.is_empty() {
        warn!(errors = errors.len(), "export finished with element errors");
    }
    Ok(Accumulated { value: export, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MapGraph;
    use crate::model::{LabelledNode, TypedLink, UndirectedLink};

    fn person(id: &str, name: &str) -> LabelledNode {
        let mut node = LabelledNode::new(id);
        node.add_label("Person");
        node.set_property("name", name);
        node
    }

    fn label_node(node: &LabelledNode) -> ExportedNode {
        ExportedNode {
            label: node.joined_labels(),
            attributes: node
                .properties()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_undirected_links_reported_once() {
        let mut g = MapGraph::<LabelledNode, UndirectedLink<LabelledNode>>::new();
        g.add_link(UndirectedLink::new(person("a", "Ada"), person("b", "Bob")));
        g.add_link(UndirectedLink::new(person("b", "Bob"), person("c", "Cy")));
        g.add_node(person("d", "Dee"));

        let result = collect_export(&g, label_node, |s, d, _| format!("{}-{}", s, d)).unwrap();
        assert!(result.is_clean());
        let export = result.value;

        assert_eq!(export.nodes.len(), 4);
        assert_eq!(export.nodes[0].label, "Person");
        assert_eq!(export.nodes[0].attributes.get("name").map(String::as_str), Some("Ada"));

        let mut labels: Vec<&str> = export.links.iter().map(|l| l.label.as_str()).collect();
        labels.sort();
        assert_eq!(labels, vec!["0-1", "1-2"]);
    }

    #[test]
    fn test_directed_links_keep_orientation() {
        let mut g = MapGraph::<LabelledNode, TypedLink<LabelledNode>>::new();
        g.add_link(TypedLink::new("KNOWS", person("a", "Ada"), person("b", "Bob")));
        g.add_link(TypedLink::new("LIKES", person("b", "Bob"), person("a", "Ada")));

        let result = collect_export(&g, |_| ExportedNode::default(), |_, _, l| {
            l.link_type().to_string()
        })
        .unwrap();
        let export = result.value;
        assert_eq!(export.nodes, vec![ExportedNode::default(), ExportedNode::default()]);
        assert_eq!(
            export.links,
            vec![
                ExportedLink { source: 0, destination: 1, label: "KNOWS".into() },
                ExportedLink { source: 1, destination: 0, label: "LIKES".into() },
            ]
        );
    }
}
