//! Directed graph keyed by plain comparable values.
//!
//! For graphs such as `"person A" -10.0-> "course about networks"` where
//! nodes are hashable values and each ordered pair holds at most one value.

use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct DirectedValuesGraph<NV, LV> {
    /// Source -> destination -> value. Every node has an entry.
    content: HashMap<NV, HashMap<NV, LV>>,
}

impl<NV: Eq + Hash + Clone, LV: Clone> DirectedValuesGraph<NV, LV> {
    pub fn new() -> Self {
        Self { content: HashMap::new() }
    }

    /// Set the value of `source -> destination`, adding missing nodes.
    pub fn set_link(&mut self, source: NV, destination: NV, value: LV) {
        self.content.entry(destination.clone()).or_default();
        self.content.entry(source).or_default().insert(destination, value);
    }

    /// Remove the link, keep both nodes.
    pub fn remove_link(&mut self, source: &NV, destination: &NV) {
        if let Some(line) = self.content.get_mut(source) {
            line.remove(destination);
        }
    }

    /// No-op for a node already present.
    pub fn add_node(&mut self, node: NV) {
        self.content.entry(node).or_default();
    }

    /// Remove `node` and every link touching it.
    pub fn remove_node(&mut self, node: &NV) {
        self.content.remove(node);
        for line in self.content.values_mut() {
            line.remove(node);
        }
    }

    pub fn has_node(&self, node: &NV) -> bool {
        self.content.contains_key(node)
    }

    /// Destinations of `source` with their values; `None` when `source` is
    /// absent or has no outgoing link.
    pub fn neighbors(&self, source: &NV) -> Option<&HashMap<NV, LV>> {
        self.content.get(source).filter(|line| !line.is_empty())
    }

    pub fn link_value(&self, source: &NV, destination: &NV) -> Option<&LV> {
        self.content.get(source)?.get(destination)
    }

    pub fn node_count(&self) -> usize {
        self.content.len()
    }

    pub fn link_count(&self) -> usize {
        self.content.values().map(HashMap::len).sum()
    }
}

impl<NV: Eq + Hash + Clone, LV: Clone> Default for DirectedValuesGraph<NV, LV> {
    fn default() -> Self {
        Self::new()
    }
}
