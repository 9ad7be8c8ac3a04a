use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Channel in the reference graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Opaque stable identifier (e.g. a snowflake id string)
    pub id: String,

    /// Human-readable display name, used for search and resolution
    pub name: String,

    /// Edges incident to this channel, in + out, parallel edges included
    pub connections: usize,
}

/// Metadata carried by a reference: the message it came from and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfo {
    pub message_link: String,
    pub message_date: String,
}

/// Channel reference graph with lookup indexes
///
/// Built once by the loader, then read-only. Queries never touch shared
/// mutable state, so a finished graph can be shared freely.
pub struct ChannelGraph {
    /// Directed graph (channel -> channel, one edge per reference)
    pub(crate) graph: DiGraph<Channel, LinkInfo>,

    /// Channel id -> NodeIndex mapping for fast lookup
    id_index: HashMap<String, NodeIndex>,

    /// Lowercased display name -> channel id
    name_index: HashMap<String, String>,

    /// Last-seen metadata per ordered (source, target) pair
    link_index: HashMap<(NodeIndex, NodeIndex), LinkInfo>,

    /// Source -> ordered targets, one entry per reference
    adjacency: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl ChannelGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            id_index: HashMap::new(),
            name_index: HashMap::new(),
            link_index: HashMap::new(),
            adjacency: HashMap::new(),
        }
    }

    /// Register a channel if unseen. The first registration's name wins;
    /// later records for the same id keep the original display name.
    pub(crate) fn ensure_channel(&mut self, id: &str, name: &str) -> NodeIndex {
        if let Some(&idx) = self.id_index.get(id) {
            return idx;
        }

        let idx = self.graph.add_node(Channel {
            id: id.to_string(),
            name: name.to_string(),
            connections: 0,
        });
        self.id_index.insert(id.to_string(), idx);

        idx
    }

    /// Append a reference edge and upsert its pair metadata.
    ///
    /// Parallel edges are kept in the edge list and both endpoints' counts
    /// grow on every call, but the pair metadata is last writer wins.
    pub(crate) fn add_reference(&mut self, from: NodeIndex, to: NodeIndex, link: LinkInfo) {
        self.link_index.insert((from, to), link.clone());
        self.graph.add_edge(from, to, link);

        self.graph[from].connections += 1;
        self.graph[to].connections += 1;
    }

    /// Build the name and adjacency indexes. Called once after ingest.
    ///
    /// Channels are visited in registration order, so a lowercased-name
    /// collision resolves to the later-registered channel. The adjacency
    /// index reflects every edge in insertion order.
    pub(crate) fn finalize(&mut self) {
        self.name_index.clear();
        for idx in self.graph.node_indices() {
            let channel = &self.graph[idx];
            self.name_index
                .insert(channel.name.to_lowercase(), channel.id.clone());
        }

        self.adjacency.clear();
        for edge in self.graph.edge_references() {
            self.adjacency
                .entry(edge.source())
                .or_insert_with(Vec::new)
                .push(edge.target());
        }
    }

    /// Resolve a display name to a channel id (case-insensitive)
    pub fn resolve_name(&self, name: &str) -> Option<&str> {
        self.name_index.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Find channel by id
    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.id_index
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    /// Metadata of the last-loaded reference for an ordered channel pair
    pub fn link_info(&self, from_id: &str, to_id: &str) -> Option<&LinkInfo> {
        let from = *self.id_index.get(from_id)?;
        let to = *self.id_index.get(to_id)?;
        self.link_index.get(&(from, to))
    }

    /// Get all channels, in registration order
    pub fn channels(&self) -> impl Iterator<Item = &Channel> {
        self.graph
            .node_indices()
            .filter_map(move |idx| self.graph.node_weight(idx))
    }

    /// Get all references with their endpoints, in load order
    pub fn references(&self) -> impl Iterator<Item = (&Channel, &Channel, &LinkInfo)> {
        self.graph
            .edge_references()
            .map(move |e| (&self.graph[e.source()], &self.graph[e.target()], e.weight()))
    }

    /// Get channel count
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get reference count
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub(crate) fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn neighbors(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.adjacency.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn pair_link(&self, from: NodeIndex, to: NodeIndex) -> Option<&LinkInfo> {
        self.link_index.get(&(from, to))
    }
}

impl Default for ChannelGraph {
    fn default() -> Self {
        Self::new()
    }
}
