use crate::error::{GraphError, Result};
use crate::types::{ChannelGraph, LinkInfo};
use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};

/// Shortest reference chain between two channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPath {
    /// Channel ids from start to end inclusive
    pub channels: Vec<String>,

    /// Metadata per hop; `links[i]` belongs to `channels[i] -> channels[i+1]`.
    /// `None` marks a hop whose pair metadata is missing.
    pub links: Vec<Option<LinkInfo>>,
}

impl ChannelPath {
    /// Number of traversed edges
    pub fn hops(&self) -> usize {
        self.channels.len().saturating_sub(1)
    }
}

impl ChannelGraph {
    /// Find the shortest directed path between two channel ids.
    ///
    /// Breadth-first search over the adjacency index, so the result has the
    /// minimum hop count. Ties between equal-length paths go to the
    /// earliest-discovered one (adjacency insertion order), which is not
    /// otherwise canonical. Returns `Ok(None)` when the target is
    /// unreachable and an error when either id is unknown.
    pub fn find_path(&self, start_id: &str, end_id: &str) -> Result<Option<ChannelPath>> {
        let start = self
            .node_index(start_id)
            .ok_or_else(|| GraphError::ChannelNotFound(start_id.to_string()))?;
        let end = self
            .node_index(end_id)
            .ok_or_else(|| GraphError::ChannelNotFound(end_id.to_string()))?;

        if start == end {
            return Ok(Some(ChannelPath {
                channels: vec![start_id.to_string()],
                links: Vec::new(),
            }));
        }

        // Frontier items carry their full path so the winning one can be
        // returned directly when the target shows up as a neighbor.
        let mut queue: VecDeque<Vec<NodeIndex>> = VecDeque::new();
        queue.push_back(vec![start]);

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        visited.insert(start);

        while let Some(path) = queue.pop_front() {
            let Some(&current) = path.last() else { continue };

            for &next in self.neighbors(current) {
                if next == end {
                    let mut full = path.clone();
                    full.push(end);
                    return Ok(Some(self.reconstruct(&full)));
                }

                if visited.insert(next) {
                    let mut next_path = path.clone();
                    next_path.push(next);
                    queue.push_back(next_path);
                }
            }
        }

        Ok(None)
    }

    fn reconstruct(&self, full: &[NodeIndex]) -> ChannelPath {
        let channels = full.iter().map(|&idx| self.graph[idx].id.clone()).collect();
        let links = full
            .windows(2)
            .map(|pair| self.pair_link(pair[0], pair[1]).cloned())
            .collect();

        ChannelPath { channels, links }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_str;
    use pretty_assertions::assert_eq;

    fn record(from: &str, from_name: &str, to: &str, to_name: &str, link: &str) -> String {
        format!(
            r#"{{"from":"{}","fromName":"{}","to":"{}","toName":"{}","messageLink":"{}","messageDate":"2024-03-01T12:00:00Z"}}"#,
            from, from_name, to, to_name, link
        )
    }

    fn chain_graph() -> ChannelGraph {
        let dump = [
            record("A", "general", "B", "dev", "https://chat.example/m/1"),
            record("B", "dev", "C", "random", "https://chat.example/m/2"),
        ]
        .join("\n");
        load_str(&dump).0
    }

    #[test]
    fn finds_two_hop_path_with_metadata() {
        let graph = chain_graph();

        let path = graph
            .find_path("A", "C")
            .expect("known ids")
            .expect("path exists");

        assert_eq!(path.channels, vec!["A", "B", "C"]);
        assert_eq!(path.hops(), 2);
        assert_eq!(
            path.links[0].as_ref().map(|l| l.message_link.as_str()),
            Some("https://chat.example/m/1")
        );
        assert_eq!(
            path.links[1].as_ref().map(|l| l.message_link.as_str()),
            Some("https://chat.example/m/2")
        );
    }

    #[test]
    fn path_edges_exist_in_the_reference_list() {
        let graph = chain_graph();
        let path = graph.find_path("A", "C").unwrap().unwrap();

        for pair in path.channels.windows(2) {
            assert!(
                graph
                    .references()
                    .any(|(from, to, _)| from.id == pair[0] && to.id == pair[1]),
                "hop {} -> {} is not a loaded reference",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn start_equals_end_is_a_trivial_path() {
        let graph = chain_graph();

        let path = graph.find_path("B", "B").unwrap().expect("trivial path");

        assert_eq!(path.channels, vec!["B"]);
        assert_eq!(path.hops(), 0);
        assert!(path.links.is_empty());
    }

    #[test]
    fn disconnected_components_have_no_path() {
        let dump = [
            record("A", "general", "B", "dev", "https://chat.example/m/1"),
            record("C", "random", "D", "support", "https://chat.example/m/2"),
        ]
        .join("\n");
        let (graph, _) = load_str(&dump);

        assert_eq!(graph.find_path("A", "D").unwrap(), None);
    }

    #[test]
    fn reachability_is_directed() {
        // only B -> A exists; A -> B must come up empty
        let dump = record("B", "dev", "A", "general", "https://chat.example/m/1");
        let (graph, _) = load_str(&dump);

        assert_eq!(graph.find_path("A", "B").unwrap(), None);
        assert!(graph.find_path("B", "A").unwrap().is_some());
    }

    #[test]
    fn returns_minimum_hop_count() {
        // long route A -> B -> C -> D, short route A -> E -> D
        let dump = [
            record("A", "general", "B", "dev", "https://chat.example/m/1"),
            record("B", "dev", "C", "random", "https://chat.example/m/2"),
            record("C", "random", "D", "support", "https://chat.example/m/3"),
            record("A", "general", "E", "offtopic", "https://chat.example/m/4"),
            record("E", "offtopic", "D", "support", "https://chat.example/m/5"),
        ]
        .join("\n");
        let (graph, _) = load_str(&dump);

        let path = graph.find_path("A", "D").unwrap().expect("path exists");

        assert_eq!(path.hops(), 2);
        assert_eq!(path.channels, vec!["A", "E", "D"]);
    }

    #[test]
    fn equal_length_tie_goes_to_first_loaded_route() {
        let dump = [
            record("A", "general", "B", "dev", "https://chat.example/m/1"),
            record("A", "general", "C", "random", "https://chat.example/m/2"),
            record("B", "dev", "D", "support", "https://chat.example/m/3"),
            record("C", "random", "D", "support", "https://chat.example/m/4"),
        ]
        .join("\n");
        let (graph, _) = load_str(&dump);

        let path = graph.find_path("A", "D").unwrap().expect("path exists");

        assert_eq!(path.channels, vec!["A", "B", "D"]);
    }

    #[test]
    fn cycles_do_not_hang_the_search() {
        let dump = [
            record("A", "general", "B", "dev", "https://chat.example/m/1"),
            record("B", "dev", "A", "general", "https://chat.example/m/2"),
            record("B", "dev", "C", "random", "https://chat.example/m/3"),
        ]
        .join("\n");
        let (graph, _) = load_str(&dump);

        let path = graph.find_path("A", "C").unwrap().expect("path exists");
        assert_eq!(path.channels, vec!["A", "B", "C"]);

        // no route out of C at all
        assert_eq!(graph.find_path("C", "A").unwrap(), None);
    }

    #[test]
    fn unknown_ids_are_an_error() {
        let graph = chain_graph();

        let err = graph.find_path("A", "nope").unwrap_err();
        assert!(matches!(err, GraphError::ChannelNotFound(ref id) if id == "nope"));

        let err = graph.find_path("nope", "A").unwrap_err();
        assert!(matches!(err, GraphError::ChannelNotFound(_)));
    }
}
