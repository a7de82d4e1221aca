use std::sync::Arc;

use crate::systems::{NodeMap, SystemEdge, SystemId, SystemNode};

/// Merge per-source node maps into one map, in the order given.
///
/// A node seen for the first time is inserted as-is. When a later map
/// carries a node that already exists, its edges are appended after the
/// existing ones; name and security status stay as the first map set them.
/// Edges are never deduplicated, so parallel links from different sources
/// all survive.
pub fn merge_nodes(maps: &[Arc<NodeMap>]) -> NodeMap {
    let capacity = maps.first().map(|map| map.len()).unwrap_or_default();
    let mut merged = NodeMap::with_capacity(capacity);

    for map in maps {
        for (&system_id, node) in map.iter() {
            match merged.get_mut(&system_id) {
                Some(existing) => existing
                    .system_edges
                    .extend(node.system_edges.iter().cloned()),
                None => {
                    merged.insert(system_id, node.clone());
                }
            }
        }
    }

    merged
}

/// Graph structure used by pathfinding algorithms.
///
/// Built fresh for every route request and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: NodeMap,
}

impl Graph {
    /// Merge `maps` (static topology first, then dynamic sources in
    /// priority order) into a routing graph.
    pub fn merge(maps: &[Arc<NodeMap>]) -> Self {
        Self {
            nodes: merge_nodes(maps),
        }
    }

    pub fn node(&self, system: SystemId) -> Option<&SystemNode> {
        self.nodes.get(&system)
    }

    pub fn contains(&self, system: SystemId) -> bool {
        self.nodes.contains_key(&system)
    }

    /// Return the outgoing edges for a given system identifier.
    pub fn neighbours(&self, system: SystemId) -> &[SystemEdge] {
        self.nodes
            .get(&system)
            .map(|node| node.system_edges.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }
}

impl From<NodeMap> for Graph {
    fn from(nodes: NodeMap) -> Self {
        Self { nodes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::EdgeSource;

    fn node(id: SystemId, name: &str, security: f64, edges: &[(SystemId, EdgeSource)]) -> SystemNode {
        let mut node = SystemNode::new(id, name, security);
        node.system_edges = edges
            .iter()
            .map(|&(target, source)| SystemEdge::new(target, format!("System {target}"), 0.5, source))
            .collect();
        node
    }

    fn map(nodes: Vec<SystemNode>) -> Arc<NodeMap> {
        Arc::new(nodes.into_iter().map(|n| (n.system_id, n)).collect())
    }

    #[test]
    fn edges_are_concatenated_in_source_order() {
        let static_map = map(vec![node(1, "A", 0.9, &[(2, EdgeSource::KSpace)])]);
        let scout = map(vec![node(1, "A", -0.99, &[(3, EdgeSource::EveScoutThera)])]);
        let metro = map(vec![node(1, "A", -0.99, &[(2, EdgeSource::EveMetro)])]);

        let merged = merge_nodes(&[static_map, scout, metro]);
        let sources: Vec<(SystemId, EdgeSource)> = merged[&1]
            .system_edges
            .iter()
            .map(|edge| (edge.system_id, edge.edge_source))
            .collect();

        assert_eq!(
            sources,
            vec![
                (2, EdgeSource::KSpace),
                (3, EdgeSource::EveScoutThera),
                (2, EdgeSource::EveMetro),
            ]
        );
    }

    #[test]
    fn first_source_fixes_node_metadata() {
        let first = map(vec![node(7, "Thera", -0.99, &[])]);
        let second = map(vec![node(7, "Renamed", 0.5, &[])]);

        let merged = merge_nodes(&[first, second]);
        assert_eq!(merged[&7].system_name, "Thera");
        assert_eq!(merged[&7].system_security_status, -0.99);
    }

    #[test]
    fn nodes_unique_to_later_sources_are_added() {
        let static_map = map(vec![node(1, "A", 0.9, &[])]);
        let scout = map(vec![node(31000005, "Thera", -0.99, &[(1, EdgeSource::EveScoutThera)])]);

        let graph = Graph::merge(&[static_map, scout]);
        assert_eq!(graph.len(), 2);
        assert!(graph.contains(31000005));
        assert_eq!(graph.neighbours(31000005)[0].system_id, 1);
    }

    #[test]
    fn merging_leaves_inputs_untouched() {
        let static_map = map(vec![node(1, "A", 0.9, &[(2, EdgeSource::KSpace)])]);
        let scout = map(vec![node(1, "A", 0.9, &[(3, EdgeSource::EveScoutThera)])]);

        let _ = merge_nodes(&[Arc::clone(&static_map), scout]);
        assert_eq!(static_map[&1].system_edges.len(), 1);
    }

    #[test]
    fn unknown_system_has_no_neighbours() {
        let graph = Graph::default();
        assert!(graph.neighbours(42).is_empty());
        assert!(graph.node(42).is_none());
        assert!(graph.is_empty());
    }
}
