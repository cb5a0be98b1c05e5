/// Dependency graph analysis for audio node execution
///
/// This module analyzes the audio processing graph to determine:
/// - Execution order (topological sort, producers before consumers)
/// - Cycle detection (rejected: nodes read the current block of their inputs)

use crate::audio_node::{AudioNode, NodeId};
use crate::error::{DspError, DspResult};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::HashMap;

/// Represents the audio processing dependency graph
///
/// # Graph Structure
/// - Nodes: Audio processing nodes (delays, filters, etc.)
/// - Edges: Dependencies (data flow from producer → consumer), one per
///   signal input or streamed parameter
///
/// # Usage
/// ```ignore
/// let graph = DependencyGraph::build(&nodes)?;
/// let exec_order = graph.execution_order()?;  // Topological sort
/// ```
pub struct DependencyGraph {
    /// Directed graph of node dependencies
    graph: DiGraph<NodeId, ()>,

    /// Map NodeId → NodeIndex for graph operations
    node_map: HashMap<NodeId, NodeIndex>,
}

impl DependencyGraph {
    /// Build dependency graph from audio nodes
    ///
    /// # Errors
    /// - If a node references non-existent input
    pub fn build(nodes: &[Box<dyn AudioNode>]) -> DspResult<Self> {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();

        for (node_id, _) in nodes.iter().enumerate() {
            let idx = graph.add_node(node_id);
            node_map.insert(node_id, idx);
        }

        for (node_id, node) in nodes.iter().enumerate() {
            let dependent_idx = node_map[&node_id];

            for input_id in node.input_nodes() {
                match node_map.get(&input_id) {
                    // Edge: input → dependent (data flows this direction)
                    Some(&input_idx) => {
                        graph.add_edge(input_idx, dependent_idx, ());
                    }
                    None => return Err(DspError::InvalidNode(input_id)),
                }
            }
        }

        Ok(Self { graph, node_map })
    }

    /// Get topologically sorted execution order
    ///
    /// # Errors
    /// `DspError::Cycle` naming a node on the cycle
    pub fn execution_order(&self) -> DspResult<Vec<NodeId>> {
        toposort(&self.graph, None)
            .map(|order| order.iter().map(|&idx| self.graph[idx]).collect())
            .map_err(|cycle| DspError::Cycle(self.graph[cycle.node_id()]))
    }

    /// Get all direct dependencies of a node
    pub fn dependencies(&self, node_id: NodeId) -> Vec<NodeId> {
        if let Some(&node_idx) = self.node_map.get(&node_id) {
            self.graph
                .neighbors_directed(node_idx, Direction::Incoming)
                .map(|dep_idx| self.graph[dep_idx])
                .collect()
        } else {
            vec![]
        }
    }

    /// Check if graph has a cycle
    pub fn is_acyclic(&self) -> bool {
        toposort(&self.graph, None).is_ok()
    }

    /// Get number of nodes in graph
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get number of edges (dependencies) in graph
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
