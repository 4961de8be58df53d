//! Connection topology queries.
//!
//! Builds a directed graph from the diagram's connections — a synthetic
//! "board" root plus one node per referenced device — and answers the
//! topology questions the positioner needs: tier levels, cycle detection,
//! and immediate neighbor lookups. The graph is rebuilt per layout call
//! and discarded with it.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::trace;
use petgraph::{
    Direction,
    graph::{DiGraph, NodeIndex},
};

use wirelay_core::model::{Connection, ConnectionSource};

use crate::error::LayoutError;

/// Name of the synthetic root node standing in for the board.
pub const BOARD_NODE: &str = "board";

/// Adjacency model over the diagram's connections.
#[derive(Debug)]
pub struct ConnectionGraph {
    graph: DiGraph<String, ()>,
    /// Device name → node index, in first-reference order.
    nodes: IndexMap<String, NodeIndex>,
    board: NodeIndex,
}

impl ConnectionGraph {
    /// Build the adjacency model from a connection list.
    ///
    /// Board-sourced connections become edges from the board root to the
    /// destination device; device-sourced connections become edges from
    /// the source device to the destination. Parallel connections between
    /// the same pair collapse into one edge.
    pub fn from_connections(connections: &[Connection]) -> Self {
        let mut graph = DiGraph::new();
        let board = graph.add_node(BOARD_NODE.to_string());
        let mut this = Self {
            graph,
            nodes: IndexMap::new(),
            board,
        };

        for connection in connections {
            let target = this.ensure_node(&connection.device);
            let source = match &connection.source {
                ConnectionSource::Board { .. } => this.board,
                ConnectionSource::Device { device, .. } => this.ensure_node(device),
            };
            if this.graph.find_edge(source, target).is_none() {
                this.graph.add_edge(source, target, ());
            }
        }

        trace!(
            devices = this.nodes.len(),
            edges = this.graph.edge_count();
            "Built connection graph"
        );
        this
    }

    fn ensure_node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    /// Successor node indices in edge-insertion order.
    ///
    /// petgraph iterates neighbors most-recent-first; downstream ordering
    /// must instead be stable in connection order.
    fn ordered_successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .filter(|&(source, _)| source == idx)
            .map(|(_, target)| target)
            .collect()
    }

    /// Predecessor node indices in edge-insertion order.
    fn ordered_predecessors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        self.graph
            .edge_indices()
            .filter_map(|edge| self.graph.edge_endpoints(edge))
            .filter(|&(_, target)| target == idx)
            .map(|(source, _)| source)
            .collect()
    }

    /// The full adjacency map: `"board"` → directly connected devices,
    /// plus each device → the devices it feeds.
    pub fn adjacency_list(&self) -> IndexMap<String, Vec<String>> {
        let mut adjacency = IndexMap::new();
        adjacency.insert(BOARD_NODE.to_string(), self.names_of(self.ordered_successors(self.board)));
        for (name, &idx) in &self.nodes {
            adjacency.insert(name.clone(), self.names_of(self.ordered_successors(idx)));
        }
        adjacency
    }

    fn names_of(&self, indices: Vec<NodeIndex>) -> Vec<String> {
        indices.into_iter().map(|idx| self.graph[idx].clone()).collect()
    }

    /// Tier level per device: 0 for any device with a direct board
    /// connection, otherwise one past the deepest immediate upstream
    /// device. Devices absent from the connection list are absent here.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Cyclic`] when the graph contains any cycle — levels
    /// are undefined on cyclic graphs.
    pub fn device_levels(&self) -> Result<IndexMap<String, usize>, LayoutError> {
        let cycles = self.detect_cycles();
        if !cycles.is_empty() {
            return Err(LayoutError::Cyclic { cycles });
        }

        let mut levels: HashMap<NodeIndex, usize> = HashMap::new();
        for &start in self.nodes.values() {
            if levels.contains_key(&start) {
                continue;
            }
            // Memoized post-order walk on an explicit stack.
            let mut stack = vec![start];
            while let Some(&node) = stack.last() {
                if levels.contains_key(&node) {
                    stack.pop();
                    continue;
                }
                if self.graph.find_edge(self.board, node).is_some() {
                    levels.insert(node, 0);
                    stack.pop();
                    continue;
                }
                let upstream = self.ordered_predecessors(node);
                let unresolved: Vec<NodeIndex> = upstream
                    .iter()
                    .copied()
                    .filter(|u| !levels.contains_key(u))
                    .collect();
                if unresolved.is_empty() {
                    // A device that only feeds others anchors its own
                    // subgraph at tier 0.
                    let level = upstream.iter().map(|u| levels[u] + 1).max().unwrap_or(0);
                    levels.insert(node, level);
                    stack.pop();
                } else {
                    stack.extend(unresolved);
                }
            }
        }

        let mut result = IndexMap::new();
        for (name, idx) in &self.nodes {
            result.insert(name.clone(), levels[idx]);
        }
        trace!(levels:? = result; "Computed device levels");
        Ok(result)
    }

    /// Every distinct cycle in the graph as an ordered device-name
    /// sequence, entry node repeated at the end. A self-connected device
    /// therefore appears twice in its cycle.
    ///
    /// Three-color depth-first search on an explicit stack: white =
    /// unvisited, gray = on the current path, black = fully explored.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Gray,
            Black,
        }

        // Successor lists in edge-insertion order, so the cycle report is
        // identical across runs on equal input.
        let mut successors: Vec<Vec<NodeIndex>> = vec![Vec::new(); self.graph.node_count()];
        for edge in self.graph.edge_indices() {
            if let Some((source, target)) = self.graph.edge_endpoints(edge) {
                successors[source.index()].push(target);
            }
        }

        let mut marks = vec![Mark::White; self.graph.node_count()];
        let mut cycles = Vec::new();

        for &start in self.nodes.values() {
            if marks[start.index()] != Mark::White {
                continue;
            }
            let mut stack: Vec<(NodeIndex, usize)> = vec![(start, 0)];
            marks[start.index()] = Mark::Gray;

            while let Some(frame) = stack.last_mut() {
                let node = frame.0;
                if frame.1 < successors[node.index()].len() {
                    let next = successors[node.index()][frame.1];
                    frame.1 += 1;
                    match marks[next.index()] {
                        Mark::White => {
                            marks[next.index()] = Mark::Gray;
                            stack.push((next, 0));
                        }
                        Mark::Gray => {
                            // Back edge: the stack from `next` down to
                            // `node` is a cycle.
                            let pos = stack
                                .iter()
                                .position(|&(on_path, _)| on_path == next)
                                .expect("gray node must be on the DFS stack");
                            let mut cycle: Vec<String> = stack[pos..]
                                .iter()
                                .map(|&(on_path, _)| self.graph[on_path].clone())
                                .collect();
                            cycle.push(self.graph[next].clone());
                            cycles.push(cycle);
                        }
                        Mark::Black => {}
                    }
                } else {
                    marks[node.index()] = Mark::Black;
                    stack.pop();
                }
            }
        }

        cycles
    }

    /// True when the graph contains no cycle.
    pub fn is_acyclic(&self) -> bool {
        self.detect_cycles().is_empty()
    }

    /// Immediate upstream names of a device; the board counts as a
    /// dependency. Unknown devices yield an empty list.
    pub fn device_dependencies(&self, name: &str) -> Vec<String> {
        match self.nodes.get(name) {
            Some(&idx) => self.names_of(self.ordered_predecessors(idx)),
            None => Vec::new(),
        }
    }

    /// Immediate downstream device names. Unknown devices yield an empty
    /// list.
    pub fn device_dependents(&self, name: &str) -> Vec<String> {
        match self.nodes.get(name) {
            Some(&idx) => self.names_of(self.ordered_successors(idx)),
            None => Vec::new(),
        }
    }

    /// Devices wired directly to the board.
    pub fn root_devices(&self) -> Vec<String> {
        self.names_of(self.ordered_successors(self.board))
    }

    /// Devices that feed no other device.
    pub fn leaf_devices(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|&(_, &idx)| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .next()
                    .is_none()
            })
            .map(|(name, _)| name.clone())
            .collect()
    }
}
