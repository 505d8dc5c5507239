//! JSON description of a clustered graph drawn with straight lines.
//!
//! Each node has a position; the rotation around a node is the counter-clockwise order of its
//! edges by angle, ties broken by edge order. A planar straight-line drawing therefore yields a
//! planar combinatorial embedding.

use clusterplan_graph::{AdjId, ClusterGraph, ClusterId, EdgeId, Graph, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("invalid input JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate node id `{id}`")]
    DuplicateNode { id: String },

    #[error("duplicate cluster id `{id}`")]
    DuplicateCluster { id: String },

    #[error("edge endpoint `{id}` is not a node")]
    UnknownNode { id: String },

    #[error("cluster `{id}` is not defined")]
    UnknownCluster { id: String },

    #[error("cluster `{id}` is its own ancestor")]
    ClusterCycle { id: String },

    #[error("self-loop at node `{id}` has no straight-line drawing")]
    SelfLoop { id: String },

    #[error(transparent)]
    Graph(#[from] clusterplan_graph::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusteredGraphSpec {
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub clusters: Vec<ClusterSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Cluster the node belongs to directly; the root when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterSpec {
    pub id: String,
    /// Parent cluster; the root when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Cluster index; the smallest index not otherwise taken when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// A graph and cluster hierarchy built from a [`ClusteredGraphSpec`], with the names and
/// positions of the description.
#[derive(Debug, Clone)]
pub struct ClusteredGraph {
    pub graph: Graph,
    pub clusters: ClusterGraph,
    node_names: Vec<String>,
    positions: Vec<(f64, f64)>,
    nodes_by_name: FxHashMap<String, NodeId>,
    clusters_by_name: FxHashMap<String, ClusterId>,
    edges: Vec<EdgeId>,
}

impl ClusteredGraph {
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.nodes_by_name.get(name).copied()
    }

    pub fn node_name(&self, v: NodeId) -> Option<&str> {
        self.node_names.get(v.index()).map(String::as_str)
    }

    pub fn position(&self, v: NodeId) -> Option<(f64, f64)> {
        self.positions.get(v.index()).copied()
    }

    pub fn cluster(&self, name: &str) -> Option<ClusterId> {
        self.clusters_by_name.get(name).copied()
    }

    /// The `i`-th edge of the description.
    pub fn edge(&self, i: usize) -> Option<EdgeId> {
        self.edges.get(i).copied()
    }

    /// The first edge joining the two named nodes, in either direction.
    pub fn edge_between(&self, a: &str, b: &str) -> Option<EdgeId> {
        let (a, b) = (self.node(a)?, self.node(b)?);
        self.edges.iter().copied().find(|&e| {
            let (s, t) = (self.graph.source(e), self.graph.target(e));
            (s == a && t == b) || (s == b && t == a)
        })
    }
}

impl ClusteredGraphSpec {
    pub fn from_json(text: &str) -> Result<Self, InputError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn build(&self) -> Result<ClusteredGraph, InputError> {
        let mut graph = Graph::new();
        let mut nodes_by_name: FxHashMap<String, NodeId> = FxHashMap::default();
        let mut node_names = Vec::with_capacity(self.nodes.len());
        let mut positions = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if nodes_by_name.contains_key(&node.id) {
                return Err(InputError::DuplicateNode {
                    id: node.id.clone(),
                });
            }
            let v = graph.new_node();
            nodes_by_name.insert(node.id.clone(), v);
            node_names.push(node.id.clone());
            positions.push((node.x, node.y));
        }

        let lookup = |id: &str| {
            nodes_by_name
                .get(id)
                .copied()
                .ok_or_else(|| InputError::UnknownNode { id: id.to_string() })
        };
        let mut edges = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            let (s, t) = (lookup(&edge.source)?, lookup(&edge.target)?);
            if s == t {
                return Err(InputError::SelfLoop {
                    id: edge.source.clone(),
                });
            }
            edges.push(graph.new_edge(s, t));
        }

        for v in graph.nodes().collect::<Vec<_>>() {
            let order = angular_order(&graph, &positions, v);
            graph.sort_adj(v, &order);
        }

        let mut clusters = ClusterGraph::new(&graph);
        let clusters_by_name = self.build_clusters(&mut clusters)?;
        for node in &self.nodes {
            let Some(name) = &node.cluster else {
                continue;
            };
            let c = clusters_by_name
                .get(name)
                .copied()
                .ok_or_else(|| InputError::UnknownCluster { id: name.clone() })?;
            clusters.reassign_node(nodes_by_name[&node.id], c);
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            clusters = clusters.cluster_count(),
            "built clustered graph"
        );
        Ok(ClusteredGraph {
            graph,
            clusters,
            node_names,
            positions,
            nodes_by_name,
            clusters_by_name,
            edges,
        })
    }

    /// Creates the described clusters parents first, in description order otherwise.
    fn build_clusters(
        &self,
        clusters: &mut ClusterGraph,
    ) -> Result<FxHashMap<String, ClusterId>, InputError> {
        let mut specs: FxHashMap<&str, &ClusterSpec> = FxHashMap::default();
        for spec in &self.clusters {
            if specs.insert(spec.id.as_str(), spec).is_some() {
                return Err(InputError::DuplicateCluster {
                    id: spec.id.clone(),
                });
            }
        }

        let explicit: FxHashSet<usize> = self.clusters.iter().filter_map(|c| c.index).collect();
        let mut next_index = 1usize;
        let mut created: FxHashMap<String, ClusterId> = FxHashMap::default();

        for spec in &self.clusters {
            let mut pending: Vec<&ClusterSpec> = Vec::new();
            let mut cur = spec;
            while !created.contains_key(&cur.id) {
                if pending.iter().any(|p| p.id == cur.id) {
                    return Err(InputError::ClusterCycle { id: cur.id.clone() });
                }
                pending.push(cur);
                let Some(parent) = &cur.parent else {
                    break;
                };
                cur = specs
                    .get(parent.as_str())
                    .copied()
                    .ok_or_else(|| InputError::UnknownCluster { id: parent.clone() })?;
            }

            for spec in pending.into_iter().rev() {
                let parent = match &spec.parent {
                    Some(p) => created[p],
                    None => clusters.root(),
                };
                let index = match spec.index {
                    Some(index) => index,
                    None => {
                        while explicit.contains(&next_index)
                            || clusters.cluster_of_index(next_index).is_some()
                        {
                            next_index += 1;
                        }
                        next_index
                    }
                };
                let c = clusters.new_cluster_with_index(parent, index)?;
                created.insert(spec.id.clone(), c);
            }
        }
        Ok(created)
    }
}

fn angular_order(graph: &Graph, positions: &[(f64, f64)], v: NodeId) -> Vec<AdjId> {
    let (vx, vy) = positions[v.index()];
    let mut order: Vec<(f64, EdgeId, AdjId)> = graph
        .adj_entries(v)
        .map(|adj| {
            let (wx, wy) = positions[graph.twin_node(adj).index()];
            ((wy - vy).atan2(wx - vx), graph.edge_of(adj), adj)
        })
        .collect();
    order.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    order.into_iter().map(|(_, _, adj)| adj).collect()
}
