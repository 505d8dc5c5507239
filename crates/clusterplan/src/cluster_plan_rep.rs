//! The clustered planar copy: a [`PlanRep`] whose nodes and edges carry the index of the cluster
//! they lie in.
//!
//! Copies of original nodes take the index of their original's cluster. Boundary and crossing
//! dummies get theirs from boundary modeling and crossing resolution; gadget nodes inherit the
//! index of the vertex they replace.

use crate::error::{Error, Result};
use clusterplan_graph::{AdjId, ClusterGraph, ClusterId, EdgeId, Graph, NodeId, PlanRep};
use rustc_hash::FxHashMap;

pub struct ClusterPlanRep<'a> {
    pub(crate) plan_rep: PlanRep<'a>,
    clusters: &'a ClusterGraph,
    node_cluster_id: Vec<Option<usize>>,
    edge_cluster_id: Vec<Option<usize>>,
    cluster_of_index: FxHashMap<usize, ClusterId>,
    pub(crate) root_adj: Option<AdjId>,
}

impl<'a> ClusterPlanRep<'a> {
    /// Creates an empty planarized copy of `original`; call [`Self::init_cc`] to populate it.
    ///
    /// The index lookup table is built here, once, from the hierarchy.
    pub fn new(original: &'a Graph, clusters: &'a ClusterGraph) -> Self {
        let cluster_of_index = clusters
            .clusters()
            .map(|c| (clusters.index(c), c))
            .collect();
        Self {
            plan_rep: PlanRep::new(original),
            clusters,
            node_cluster_id: Vec::new(),
            edge_cluster_id: Vec::new(),
            cluster_of_index,
            root_adj: None,
        }
    }

    pub fn plan_rep(&self) -> &PlanRep<'a> {
        &self.plan_rep
    }

    pub fn graph(&self) -> &Graph {
        self.plan_rep.graph()
    }

    pub fn original_graph(&self) -> &'a Graph {
        self.plan_rep.original_graph()
    }

    pub fn cluster_graph(&self) -> &'a ClusterGraph {
        self.clusters
    }

    pub fn number_of_ccs(&self) -> usize {
        self.plan_rep.number_of_ccs()
    }

    /// Copies connected component `i` and assigns the cluster ids of its original nodes.
    pub fn init_cc(&mut self, i: usize) -> Result<()> {
        self.plan_rep.init_cc(i)?;
        self.reset_cluster_ids();
        self.root_adj = None;
        self.refresh_root_adj();
        Ok(())
    }

    /// Clears every cluster id, then gives each copy of an original node its original's cluster
    /// index and each edge whose endpoints carry the same index that index. Everything else is
    /// left unset.
    pub fn reset_cluster_ids(&mut self) {
        self.node_cluster_id = vec![None; self.graph().node_capacity()];
        self.edge_cluster_id = vec![None; self.graph().edge_capacity()];

        let original = self.original_graph();
        for v in original.nodes() {
            if let Some(c) = self.plan_rep.copy(v) {
                self.node_cluster_id[c.index()] = Some(self.clusters.index(self.clusters.cluster_of(v)));
            }
        }

        let g = self.plan_rep.graph();
        for e in g.edges() {
            let s = self.node_cluster_id[g.source(e).index()];
            let t = self.node_cluster_id[g.target(e).index()];
            if s.is_some() && s == t {
                self.edge_cluster_id[e.index()] = s;
            }
        }
    }

    pub fn cluster_id(&self, v: NodeId) -> Option<usize> {
        self.node_cluster_id.get(v.index()).copied().flatten()
    }

    pub fn edge_cluster_id(&self, e: EdgeId) -> Option<usize> {
        self.edge_cluster_id.get(e.index()).copied().flatten()
    }

    pub(crate) fn set_cluster_id(&mut self, v: NodeId, index: usize) {
        if v.index() >= self.node_cluster_id.len() {
            self.node_cluster_id.resize(v.index() + 1, None);
        }
        self.node_cluster_id[v.index()] = Some(index);
    }

    pub(crate) fn set_edge_cluster_id(&mut self, e: EdgeId, index: usize) {
        if e.index() >= self.edge_cluster_id.len() {
            self.edge_cluster_id.resize(e.index() + 1, None);
        }
        self.edge_cluster_id[e.index()] = Some(index);
    }

    pub fn cluster_of_index(&self, index: usize) -> Option<ClusterId> {
        self.cluster_of_index.get(&index).copied()
    }

    /// The cluster a copy node has been placed in, looked up through its cluster id.
    pub fn cluster_of_dummy(&self, v: NodeId) -> Result<ClusterId> {
        let index = self.cluster_id(v).ok_or(Error::UnsetClusterId { node: v })?;
        self.cluster_of_index(index)
            .ok_or(Error::UnknownClusterIndex { node: v, index })
    }

    /// An adjacency entry on the outer face, once boundaries have been modeled. Always refers to
    /// a live edge of the current copy, or is `None` when the copy has no edges.
    pub fn root_adj(&self) -> Option<AdjId> {
        self.root_adj
    }

    pub fn is_cluster_boundary(&self, e: EdgeId) -> bool {
        self.plan_rep.is_cluster_boundary(e)
    }

    pub fn represents_comb_embedding(&self) -> bool {
        self.plan_rep.represents_comb_embedding()
    }

    /// Splits copy edge `e`. The new node starts without a cluster id; the new edge takes `e`'s.
    pub fn split(&mut self, e: EdgeId) -> EdgeId {
        let e2 = self.plan_rep.split(e);
        if let Some(index) = self.edge_cluster_id(e) {
            self.set_edge_cluster_id(e2, index);
        }
        e2
    }

    /// Inserts an edge without original directly after `adj_src` and `adj_tgt`.
    pub fn new_edge(&mut self, adj_src: AdjId, adj_tgt: AdjId) -> EdgeId {
        self.plan_rep.new_edge(adj_src, adj_tgt)
    }

    /// Deletes the chain of `e_orig`; the root entry moves to a live edge if it was on the chain.
    pub fn remove_edge_path_embedded(&mut self, e_orig: EdgeId) {
        self.plan_rep.remove_edge_path_embedded(e_orig);
        self.refresh_root_adj();
    }

    pub(crate) fn refresh_root_adj(&mut self) {
        let g = self.plan_rep.graph();
        if self.root_adj.is_some_and(|adj| g.contains_adj(adj)) {
            return;
        }
        self.root_adj = g.first_edge().map(|e| g.adj_source(e));
    }
}
