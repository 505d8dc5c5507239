//! Rooted cluster hierarchy over the nodes of an embedded [`Graph`].
//!
//! Clusters are laminar: every node belongs directly to exactly one cluster, and a cluster's
//! region consists of its own nodes plus those of all its descendants. The root stands for the
//! unclustered whole.

use crate::error::{Error, Result};
use crate::{AdjId, Graph, NodeId};
use rustc_hash::FxBuildHasher;
use std::fmt;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(usize);

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct ClusterEntry {
    index: usize,
    parent: Option<ClusterId>,
    children: Vec<ClusterId>,
    nodes: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct ClusterGraph {
    clusters: Vec<ClusterEntry>,
    node_cluster: Vec<ClusterId>,
    by_index: HashMap<usize, ClusterId>,
    next_index: usize,
}

const ROOT: ClusterId = ClusterId(0);

impl ClusterGraph {
    /// Creates the hierarchy with only the root cluster (index 0), which holds every node of `g`.
    pub fn new(g: &Graph) -> Self {
        let mut by_index = HashMap::default();
        by_index.insert(0, ROOT);
        Self {
            clusters: vec![ClusterEntry {
                index: 0,
                parent: None,
                children: Vec::new(),
                nodes: g.nodes().collect(),
            }],
            node_cluster: vec![ROOT; g.node_capacity()],
            by_index,
            next_index: 1,
        }
    }

    pub fn root(&self) -> ClusterId {
        ROOT
    }

    pub fn is_root(&self, c: ClusterId) -> bool {
        c == ROOT
    }

    /// Adds an empty child of `parent` with the smallest unused index.
    pub fn new_cluster(&mut self, parent: ClusterId) -> ClusterId {
        while self.by_index.contains_key(&self.next_index) {
            self.next_index += 1;
        }
        let index = self.next_index;
        self.push_cluster(parent, index)
    }

    /// Adds an empty child of `parent` carrying a caller-chosen index. Indices need not be
    /// contiguous but must be unique.
    pub fn new_cluster_with_index(&mut self, parent: ClusterId, index: usize) -> Result<ClusterId> {
        if self.by_index.contains_key(&index) {
            return Err(Error::DuplicateClusterIndex { index });
        }
        Ok(self.push_cluster(parent, index))
    }

    fn push_cluster(&mut self, parent: ClusterId, index: usize) -> ClusterId {
        let c = ClusterId(self.clusters.len());
        self.clusters.push(ClusterEntry {
            index,
            parent: Some(parent),
            children: Vec::new(),
            nodes: Vec::new(),
        });
        self.clusters[parent.0].children.push(c);
        self.by_index.insert(index, c);
        c
    }

    /// Moves `v` from its current cluster into `c`.
    pub fn reassign_node(&mut self, v: NodeId, c: ClusterId) {
        if v.index() >= self.node_cluster.len() {
            self.node_cluster.resize(v.index() + 1, ROOT);
        }
        let old = self.node_cluster[v.index()];
        self.clusters[old.0].nodes.retain(|&w| w != v);
        self.clusters[c.0].nodes.push(v);
        self.node_cluster[v.index()] = c;
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn clusters(&self) -> impl Iterator<Item = ClusterId> + '_ {
        (0..self.clusters.len()).map(ClusterId)
    }

    pub fn index(&self, c: ClusterId) -> usize {
        self.clusters[c.0].index
    }

    pub fn cluster_of_index(&self, index: usize) -> Option<ClusterId> {
        self.by_index.get(&index).copied()
    }

    pub fn parent(&self, c: ClusterId) -> Option<ClusterId> {
        self.clusters[c.0].parent
    }

    /// Children in creation order.
    pub fn children(&self, c: ClusterId) -> &[ClusterId] {
        &self.clusters[c.0].children
    }

    /// Nodes assigned directly to `c` (not to one of its descendants).
    pub fn nodes(&self, c: ClusterId) -> &[NodeId] {
        &self.clusters[c.0].nodes
    }

    /// The cluster `v` belongs to directly. Nodes unknown to the hierarchy belong to the root.
    pub fn cluster_of(&self, v: NodeId) -> ClusterId {
        self.node_cluster.get(v.index()).copied().unwrap_or(ROOT)
    }

    /// Whether `c` equals `ancestor` or lies below it.
    pub fn is_descendant(&self, c: ClusterId, ancestor: ClusterId) -> bool {
        let mut cur = Some(c);
        while let Some(x) = cur {
            if x == ancestor {
                return true;
            }
            cur = self.parent(x);
        }
        false
    }

    /// Whether `v` lies in the region of `c`, i.e. in `c` or one of its descendants.
    pub fn contains_node(&self, c: ClusterId, v: NodeId) -> bool {
        self.is_descendant(self.cluster_of(v), c)
    }

    /// Clusters in post-order: every child before its parent, siblings in creation order, the
    /// root last. Uses an explicit stack, so deep hierarchies do not recurse.
    pub fn postorder(&self) -> Vec<ClusterId> {
        let mut out: Vec<ClusterId> = Vec::with_capacity(self.clusters.len());
        let mut stack: Vec<(ClusterId, usize)> = vec![(ROOT, 0)];
        while let Some(top) = stack.last_mut() {
            let (c, next_child) = *top;
            if let Some(&child) = self.clusters[c.0].children.get(next_child) {
                top.1 += 1;
                stack.push((child, 0));
            } else {
                out.push(c);
                stack.pop();
            }
        }
        out
    }

    /// Adjacency entries of `g` at nodes inside `c`'s region whose twin lies outside, in rotation
    /// order around the region.
    ///
    /// The order comes from walking the region boundary: step to `succ`, follow entries that stay
    /// inside through their twin, and report each entry that leaves the region. The walk starts
    /// at the crossing entry of the lowest edge. Every crossing entry must be reached by that
    /// single walk.
    pub fn adj_entries(&self, g: &Graph, c: ClusterId) -> Result<Vec<AdjId>> {
        let mut inside = vec![false; g.node_capacity()];
        for v in g.nodes() {
            inside[v.index()] = self.contains_node(c, v);
        }

        let mut crossing: Vec<AdjId> = Vec::new();
        for e in g.edges() {
            let (s, t) = (g.source(e), g.target(e));
            match (inside[s.index()], inside[t.index()]) {
                (true, false) => crossing.push(g.adj_source(e)),
                (false, true) => crossing.push(g.adj_target(e)),
                _ => {}
            }
        }
        let Some(&start) = crossing.first() else {
            return Ok(Vec::new());
        };

        let limit = 2 * g.edge_count() + 1;
        let mut out = vec![start];
        let mut cur = start;
        let mut steps = 0usize;
        loop {
            steps += 1;
            if steps > limit {
                return Err(Error::UnclosedBoundary {
                    index: self.index(c),
                });
            }
            cur = g.succ(cur);
            if inside[g.twin_node(cur).index()] {
                cur = g.twin(cur);
                continue;
            }
            if cur == start {
                break;
            }
            out.push(cur);
        }

        if out.len() != crossing.len() {
            return Err(Error::DisconnectedBoundary {
                index: self.index(c),
                reached: out.len(),
                total: crossing.len(),
            });
        }
        Ok(out)
    }
}
