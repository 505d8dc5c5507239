//! Arena-backed combinatorial embedding.
//!
//! A [`Graph`] stores nodes, edges and adjacency entries (half-edges) in flat vectors addressed by
//! `Copy` handles. Every node keeps its incident adjacency entries in a circular doubly linked
//! list, the rotation. Deleted entities are tombstoned rather than removed, so a handle keeps
//! naming the same entity for the lifetime of the graph.
//!
//! Faces follow the `succ(twin(adj))` convention: the corner between `adj` and `succ(adj)` lies on
//! the face traversed by `twin(adj)`.

pub mod alg;
mod entries;

use entries::{AdjEntry, EdgeEntry, NodeEntry};
use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(usize);

        impl $name {
            fn new(ix: usize) -> Self {
                Self(ix)
            }

            /// Position in the owning arena; stable, suitable for indexing side arrays.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

handle!(
    /// Handle of a node.
    NodeId,
    "n"
);
handle!(
    /// Handle of an edge.
    EdgeId,
    "e"
);
handle!(
    /// Handle of an adjacency entry (half-edge).
    AdjId,
    "a"
);

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<NodeEntry>,
    edges: Vec<EdgeEntry>,
    adjs: Vec<AdjEntry>,
    live_nodes: usize,
    live_edges: usize,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn node_count(&self) -> usize {
        self.live_nodes
    }

    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Number of node slots ever allocated, including deleted nodes. Side arrays indexed by
    /// [`NodeId::index`] need this length.
    pub fn node_capacity(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_capacity(&self) -> usize {
        self.edges.len()
    }

    pub fn adj_capacity(&self) -> usize {
        self.adjs.len()
    }

    pub fn contains_node(&self, v: NodeId) -> bool {
        self.nodes.get(v.0).is_some_and(|n| n.alive)
    }

    pub fn contains_edge(&self, e: EdgeId) -> bool {
        self.edges.get(e.0).is_some_and(|e| e.alive)
    }

    pub fn contains_adj(&self, adj: AdjId) -> bool {
        self.adjs.get(adj.0).is_some_and(|a| {
            self.contains_edge(a.edge) && {
                let e = &self.edges[a.edge.0];
                e.adj_source == adj || e.adj_target == adj
            }
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.alive)
            .map(|(ix, _)| NodeId::new(ix))
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.alive)
            .map(|(ix, _)| EdgeId::new(ix))
    }

    pub fn first_edge(&self) -> Option<EdgeId> {
        self.edges().next()
    }

    pub fn source(&self, e: EdgeId) -> NodeId {
        self.edges[e.0].source
    }

    pub fn target(&self, e: EdgeId) -> NodeId {
        self.edges[e.0].target
    }

    pub fn adj_source(&self, e: EdgeId) -> AdjId {
        self.edges[e.0].adj_source
    }

    pub fn adj_target(&self, e: EdgeId) -> AdjId {
        self.edges[e.0].adj_target
    }

    pub fn opposite(&self, e: EdgeId, v: NodeId) -> NodeId {
        let entry = &self.edges[e.0];
        if entry.source == v {
            entry.target
        } else {
            entry.source
        }
    }

    pub fn twin(&self, adj: AdjId) -> AdjId {
        self.adjs[adj.0].twin
    }

    /// Next entry in the rotation of the owning node.
    pub fn succ(&self, adj: AdjId) -> AdjId {
        self.adjs[adj.0].succ
    }

    /// Previous entry in the rotation of the owning node.
    pub fn pred(&self, adj: AdjId) -> AdjId {
        self.adjs[adj.0].pred
    }

    pub fn node_of(&self, adj: AdjId) -> NodeId {
        self.adjs[adj.0].node
    }

    pub fn twin_node(&self, adj: AdjId) -> NodeId {
        self.node_of(self.twin(adj))
    }

    pub fn edge_of(&self, adj: AdjId) -> EdgeId {
        self.adjs[adj.0].edge
    }

    /// Whether `adj` is the source end of its edge.
    pub fn is_source(&self, adj: AdjId) -> bool {
        self.edges[self.adjs[adj.0].edge.0].adj_source == adj
    }

    pub fn face_cycle_succ(&self, adj: AdjId) -> AdjId {
        self.succ(self.twin(adj))
    }

    pub fn degree(&self, v: NodeId) -> usize {
        self.nodes[v.0].degree
    }

    pub fn first_adj(&self, v: NodeId) -> Option<AdjId> {
        self.nodes[v.0].first
    }

    /// Adjacency entries of `v` in rotation order, starting at [`Graph::first_adj`].
    pub fn adj_entries(&self, v: NodeId) -> Rotation<'_> {
        let first = self.nodes[v.0].first;
        Rotation {
            graph: self,
            first,
            next: first,
        }
    }

    pub fn new_node(&mut self) -> NodeId {
        let v = NodeId::new(self.nodes.len());
        self.nodes.push(NodeEntry {
            first: None,
            degree: 0,
            alive: true,
        });
        self.live_nodes += 1;
        v
    }

    /// Adds an edge `v -> w`, appending one entry to the end of each rotation.
    pub fn new_edge(&mut self, v: NodeId, w: NodeId) -> EdgeId {
        let (e, adj_src, adj_tgt) = self.push_edge(v, w);
        self.link_last(adj_src, v);
        self.link_last(adj_tgt, w);
        e
    }

    /// Adds an edge from the node of `adj_src` to the node of `adj_tgt`, placing the new entries
    /// directly after the given ones.
    pub fn new_edge_after(&mut self, adj_src: AdjId, adj_tgt: AdjId) -> EdgeId {
        let v = self.node_of(adj_src);
        let w = self.node_of(adj_tgt);
        let (e, new_src, new_tgt) = self.push_edge(v, w);
        self.link_after(new_src, adj_src);
        self.link_after(new_tgt, adj_tgt);
        e
    }

    /// Splits `e = (s, t)` by a new node `x`: afterwards `e` is `(s, x)` and the returned edge is
    /// `(x, t)`. The entries at `s` and `t` keep their identity; the one at `t` moves to the new
    /// edge.
    pub fn split(&mut self, e: EdgeId) -> EdgeId {
        let EdgeEntry {
            target,
            adj_source,
            adj_target,
            ..
        } = self.edges[e.0].clone();
        let x = self.new_node();

        let e2 = EdgeId::new(self.edges.len());
        let near = AdjId::new(self.adjs.len());
        let far = AdjId::new(self.adjs.len() + 1);
        self.adjs.push(AdjEntry {
            node: x,
            edge: e,
            twin: adj_source,
            succ: near,
            pred: near,
        });
        self.adjs.push(AdjEntry {
            node: x,
            edge: e2,
            twin: adj_target,
            succ: far,
            pred: far,
        });
        self.edges.push(EdgeEntry {
            source: x,
            target,
            adj_source: far,
            adj_target,
            alive: true,
        });
        self.live_edges += 1;

        self.adjs[adj_source.0].twin = near;
        self.adjs[adj_target.0].twin = far;
        self.adjs[adj_target.0].edge = e2;
        let entry = &mut self.edges[e.0];
        entry.target = x;
        entry.adj_target = near;

        self.link_last(near, x);
        self.link_last(far, x);
        e2
    }

    /// Reverts a split: `e_in = (s, x)` and `e_out = (x, t)` with `x` of degree two become the
    /// single edge `e_in = (s, t)`. `e_out` and `x` are deleted.
    pub fn unsplit(&mut self, e_in: EdgeId, e_out: EdgeId) {
        let x = self.target(e_in);
        debug_assert_eq!(self.source(e_out), x);
        debug_assert_eq!(self.degree(x), 2);

        let near = self.adj_target(e_in);
        let far = self.adj_source(e_out);
        let keep = self.adj_target(e_out);
        let src_adj = self.adj_source(e_in);
        let target = self.target(e_out);

        self.unlink(near);
        self.unlink(far);

        let entry = &mut self.edges[e_in.0];
        entry.target = target;
        entry.adj_target = keep;
        self.adjs[keep.0].edge = e_in;
        self.adjs[keep.0].twin = src_adj;
        self.adjs[src_adj.0].twin = keep;

        self.edges[e_out.0].alive = false;
        self.live_edges -= 1;
        self.nodes[x.0].alive = false;
        self.live_nodes -= 1;
    }

    pub fn delete_edge(&mut self, e: EdgeId) {
        if !self.contains_edge(e) {
            return;
        }
        let (adj_src, adj_tgt) = (self.adj_source(e), self.adj_target(e));
        self.unlink(adj_src);
        self.unlink(adj_tgt);
        self.edges[e.0].alive = false;
        self.live_edges -= 1;
    }

    /// Deletes `v` together with its incident edges.
    pub fn delete_node(&mut self, v: NodeId) {
        if !self.contains_node(v) {
            return;
        }
        while let Some(adj) = self.nodes[v.0].first {
            self.delete_edge(self.edge_of(adj));
        }
        self.nodes[v.0].alive = false;
        self.live_nodes -= 1;
    }

    /// Re-homes `adj` at the end of the rotation of `v`; the edge endpoint follows.
    pub fn move_adj(&mut self, adj: AdjId, v: NodeId) {
        let is_source = self.is_source(adj);
        self.unlink(adj);
        self.link_last(adj, v);
        let entry = &mut self.edges[self.adjs[adj.0].edge.0];
        if is_source {
            entry.source = v;
        } else {
            entry.target = v;
        }
    }

    /// Replaces the rotation of `v` by `order`, which must be a permutation of it.
    pub fn sort_adj(&mut self, v: NodeId, order: &[AdjId]) {
        debug_assert_eq!(order.len(), self.nodes[v.0].degree);
        let n = order.len();
        for (i, &adj) in order.iter().enumerate() {
            debug_assert_eq!(self.adjs[adj.0].node, v);
            self.adjs[adj.0].succ = order[(i + 1) % n];
            self.adjs[adj.0].pred = order[(i + n - 1) % n];
        }
        self.nodes[v.0].first = order.first().copied();
    }

    fn push_edge(&mut self, v: NodeId, w: NodeId) -> (EdgeId, AdjId, AdjId) {
        let e = EdgeId::new(self.edges.len());
        let adj_src = AdjId::new(self.adjs.len());
        let adj_tgt = AdjId::new(self.adjs.len() + 1);
        self.adjs.push(AdjEntry {
            node: v,
            edge: e,
            twin: adj_tgt,
            succ: adj_src,
            pred: adj_src,
        });
        self.adjs.push(AdjEntry {
            node: w,
            edge: e,
            twin: adj_src,
            succ: adj_tgt,
            pred: adj_tgt,
        });
        self.edges.push(EdgeEntry {
            source: v,
            target: w,
            adj_source: adj_src,
            adj_target: adj_tgt,
            alive: true,
        });
        self.live_edges += 1;
        (e, adj_src, adj_tgt)
    }

    fn link_after(&mut self, adj: AdjId, after: AdjId) {
        let v = self.adjs[after.0].node;
        let succ = self.adjs[after.0].succ;
        {
            let entry = &mut self.adjs[adj.0];
            entry.node = v;
            entry.pred = after;
            entry.succ = succ;
        }
        self.adjs[succ.0].pred = adj;
        self.adjs[after.0].succ = adj;
        self.nodes[v.0].degree += 1;
    }

    fn link_last(&mut self, adj: AdjId, v: NodeId) {
        match self.nodes[v.0].first {
            Some(first) => {
                let last = self.adjs[first.0].pred;
                self.link_after(adj, last);
            }
            None => {
                let entry = &mut self.adjs[adj.0];
                entry.node = v;
                entry.succ = adj;
                entry.pred = adj;
                let node = &mut self.nodes[v.0];
                node.first = Some(adj);
                node.degree = 1;
            }
        }
    }

    fn unlink(&mut self, adj: AdjId) {
        let AdjEntry {
            node, succ, pred, ..
        } = self.adjs[adj.0].clone();
        let entry = &mut self.nodes[node.0];
        entry.degree -= 1;
        if entry.degree == 0 {
            entry.first = None;
        } else {
            if entry.first == Some(adj) {
                entry.first = Some(succ);
            }
            self.adjs[pred.0].succ = succ;
            self.adjs[succ.0].pred = pred;
        }
        let entry = &mut self.adjs[adj.0];
        entry.succ = adj;
        entry.pred = adj;
    }
}

/// Iterator over the rotation of one node.
pub struct Rotation<'a> {
    graph: &'a Graph,
    first: Option<AdjId>,
    next: Option<AdjId>,
}

impl Iterator for Rotation<'_> {
    type Item = AdjId;

    fn next(&mut self) -> Option<AdjId> {
        let cur = self.next?;
        let succ = self.graph.succ(cur);
        self.next = if Some(succ) == self.first {
            None
        } else {
            Some(succ)
        };
        Some(cur)
    }
}
