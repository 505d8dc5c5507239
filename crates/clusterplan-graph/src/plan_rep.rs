//! Planarized representation: a working copy of one connected component of an original graph.
//!
//! The copy starts as an exact replica (nodes, edges, rotations) and is then modified by edge
//! splits, routed edge paths and vertex expansions. Every copy node remembers the original node
//! it realizes, if any; every original edge maps to the chain of copy edges realizing it, ordered
//! from the copy of its source to the copy of its target.

use crate::error::{Error, Result};
use crate::graph::alg;
use crate::{AdjId, EdgeId, Graph, NodeId};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeType {
    /// Copy of an original node.
    Vertex,
    /// Split or crossing node without an original.
    #[default]
    Dummy,
    /// Node added by vertex expansion.
    Expander,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeType {
    #[default]
    Association,
    ClusterBoundary,
    Expansion,
}

pub struct PlanRep<'a> {
    original: &'a Graph,
    graph: Graph,
    components: Vec<Vec<NodeId>>,
    current_cc: Option<usize>,

    copy_of_node: Vec<Option<NodeId>>,
    chains: Vec<Vec<EdgeId>>,

    original_of_node: Vec<Option<NodeId>>,
    original_of_edge: Vec<Option<EdgeId>>,
    node_types: Vec<NodeType>,
    edge_types: Vec<EdgeType>,
    expanded: Vec<Option<NodeId>>,
    crossings: Vec<bool>,
}

fn slot<T: Clone + Default>(values: &mut Vec<T>, ix: usize) -> &mut T {
    if ix >= values.len() {
        values.resize(ix + 1, T::default());
    }
    &mut values[ix]
}

impl<'a> PlanRep<'a> {
    pub fn new(original: &'a Graph) -> Self {
        Self {
            original,
            graph: Graph::new(),
            components: alg::connected_components(original),
            current_cc: None,
            copy_of_node: Vec::new(),
            chains: Vec::new(),
            original_of_node: Vec::new(),
            original_of_edge: Vec::new(),
            node_types: Vec::new(),
            edge_types: Vec::new(),
            expanded: Vec::new(),
            crossings: Vec::new(),
        }
    }

    pub fn original_graph(&self) -> &'a Graph {
        self.original
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn number_of_ccs(&self) -> usize {
        self.components.len()
    }

    pub fn current_cc(&self) -> Option<usize> {
        self.current_cc
    }

    /// Original nodes of connected component `i`, in handle order.
    pub fn nodes_in_cc(&self, i: usize) -> &[NodeId] {
        self.components.get(i).map(Vec::as_slice).unwrap_or_default()
    }

    /// Rebuilds the working graph as a copy of component `i`, preserving every rotation.
    pub fn init_cc(&mut self, i: usize) -> Result<()> {
        let count = self.components.len();
        let Some(nodes) = self.components.get(i) else {
            return Err(Error::ComponentOutOfRange { index: i, count });
        };
        let original = self.original;

        self.graph.clear();
        self.copy_of_node = vec![None; original.node_capacity()];
        self.chains = vec![Vec::new(); original.edge_capacity()];
        self.original_of_node.clear();
        self.original_of_edge.clear();
        self.node_types.clear();
        self.edge_types.clear();
        self.expanded.clear();
        self.crossings.clear();

        for &v in nodes {
            let c = self.graph.new_node();
            self.copy_of_node[v.index()] = Some(c);
            *slot(&mut self.original_of_node, c.index()) = Some(v);
            *slot(&mut self.node_types, c.index()) = NodeType::Vertex;
        }

        let mut adj_copy: FxHashMap<AdjId, AdjId> = FxHashMap::default();
        for &v in nodes {
            for adj in original.adj_entries(v) {
                if !original.is_source(adj) {
                    continue;
                }
                let e = original.edge_of(adj);
                let (Some(s), Some(t)) = (
                    self.copy_of_node[original.source(e).index()],
                    self.copy_of_node[original.target(e).index()],
                ) else {
                    continue;
                };
                let ce = self.graph.new_edge(s, t);
                adj_copy.insert(original.adj_source(e), self.graph.adj_source(ce));
                adj_copy.insert(original.adj_target(e), self.graph.adj_target(ce));
                self.chains[e.index()] = vec![ce];
                *slot(&mut self.original_of_edge, ce.index()) = Some(e);
                *slot(&mut self.edge_types, ce.index()) = EdgeType::Association;
            }
        }

        for &v in nodes {
            let order: Vec<AdjId> = original
                .adj_entries(v)
                .filter_map(|adj| adj_copy.get(&adj).copied())
                .collect();
            if let Some(c) = self.copy_of_node[v.index()] {
                self.graph.sort_adj(c, &order);
            }
        }

        self.current_cc = Some(i);
        tracing::debug!(
            component = i,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "initialized planarized copy"
        );
        Ok(())
    }

    pub fn copy(&self, v: NodeId) -> Option<NodeId> {
        self.copy_of_node.get(v.index()).copied().flatten()
    }

    /// The single copy edge of an original edge that has not been split.
    pub fn copy_edge(&self, e: EdgeId) -> Result<EdgeId> {
        match self.chain(e) {
            [single] => Ok(*single),
            chain => Err(Error::NotSingleCopy {
                edge: e,
                len: chain.len(),
            }),
        }
    }

    /// Copy edges realizing the original edge `e`, from the copy of its source to the copy of its
    /// target. Empty when `e` is currently not represented.
    pub fn chain(&self, e: EdgeId) -> &[EdgeId] {
        self.chains.get(e.index()).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn original(&self, v: NodeId) -> Option<NodeId> {
        self.original_of_node.get(v.index()).copied().flatten()
    }

    pub fn original_edge(&self, e: EdgeId) -> Option<EdgeId> {
        self.original_of_edge.get(e.index()).copied().flatten()
    }

    pub fn node_type(&self, v: NodeId) -> NodeType {
        self.node_types.get(v.index()).copied().unwrap_or_default()
    }

    pub fn edge_type(&self, e: EdgeId) -> EdgeType {
        self.edge_types.get(e.index()).copied().unwrap_or_default()
    }

    pub fn is_cluster_boundary(&self, e: EdgeId) -> bool {
        self.edge_type(e) == EdgeType::ClusterBoundary
    }

    pub fn set_cluster_boundary(&mut self, e: EdgeId) {
        *slot(&mut self.edge_types, e.index()) = EdgeType::ClusterBoundary;
    }

    /// Whether `v` was created where a routed edge path crosses an existing edge.
    pub fn is_crossing(&self, v: NodeId) -> bool {
        self.crossings.get(v.index()).copied().unwrap_or(false)
    }

    /// The vertex a gadget node replaces, for nodes created by expansion.
    pub fn expanded_node(&self, v: NodeId) -> Option<NodeId> {
        self.expanded.get(v.index()).copied().flatten()
    }

    pub fn represents_comb_embedding(&self) -> bool {
        alg::represents_comb_embedding(&self.graph)
    }

    /// Splits copy edge `e`; the new node is a dummy and the new edge joins `e`'s chain.
    pub fn split(&mut self, e: EdgeId) -> EdgeId {
        let e2 = self.graph.split(e);
        let x = self.graph.source(e2);
        *slot(&mut self.node_types, x.index()) = NodeType::Dummy;
        *slot(&mut self.edge_types, e2.index()) = self.edge_type(e);

        if let Some(orig) = self.original_edge(e) {
            *slot(&mut self.original_of_edge, e2.index()) = Some(orig);
            let chain = &mut self.chains[orig.index()];
            let pos = chain.iter().position(|&c| c == e).unwrap_or(chain.len() - 1);
            chain.insert(pos + 1, e2);
        }
        tracing::trace!(edge = %e, node = %x, "split copy edge");
        e2
    }

    fn unsplit(&mut self, e_in: EdgeId, e_out: EdgeId) {
        if let Some(orig) = self.original_edge(e_out) {
            self.chains[orig.index()].retain(|&c| c != e_out);
            self.original_of_edge[e_out.index()] = None;
        }
        self.graph.unsplit(e_in, e_out);
    }

    /// Inserts an edge without original between the nodes of `adj_src` and `adj_tgt`, directly
    /// after both entries.
    pub fn new_edge(&mut self, adj_src: AdjId, adj_tgt: AdjId) -> EdgeId {
        let e = self.graph.new_edge_after(adj_src, adj_tgt);
        *slot(&mut self.edge_types, e.index()) = EdgeType::Association;
        e
    }

    /// Routes the currently unrepresented original edge `e_orig` through the embedding.
    ///
    /// `path` starts with an entry at the copy of the source and ends with an entry at the copy of
    /// the target; the new edge leaves and enters right after them. Every entry in between
    /// belongs to an edge to be crossed and lies on the face the route is currently in. Each
    /// crossed edge is split, and the chain of `e_orig` passes through the split nodes.
    pub fn insert_edge_path_embedded(&mut self, e_orig: EdgeId, path: &[AdjId]) -> Result<()> {
        if !self.chain(e_orig).is_empty() {
            return Err(Error::EdgeAlreadyRepresented { edge: e_orig });
        }
        let invalid = |message: &str| Error::InvalidCrossingPath {
            edge: e_orig,
            message: message.to_string(),
        };
        let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
            return Err(invalid("empty path"));
        };
        if path.len() < 2 {
            return Err(invalid("path needs a source and a target entry"));
        }

        let src_orig = self.original.source(e_orig);
        let tgt_orig = self.original.target(e_orig);
        let src = self.copy(src_orig).ok_or(Error::NoCopy { node: src_orig })?;
        let tgt = self.copy(tgt_orig).ok_or(Error::NoCopy { node: tgt_orig })?;
        if !self.graph.contains_adj(first) || self.graph.node_of(first) != src {
            return Err(invalid("first entry is not at the copy of the source"));
        }
        if !self.graph.contains_adj(last) || self.graph.node_of(last) != tgt {
            return Err(invalid("last entry is not at the copy of the target"));
        }
        let crossed = &path[1..path.len() - 1];
        if crossed.iter().any(|&adj| !self.graph.contains_adj(adj)) {
            return Err(invalid("crossed entry is not live"));
        }

        let mut chain: Vec<EdgeId> = Vec::with_capacity(path.len() - 1);
        let mut adj_src = first;
        for &adj in crossed {
            let crossed_piece = self.split(self.graph.edge_of(adj));
            *slot(&mut self.crossings, self.graph.source(crossed_piece).index()) = true;
            // Both entries at the split node: the one facing the current face receives the
            // incoming segment, the other one starts the next.
            let adj_tgt = self.graph.twin(adj);
            let adj_next = self.graph.succ(adj_tgt);
            let seg = self.graph.new_edge_after(adj_src, adj_tgt);
            chain.push(seg);
            adj_src = adj_next;
        }
        chain.push(self.graph.new_edge_after(adj_src, last));

        for &seg in &chain {
            *slot(&mut self.original_of_edge, seg.index()) = Some(e_orig);
            *slot(&mut self.edge_types, seg.index()) = EdgeType::Association;
        }
        tracing::trace!(edge = %e_orig, crossings = crossed.len(), "inserted edge path");
        self.chains[e_orig.index()] = chain;
        Ok(())
    }

    /// Deletes the chain of `e_orig`, unsplitting the crossing dummies it passed through. Other
    /// dummies on the chain, such as cluster boundary nodes, keep their remaining edges.
    pub fn remove_edge_path_embedded(&mut self, e_orig: EdgeId) {
        let Some(chain) = self.chains.get_mut(e_orig.index()).map(std::mem::take) else {
            return;
        };
        let interior: Vec<NodeId> = chain
            .iter()
            .take(chain.len().saturating_sub(1))
            .map(|&seg| self.graph.target(seg))
            .collect();
        for &seg in &chain {
            self.graph.delete_edge(seg);
            self.original_of_edge[seg.index()] = None;
        }
        for x in interior {
            if !self.is_crossing(x) || self.graph.degree(x) != 2 {
                continue;
            }
            let Some(a) = self.graph.first_adj(x) else {
                continue;
            };
            let (ea, eb) = (self.graph.edge_of(a), self.graph.edge_of(self.graph.succ(a)));
            let (e_in, e_out) = if self.graph.target(ea) == x {
                (ea, eb)
            } else {
                (eb, ea)
            };
            if self.graph.target(e_in) == x && self.graph.source(e_out) == x {
                self.unsplit(e_in, e_out);
            }
        }
    }

    /// Replaces `v` by a gadget of `parts` nodes: `v` keeps the first contiguous run of its
    /// rotation, each further run moves to a new expander node, and consecutive gadget nodes are
    /// joined by expansion edges placed in the corners between the runs. Returns the gadget with
    /// `v` first.
    pub fn expand_node(&mut self, v: NodeId, parts: usize) -> Result<Vec<NodeId>> {
        let degree = self.graph.degree(v);
        if parts == 0 || parts > degree {
            return Err(Error::InvalidExpansion {
                node: v,
                degree,
                parts,
            });
        }
        let mut gadget = vec![v];
        if parts == 1 {
            return Ok(gadget);
        }

        let rotation: Vec<AdjId> = self.graph.adj_entries(v).collect();
        let (base, extra) = (degree / parts, degree % parts);
        let mut runs: Vec<&[AdjId]> = Vec::with_capacity(parts);
        let mut start = 0usize;
        for i in 0..parts {
            let len = base + usize::from(i < extra);
            runs.push(&rotation[start..start + len]);
            start += len;
        }

        for run in runs.iter().skip(1) {
            let u = self.graph.new_node();
            *slot(&mut self.node_types, u.index()) = NodeType::Expander;
            *slot(&mut self.expanded, u.index()) = Some(v);
            for &adj in run.iter() {
                self.graph.move_adj(adj, u);
            }
            gadget.push(u);
        }

        for i in 0..parts {
            let last = runs[i][runs[i].len() - 1];
            let next_first = runs[(i + 1) % parts][0];
            let e = self
                .graph
                .new_edge_after(last, self.graph.pred(next_first));
            *slot(&mut self.edge_types, e.index()) = EdgeType::Expansion;
        }
        tracing::trace!(node = %v, parts, "expanded vertex");
        Ok(gadget)
    }

    /// Expands every original vertex of degree above four into one gadget node per incident edge;
    /// with `low_degree_expand`, vertices of degree two to four as well. Returns the gadgets.
    pub fn expand(&mut self, low_degree_expand: bool) -> Result<Vec<Vec<NodeId>>> {
        let candidates: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|&v| self.node_type(v) == NodeType::Vertex)
            .filter(|&v| {
                let degree = self.graph.degree(v);
                degree > 4 || (low_degree_expand && degree >= 2)
            })
            .collect();
        let mut gadgets = Vec::with_capacity(candidates.len());
        for v in candidates {
            let degree = self.graph.degree(v);
            gadgets.push(self.expand_node(v, degree)?);
        }
        Ok(gadgets)
    }
}
