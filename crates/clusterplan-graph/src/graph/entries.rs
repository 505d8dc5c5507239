//! Internal storage entries for [`Graph`](super::Graph).

use super::{AdjId, EdgeId, NodeId};

#[derive(Debug, Clone)]
pub(in crate::graph) struct NodeEntry {
    pub(in crate::graph) first: Option<AdjId>,
    pub(in crate::graph) degree: usize,
    pub(in crate::graph) alive: bool,
}

#[derive(Debug, Clone)]
pub(in crate::graph) struct EdgeEntry {
    pub(in crate::graph) source: NodeId,
    pub(in crate::graph) target: NodeId,
    pub(in crate::graph) adj_source: AdjId,
    pub(in crate::graph) adj_target: AdjId,
    pub(in crate::graph) alive: bool,
}

/// One endpoint incidence of an edge. `succ`/`pred` link the entry into the circular
/// rotation of `node`.
#[derive(Debug, Clone)]
pub(in crate::graph) struct AdjEntry {
    pub(in crate::graph) node: NodeId,
    pub(in crate::graph) edge: EdgeId,
    pub(in crate::graph) twin: AdjId,
    pub(in crate::graph) succ: AdjId,
    pub(in crate::graph) pred: AdjId,
}
