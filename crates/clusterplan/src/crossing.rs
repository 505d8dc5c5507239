//! Cluster assignment for crossing dummies created when an edge is routed through the copy.
//!
//! A crossing node splits an existing edge. The two nodes along that crossed edge determine
//! which cluster the crossing lies in: boundary dummies sit on the border of their cluster, so a
//! crossing between a cluster's boundary and one of its children's boundaries belongs to the
//! outer cluster, and a crossing between two sibling boundaries belongs to their parent.

use crate::ClusterPlanRep;
use crate::error::{Error, Result};
use clusterplan_graph::{AdjId, ClusterId, EdgeId, NodeId};

impl ClusterPlanRep<'_> {
    /// Routes the unrepresented original edge `e_orig` along `path` (see
    /// [`clusterplan_graph::PlanRep::insert_edge_path_embedded`]) and assigns a cluster id to every
    /// crossing node on its new chain. The pieces of a crossed edge share its edge cluster id.
    ///
    /// Every crossing is resolved before any id is written. If one cannot be resolved, the new
    /// chain is removed again and the copy is left as it was before the call.
    pub fn insert_edge_path_embedded(&mut self, e_orig: EdgeId, path: &[AdjId]) -> Result<()> {
        self.plan_rep.insert_edge_path_embedded(e_orig, path)?;

        let resolved = match self.resolve_chain_crossings(e_orig) {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::debug!(edge = %e_orig, error = %err, "removing unresolvable edge path");
                self.plan_rep.remove_edge_path_embedded(e_orig);
                self.refresh_root_adj();
                return Err(err);
            }
        };
        for (adj_in, index) in resolved {
            let g = self.graph();
            let crossing = g.node_of(adj_in);
            let pieces = [g.edge_of(g.pred(adj_in)), g.edge_of(g.succ(adj_in))];
            tracing::trace!(node = %crossing, cluster = index, "resolved crossing cluster");
            self.set_cluster_id(crossing, index);
            if let Some(edge_index) = pieces.iter().find_map(|&e| self.edge_cluster_id(e)) {
                for e in pieces {
                    self.set_edge_cluster_id(e, edge_index);
                }
            }
        }
        self.refresh_root_adj();
        Ok(())
    }

    /// The entry into each crossing node on the chain of `e_orig`, with its cluster index.
    fn resolve_chain_crossings(&self, e_orig: EdgeId) -> Result<Vec<(AdjId, usize)>> {
        let g = self.graph();
        let target_copy = self.plan_rep.copy(self.original_graph().target(e_orig));
        self.plan_rep
            .chain(e_orig)
            .iter()
            .filter(|&&seg| Some(g.target(seg)) != target_copy)
            .map(|&seg| {
                let adj_in = g.adj_target(seg);
                self.resolve_crossing(adj_in).map(|index| (adj_in, index))
            })
            .collect()
    }

    /// The cluster index for the crossing node entered through `adj_in`.
    ///
    /// The crossed edge runs through the entries before and after `adj_in` in the rotation. Does
    /// not modify anything, so resolving the same crossing twice yields the same index.
    pub fn resolve_crossing(&self, adj_in: AdjId) -> Result<usize> {
        let g = self.graph();
        let crossing = g.node_of(adj_in);
        let degree = g.degree(crossing);
        if degree != 4 {
            return Err(Error::CrossingDegree {
                node: crossing,
                degree,
            });
        }
        let v1 = g.twin_node(g.pred(adj_in));
        let v2 = g.twin_node(g.succ(adj_in));
        let c = self.crossing_cluster(crossing, v1, v2)?;
        Ok(self.cluster_graph().index(c))
    }

    fn crossing_cluster(&self, crossing: NodeId, v1: NodeId, v2: NodeId) -> Result<ClusterId> {
        let clusters = self.cluster_graph();
        let failure = |message: String| Error::AlgorithmFailure {
            node: crossing,
            message,
        };

        match (self.plan_rep.original(v1), self.plan_rep.original(v2)) {
            (Some(o1), Some(o2)) => {
                let (c1, c2) = (clusters.cluster_of(o1), clusters.cluster_of(o2));
                if c1 != c2 {
                    return Err(failure(format!(
                        "crossed edge joins original nodes of clusters {} and {}",
                        clusters.index(c1),
                        clusters.index(c2)
                    )));
                }
                Ok(c1)
            }
            (Some(orig), None) | (None, Some(orig)) => {
                let dummy = if self.plan_rep.original(v1).is_some() {
                    v2
                } else {
                    v1
                };
                let or_c = clusters.cluster_of(orig);
                let d_c = self.cluster_of_dummy(dummy)?;
                if or_c == d_c || clusters.parent(d_c) == Some(or_c) {
                    return Ok(or_c);
                }
                let relation = if clusters.parent(or_c) == Some(d_c) {
                    "lies in a child of"
                } else {
                    "is unrelated to"
                };
                Err(failure(format!(
                    "cluster {} of original node {orig} {relation} cluster {} of dummy {dummy}",
                    clusters.index(or_c),
                    clusters.index(d_c)
                )))
            }
            (None, None) => {
                let c1 = self.cluster_of_dummy(v1)?;
                let c2 = self.cluster_of_dummy(v2)?;
                if c1 == c2 || clusters.parent(c2) == Some(c1) {
                    Ok(c1)
                } else if clusters.parent(c1) == Some(c2) {
                    Ok(c2)
                } else {
                    clusters
                        .parent(c1)
                        .ok_or(Error::MissingParent { cluster: c1 })
                }
            }
        }
    }
}
