//! Cluster boundary modeling.
//!
//! Every edge leaving a cluster's region is split once per cluster it leaves, and the split
//! nodes of one cluster are joined, in rotation order, by a cycle of boundary edges. Clusters are
//! handled children first, so an inner boundary sits closer to its cluster's nodes than the
//! boundaries of its ancestors.

use crate::ClusterPlanRep;
use crate::error::{Checkpoint, Error, Result};
use clusterplan_graph::{AdjId, ClusterId, EdgeId};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryOptions {
    /// Verify the combinatorial embedding before modeling, after each cluster and at the end.
    pub check_embedding: bool,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            check_embedding: cfg!(debug_assertions),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Outgoing,
    Incoming,
}

/// State of one modeling pass, keyed by adjacency entries of the original graph: which way the
/// original edge points relative to the region, and which copy edge currently continues it
/// outwards.
#[derive(Debug, Default)]
struct BoundaryPass {
    direction: FxHashMap<AdjId, Direction>,
    current_edge: FxHashMap<AdjId, EdgeId>,
}

impl ClusterPlanRep<'_> {
    pub fn model_boundaries(&mut self) -> Result<()> {
        self.model_boundaries_with(&BoundaryOptions::default())
    }

    pub fn model_boundaries_with(&mut self, options: &BoundaryOptions) -> Result<()> {
        self.check_embedding(options, Checkpoint::BeforeModeling)?;

        let clusters = self.cluster_graph();
        if clusters.children(clusters.root()).is_empty() {
            let g = self.graph();
            self.root_adj = g.first_edge().map(|e| g.adj_source(e));
        }

        let mut pass = BoundaryPass::default();
        for c in clusters.postorder() {
            if clusters.is_root(c) {
                continue;
            }
            let segments = self.insert_boundary(c, &mut pass)?;
            tracing::debug!(cluster = clusters.index(c), segments, "modeled cluster boundary");
            self.check_embedding(
                options,
                Checkpoint::AfterCluster {
                    index: clusters.index(c),
                },
            )?;
        }

        self.refresh_root_adj();
        self.check_embedding(options, Checkpoint::AfterModeling)
    }

    /// Splits every represented edge crossing `c`'s region and closes the cycle of boundary
    /// edges through the split nodes. Returns the number of boundary edges.
    fn insert_boundary(&mut self, c: ClusterId, pass: &mut BoundaryPass) -> Result<usize> {
        let clusters = self.cluster_graph();
        let original = self.original_graph();
        let index = clusters.index(c);
        let adjacent = clusters.adj_entries(original, c)?;

        // Entries pointing out of the split nodes, and entries pointing back inside.
        let mut sources: Vec<AdjId> = Vec::with_capacity(adjacent.len());
        let mut targets: Vec<AdjId> = Vec::with_capacity(adjacent.len());
        let mut last_current: Option<EdgeId> = None;

        for adj in adjacent {
            let orig_edge = original.edge_of(adj);
            let chain = self.plan_rep.chain(orig_edge);
            let (Some(&front), Some(&back)) = (chain.first(), chain.last()) else {
                tracing::trace!(cluster = index, edge = %orig_edge, "skipping unrepresented edge");
                continue;
            };

            let direction = *pass.direction.entry(adj).or_insert_with(|| {
                if original.is_source(adj) {
                    Direction::Outgoing
                } else {
                    Direction::Incoming
                }
            });
            let split_edge = match pass.current_edge.get(&adj) {
                Some(&e) => e,
                None => match direction {
                    Direction::Outgoing => front,
                    Direction::Incoming => back,
                },
            };

            let new_edge = self.split(split_edge);
            let g = self.plan_rep.graph();
            let x = g.source(new_edge);
            match direction {
                Direction::Outgoing => {
                    pass.current_edge.insert(adj, new_edge);
                    pass.current_edge.insert(original.twin(adj), new_edge);
                    sources.push(g.adj_source(new_edge));
                    targets.push(g.adj_target(split_edge));
                    last_current = Some(new_edge);
                }
                Direction::Incoming => {
                    pass.current_edge.insert(adj, split_edge);
                    sources.push(g.adj_target(split_edge));
                    targets.push(g.adj_source(new_edge));
                    last_current = Some(split_edge);
                }
            }
            self.set_cluster_id(x, index);
        }

        if clusters.parent(c).is_some_and(|p| clusters.is_root(p)) {
            if let Some(e) = last_current {
                self.root_adj = Some(self.graph().adj_source(e));
            }
        }

        if sources.is_empty() {
            return Ok(0);
        }
        targets.rotate_left(1);
        let segments = sources.len();
        for (s, t) in sources.into_iter().zip(targets) {
            let e = self.new_edge(s, t);
            self.plan_rep.set_cluster_boundary(e);
            self.set_edge_cluster_id(e, index);
        }
        Ok(segments)
    }

    fn check_embedding(&self, options: &BoundaryOptions, checkpoint: Checkpoint) -> Result<()> {
        if options.check_embedding && !self.represents_comb_embedding() {
            return Err(Error::InvalidEmbedding { checkpoint });
        }
        Ok(())
    }
}
