use crate::ClusterPlanRep;
use crate::error::{Error, Result};
use clusterplan_graph::{NodeId, NodeType};

impl ClusterPlanRep<'_> {
    /// Expands `v` into `parts` gadget nodes (see [`clusterplan_graph::PlanRep::expand_node`]);
    /// every gadget node joins `v`'s cluster.
    pub fn expand_node(&mut self, v: NodeId, parts: usize) -> Result<Vec<NodeId>> {
        let index = self.cluster_id(v).ok_or(Error::UnsetClusterId { node: v })?;
        let gadget = self.plan_rep.expand_node(v, parts)?;
        for &u in &gadget {
            self.set_cluster_id(u, index);
        }
        Ok(gadget)
    }

    /// Expands high-degree vertices, and with `low_degree_expand` those of degree two and up,
    /// then propagates cluster ids onto the new gadget nodes.
    ///
    /// Fails without touching the copy if a vertex lacks a cluster id.
    pub fn expand(&mut self, low_degree_expand: bool) -> Result<Vec<Vec<NodeId>>> {
        let g = self.graph();
        if let Some(v) = g
            .nodes()
            .filter(|&v| self.plan_rep.node_type(v) == NodeType::Vertex)
            .find(|&v| self.cluster_id(v).is_none())
        {
            return Err(Error::UnsetClusterId { node: v });
        }

        let gadgets = self.plan_rep.expand(low_degree_expand)?;
        self.propagate_expansion_ids()?;
        tracing::debug!(gadgets = gadgets.len(), low_degree_expand, "expanded vertices");
        Ok(gadgets)
    }

    /// Gives every node created by expansion the cluster id of the vertex it replaces.
    fn propagate_expansion_ids(&mut self) -> Result<()> {
        let g = self.plan_rep.graph();
        let pairs: Vec<(NodeId, NodeId)> = g
            .nodes()
            .filter_map(|u| self.plan_rep.expanded_node(u).map(|v| (u, v)))
            .collect();
        for (u, v) in pairs {
            let index = self.cluster_id(v).ok_or(Error::UnsetClusterId { node: v })?;
            self.set_cluster_id(u, index);
        }
        Ok(())
    }
}
