#![forbid(unsafe_code)]

//! Cluster-aware planarized graph copies.
//!
//! A [`ClusterPlanRep`] is a planarized working copy of one connected component of a clustered
//! graph. On top of the plain copy it:
//!
//! - models each cluster's border as a cycle of boundary edges ([`ClusterPlanRep::model_boundaries`]),
//! - tags every node and edge with the index of the cluster it lies in,
//! - places crossings of routed edges in the right cluster
//!   ([`ClusterPlanRep::insert_edge_path_embedded`]),
//! - keeps cluster tags on vertex expansion gadgets ([`ClusterPlanRep::expand`]).

pub use clusterplan_graph as graph;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod boundary;
mod cluster_plan_rep;
mod crossing;
pub mod error;
mod expansion;
pub mod gml;
pub mod input;

pub use boundary::BoundaryOptions;
pub use cluster_plan_rep::ClusterPlanRep;
pub use error::{Checkpoint, Error, ErrorKind, Result};
pub use gml::Layout;
pub use input::{ClusteredGraph, ClusteredGraphSpec, InputError};
