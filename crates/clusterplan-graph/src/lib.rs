#![forbid(unsafe_code)]

//! Embedded graph containers used by `clusterplan`.
//!
//! - [`Graph`]: an arena-backed combinatorial embedding (rotation system) with stable handles.
//! - [`alg`]: face traversal, connectivity and the embedding validity predicate.
//! - [`ClusterGraph`]: a rooted, laminar cluster hierarchy over the nodes of a graph.
//! - [`PlanRep`]: a planarized working copy of one connected component of an original graph.

pub mod cluster;
pub mod error;
mod graph;
pub mod plan_rep;

pub use cluster::{ClusterGraph, ClusterId};
pub use error::{Error, Result};
pub use graph::{AdjId, EdgeId, Graph, NodeId, Rotation, alg};
pub use plan_rep::{EdgeType, NodeType, PlanRep};
