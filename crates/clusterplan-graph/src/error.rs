use crate::{EdgeId, NodeId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cluster index {index} is already in use")]
    DuplicateClusterIndex { index: usize },

    #[error(
        "adjacent edges of cluster {index} form more than one cyclic run ({reached} of {total} reached from the first)"
    )]
    DisconnectedBoundary {
        index: usize,
        reached: usize,
        total: usize,
    },

    #[error("boundary walk around cluster {index} did not close")]
    UnclosedBoundary { index: usize },

    #[error("connected component {index} does not exist ({count} components)")]
    ComponentOutOfRange { index: usize, count: usize },

    #[error("original node {node} has no copy in the current component")]
    NoCopy { node: NodeId },

    #[error("original edge {edge} is realized by {len} copy edges, expected exactly one")]
    NotSingleCopy { edge: EdgeId, len: usize },

    #[error("original edge {edge} is already represented in the copy")]
    EdgeAlreadyRepresented { edge: EdgeId },

    #[error("invalid crossing path for original edge {edge}: {message}")]
    InvalidCrossingPath { edge: EdgeId, message: String },

    #[error("cannot expand node {node} of degree {degree} into {parts} gadget nodes")]
    InvalidExpansion {
        node: NodeId,
        degree: usize,
        parts: usize,
    },
}
