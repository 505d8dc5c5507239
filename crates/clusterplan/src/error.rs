use clusterplan_graph::{ClusterId, NodeId};

pub type Result<T> = std::result::Result<T, Error>;

/// Where an embedding validity check failed during boundary modeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    BeforeModeling,
    AfterCluster { index: usize },
    AfterModeling,
}

impl std::fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Checkpoint::BeforeModeling => write!(f, "before boundary modeling"),
            Checkpoint::AfterCluster { index } => write!(f, "after the boundary of cluster {index}"),
            Checkpoint::AfterModeling => write!(f, "after boundary modeling"),
        }
    }
}

/// The three fatal failure classes. None of them is retried; the caller decides whether to
/// abort the pipeline or skip the affected component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller invoked an operation out of order or with invalid arguments.
    Precondition,
    /// The input cluster structure is malformed (an algorithm failure, reportable as bad data).
    StructuralInconsistency,
    /// The working graph stopped representing a planar combinatorial embedding.
    EmbeddingInvalidity,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cluster id of node {node} is not set")]
    UnsetClusterId { node: NodeId },

    #[error("node {node} carries cluster id {index}, which names no cluster")]
    UnknownClusterIndex { node: NodeId, index: usize },

    #[error("crossing node {node} has degree {degree}, expected 4")]
    CrossingDegree { node: NodeId, degree: usize },

    #[error("crossing at node {node}: {message}")]
    AlgorithmFailure { node: NodeId, message: String },

    #[error("cluster {cluster} has no parent to fall back on")]
    MissingParent { cluster: ClusterId },

    #[error("embedding is not a planar combinatorial embedding {checkpoint}")]
    InvalidEmbedding { checkpoint: Checkpoint },

    #[error(transparent)]
    Graph(#[from] clusterplan_graph::Error),

    #[error(transparent)]
    Input(#[from] crate::input::InputError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsetClusterId { .. }
            | Error::UnknownClusterIndex { .. }
            | Error::CrossingDegree { .. }
            | Error::Input(_) => ErrorKind::Precondition,
            Error::AlgorithmFailure { .. } | Error::MissingParent { .. } => {
                ErrorKind::StructuralInconsistency
            }
            Error::InvalidEmbedding { .. } => ErrorKind::EmbeddingInvalidity,
            Error::Graph(err) => match err {
                clusterplan_graph::Error::DisconnectedBoundary { .. }
                | clusterplan_graph::Error::UnclosedBoundary { .. } => {
                    ErrorKind::StructuralInconsistency
                }
                _ => ErrorKind::Precondition,
            },
        }
    }
}
