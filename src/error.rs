//! Error types for the analysis pipeline

use thiserror::Error;

/// Result alias for analysis operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors surfaced by graph metrics and partition algorithms.
///
/// Malformed edit records are not represented here: ingestion skips them
/// and reports a count instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Analysis requested on a graph with no nodes.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// A distance metric was requested on a disconnected graph.
    #[error("{metric} is undefined on a disconnected graph")]
    Disconnected {
        /// Metric whose connectivity precondition was violated.
        metric: &'static str,
    },

    /// An iterative method hit its iteration bound without converging.
    #[error("{metric} did not converge after {iterations} iterations")]
    Convergence {
        /// Metric whose iteration failed to converge.
        metric: &'static str,
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// Invalid number of clusters requested for a partition.
    #[error("cannot split {node_count} nodes into {requested} clusters")]
    InvalidClusterCount {
        /// Requested cluster count.
        requested: usize,
        /// Number of nodes in the graph.
        node_count: usize,
    },
}
