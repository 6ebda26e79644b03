//! Error types for the solver crate
//!
//! Solving itself never fails. These cover the edges around it: building a
//! [`crate::Solver`] from configuration and loading inputs.

use crate::config::ConfigError;
use clause_graph::GraphError;

/// Errors from solver setup and input loading
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    /// Invalid configuration
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid candidate graph
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// Batch input decode failure
    #[error("batch decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type alias for solver setup operations
pub type SolverResult<T> = Result<T, SolverError>;
