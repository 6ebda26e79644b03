//! Error types for candidate graph construction
//!
//! The solver never rejects a graph. These errors come only from the strict
//! entry points ([`crate::CandidateGraph::from_json_strict`] and
//! [`crate::CandidateGraphBuilder::build`]) used by callers that want malformed
//! input surfaced instead of degraded.

use crate::ids::{EdgeId, NodeCandidateId};

/// Errors raised while loading or strictly building a candidate graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// JSON decode failure
    #[error("graph decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Two node candidates share an id
    #[error("duplicate node candidate id: {0}")]
    DuplicateNode(NodeCandidateId),

    /// Two edges share an id
    #[error("duplicate edge id: {0}")]
    DuplicateEdge(EdgeId),

    /// `span_end <= span_start`
    #[error("invalid span on {id}: [{start}, {end})")]
    InvalidSpan {
        /// Offending candidate
        id: NodeCandidateId,
        /// Span start
        start: usize,
        /// Span end
        end: usize,
    },

    /// Edge refers to a child that is not a node candidate
    #[error("edge {edge} refers to unknown child {child}")]
    DanglingChild {
        /// Offending edge
        edge: EdgeId,
        /// Missing child
        child: NodeCandidateId,
    },

    /// Continuous feature outside `[0, 1]` or not finite
    #[error("feature {feature} out of range on {id}: {value}")]
    FeatureOutOfRange {
        /// Offending candidate
        id: NodeCandidateId,
        /// Feature name
        feature: &'static str,
        /// Observed value
        value: f64,
    },
}
