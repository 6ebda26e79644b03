//! Clause Structure Solver
//!
//! Deterministic solver that turns a section's [`CandidateGraph`] into a
//! uniquely identified clause tree with an auditable section verdict.
//!
//! # Stages
//!
//! - Token decisions ([`decide_tokens`]): pick one reading per token or abstain
//! - Parent edges ([`resolve_parent_edges`]): attach each selected node once
//! - Tree assembly ([`assemble_tree`]): dotted clause ids, sibling suffixes
//! - Aggregation ([`section_verdict`]): objective, margins, section status
//!
//! # Example
//!
//! ```rust
//! use clause_graph::{CandidateGraph, FeatureVector, NodeCandidate, ParentEdgeCandidate};
//! use clause_solver::{ParseStatus, Solver};
//!
//! let graph = CandidateGraph::new(
//!     vec![NodeCandidate::new("n1", "t1", 0, "a")
//!         .with_span(0, 3)
//!         .with_features(FeatureVector::anchored())],
//!     vec![ParentEdgeCandidate::to_root("e1", "n1")],
//! );
//!
//! let solution = Solver::with_defaults().solve(&graph, "section-1");
//! assert_eq!(solution.status(), ParseStatus::Accepted);
//! assert_eq!(solution.nodes[0].clause_id, "a");
//! assert!(solution.parse_run_id.starts_with("p2_"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod aggregate;
mod config;
mod decision;
mod edges;
mod error;
mod run_id;
mod scoring;
mod solution;
mod solver;
mod status;
mod tree;

// Re-exports
pub use aggregate::{flatten_alternatives, objective_components, section_verdict};
pub use config::{
    ConfigError, SolverConfig, DEFAULT_ABSTAIN_MARGIN_THRESHOLD, DEFAULT_PARSER_VERSION,
    DEFAULT_REVIEW_MARGIN_THRESHOLD, DEFAULT_SECTION_ABSTAIN_RATIO_THRESHOLD,
};
pub use decision::{
    decide_token, decide_tokens, Alternative, ScoredCandidate, TokenDecision, TokenDecisions,
    TokenOutcome, ALTERNATIVES_PER_TOKEN, MARGIN_EPSILON, MIN_TOP1_SCORE, SINGLE_CANDIDATE_GAP,
};
pub use edges::{resolve_parent_edges, EdgeResolution};
pub use error::{SolverError, SolverResult};
pub use run_id::{parse_run_id, RUN_ID_DIGEST_VERSION, RUN_ID_HEX_LEN, RUN_ID_PREFIX};
pub use scoring::candidate_score;
pub use solution::{
    ObjectiveComponents, RankedAlternative, SectionVerdict, SolvedClauseNode, SolverDiagnostics,
    SolverSolution,
};
pub use solver::{solve, SectionInput, Solver};
pub use status::{ParseStatus, ReasonCode, ReasonCodes};
pub use tree::{assemble_tree, EMPTY_LABEL_SEGMENT};

pub use clause_graph::CandidateGraph;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
