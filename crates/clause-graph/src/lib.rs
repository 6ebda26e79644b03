//! Clause Candidate Graph
//!
//! Input contract of the clause-structure solver: competing structural
//! interpretations of enumerator tokens and competing parent links between
//! them, for one section of agreement text.
//!
//! # Core Concepts
//!
//! - [`NodeCandidate`]: one reading of one token (e.g. `(i)` as roman vs alpha)
//! - [`ParentEdgeCandidate`]: one proposed parent of a node, or a root marker
//! - [`CandidateGraph`]: all candidates of one section, immutable once built
//!
//! # Example
//!
//! ```rust
//! use clause_graph::{CandidateGraph, FeatureVector, NodeCandidate, ParentEdgeCandidate};
//!
//! let graph = CandidateGraph::builder()
//!     .node(
//!         NodeCandidate::new("n1", "t1", 0, "a")
//!             .with_span(0, 3)
//!             .with_features(FeatureVector::anchored()),
//!     )
//!     .edge(ParentEdgeCandidate::to_root("e1", "n1").with_component("root_prior", 0.4))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(graph.token_groups().len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod candidate;
mod error;
mod feature;
mod graph;
mod ids;

pub use candidate::{LevelType, NodeCandidate, ParentEdgeCandidate};
pub use error::GraphError;
pub use feature::FeatureVector;
pub use graph::{CandidateGraph, CandidateGraphBuilder, TokenGroup};
pub use ids::{EdgeId, NodeCandidateId, TokenId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
