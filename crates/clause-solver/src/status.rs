//! Parse status and reason-code vocabulary
//!
//! Every outcome of the solver is expressed through these two types rather
//! than through errors.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Outcome class of a token, node or section
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStatus {
    /// Confident structural reading
    Accepted,
    /// Reading selected but flagged for a human
    Review,
    /// No safe reading
    Abstain,
}

impl ParseStatus {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Review => "review",
            Self::Abstain => "abstain",
        }
    }
}

impl fmt::Display for ParseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auditable reason attached to a non-accepted outcome
///
/// Ordering follows declaration order and fixes the order of reason sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Top candidate not decisively ahead of its closest competitor
    LowMargin,
    /// Candidate plausibly a cross-reference, not a new clause
    XrefConflict,
    /// Candidate not at a structural anchor
    LayoutUncertain,
    /// Section-wide abstain rate too high to trust
    InsufficientContext,
    /// Node had no structurally valid parent and was dropped
    ParentConflict,
}

impl ReasonCode {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LowMargin => "low_margin",
            Self::XrefConflict => "xref_conflict",
            Self::LayoutUncertain => "layout_uncertain",
            Self::InsufficientContext => "insufficient_context",
            Self::ParentConflict => "parent_conflict",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered, duplicate-free set of reason codes
pub type ReasonCodes = BTreeSet<ReasonCode>;
