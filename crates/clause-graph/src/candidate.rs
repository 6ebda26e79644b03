//! Node and parent-edge candidates

use crate::feature::FeatureVector;
use crate::ids::{EdgeId, NodeCandidateId, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Enumerator family of a candidate label
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelType {
    /// `(a)`, `(b)`, ...
    Alpha,
    /// `(i)`, `(iv)`, ...
    Roman,
    /// `(A)`, `(B)`, ...
    Caps,
    /// `1.`, `(2)`, ...
    Numeric,
    /// Anything else
    #[default]
    Other,
}

impl LevelType {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Roman => "roman",
            Self::Caps => "caps",
            Self::Numeric => "numeric",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural interpretation of one token
///
/// Candidates sharing a `token_id` are mutually exclusive readings of the
/// same text position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeCandidate {
    /// Unique key
    pub node_candidate_id: NodeCandidateId,
    /// Token this candidate interprets
    pub token_id: TokenId,
    /// Ordering key within the section
    pub token_index: u32,
    /// Label without punctuation, e.g. `"a"`, `"iv"`, `"1"`
    pub normalized_label: String,
    /// Enumerator family
    #[serde(default)]
    pub level_type: LevelType,
    /// Byte offset where the enumerator starts
    pub span_start: usize,
    /// Byte offset one past the enumerator
    pub span_end: usize,
    /// Proposed nesting depth, 1 = root level
    pub depth_hint: u32,
    /// Layout and context features
    #[serde(default)]
    pub feature_vector: FeatureVector,
}

impl NodeCandidate {
    /// Create a candidate with default (empty) features
    #[must_use]
    pub fn new(
        node_candidate_id: impl Into<NodeCandidateId>,
        token_id: impl Into<TokenId>,
        token_index: u32,
        normalized_label: impl Into<String>,
    ) -> Self {
        Self {
            node_candidate_id: node_candidate_id.into(),
            token_id: token_id.into(),
            token_index,
            normalized_label: normalized_label.into(),
            level_type: LevelType::Other,
            span_start: 0,
            span_end: 1,
            depth_hint: 1,
            feature_vector: FeatureVector::default(),
        }
    }

    /// Set enumerator family
    #[inline]
    #[must_use]
    pub fn with_level_type(mut self, level_type: LevelType) -> Self {
        self.level_type = level_type;
        self
    }

    /// Set byte span
    #[inline]
    #[must_use]
    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span_start = start;
        self.span_end = end;
        self
    }

    /// Set depth hint
    #[inline]
    #[must_use]
    pub fn with_depth_hint(mut self, depth_hint: u32) -> Self {
        self.depth_hint = depth_hint;
        self
    }

    /// Set feature vector
    #[inline]
    #[must_use]
    pub fn with_features(mut self, features: FeatureVector) -> Self {
        self.feature_vector = features;
        self
    }

    /// `span_end > span_start`
    #[inline]
    #[must_use]
    pub fn has_valid_span(&self) -> bool {
        self.span_end > self.span_start
    }
}

/// One proposed parent assignment for one node candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentEdgeCandidate {
    /// Unique key
    pub edge_id: EdgeId,
    /// Candidate being attached
    pub child_candidate_id: NodeCandidateId,
    /// Proposed parent; ignored for root edges
    #[serde(default)]
    pub parent_candidate_id: NodeCandidateId,
    /// Proposes the child as a top-level clause
    #[serde(default)]
    pub root: bool,
    /// Structurally possible; `false` edges are never selectable
    #[serde(default = "default_hard_valid")]
    pub hard_valid: bool,
    /// Named positive signals
    #[serde(default)]
    pub soft_score_components: BTreeMap<String, f64>,
    /// Named negative signals
    #[serde(default)]
    pub edge_penalties: BTreeMap<String, f64>,
}

fn default_hard_valid() -> bool {
    true
}

impl ParentEdgeCandidate {
    /// Edge attaching `child` under `parent`
    #[must_use]
    pub fn to_parent(
        edge_id: impl Into<EdgeId>,
        child: impl Into<NodeCandidateId>,
        parent: impl Into<NodeCandidateId>,
    ) -> Self {
        Self {
            edge_id: edge_id.into(),
            child_candidate_id: child.into(),
            parent_candidate_id: parent.into(),
            root: false,
            hard_valid: true,
            soft_score_components: BTreeMap::new(),
            edge_penalties: BTreeMap::new(),
        }
    }

    /// Root edge promoting `child` to top level
    #[must_use]
    pub fn to_root(edge_id: impl Into<EdgeId>, child: impl Into<NodeCandidateId>) -> Self {
        Self {
            edge_id: edge_id.into(),
            child_candidate_id: child.into(),
            parent_candidate_id: NodeCandidateId::default(),
            root: true,
            hard_valid: true,
            soft_score_components: BTreeMap::new(),
            edge_penalties: BTreeMap::new(),
        }
    }

    /// Add a positive signal
    #[must_use]
    pub fn with_component(mut self, name: impl Into<String>, value: f64) -> Self {
        self.soft_score_components.insert(name.into(), value);
        self
    }

    /// Add a negative signal
    #[must_use]
    pub fn with_penalty(mut self, name: impl Into<String>, value: f64) -> Self {
        self.edge_penalties.insert(name.into(), value);
        self
    }

    /// Set hard validity
    #[inline]
    #[must_use]
    pub fn with_hard_valid(mut self, hard_valid: bool) -> Self {
        self.hard_valid = hard_valid;
        self
    }

    /// Sum of components minus sum of penalties, unclamped
    #[must_use]
    pub fn score(&self) -> f64 {
        let positive: f64 = self.soft_score_components.values().sum();
        let negative: f64 = self.edge_penalties.values().sum();
        positive - negative
    }

    /// Parent id, `None` for root edges
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<&NodeCandidateId> {
        (!self.root).then_some(&self.parent_candidate_id)
    }
}
