//! Layout and context features attached to each node candidate

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature vector of one node candidate
///
/// The five named features are the ones the token scoring model reads.
/// Anything else produced upstream is kept in [`FeatureVector::extra`] and
/// round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Candidate sits at a structurally valid anchor (e.g. line start after a break)
    #[serde(default)]
    pub anchor: bool,

    /// Candidate begins a line
    #[serde(default)]
    pub line_start: bool,

    /// Normalized indentation in `[0, 1]`
    #[serde(default)]
    pub indentation: f64,

    /// Preceding text ends in a cross-reference keyword ("Section", "clause")
    #[serde(default)]
    pub xref_keyword_pre: bool,

    /// Preceding text ends in a cross-reference preposition ("in", "under")
    #[serde(default)]
    pub xref_preposition_pre: bool,

    /// Additional upstream features not read by the solver
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FeatureVector {
    /// Anchored, line-start candidate with no indentation or xref context
    #[must_use]
    pub fn anchored() -> Self {
        Self {
            anchor: true,
            line_start: true,
            ..Self::default()
        }
    }

    /// Set anchor flag
    #[inline]
    #[must_use]
    pub fn with_anchor(mut self, anchor: bool) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set line-start flag
    #[inline]
    #[must_use]
    pub fn with_line_start(mut self, line_start: bool) -> Self {
        self.line_start = line_start;
        self
    }

    /// Set indentation
    #[inline]
    #[must_use]
    pub fn with_indentation(mut self, indentation: f64) -> Self {
        self.indentation = indentation;
        self
    }

    /// Set xref keyword flag
    #[inline]
    #[must_use]
    pub fn with_xref_keyword(mut self, flag: bool) -> Self {
        self.xref_keyword_pre = flag;
        self
    }

    /// Set xref preposition flag
    #[inline]
    #[must_use]
    pub fn with_xref_preposition(mut self, flag: bool) -> Self {
        self.xref_preposition_pre = flag;
        self
    }

    /// Either cross-reference signal is present
    #[inline]
    #[must_use]
    pub fn xref_suspected(&self) -> bool {
        self.xref_keyword_pre || self.xref_preposition_pre
    }
}
