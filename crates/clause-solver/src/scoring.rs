//! Fixed linear scoring model for node candidates

use clause_graph::NodeCandidate;

/// Weight of the anchor flag
const W_ANCHOR: f64 = 0.35;
/// Weight of the line-start flag
const W_LINE_START: f64 = 0.20;
/// Weight of normalized indentation
const W_INDENTATION: f64 = 0.10;
/// Bonus for `depth_hint == 1`
const DEPTH_ONE_BONUS: f64 = 0.15;
/// Bonus for any other depth hint
const DEPTH_OTHER_BONUS: f64 = 0.08;
/// Penalty for a preceding cross-reference keyword
const P_XREF_KEYWORD: f64 = 0.12;
/// Penalty for a preceding cross-reference preposition
const P_XREF_PREPOSITION: f64 = 0.20;

#[inline]
fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Score a node candidate, clamped to `[0, 1]`
///
/// Non-finite inputs score 0.
#[must_use]
pub fn candidate_score(candidate: &NodeCandidate) -> f64 {
    let f = &candidate.feature_vector;
    let depth_bonus = if candidate.depth_hint == 1 {
        DEPTH_ONE_BONUS
    } else {
        DEPTH_OTHER_BONUS
    };

    let raw = W_ANCHOR * flag(f.anchor)
        + W_LINE_START * flag(f.line_start)
        + W_INDENTATION * f.indentation
        + depth_bonus
        - P_XREF_KEYWORD * flag(f.xref_keyword_pre)
        - P_XREF_PREPOSITION * flag(f.xref_preposition_pre);

    if raw.is_finite() {
        raw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
