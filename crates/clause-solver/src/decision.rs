//! Token decision engine
//!
//! For every token, ranks the competing node candidates with the fixed scoring
//! model and either selects one (accepted or review) or abstains.
//!
//! Tokens are processed in ascending order of their smallest `token_index`
//! (ties by token id). That order fixes the order of decisions, warnings and
//! the selected-node list handed to the parent edge resolver.

use crate::config::SolverConfig;
use crate::scoring::candidate_score;
use crate::status::{ParseStatus, ReasonCode, ReasonCodes};
use clause_graph::{CandidateGraph, NodeCandidate, NodeCandidateId, TokenGroup, TokenId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Top-1 scores below this always abstain
pub const MIN_TOP1_SCORE: f64 = 0.12;

/// Gap to the synthetic competitor of a single-candidate token
pub const SINGLE_CANDIDATE_GAP: f64 = 0.3;

/// Tolerance for margin comparisons so a margin equal to its threshold passes
pub const MARGIN_EPSILON: f64 = 1e-9;

/// Number of ranked alternatives recorded per token
pub const ALTERNATIVES_PER_TOKEN: usize = 2;

/// Outcome of one token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TokenOutcome {
    /// Candidate selected with no reservations
    Accepted {
        /// Selected candidate
        candidate_id: NodeCandidateId,
    },
    /// Candidate selected but flagged
    Review {
        /// Selected candidate
        candidate_id: NodeCandidateId,
        /// The single highest-priority reason
        reason: ReasonCode,
    },
    /// Nothing selected
    Abstain {
        /// Why the token abstained
        reasons: ReasonCodes,
    },
}

/// One ranked alternative of a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    /// 1-based rank
    pub rank: u32,
    /// Candidate id
    pub candidate_id: NodeCandidateId,
    /// Clamped model score
    pub score: f64,
}

/// Decision for one token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenDecision {
    /// Token id
    pub token_id: TokenId,
    /// Smallest `token_index` among the token's candidates
    pub token_index: u32,
    /// Number of competing candidates
    pub candidate_count: usize,
    /// Selection outcome
    pub outcome: TokenOutcome,
    /// `max(0, top1 - top2)`
    pub margin_abs: f64,
    /// Score of the top-ranked candidate
    pub confidence_score: f64,
    /// Top-ranked candidates, best first
    pub alternatives: Vec<Alternative>,
}

impl TokenDecision {
    /// Outcome class
    #[must_use]
    pub fn status(&self) -> ParseStatus {
        match self.outcome {
            TokenOutcome::Accepted { .. } => ParseStatus::Accepted,
            TokenOutcome::Review { .. } => ParseStatus::Review,
            TokenOutcome::Abstain { .. } => ParseStatus::Abstain,
        }
    }

    /// Selected candidate, `None` when abstained
    #[must_use]
    pub fn selected(&self) -> Option<&NodeCandidateId> {
        match &self.outcome {
            TokenOutcome::Accepted { candidate_id } | TokenOutcome::Review { candidate_id, .. } => {
                Some(candidate_id)
            }
            TokenOutcome::Abstain { .. } => None,
        }
    }

    /// Reason codes, empty when accepted
    #[must_use]
    pub fn reason_codes(&self) -> ReasonCodes {
        match &self.outcome {
            TokenOutcome::Accepted { .. } => ReasonCodes::new(),
            TokenOutcome::Review { reason, .. } => std::iter::once(*reason).collect(),
            TokenOutcome::Abstain { reasons } => reasons.clone(),
        }
    }

    /// True when abstained
    #[inline]
    #[must_use]
    pub fn is_abstain(&self) -> bool {
        matches!(self.outcome, TokenOutcome::Abstain { .. })
    }
}

/// All token decisions of one section
#[derive(Debug, Clone)]
pub struct TokenDecisions<'g> {
    /// Decisions in processing order
    pub decisions: Vec<TokenDecision>,
    /// Selected candidates in processing order
    pub selected: Vec<&'g NodeCandidate>,
    /// `ambiguous_abstain:{token_id}` warnings in processing order
    pub warnings: Vec<String>,
}

/// A candidate paired with its model score
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'g> {
    /// The candidate
    pub candidate: &'g NodeCandidate,
    /// Clamped model score
    pub score: f64,
}

/// `(score desc, depth_hint asc, node_candidate_id asc)`
fn rank_order(a: &ScoredCandidate<'_>, b: &ScoredCandidate<'_>) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.candidate.depth_hint.cmp(&b.candidate.depth_hint))
        .then_with(|| a.candidate.node_candidate_id.cmp(&b.candidate.node_candidate_id))
}

/// Decide every token of a graph
#[must_use]
pub fn decide_tokens<'g>(graph: &'g CandidateGraph, config: &SolverConfig) -> TokenDecisions<'g> {
    let mut out = TokenDecisions {
        decisions: Vec::new(),
        selected: Vec::new(),
        warnings: Vec::new(),
    };

    for group in graph.token_groups() {
        let scored: Vec<ScoredCandidate<'g>> = group
            .candidates
            .iter()
            .map(|&candidate| ScoredCandidate {
                candidate,
                score: candidate_score(candidate),
            })
            .collect();

        let Some((decision, selected)) = decide_token(&group, scored, config) else {
            continue;
        };

        if decision.is_abstain() && decision.candidate_count > 1 {
            tracing::warn!(token_id = %decision.token_id, "ambiguous abstain");
            out.warnings.push(format!("ambiguous_abstain:{}", decision.token_id));
        }
        if let Some(candidate) = selected {
            out.selected.push(candidate);
        }
        out.decisions.push(decision);
    }

    out
}

/// Rank pre-scored candidates of one token and classify the outcome
///
/// Returns `None` only for an empty group.
#[must_use]
pub fn decide_token<'g>(
    group: &TokenGroup<'g>,
    mut scored: Vec<ScoredCandidate<'g>>,
    config: &SolverConfig,
) -> Option<(TokenDecision, Option<&'g NodeCandidate>)> {
    scored.sort_by(rank_order);
    let top1 = *scored.first()?;
    let top2_score = scored
        .get(1)
        .map_or(top1.score - SINGLE_CANDIDATE_GAP, |c| c.score);
    let margin_abs = (top1.score - top2_score).max(0.0);

    let features = &top1.candidate.feature_vector;
    let top1_id = top1.candidate.node_candidate_id.clone();

    let (outcome, selected) = if top1.score < MIN_TOP1_SCORE
        || margin_abs < config.abstain_margin_threshold - MARGIN_EPSILON
    {
        let mut reasons = ReasonCodes::new();
        reasons.insert(ReasonCode::LowMargin);
        if features.xref_preposition_pre {
            reasons.insert(ReasonCode::XrefConflict);
        }
        (TokenOutcome::Abstain { reasons }, None)
    } else {
        let reason = if margin_abs < config.review_margin_threshold - MARGIN_EPSILON {
            Some(ReasonCode::LowMargin)
        } else if features.xref_preposition_pre {
            Some(ReasonCode::XrefConflict)
        } else if !features.anchor {
            Some(ReasonCode::LayoutUncertain)
        } else {
            None
        };
        let outcome = match reason {
            Some(reason) => TokenOutcome::Review {
                candidate_id: top1_id,
                reason,
            },
            None => TokenOutcome::Accepted {
                candidate_id: top1_id,
            },
        };
        (outcome, Some(top1.candidate))
    };

    let alternatives = scored
        .iter()
        .take(ALTERNATIVES_PER_TOKEN)
        .zip(1u32..)
        .map(|(c, rank)| Alternative {
            rank,
            candidate_id: c.candidate.node_candidate_id.clone(),
            score: c.score,
        })
        .collect();

    let decision = TokenDecision {
        token_id: group.token_id.clone(),
        token_index: group.min_token_index,
        candidate_count: scored.len(),
        outcome,
        margin_abs,
        confidence_score: top1.score,
        alternatives,
    };

    tracing::debug!(
        token_id = %decision.token_id,
        status = %decision.status(),
        margin = decision.margin_abs,
        score = decision.confidence_score,
        "token decided"
    );

    Some((decision, selected))
}
