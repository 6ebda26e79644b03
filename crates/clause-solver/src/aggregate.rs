//! Section aggregator
//!
//! Rolls token decisions and edge resolution up into the section objective,
//! the section verdict and the flattened alternatives list.

use crate::config::SolverConfig;
use crate::decision::TokenDecision;
use crate::solution::{ObjectiveComponents, RankedAlternative, SectionVerdict};
use crate::status::{ParseStatus, ReasonCode, ReasonCodes};

/// Objective terms from decisions and the resolved edge total
#[must_use]
pub fn objective_components(
    decisions: &[TokenDecision],
    edge_score_total: f64,
) -> ObjectiveComponents {
    let node_score_total = decisions
        .iter()
        .filter(|d| d.selected().is_some())
        .map(|d| d.confidence_score)
        .sum();

    let avg_margin = if decisions.is_empty() {
        0.0
    } else {
        decisions.iter().map(|d| d.margin_abs).sum::<f64>() / decisions.len() as f64
    };

    ObjectiveComponents {
        node_score_total,
        edge_score_total,
        avg_margin,
    }
}

/// One-shot section classification
///
/// - abstain ratio at or above the threshold, or no tokens at all: `abstain`
/// - any review or abstained token: `review`
/// - otherwise `accepted`
///
/// Reason codes are the union of token reasons, plus `parent_conflict` when
/// any node was dropped, plus `insufficient_context` when abstaining.
#[must_use]
pub fn section_verdict(
    decisions: &[TokenDecision],
    edge_warnings: &[String],
    objective: &ObjectiveComponents,
    config: &SolverConfig,
) -> SectionVerdict {
    let total = decisions.len();
    let abstained = decisions.iter().filter(|d| d.is_abstain()).count();
    let critical_node_abstain_ratio = abstained as f64 / total.max(1) as f64;

    let mut reasons: ReasonCodes = decisions.iter().flat_map(TokenDecision::reason_codes).collect();
    if !edge_warnings.is_empty() {
        reasons.insert(ReasonCode::ParentConflict);
    }

    let too_many_abstained = critical_node_abstain_ratio >= config.section_abstain_ratio_threshold;
    let status = if total == 0 || too_many_abstained {
        reasons.insert(ReasonCode::InsufficientContext);
        ParseStatus::Abstain
    } else if abstained > 0 || decisions.iter().any(|d| d.status() == ParseStatus::Review) {
        ParseStatus::Review
    } else {
        ParseStatus::Accepted
    };

    let top1_score = objective.node_score_total + objective.edge_score_total;
    let top2_score = (top1_score - objective.avg_margin).max(0.0);
    let margin_abs = top1_score - top2_score;
    let margin_ratio = if top1_score == 0.0 { 0.0 } else { margin_abs / top1_score };

    SectionVerdict {
        section_parse_status: status,
        section_reason_codes: reasons,
        critical_node_abstain_ratio,
        top1_score,
        top2_score,
        margin_abs,
        margin_ratio,
    }
}

/// Every token's ranked alternatives, sorted by `(token_id, rank, candidate_id)`
#[must_use]
pub fn flatten_alternatives(decisions: &[TokenDecision]) -> Vec<RankedAlternative> {
    let mut out: Vec<RankedAlternative> = decisions
        .iter()
        .flat_map(|d| {
            let selected = d.selected();
            d.alternatives.iter().map(move |alt| RankedAlternative {
                token_id: d.token_id.clone(),
                rank: alt.rank,
                candidate_id: alt.candidate_id.clone(),
                score: alt.score,
                selected: selected == Some(&alt.candidate_id),
            })
        })
        .collect();

    out.sort_by(|a, b| {
        a.token_id
            .cmp(&b.token_id)
            .then_with(|| a.rank.cmp(&b.rank))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    out
}
