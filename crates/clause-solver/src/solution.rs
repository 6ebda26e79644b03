//! Solver output types
//!
//! A [`SolverSolution`] is a self-describing report. It is produced once per
//! solve call and never mutated afterwards. All collections are ordered so
//! that serializing the same solution twice yields identical bytes.

use crate::decision::TokenDecision;
use crate::status::{ParseStatus, ReasonCodes};
use clause_graph::{EdgeId, LevelType, NodeCandidateId, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One node of the solved clause tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedClauseNode {
    /// Selected candidate
    pub node_candidate_id: NodeCandidateId,
    /// Token the candidate interprets
    pub token_id: TokenId,
    /// Dotted path, unique within the section
    pub clause_id: String,
    /// Dotted path of the parent, empty for roots
    pub parent_id: String,
    /// Candidate label the clause id segment derives from
    pub normalized_label: String,
    /// 1 at the root level
    pub depth: u32,
    /// Enumerator family
    pub level_type: LevelType,
    /// Byte offset where the enumerator starts
    pub span_start: usize,
    /// Byte offset one past the enumerator
    pub span_end: usize,
    /// Token decision did not abstain
    pub is_structural_candidate: bool,
    /// Either cross-reference feature was set
    pub xref_suspected: bool,
    /// Token decision status
    pub parse_status: ParseStatus,
    /// Reasons, empty when accepted
    pub abstain_reason_codes: ReasonCodes,
    /// Token decision margin
    pub solver_margin: f64,
    /// Token decision confidence
    pub confidence_score: f64,
}

/// One ranked alternative, flattened across tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlternative {
    /// Token the alternative belongs to
    pub token_id: TokenId,
    /// 1-based rank within the token
    pub rank: u32,
    /// Candidate id
    pub candidate_id: NodeCandidateId,
    /// Model score
    pub score: f64,
    /// This candidate was the one selected
    pub selected: bool,
}

/// Terms of the section objective
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectiveComponents {
    /// Sum of confidence over selected token decisions
    pub node_score_total: f64,
    /// Sum of selected edge scores
    pub edge_score_total: f64,
    /// Mean token margin
    pub avg_margin: f64,
}

/// Section-level verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionVerdict {
    /// Overall status
    pub section_parse_status: ParseStatus,
    /// Reasons behind the status
    pub section_reason_codes: ReasonCodes,
    /// Abstained tokens over total tokens
    pub critical_node_abstain_ratio: f64,
    /// Objective score
    pub top1_score: f64,
    /// Objective less the mean token margin, floored at 0
    pub top2_score: f64,
    /// `top1_score - top2_score`
    pub margin_abs: f64,
    /// `margin_abs / top1_score`, 0 when `top1_score` is 0
    pub margin_ratio: f64,
}

/// Counts and warnings for auditing a solve
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SolverDiagnostics {
    /// Distinct tokens
    pub token_count: usize,
    /// Node candidates in the graph
    pub node_candidate_count: usize,
    /// Edge candidates in the graph
    pub edge_candidate_count: usize,
    /// Candidates selected by token decisions
    pub selected_node_count: usize,
    /// Edges selected by the resolver
    pub selected_edge_count: usize,
    /// Accepted tokens
    pub accepted_token_count: usize,
    /// Review tokens
    pub review_token_count: usize,
    /// Abstained tokens
    pub abstained_token_count: usize,
    /// Selected nodes dropped for lack of a valid parent
    pub dropped_node_count: usize,
    /// Nodes in the output tree
    pub tree_node_count: usize,
    /// Dropped node ids in resolution order
    pub dropped_node_ids: Vec<NodeCandidateId>,
    /// `ambiguous_abstain:*` then `parent_conflict:*`
    pub warnings: Vec<String>,
    /// Non-fatal input lint findings
    pub input_warnings: Vec<String>,
}

/// Complete result of solving one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSolution {
    /// Content-addressed run id
    pub parse_run_id: String,
    /// Parser version tag
    pub parser_version: String,
    /// Caller-supplied section key
    pub section_key: String,
    /// Candidates selected by token decisions
    pub selected_node_ids: BTreeSet<NodeCandidateId>,
    /// Edges selected by the resolver
    pub selected_edge_ids: BTreeSet<EdgeId>,
    /// Tokens that abstained
    pub abstained_token_ids: BTreeSet<TokenId>,
    /// `node_score_total + edge_score_total`
    pub objective_score: f64,
    /// Objective terms
    pub objective_components: ObjectiveComponents,
    /// Flattened top-2 alternatives of every token
    pub top_k_alternatives: Vec<RankedAlternative>,
    /// Counts and warnings
    pub diagnostics: SolverDiagnostics,
    /// Per-token decisions in processing order
    pub token_decisions: Vec<TokenDecision>,
    /// Clause tree, ordered by `(span_start, clause_id)`
    pub nodes: Vec<SolvedClauseNode>,
    /// Section verdict
    #[serde(flatten)]
    pub verdict: SectionVerdict,
}

impl SolverSolution {
    /// Overall section status
    #[inline]
    #[must_use]
    pub fn status(&self) -> ParseStatus {
        self.verdict.section_parse_status
    }

    /// Look up a tree node by clause id
    #[must_use]
    pub fn node_by_clause_id(&self, clause_id: &str) -> Option<&SolvedClauseNode> {
        self.nodes.iter().find(|n| n.clause_id == clause_id)
    }

    /// Indented text rendering of the clause tree
    #[must_use]
    pub fn outline(&self) -> String {
        let mut out = format!(
            "{} {} [{}]\n",
            self.section_key, self.parse_run_id, self.verdict.section_parse_status
        );
        for node in &self.nodes {
            let indent = "  ".repeat(node.depth as usize);
            let reasons = if node.abstain_reason_codes.is_empty() {
                String::new()
            } else {
                let codes: Vec<&str> =
                    node.abstain_reason_codes.iter().map(|r| r.as_str()).collect();
                format!(": {}", codes.join(","))
            };
            out.push_str(&format!(
                "{indent}{} [{}{reasons}] {}..{}\n",
                node.clause_id, node.parse_status, node.span_start, node.span_end
            ));
        }
        out
    }
}
