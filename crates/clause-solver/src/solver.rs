//! Section solver
//!
//! Wires the four stages together:
//! token decisions → parent edges → clause tree → section verdict.
//!
//! A solve reads the graph, allocates a fresh [`SolverSolution`] and touches
//! no shared state, so independent sections can be solved in parallel.

use crate::aggregate::{flatten_alternatives, objective_components, section_verdict};
use crate::config::SolverConfig;
use crate::decision::{decide_tokens, TokenDecision};
use crate::edges::resolve_parent_edges;
use crate::error::SolverResult;
use crate::run_id::parse_run_id;
use crate::solution::{SolverDiagnostics, SolverSolution};
use crate::status::ParseStatus;
use crate::tree::assemble_tree;
use clause_graph::{CandidateGraph, NodeCandidate, NodeCandidateId, TokenId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One section to solve in a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionInput {
    /// Key used for hashing and reporting
    pub section_key: String,
    /// The section's candidate graph
    pub graph: CandidateGraph,
}

impl SectionInput {
    /// Pair a key with its graph
    #[must_use]
    pub fn new(section_key: impl Into<String>, graph: CandidateGraph) -> Self {
        Self {
            section_key: section_key.into(),
            graph,
        }
    }

    /// Decode a JSON array of sections
    ///
    /// # Errors
    /// Returns [`crate::SolverError::Decode`] on malformed JSON
    pub fn batch_from_json(json: &str) -> SolverResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Solver holding a validated configuration
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// Create a solver after validating `config`
    ///
    /// # Errors
    /// Returns [`crate::SolverError::Config`] if validation fails
    pub fn new(config: SolverConfig) -> SolverResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Solver with default configuration
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve one section
    #[must_use]
    pub fn solve(&self, graph: &CandidateGraph, section_key: &str) -> SolverSolution {
        solve(graph, section_key, &self.config)
    }

    /// Solve independent sections in parallel, results in input order
    #[must_use]
    pub fn solve_batch(&self, sections: &[SectionInput]) -> Vec<SolverSolution> {
        sections
            .par_iter()
            .map(|section| self.solve(&section.graph, &section.section_key))
            .collect()
    }
}

/// Solve one section with an explicit configuration
///
/// Never fails: malformed input degrades (ineligible edges, dropped nodes,
/// abstained tokens) instead of erroring.
#[must_use]
pub fn solve(graph: &CandidateGraph, section_key: &str, config: &SolverConfig) -> SolverSolution {
    let span = tracing::info_span!("solve_section", section_key);
    let _enter = span.enter();

    let tokens = decide_tokens(graph, config);
    let edges = resolve_parent_edges(&tokens.selected, graph);

    let node_map: HashMap<&NodeCandidateId, &NodeCandidate> = tokens
        .selected
        .iter()
        .map(|&node| (&node.node_candidate_id, node))
        .collect();
    let decision_map: HashMap<&NodeCandidateId, &TokenDecision> = tokens
        .decisions
        .iter()
        .filter_map(|d| d.selected().map(|id| (id, d)))
        .collect();
    let nodes = assemble_tree(&edges.selected, &node_map, &decision_map);

    let objective = objective_components(&tokens.decisions, edges.edge_score_total);
    let verdict = section_verdict(&tokens.decisions, &edges.warnings, &objective, config);

    let selected_node_ids: BTreeSet<NodeCandidateId> = tokens
        .selected
        .iter()
        .map(|n| n.node_candidate_id.clone())
        .collect();
    let selected_edge_ids = edges.selected.iter().map(|e| e.edge_id.clone()).collect();
    let abstained_token_ids: BTreeSet<TokenId> = tokens
        .decisions
        .iter()
        .filter(|d| d.is_abstain())
        .map(|d| d.token_id.clone())
        .collect();

    let count_status =
        |status: ParseStatus| tokens.decisions.iter().filter(|d| d.status() == status).count();
    let diagnostics = SolverDiagnostics {
        token_count: tokens.decisions.len(),
        node_candidate_count: graph.nodes().len(),
        edge_candidate_count: graph.edges().len(),
        selected_node_count: tokens.selected.len(),
        selected_edge_count: edges.selected.len(),
        accepted_token_count: count_status(ParseStatus::Accepted),
        review_token_count: count_status(ParseStatus::Review),
        abstained_token_count: abstained_token_ids.len(),
        dropped_node_count: edges.dropped.len(),
        tree_node_count: nodes.len(),
        dropped_node_ids: edges.dropped.clone(),
        warnings: tokens.warnings.iter().chain(&edges.warnings).cloned().collect(),
        input_warnings: graph.lint(),
    };

    let parse_run_id = parse_run_id(section_key, &selected_node_ids, &abstained_token_ids);

    tracing::info!(
        run_id = %parse_run_id,
        status = %verdict.section_parse_status,
        tokens = diagnostics.token_count,
        nodes = diagnostics.tree_node_count,
        dropped = diagnostics.dropped_node_count,
        "section solved"
    );

    SolverSolution {
        parse_run_id,
        parser_version: config.parser_version.clone(),
        section_key: section_key.to_string(),
        selected_node_ids,
        selected_edge_ids,
        abstained_token_ids,
        objective_score: verdict.top1_score,
        objective_components: objective,
        top_k_alternatives: flatten_alternatives(&tokens.decisions),
        diagnostics,
        token_decisions: tokens.decisions,
        nodes,
        verdict,
    }
}
