//! Candidate graph for one section of text
//!
//! The graph is the immutable input to the solver. It is built once per section
//! by the upstream graph-construction step and only read afterwards.

use crate::candidate::{NodeCandidate, ParentEdgeCandidate};
use crate::error::GraphError;
use crate::ids::{EdgeId, NodeCandidateId, TokenId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

/// All node and parent-edge candidates of one section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateGraph {
    #[serde(default)]
    node_candidates: Vec<NodeCandidate>,
    #[serde(default)]
    edge_candidates: Vec<ParentEdgeCandidate>,
}

/// Competing candidates for one token, in input order
#[derive(Debug, Clone)]
pub struct TokenGroup<'g> {
    /// Shared token id
    pub token_id: &'g TokenId,
    /// Smallest `token_index` among the candidates
    pub min_token_index: u32,
    /// The competing candidates
    pub candidates: Vec<&'g NodeCandidate>,
}

impl CandidateGraph {
    /// Wrap candidates without validation
    #[must_use]
    pub fn new(
        node_candidates: Vec<NodeCandidate>,
        edge_candidates: Vec<ParentEdgeCandidate>,
    ) -> Self {
        Self {
            node_candidates,
            edge_candidates,
        }
    }

    /// Start a strict builder
    #[must_use]
    pub fn builder() -> CandidateGraphBuilder {
        CandidateGraphBuilder::default()
    }

    /// Decode from JSON without structural checks
    ///
    /// # Errors
    /// Returns [`GraphError::Decode`] if the JSON does not match the schema
    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode from JSON and reject malformed structure
    ///
    /// # Errors
    /// Decode errors plus everything [`CandidateGraph::check`] reports
    pub fn from_json_strict(json: &str) -> Result<Self, GraphError> {
        let graph = Self::from_json(json)?;
        graph.check()?;
        Ok(graph)
    }

    /// Node candidates in input order
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[NodeCandidate] {
        &self.node_candidates
    }

    /// Edge candidates in input order
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[ParentEdgeCandidate] {
        &self.edge_candidates
    }

    /// No node candidates
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_candidates.is_empty()
    }

    /// Look up a node candidate by id (first match)
    #[must_use]
    pub fn node(&self, id: &NodeCandidateId) -> Option<&NodeCandidate> {
        self.node_candidates.iter().find(|n| &n.node_candidate_id == id)
    }

    /// Group candidates by token, ordered by `(min token_index, token_id)`
    #[must_use]
    pub fn token_groups(&self) -> Vec<TokenGroup<'_>> {
        let mut groups: BTreeMap<&TokenId, Vec<&NodeCandidate>> = BTreeMap::new();
        for node in &self.node_candidates {
            groups.entry(&node.token_id).or_default().push(node);
        }

        let mut out: Vec<TokenGroup<'_>> = groups
            .into_iter()
            .map(|(token_id, candidates)| TokenGroup {
                token_id,
                min_token_index: candidates.iter().map(|c| c.token_index).min().unwrap_or(0),
                candidates,
            })
            .collect();
        out.sort_by(|a, b| {
            a.min_token_index
                .cmp(&b.min_token_index)
                .then_with(|| a.token_id.cmp(b.token_id))
        });
        out
    }

    /// Edge candidates grouped by child id, each list in input order
    #[must_use]
    pub fn edges_by_child(&self) -> HashMap<&NodeCandidateId, Vec<&ParentEdgeCandidate>> {
        let mut map: HashMap<&NodeCandidateId, Vec<&ParentEdgeCandidate>> = HashMap::new();
        for edge in &self.edge_candidates {
            map.entry(&edge.child_candidate_id).or_default().push(edge);
        }
        map
    }

    /// Non-fatal structural diagnostics, sorted
    ///
    /// Codes: `duplicate_node:{id}`, `duplicate_edge:{id}`, `invalid_span:{id}`,
    /// `dangling_child:{edge}`, `dangling_parent:{edge}`,
    /// `non_finite_score:{edge}`.
    #[must_use]
    pub fn lint(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut node_ids = HashSet::new();
        for node in &self.node_candidates {
            if !node_ids.insert(&node.node_candidate_id) {
                warnings.push(format!("duplicate_node:{}", node.node_candidate_id));
            }
            if !node.has_valid_span() {
                warnings.push(format!("invalid_span:{}", node.node_candidate_id));
            }
        }

        let mut edge_ids = HashSet::new();
        for edge in &self.edge_candidates {
            if !edge_ids.insert(&edge.edge_id) {
                warnings.push(format!("duplicate_edge:{}", edge.edge_id));
            }
            if !node_ids.contains(&edge.child_candidate_id) {
                warnings.push(format!("dangling_child:{}", edge.edge_id));
            }
            if let Some(parent) = edge.parent() {
                if !node_ids.contains(parent) {
                    warnings.push(format!("dangling_parent:{}", edge.edge_id));
                }
            }
            if !edge.score().is_finite() {
                warnings.push(format!("non_finite_score:{}", edge.edge_id));
            }
        }

        warnings.sort();
        warnings.dedup();
        warnings
    }

    /// Strict structural check
    ///
    /// # Errors
    /// First violation found, in input order: duplicate ids, invalid spans,
    /// out-of-range indentation, edges to unknown children
    pub fn check(&self) -> Result<(), GraphError> {
        let mut node_ids = HashSet::new();
        for node in &self.node_candidates {
            if !node_ids.insert(&node.node_candidate_id) {
                return Err(GraphError::DuplicateNode(node.node_candidate_id.clone()));
            }
            if !node.has_valid_span() {
                return Err(GraphError::InvalidSpan {
                    id: node.node_candidate_id.clone(),
                    start: node.span_start,
                    end: node.span_end,
                });
            }
            let indentation = node.feature_vector.indentation;
            if !(0.0..=1.0).contains(&indentation) {
                return Err(GraphError::FeatureOutOfRange {
                    id: node.node_candidate_id.clone(),
                    feature: "indentation",
                    value: indentation,
                });
            }
        }

        let mut edge_ids: HashSet<&EdgeId> = HashSet::new();
        for edge in &self.edge_candidates {
            if !edge_ids.insert(&edge.edge_id) {
                return Err(GraphError::DuplicateEdge(edge.edge_id.clone()));
            }
            if !node_ids.contains(&edge.child_candidate_id) {
                return Err(GraphError::DanglingChild {
                    edge: edge.edge_id.clone(),
                    child: edge.child_candidate_id.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Accumulates candidates and checks them on [`CandidateGraphBuilder::build`]
#[derive(Debug, Clone, Default)]
pub struct CandidateGraphBuilder {
    nodes: Vec<NodeCandidate>,
    edges: Vec<ParentEdgeCandidate>,
}

impl CandidateGraphBuilder {
    /// Add a node candidate
    #[must_use]
    pub fn node(mut self, node: NodeCandidate) -> Self {
        self.nodes.push(node);
        self
    }

    /// Add an edge candidate
    #[must_use]
    pub fn edge(mut self, edge: ParentEdgeCandidate) -> Self {
        self.edges.push(edge);
        self
    }

    /// Finish without checks
    #[must_use]
    pub fn build_unchecked(self) -> CandidateGraph {
        CandidateGraph::new(self.nodes, self.edges)
    }

    /// Finish and run [`CandidateGraph::check`]
    ///
    /// # Errors
    /// See [`CandidateGraph::check`]
    pub fn build(self) -> Result<CandidateGraph, GraphError> {
        let graph = self.build_unchecked();
        graph.check()?;
        Ok(graph)
    }
}
