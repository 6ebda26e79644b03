//! Tree assembler
//!
//! Turns the selected edges into an arena of nodes, walks it depth-first
//! from the roots, and assigns dotted clause ids. Duplicate labels under the
//! same parent get `_2`, `_3`, ... suffixes; a `.` inside a label becomes `_`.

use crate::decision::TokenDecision;
use crate::solution::SolvedClauseNode;
use crate::status::{ParseStatus, ReasonCodes};
use clause_graph::{NodeCandidate, NodeCandidateId, ParentEdgeCandidate};
use std::collections::{HashMap, HashSet};

/// Segment used when a candidate has an empty label
pub const EMPTY_LABEL_SEGMENT: &str = "_";

const PATH_SEPARATOR: char = '.';

/// Replacement for a `.` inside a label
const ESCAPED_SEPARATOR: &str = "_";

struct ArenaNode<'g> {
    candidate: &'g NodeCandidate,
    children: Vec<usize>,
}

struct Arena<'g, 'd> {
    nodes: Vec<ArenaNode<'g>>,
    decisions: &'d HashMap<&'d NodeCandidateId, &'d TokenDecision>,
}

/// Assemble the clause tree for the selected edges
///
/// `nodes` maps every selected candidate id to its candidate; `decisions` maps
/// it to its token decision. Edges whose child or parent is missing from
/// `nodes` are ignored.
#[must_use]
pub fn assemble_tree(
    selected_edges: &[&ParentEdgeCandidate],
    nodes: &HashMap<&NodeCandidateId, &NodeCandidate>,
    decisions: &HashMap<&NodeCandidateId, &TokenDecision>,
) -> Vec<SolvedClauseNode> {
    let mut arena = Arena {
        nodes: Vec::with_capacity(selected_edges.len()),
        decisions,
    };
    let mut index: HashMap<&NodeCandidateId, usize> = HashMap::new();
    let mut roots = Vec::new();

    for edge in selected_edges {
        let Some(&candidate) = nodes.get(&edge.child_candidate_id) else {
            continue;
        };
        let parent_idx = match edge.parent() {
            None => None,
            Some(parent) => match index.get(parent) {
                Some(&idx) => Some(idx),
                None => continue,
            },
        };

        let idx = arena.nodes.len();
        arena.nodes.push(ArenaNode {
            candidate,
            children: Vec::new(),
        });
        index.insert(&candidate.node_candidate_id, idx);

        match parent_idx {
            Some(p) => arena.nodes[p].children.push(idx),
            None => roots.push(idx),
        }
    }

    arena.sort_siblings(&mut roots);
    for i in 0..arena.nodes.len() {
        let mut children = std::mem::take(&mut arena.nodes[i].children);
        arena.sort_siblings(&mut children);
        arena.nodes[i].children = children;
    }

    let mut out = Vec::with_capacity(arena.nodes.len());
    arena.walk_siblings(&roots, "", 1, &mut out);

    out.sort_by(|a, b| {
        a.span_start
            .cmp(&b.span_start)
            .then_with(|| a.clause_id.cmp(&b.clause_id))
    });
    out
}

impl Arena<'_, '_> {
    /// `(span_start, node_candidate_id)` ascending
    fn sort_siblings(&self, siblings: &mut [usize]) {
        siblings.sort_by(|&a, &b| {
            let a = self.nodes[a].candidate;
            let b = self.nodes[b].candidate;
            a.span_start
                .cmp(&b.span_start)
                .then_with(|| a.node_candidate_id.cmp(&b.node_candidate_id))
        });
    }

    fn walk_siblings(
        &self,
        siblings: &[usize],
        parent_clause_id: &str,
        depth: u32,
        out: &mut Vec<SolvedClauseNode>,
    ) {
        let mut used: HashSet<String> = HashSet::new();
        for &idx in siblings {
            let candidate = self.nodes[idx].candidate;
            let segment = unique_segment(&candidate.normalized_label, &mut used);
            let clause_id = if parent_clause_id.is_empty() {
                segment
            } else {
                format!("{parent_clause_id}{PATH_SEPARATOR}{segment}")
            };

            out.push(self.solved_node(candidate, &clause_id, parent_clause_id, depth));
            self.walk_siblings(&self.nodes[idx].children, &clause_id, depth + 1, out);
        }
    }

    fn solved_node(
        &self,
        candidate: &NodeCandidate,
        clause_id: &str,
        parent_clause_id: &str,
        depth: u32,
    ) -> SolvedClauseNode {
        let decision = self.decisions.get(&candidate.node_candidate_id);
        let status = decision.map_or(ParseStatus::Abstain, |d| d.status());
        let abstain_reason_codes = match (status, decision) {
            (ParseStatus::Accepted, _) | (_, None) => ReasonCodes::new(),
            (_, Some(d)) => d.reason_codes(),
        };

        SolvedClauseNode {
            node_candidate_id: candidate.node_candidate_id.clone(),
            token_id: candidate.token_id.clone(),
            clause_id: clause_id.to_string(),
            parent_id: parent_clause_id.to_string(),
            normalized_label: candidate.normalized_label.clone(),
            depth,
            level_type: candidate.level_type,
            span_start: candidate.span_start,
            span_end: candidate.span_end,
            is_structural_candidate: status != ParseStatus::Abstain,
            xref_suspected: candidate.feature_vector.xref_suspected(),
            parse_status: status,
            abstain_reason_codes,
            solver_margin: decision.map_or(0.0, |d| d.margin_abs),
            confidence_score: decision.map_or(0.0, |d| d.confidence_score),
        }
    }
}

/// Label with `.` escaped, or `label_N` (N from 2) if a sibling already used it
///
/// Segments never contain the path separator, so sibling-unique segments
/// give section-unique clause ids.
fn unique_segment(label: &str, used: &mut HashSet<String>) -> String {
    let base = if label.is_empty() {
        EMPTY_LABEL_SEGMENT.to_string()
    } else {
        label.replace(PATH_SEPARATOR, ESCAPED_SEPARATOR)
    };
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 2u32;
    loop {
        let candidate = format!("{base}_{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Alternative, TokenOutcome};
    use crate::status::ReasonCode;
    use clause_graph::{FeatureVector, TokenId};

    fn node(id: &str, label: &str, start: usize) -> NodeCandidate {
        NodeCandidate::new(id, format!("t_{id}"), start as u32, label).with_span(start, start + 3)
    }

    fn accepted(c: &NodeCandidate) -> TokenDecision {
        TokenDecision {
            token_id: c.token_id.clone(),
            token_index: c.token_index,
            candidate_count: 1,
            outcome: TokenOutcome::Accepted {
                candidate_id: c.node_candidate_id.clone(),
            },
            margin_abs: 0.3,
            confidence_score: 0.7,
            alternatives: vec![Alternative {
                rank: 1,
                candidate_id: c.node_candidate_id.clone(),
                score: 0.7,
            }],
        }
    }

    fn assemble(
        nodes: &[NodeCandidate],
        decisions: &[TokenDecision],
        edges: &[ParentEdgeCandidate],
    ) -> Vec<SolvedClauseNode> {
        let node_map: HashMap<&NodeCandidateId, &NodeCandidate> =
            nodes.iter().map(|n| (&n.node_candidate_id, n)).collect();
        let decision_map: HashMap<&NodeCandidateId, &TokenDecision> = nodes
            .iter()
            .zip(decisions)
            .map(|(n, d)| (&n.node_candidate_id, d))
            .collect();
        let edge_refs: Vec<&ParentEdgeCandidate> = edges.iter().collect();
        assemble_tree(&edge_refs, &node_map, &decision_map)
    }

    #[test]
    fn builds_dotted_paths() {
        let nodes = vec![node("n1", "a", 0), node("n2", "i", 10), node("n3", "b", 20)];
        let decisions: Vec<_> = nodes.iter().map(accepted).collect();
        let edges = vec![
            ParentEdgeCandidate::to_root("e1", "n1"),
            ParentEdgeCandidate::to_parent("e2", "n2", "n1"),
            ParentEdgeCandidate::to_root("e3", "n3"),
        ];

        let tree = assemble(&nodes, &decisions, &edges);
        let ids: Vec<(&str, &str, u32)> = tree
            .iter()
            .map(|n| (n.clause_id.as_str(), n.parent_id.as_str(), n.depth))
            .collect();
        assert_eq!(ids, vec![("a", "", 1), ("a.i", "a", 2), ("b", "", 1)]);
        assert!(tree.iter().all(|n| n.is_structural_candidate));
        assert!(tree.iter().all(|n| n.abstain_reason_codes.is_empty()));
    }

    #[test]
    fn duplicate_sibling_labels_get_suffixes() {
        let nodes = vec![node("n1", "a", 0), node("n2", "a", 10), node("n3", "a", 20)];
        let decisions: Vec<_> = nodes.iter().map(accepted).collect();
        let edges = vec![
            ParentEdgeCandidate::to_root("e1", "n1"),
            ParentEdgeCandidate::to_root("e2", "n2"),
            ParentEdgeCandidate::to_root("e3", "n3"),
        ];

        let tree = assemble(&nodes, &decisions, &edges);
        let ids: Vec<&str> = tree.iter().map(|n| n.clause_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a_2", "a_3"]);
    }

    #[test]
    fn same_label_under_different_parents_is_not_suffixed() {
        let nodes = vec![
            node("p1", "a", 0),
            node("c1", "i", 5),
            node("p2", "b", 10),
            node("c2", "i", 15),
        ];
        let decisions: Vec<_> = nodes.iter().map(accepted).collect();
        let edges = vec![
            ParentEdgeCandidate::to_root("e1", "p1"),
            ParentEdgeCandidate::to_parent("e2", "c1", "p1"),
            ParentEdgeCandidate::to_root("e3", "p2"),
            ParentEdgeCandidate::to_parent("e4", "c2", "p2"),
        ];

        let tree = assemble(&nodes, &decisions, &edges);
        let ids: Vec<&str> = tree.iter().map(|n| n.clause_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a.i", "b", "b.i"]);
    }

    #[test]
    fn literal_suffix_label_does_not_collide() {
        let mut used = HashSet::new();
        assert_eq!(unique_segment("a", &mut used), "a");
        assert_eq!(unique_segment("a", &mut used), "a_2");
        assert_eq!(unique_segment("a_2", &mut used), "a_2_2");
        assert_eq!(unique_segment("", &mut used), "_");
        assert_eq!(unique_segment("b.2", &mut used), "b_2");
    }

    #[test]
    fn dotted_label_cannot_shadow_nested_path() {
        // root "1" with child "1", next to a root literally labelled "1.1"
        let nodes = vec![node("p", "1", 0), node("c", "1", 5), node("r", "1.1", 10)];
        let decisions: Vec<_> = nodes.iter().map(accepted).collect();
        let edges = vec![
            ParentEdgeCandidate::to_root("e1", "p"),
            ParentEdgeCandidate::to_parent("e2", "c", "p"),
            ParentEdgeCandidate::to_root("e3", "r"),
        ];

        let tree = assemble(&nodes, &decisions, &edges);
        let ids: Vec<&str> = tree.iter().map(|n| n.clause_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "1.1", "1_1"]);
        assert_eq!(tree[2].normalized_label, "1.1");
        assert_eq!(tree[2].depth, 1);
    }

    #[test]
    fn review_node_carries_reason_and_xref_flag() {
        let c = node("n1", "a", 0).with_features(FeatureVector::default().with_xref_keyword(true));
        let mut d = accepted(&c);
        d.outcome = TokenOutcome::Review {
            candidate_id: c.node_candidate_id.clone(),
            reason: ReasonCode::LayoutUncertain,
        };
        let tree = assemble(&[c], &[d], &[ParentEdgeCandidate::to_root("e1", "n1")]);

        assert_eq!(tree[0].parse_status, ParseStatus::Review);
        assert!(tree[0].xref_suspected);
        assert!(tree[0].abstain_reason_codes.contains(&ReasonCode::LayoutUncertain));
        assert_eq!(tree[0].token_id, TokenId::from("t_n1"));
    }

    #[test]
    fn output_sorted_by_span_not_traversal() {
        // root b appears before root a's child in text
        let nodes = vec![node("ra", "a", 0), node("rb", "b", 10), node("ca", "i", 20)];
        let decisions: Vec<_> = nodes.iter().map(accepted).collect();
        let edges = vec![
            ParentEdgeCandidate::to_root("e1", "ra"),
            ParentEdgeCandidate::to_root("e2", "rb"),
            ParentEdgeCandidate::to_parent("e3", "ca", "ra"),
        ];

        let tree = assemble(&nodes, &decisions, &edges);
        let ids: Vec<&str> = tree.iter().map(|n| n.clause_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "a.i"]);
    }
}
