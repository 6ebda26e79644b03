//! Parent edge resolver
//!
//! Picks exactly one incoming edge for every selected node, or drops the node
//! when none is eligible. Nodes are resolved left to right, shallow to deep;
//! a non-root edge is eligible only if its parent was attached earlier in the
//! same pass. That rule also makes cycles impossible. Edges whose score is not
//! finite are never eligible.

use clause_graph::{CandidateGraph, NodeCandidate, NodeCandidateId, ParentEdgeCandidate};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Result of resolving parent edges for one section
#[derive(Debug, Clone, Default)]
pub struct EdgeResolution<'g> {
    /// Selected edges in node resolution order
    pub selected: Vec<&'g ParentEdgeCandidate>,
    /// `parent_conflict:{child}` warnings in node resolution order
    pub warnings: Vec<String>,
    /// Nodes with no eligible edge, in resolution order
    pub dropped: Vec<NodeCandidateId>,
    /// Sum of the selected edges' scores
    pub edge_score_total: f64,
}

/// `(span_start, span_end, depth_hint, node_candidate_id)` ascending
fn resolution_order(a: &NodeCandidate, b: &NodeCandidate) -> Ordering {
    a.span_start
        .cmp(&b.span_start)
        .then_with(|| a.span_end.cmp(&b.span_end))
        .then_with(|| a.depth_hint.cmp(&b.depth_hint))
        .then_with(|| a.node_candidate_id.cmp(&b.node_candidate_id))
}

/// `(score desc, non-root before root, edge_id asc)`
fn edge_rank(a: &(&ParentEdgeCandidate, f64), b: &(&ParentEdgeCandidate, f64)) -> Ordering {
    b.1.total_cmp(&a.1)
        .then_with(|| a.0.root.cmp(&b.0.root))
        .then_with(|| a.0.edge_id.cmp(&b.0.edge_id))
}

/// Resolve one parent edge per selected node
#[must_use]
pub fn resolve_parent_edges<'g>(
    selected_nodes: &[&'g NodeCandidate],
    graph: &'g CandidateGraph,
) -> EdgeResolution<'g> {
    let edges_by_child = graph.edges_by_child();

    let mut order: Vec<&'g NodeCandidate> = selected_nodes.to_vec();
    order.sort_by(|a, b| resolution_order(a, b));

    let mut resolution = EdgeResolution::default();
    let mut attached: HashSet<&NodeCandidateId> = HashSet::new();

    for node in order {
        let child_id = &node.node_candidate_id;

        let mut eligible: Vec<(&'g ParentEdgeCandidate, f64)> = edges_by_child
            .get(child_id)
            .into_iter()
            .flatten()
            .copied()
            .filter(|edge| edge.hard_valid)
            .filter(|edge| edge.parent().map_or(true, |parent| attached.contains(parent)))
            .map(|edge| (edge, edge.score()))
            .filter(|(_, score)| score.is_finite())
            .collect();

        if eligible.is_empty() {
            tracing::warn!(child = %child_id, "no eligible parent edge, dropping node");
            resolution.warnings.push(format!("parent_conflict:{child_id}"));
            resolution.dropped.push(child_id.clone());
            continue;
        }

        eligible.sort_by(edge_rank);
        let (edge, score) = eligible[0];

        tracing::debug!(
            child = %child_id,
            edge = %edge.edge_id,
            root = edge.root,
            score,
            "parent edge selected"
        );

        resolution.edge_score_total += score;
        resolution.selected.push(edge);
        attached.insert(child_id);
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, start: usize, depth: u32) -> NodeCandidate {
        NodeCandidate::new(id, id, start as u32, "a")
            .with_span(start, start + 3)
            .with_depth_hint(depth)
    }

    fn selected_ids<'a>(resolution: &'a EdgeResolution<'a>) -> Vec<&'a str> {
        resolution.selected.iter().map(|e| e.edge_id.as_str()).collect()
    }

    #[test]
    fn tie_prefers_non_root_edge() {
        let nodes = vec![node("p", 0, 1), node("c", 10, 2)];
        let graph = CandidateGraph::new(
            nodes.clone(),
            vec![
                ParentEdgeCandidate::to_root("e_p", "p"),
                ParentEdgeCandidate::to_root("a_root", "c").with_component("s", 0.5),
                ParentEdgeCandidate::to_parent("z_parent", "c", "p").with_component("s", 0.5),
            ],
        );
        let selected: Vec<&NodeCandidate> = graph.nodes().iter().collect();

        let resolution = resolve_parent_edges(&selected, &graph);
        assert_eq!(selected_ids(&resolution), vec!["e_p", "z_parent"]);
        assert!((resolution.edge_score_total - 0.5).abs() < 1e-12);
    }

    #[test]
    fn orphan_is_dropped_with_warning() {
        let graph = CandidateGraph::new(
            vec![node("ghost_parent", 0, 1), node("c", 10, 2)],
            vec![ParentEdgeCandidate::to_parent("e1", "c", "ghost_parent")],
        );
        // only the child was selected
        let selected = vec![&graph.nodes()[1]];

        let resolution = resolve_parent_edges(&selected, &graph);
        assert!(resolution.selected.is_empty());
        assert_eq!(resolution.warnings, vec!["parent_conflict:c".to_string()]);
        assert_eq!(resolution.dropped, vec![NodeCandidateId::from("c")]);
    }

    #[test]
    fn hard_invalid_edges_never_selected() {
        let graph = CandidateGraph::new(
            vec![node("n", 0, 1)],
            vec![
                ParentEdgeCandidate::to_root("e_bad", "n")
                    .with_component("s", 9.0)
                    .with_hard_valid(false),
                ParentEdgeCandidate::to_root("e_ok", "n").with_penalty("p", 1.0),
            ],
        );
        let selected: Vec<&NodeCandidate> = graph.nodes().iter().collect();

        let resolution = resolve_parent_edges(&selected, &graph);
        assert_eq!(selected_ids(&resolution), vec!["e_ok"]);
        assert!((resolution.edge_score_total + 1.0).abs() < 1e-12);
    }

    #[test]
    fn parent_must_be_resolved_earlier() {
        // the "parent" starts after the child, so it is not attached yet
        let graph = CandidateGraph::new(
            vec![node("late", 20, 1), node("early", 0, 1)],
            vec![
                ParentEdgeCandidate::to_root("e_late", "late"),
                ParentEdgeCandidate::to_parent("e_early", "early", "late").with_component("s", 1.0),
            ],
        );
        let selected: Vec<&NodeCandidate> = graph.nodes().iter().collect();

        let resolution = resolve_parent_edges(&selected, &graph);
        assert_eq!(selected_ids(&resolution), vec!["e_late"]);
        assert_eq!(resolution.warnings, vec!["parent_conflict:early".to_string()]);
    }

    #[test]
    fn dropped_node_cannot_parent() {
        let graph = CandidateGraph::new(
            vec![node("a", 0, 1), node("b", 10, 2)],
            vec![ParentEdgeCandidate::to_parent("e_b", "b", "a")],
        );
        let selected: Vec<&NodeCandidate> = graph.nodes().iter().collect();

        let resolution = resolve_parent_edges(&selected, &graph);
        assert!(resolution.selected.is_empty());
        assert_eq!(resolution.dropped.len(), 2);
    }

    #[test]
    fn non_finite_edge_score_is_ineligible() {
        let graph = CandidateGraph::new(
            vec![node("n", 0, 1)],
            vec![
                ParentEdgeCandidate::to_root("e_nan", "n").with_component("s", f64::NAN),
                ParentEdgeCandidate::to_root("e_inf", "n").with_component("s", f64::INFINITY),
                ParentEdgeCandidate::to_root("e_ok", "n").with_component("s", 0.2),
            ],
        );
        let selected: Vec<&NodeCandidate> = graph.nodes().iter().collect();

        let resolution = resolve_parent_edges(&selected, &graph);
        assert_eq!(selected_ids(&resolution), vec!["e_ok"]);
        assert!((resolution.edge_score_total - 0.2).abs() < 1e-12);
    }

    #[test]
    fn higher_score_beats_root_preference() {
        let graph = CandidateGraph::new(
            vec![node("p", 0, 1), node("c", 10, 2)],
            vec![
                ParentEdgeCandidate::to_root("e_p", "p"),
                ParentEdgeCandidate::to_root("e_root", "c").with_component("s", 0.6),
                ParentEdgeCandidate::to_parent("e_parent", "c", "p").with_component("s", 0.5),
            ],
        );
        let selected: Vec<&NodeCandidate> = graph.nodes().iter().collect();

        let resolution = resolve_parent_edges(&selected, &graph);
        assert_eq!(selected_ids(&resolution), vec!["e_p", "e_root"]);
    }
}
