use clause_graph::{CandidateGraph, FeatureVector, LevelType, NodeCandidate, ParentEdgeCandidate};
use clause_solver::{ParseStatus, Solver, SolverConfig, RUN_ID_HEX_LEN, RUN_ID_PREFIX};
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::{BTreeSet, HashMap, HashSet};

const LABELS: [&str; 7] = ["a", "b", "i", "ii", "1", "1.1", ""];
const LEVELS: [LevelType; 4] = [
    LevelType::Alpha,
    LevelType::Roman,
    LevelType::Numeric,
    LevelType::Caps,
];

#[derive(Debug, Clone)]
struct CandidateShape {
    features: FeatureVector,
    depth: u32,
    label: usize,
}

#[derive(Debug, Clone)]
struct EdgeShape {
    child: Index,
    parent: Option<Index>,
    score: u8,
    hard_valid: bool,
}

fn candidate_shape() -> impl Strategy<Value = CandidateShape> {
    (
        any::<bool>(),
        any::<bool>(),
        0..=4u8,
        prop::bool::weighted(0.2),
        prop::bool::weighted(0.2),
        1..=3u32,
        0..LABELS.len(),
    )
        .prop_map(|(anchor, line_start, indent, kw, prep, depth, label)| CandidateShape {
            features: FeatureVector::default()
                .with_anchor(anchor)
                .with_line_start(line_start)
                .with_indentation(f64::from(indent) / 4.0)
                .with_xref_keyword(kw)
                .with_xref_preposition(prep),
            depth,
            label,
        })
}

fn edge_shape() -> impl Strategy<Value = EdgeShape> {
    (
        any::<Index>(),
        prop::option::weighted(0.7, any::<Index>()),
        0..=10u8,
        prop::bool::weighted(0.9),
    )
        .prop_map(|(child, parent, score, hard_valid)| EdgeShape {
            child,
            parent,
            score,
            hard_valid,
        })
}

fn build_graph(tokens: &[Vec<CandidateShape>], edges: &[EdgeShape]) -> CandidateGraph {
    let mut nodes = Vec::new();
    for (t, candidates) in tokens.iter().enumerate() {
        let start = t * 10;
        for (c, shape) in candidates.iter().enumerate() {
            nodes.push(
                NodeCandidate::new(
                    format!("t{t}:c{c}"),
                    format!("t{t}"),
                    t as u32,
                    LABELS[shape.label],
                )
                .with_level_type(LEVELS[(shape.label + c) % LEVELS.len()])
                .with_span(start, start + 3)
                .with_depth_hint(shape.depth)
                .with_features(shape.features.clone()),
            );
        }
    }

    let ids: Vec<String> = nodes.iter().map(|n| n.node_candidate_id.to_string()).collect();
    let edges = edges
        .iter()
        .enumerate()
        .map(|(k, shape)| {
            let child = ids[shape.child.index(ids.len())].as_str();
            let edge = match &shape.parent {
                Some(parent) => {
                    let parent = ids[parent.index(ids.len())].as_str();
                    ParentEdgeCandidate::to_parent(format!("e{k}"), child, parent)
                }
                None => ParentEdgeCandidate::to_root(format!("e{k}"), child),
            };
            edge.with_component("level_step", f64::from(shape.score) / 10.0)
                .with_hard_valid(shape.hard_valid)
        })
        .collect();

    CandidateGraph::new(nodes, edges)
}

fn arb_graph() -> impl Strategy<Value = CandidateGraph> {
    (
        prop::collection::vec(prop::collection::vec(candidate_shape(), 1..=3), 1..=8),
        prop::collection::vec(edge_shape(), 0..=30),
    )
        .prop_map(|(tokens, edges)| build_graph(&tokens, &edges))
}

fn reversed(graph: &CandidateGraph) -> CandidateGraph {
    CandidateGraph::new(
        graph.nodes().iter().rev().cloned().collect(),
        graph.edges().iter().rev().cloned().collect(),
    )
}

proptest! {
    #[test]
    fn prop_solve_is_deterministic(graph in arb_graph()) {
        let solver = Solver::with_defaults();
        let first = serde_json::to_string(&solver.solve(&graph, "s")).unwrap();
        let second = serde_json::to_string(&solver.solve(&graph, "s")).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_input_order_does_not_matter(graph in arb_graph()) {
        let solver = Solver::with_defaults();
        prop_assert_eq!(solver.solve(&graph, "s"), solver.solve(&reversed(&graph), "s"));
    }

    #[test]
    fn prop_at_most_one_candidate_per_token(graph in arb_graph()) {
        let solution = Solver::with_defaults().solve(&graph, "s");

        let mut tokens = HashSet::new();
        for id in &solution.selected_node_ids {
            let node = graph.node(id).unwrap();
            prop_assert!(tokens.insert(node.token_id.clone()));
            prop_assert!(!solution.abstained_token_ids.contains(&node.token_id));
        }
        prop_assert_eq!(
            tokens.len() + solution.abstained_token_ids.len(),
            solution.diagnostics.token_count
        );
    }

    #[test]
    fn prop_selected_edges_are_valid(graph in arb_graph()) {
        let solution = Solver::with_defaults().solve(&graph, "s");
        let edges: HashMap<_, _> = graph.edges().iter().map(|e| (&e.edge_id, e)).collect();
        let tree_nodes: HashSet<_> = solution.nodes.iter().map(|n| &n.node_candidate_id).collect();

        let mut children = HashSet::new();
        for id in &solution.selected_edge_ids {
            let edge = edges[id];
            prop_assert!(edge.hard_valid);
            prop_assert!(tree_nodes.contains(&edge.child_candidate_id));
            prop_assert!(children.insert(&edge.child_candidate_id));
            if let Some(parent) = edge.parent() {
                prop_assert!(tree_nodes.contains(parent));
            }
        }

        prop_assert_eq!(children.len(), solution.nodes.len());
        prop_assert_eq!(
            solution.nodes.len() + solution.diagnostics.dropped_node_ids.len(),
            solution.selected_node_ids.len()
        );
    }

    #[test]
    fn prop_clause_ids_form_a_tree(graph in arb_graph()) {
        let solution = Solver::with_defaults().solve(&graph, "s");
        let depth_of: HashMap<&str, u32> = solution
            .nodes
            .iter()
            .map(|n| (n.clause_id.as_str(), n.depth))
            .collect();

        prop_assert_eq!(depth_of.len(), solution.nodes.len());
        for node in &solution.nodes {
            prop_assert_eq!(node.clause_id.matches('.').count() + 1, node.depth as usize);
            if node.parent_id.is_empty() {
                prop_assert_eq!(node.depth, 1);
                prop_assert!(!node.clause_id.contains('.'));
            } else {
                prop_assert_eq!(
                    depth_of.get(node.parent_id.as_str()).copied(),
                    Some(node.depth - 1)
                );
                let prefix = format!("{}.", node.parent_id);
                prop_assert!(node.clause_id.starts_with(&prefix));
            }
        }

        let order: Vec<_> = solution
            .nodes
            .iter()
            .map(|n| (n.span_start, n.clause_id.clone()))
            .collect();
        let mut sorted = order.clone();
        sorted.sort();
        prop_assert_eq!(order, sorted);
    }

    #[test]
    fn prop_raising_abstain_threshold_only_adds_abstentions(
        graph in arb_graph(),
        low in 0.0..0.5f64,
        delta in 0.0..0.5f64,
    ) {
        let solve_with = |threshold: f64| {
            let config = SolverConfig::new()
                .with_abstain_margin_threshold(threshold)
                .with_review_margin_threshold(1.0);
            Solver::new(config).unwrap().solve(&graph, "s").abstained_token_ids
        };

        let loose: BTreeSet<_> = solve_with(low);
        let strict: BTreeSet<_> = solve_with(low + delta);
        prop_assert!(loose.is_subset(&strict));
    }

    #[test]
    fn prop_weak_top_candidate_always_abstains(graph in arb_graph()) {
        let solution = Solver::with_defaults().solve(&graph, "s");
        for decision in &solution.token_decisions {
            if decision.confidence_score < clause_solver::MIN_TOP1_SCORE {
                prop_assert!(decision.is_abstain());
            }
        }
    }

    #[test]
    fn prop_run_id_shape(graph in arb_graph(), key in "[a-z0-9/]{0,12}") {
        let solution = Solver::with_defaults().solve(&graph, &key);
        let hex = solution.parse_run_id.strip_prefix(RUN_ID_PREFIX).unwrap();
        prop_assert_eq!(hex.len(), RUN_ID_HEX_LEN);
        prop_assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn prop_section_status_matches_ratio(graph in arb_graph()) {
        let config = SolverConfig::default();
        let solution = Solver::with_defaults().solve(&graph, "s");
        let ratio = solution.verdict.critical_node_abstain_ratio;

        if ratio >= config.section_abstain_ratio_threshold {
            prop_assert_eq!(solution.status(), ParseStatus::Abstain);
        } else {
            prop_assert_ne!(solution.status(), ParseStatus::Abstain);
        }
        prop_assert!((0.0..=1.0).contains(&ratio));
    }
}
