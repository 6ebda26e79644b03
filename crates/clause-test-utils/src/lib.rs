//! Testing utilities for the clause solver workspace
//!
//! Shared fixture builders for candidate graphs.

#![allow(missing_docs)]

use clause_graph::{CandidateGraph, FeatureVector, LevelType, NodeCandidate, ParentEdgeCandidate};

/// Anchored, line-start candidate whose token id is `t_{id}`
pub fn anchored(id: &str, label: &str, start: usize, depth: u32) -> NodeCandidate {
    NodeCandidate::new(id, format!("t_{id}"), start as u32, label)
        .with_span(start, start + label.len() + 2)
        .with_depth_hint(depth)
        .with_features(FeatureVector::anchored())
}

#[derive(Debug, Clone, Default)]
pub struct GraphFixture {
    nodes: Vec<NodeCandidate>,
    edges: Vec<ParentEdgeCandidate>,
}

impl GraphFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-candidate anchored clause
    pub fn clause(mut self, id: &str, label: &str, start: usize, depth: u32) -> Self {
        self.nodes.push(anchored(id, label, start, depth));
        self
    }

    pub fn candidate(mut self, node: NodeCandidate) -> Self {
        self.nodes.push(node);
        self
    }

    /// Two indistinguishable readings of one token; always abstains
    pub fn ambiguous(mut self, token: &str, start: usize) -> Self {
        for (suffix, level) in [("alpha", LevelType::Alpha), ("roman", LevelType::Roman)] {
            self.nodes.push(
                NodeCandidate::new(format!("{token}:{suffix}"), token, start as u32, "i")
                    .with_level_type(level)
                    .with_span(start, start + 3)
                    .with_depth_hint(2)
                    .with_features(FeatureVector::anchored()),
            );
        }
        self
    }

    /// Root edge `root:{child}` scored `score`
    pub fn root(mut self, child: &str, score: f64) -> Self {
        self.edges.push(
            ParentEdgeCandidate::to_root(format!("root:{child}"), child)
                .with_component("root_prior", score),
        );
        self
    }

    /// Parent edge `{parent}>{child}` scored `score`
    pub fn child(mut self, child: &str, parent: &str, score: f64) -> Self {
        self.edges.push(
            ParentEdgeCandidate::to_parent(format!("{parent}>{child}"), child, parent)
                .with_component("level_step", score),
        );
        self
    }

    pub fn edge(mut self, edge: ParentEdgeCandidate) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn build(self) -> CandidateGraph {
        CandidateGraph::new(self.nodes, self.edges)
    }
}

/// A definitions section with one roman/alpha ambiguity and one cross-reference
///
/// ```text
/// 1. Definitions
///    (a) "Agreement" means ...
///    (b) "Affiliate" means
///        (i)  any entity ...
///        (ii) any officer ..., subject to clause (c) below.
///    (c) "Business Day" means ...
/// ```
///
/// Expected tree: `1`, `1.a`, `1.b`, `1.b.i`, `1.b.ii`, `1.c`. The inline
/// `(c)` abstains, so the section goes to review.
pub fn definitions_section() -> CandidateGraph {
    let indented = |indent: f64| FeatureVector::anchored().with_indentation(indent);

    GraphFixture::new()
        .candidate(
            NodeCandidate::new("t0:numeric", "t0", 0, "1")
                .with_level_type(LevelType::Numeric)
                .with_span(0, 2)
                .with_depth_hint(1)
                .with_features(FeatureVector::anchored()),
        )
        .candidate(
            NodeCandidate::new("t1:alpha", "t1", 1, "a")
                .with_level_type(LevelType::Alpha)
                .with_span(20, 23)
                .with_depth_hint(2)
                .with_features(indented(0.2)),
        )
        .candidate(
            NodeCandidate::new("t2:alpha", "t2", 2, "b")
                .with_level_type(LevelType::Alpha)
                .with_span(60, 63)
                .with_depth_hint(2)
                .with_features(indented(0.2)),
        )
        .candidate(
            NodeCandidate::new("t3:roman", "t3", 3, "i")
                .with_level_type(LevelType::Roman)
                .with_span(90, 93)
                .with_depth_hint(3)
                .with_features(indented(0.4)),
        )
        .candidate(
            // (i) does not follow (h), so not a valid alpha anchor
            NodeCandidate::new("t3:alpha", "t3", 3, "i")
                .with_level_type(LevelType::Alpha)
                .with_span(90, 93)
                .with_depth_hint(2)
                .with_features(indented(0.4).with_anchor(false)),
        )
        .candidate(
            NodeCandidate::new("t4:roman", "t4", 4, "ii")
                .with_level_type(LevelType::Roman)
                .with_span(140, 144)
                .with_depth_hint(3)
                .with_features(indented(0.4)),
        )
        .candidate(
            NodeCandidate::new("t5:alpha", "t5", 5, "c")
                .with_level_type(LevelType::Alpha)
                .with_span(180, 183)
                .with_depth_hint(2)
                .with_features(FeatureVector::default().with_xref_keyword(true)),
        )
        .candidate(
            NodeCandidate::new("t6:alpha", "t6", 6, "c")
                .with_level_type(LevelType::Alpha)
                .with_span(200, 203)
                .with_depth_hint(2)
                .with_features(indented(0.2)),
        )
        .root("t0:numeric", 0.5)
        .child("t1:alpha", "t0:numeric", 0.6)
        .root("t1:alpha", 0.1)
        .child("t2:alpha", "t0:numeric", 0.6)
        .child("t2:alpha", "t1:alpha", 0.2)
        .root("t2:alpha", 0.1)
        .child("t3:roman", "t2:alpha", 0.7)
        .child("t3:roman", "t0:numeric", 0.2)
        .child("t3:alpha", "t0:numeric", 0.5)
        .child("t4:roman", "t2:alpha", 0.7)
        .edge(
            // (ii) nested under (i) would break the roman sequence
            ParentEdgeCandidate::to_parent("t3:roman>t4:roman", "t4:roman", "t3:roman")
                .with_component("level_step", 0.5)
                .with_penalty("sequence_break", 0.4),
        )
        .child("t5:alpha", "t2:alpha", 0.3)
        .child("t6:alpha", "t0:numeric", 0.6)
        .edge(
            // a parent that starts after its child is structurally impossible
            ParentEdgeCandidate::to_parent("t6:alpha>t0:numeric", "t0:numeric", "t6:alpha")
                .with_component("level_step", 2.0)
                .with_hard_valid(false),
        )
        .build()
}
