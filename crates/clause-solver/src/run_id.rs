//! Content-addressed parse run ids
//!
//! The run id is persisted and compared across runs, so the digest is fixed:
//! SHA-256 over the canonical JSON encoding of the section key and the sorted
//! selected-node and abstained-token id lists, first 8 bytes in hex, prefixed
//! with [`RUN_ID_PREFIX`]. Changing any of that requires bumping
//! [`RUN_ID_DIGEST_VERSION`].

use clause_graph::{NodeCandidateId, TokenId};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

/// Version of the digest input layout
pub const RUN_ID_DIGEST_VERSION: u32 = 1;

/// Prefix of every run id
pub const RUN_ID_PREFIX: &str = "p2_";

/// Hex characters after the prefix
pub const RUN_ID_HEX_LEN: usize = 16;

#[derive(Serialize)]
struct RunIdInput<'a> {
    v: u32,
    section_key: &'a str,
    selected_node_ids: Vec<&'a str>,
    abstained_token_ids: Vec<&'a str>,
}

/// Deterministic run id for a solved section
#[must_use]
pub fn parse_run_id(
    section_key: &str,
    selected_node_ids: &BTreeSet<NodeCandidateId>,
    abstained_token_ids: &BTreeSet<TokenId>,
) -> String {
    let input = RunIdInput {
        v: RUN_ID_DIGEST_VERSION,
        section_key,
        selected_node_ids: selected_node_ids.iter().map(NodeCandidateId::as_str).collect(),
        abstained_token_ids: abstained_token_ids.iter().map(TokenId::as_str).collect(),
    };

    let canonical = serde_json::json!(input).to_string();

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();

    format!("{RUN_ID_PREFIX}{}", hex::encode(&digest[..RUN_ID_HEX_LEN / 2]))
}
