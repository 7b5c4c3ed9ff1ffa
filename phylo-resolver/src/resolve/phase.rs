//! Resolution phases, their outcomes and the merge law

use super::fetcher::Batch;
use phylo_common::db::PostRecord;
use serde::Serialize;
use std::collections::HashSet;

/// The four cascade phases, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Posts tagged with the requested name verbatim
    Exact,
    /// Descendants from the tree attached to the requested classification
    TreeChildren,
    /// Descendants found by searching every stored tree
    GlobalTreeSearch,
    /// Names suggested by the semantic matcher
    Semantic,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::Exact,
        Phase::TreeChildren,
        Phase::GlobalTreeSearch,
        Phase::Semantic,
    ];

    /// Label used in logs, stream frames and diagnostics
    pub fn label(self) -> &'static str {
        match self {
            Phase::Exact => "exact",
            Phase::TreeChildren => "tree_children",
            Phase::GlobalTreeSearch => "global_tree_search",
            Phase::Semantic => "semantic",
        }
    }

    /// Key under `phaseResults` in the buffered response
    pub fn key(self) -> &'static str {
        match self {
            Phase::Exact => "phase1",
            Phase::TreeChildren => "phase2",
            Phase::GlobalTreeSearch => "phase3",
            Phase::Semantic => "phase4",
        }
    }

    /// Skip predicate: the fallback phases only run when no tree is attached
    pub fn is_skipped(self, has_linked_tree: bool) -> bool {
        match self {
            Phase::Exact | Phase::TreeChildren => false,
            Phase::GlobalTreeSearch | Phase::Semantic => has_linked_tree,
        }
    }
}

/// What a phase that ran produced
#[derive(Debug, Clone)]
pub enum PhaseOutcome {
    Ok { posts: Vec<PostRecord>, batches: Vec<Batch> },
    Failed(String),
}

impl PhaseOutcome {
    pub fn posts(&self) -> &[PostRecord] {
        match self {
            PhaseOutcome::Ok { posts, .. } => posts,
            PhaseOutcome::Failed(_) => &[],
        }
    }
}

/// Union of posts across phases, first phase to introduce an id wins,
/// ordered newest first
pub fn merge_posts<'a>(outcomes: impl IntoIterator<Item = &'a PhaseOutcome>) -> Vec<PostRecord> {
    let mut seen = HashSet::new();
    let mut merged: Vec<PostRecord> = outcomes
        .into_iter()
        .flat_map(PhaseOutcome::posts)
        .filter(|post| seen.insert(post.id))
        .cloned()
        .collect();

    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}
