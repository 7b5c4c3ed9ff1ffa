//! Phased classification resolution
//!
//! Resolves one classification name into every post filed "under" it:
//!
//! 1. **Exact**: posts tagged with the name itself
//! 2. **Tree children**: descendants from the tree attached to the name
//! 3. **Global tree search**: descendants from any stored tree mentioning the name
//! 4. **Semantic**: names the semantic matcher places under the requested one
//!
//! Phases run strictly in order. Phases 3 and 4 are skipped whenever Phase 2
//! found an attached tree. A failing phase contributes nothing and never
//! aborts the request. Two delivery modes share the cascade: [`buffered`]
//! (one merged document) and [`stream`] (incremental frames).

pub mod buffered;
pub mod collector;
pub mod fetcher;
pub mod phase;
pub mod stream;

pub use buffered::{PhaseReport, Resolution};
pub use fetcher::{Batch, BatchSummary, BatchedFetcher, FetchResult};
pub use phase::{merge_posts, Phase, PhaseOutcome};
pub use stream::{spawn_stream, StreamFrame};

use crate::matcher::{self, MatcherError, RetryPolicy, SemanticMatcher};
use crate::store::{PostStore, TreeStore, WithTimeout};
use phylo_common::config::TomlConfig;
use phylo_common::tree::{parse_tree, TreeNode};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Phase-local failure reasons
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Store(#[from] phylo_common::Error),

    #[error("Matcher error: {0}")]
    Matcher(#[from] MatcherError),

    #[error("Semantic matcher is not configured")]
    MatcherUnavailable,

    #[error("Resolution task failed: {0}")]
    Task(String),
}

/// Resolution tuning
#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    /// Bound applied to every store call
    pub call_timeout: Duration,
    /// Names per relational query
    pub fetch_chunk_size: usize,
    /// Names per streamed batch
    pub stream_chunk_size: usize,
    pub retry: RetryPolicy,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            fetch_chunk_size: fetcher::FETCH_CHUNK_SIZE,
            stream_chunk_size: stream::STREAM_CHUNK_SIZE,
            retry: RetryPolicy::default(),
        }
    }
}

impl ResolverSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            call_timeout: Duration::from_millis(config.resolver.call_timeout_ms),
            fetch_chunk_size: config.resolver.fetch_chunk_size.max(1),
            stream_chunk_size: config.resolver.stream_chunk_size.max(1),
            retry: RetryPolicy {
                max_attempts: config.matcher.max_attempts,
                backoff_base: Duration::from_millis(config.matcher.backoff_base_ms),
            },
        }
    }
}

/// Names gathered for a phase plus the cascade state it updates
struct CascadeState {
    has_linked_tree: bool,
}

/// Resolution entry point shared by both delivery modes
///
/// Cheap to clone; holds only shared handles. Nothing is cached between
/// requests: every resolution re-reads trees and posts.
#[derive(Clone)]
pub struct Resolver {
    trees: Arc<dyn TreeStore>,
    posts: Arc<dyn PostStore>,
    matcher: Option<Arc<dyn SemanticMatcher>>,
    settings: ResolverSettings,
}

impl Resolver {
    /// Build a resolver; every store call is bounded by `settings.call_timeout`
    pub fn new(
        trees: Arc<dyn TreeStore>,
        posts: Arc<dyn PostStore>,
        matcher: Option<Arc<dyn SemanticMatcher>>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            trees: Arc::new(WithTimeout::new(trees, settings.call_timeout)),
            posts: Arc::new(WithTimeout::new(posts, settings.call_timeout)),
            matcher,
            settings,
        }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    fn fetcher(&self) -> BatchedFetcher<'_> {
        BatchedFetcher::new(self.posts.as_ref(), self.settings.fetch_chunk_size)
    }

    /// Post ids liked by the owner of `token`
    ///
    /// Missing, unknown or unresolvable tokens yield an empty set.
    pub async fn liked_ids_for_token(&self, token: Option<&str>) -> HashSet<i64> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return HashSet::new();
        };

        let user_id = match self.posts.user_for_token(token).await {
            Ok(Some(user_id)) => user_id,
            Ok(None) => {
                debug!("Unknown session token, resolving anonymously");
                return HashSet::new();
            }
            Err(e) => {
                warn!("Session lookup failed, resolving anonymously: {}", e);
                return HashSet::new();
            }
        };

        match self.posts.liked_post_ids(user_id).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(user_id, "Liked post lookup failed: {}", e);
                HashSet::new()
            }
        }
    }

    /// Parsed tree attached to `name`, if any
    pub async fn attached_tree(&self, name: &str) -> phylo_common::Result<Option<TreeNode>> {
        let text = self.trees.tree_text_for_name(name).await?;
        Ok(parse_tree(text.as_deref()))
    }

    /// Classification names whose posts make up `phase`
    ///
    /// Phase 2 records in `state` whether a tree is attached, before any
    /// further work, so a later failure still suppresses Phases 3 and 4.
    async fn phase_names(
        &self,
        phase: Phase,
        name: &str,
        state: &mut CascadeState,
    ) -> Result<Vec<String>, ResolveError> {
        match phase {
            Phase::Exact => Ok(vec![name.to_string()]),
            Phase::TreeChildren => self.tree_children_names(name, state).await,
            Phase::GlobalTreeSearch => {
                Ok(collector::collect_from_related_trees(self.trees.as_ref(), name).await?)
            }
            Phase::Semantic => self.semantic_names(name).await,
        }
    }

    async fn tree_children_names(
        &self,
        name: &str,
        state: &mut CascadeState,
    ) -> Result<Vec<String>, ResolveError> {
        let Some(text) = self.trees.tree_text_for_name(name).await? else {
            debug!(classification = %name, "No tree attached");
            return Ok(Vec::new());
        };
        state.has_linked_tree = true;

        let Some(tree) = parse_tree(Some(&text)) else {
            info!(classification = %name, "Attached tree is unparseable, no descendants");
            return Ok(Vec::new());
        };

        Ok(collector::collect_all_children_names_with_linked_tree(&tree, self.trees.as_ref()).await)
    }

    async fn semantic_names(&self, name: &str) -> Result<Vec<String>, ResolveError> {
        let matcher = self.matcher.as_ref().ok_or(ResolveError::MatcherUnavailable)?;

        let candidates: Vec<String> = self
            .posts
            .distinct_classifications()
            .await?
            .into_iter()
            .filter(|candidate| candidate != name)
            .collect();

        if candidates.is_empty() {
            debug!(classification = %name, "No candidate classifications for matcher");
            return Ok(Vec::new());
        }

        let prompt = matcher::build_prompt(name, &candidates);
        let reply =
            matcher::complete_with_retry(matcher.as_ref(), &prompt, self.settings.retry).await?;
        let names = matcher::matched_names(&reply, name, &candidates);

        info!(
            classification = %name,
            candidates = candidates.len(),
            matched = names.len(),
            "Semantic matcher answered"
        );
        Ok(names)
    }
}
