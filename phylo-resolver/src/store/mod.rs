//! Store seams consumed by the resolver
//!
//! The resolver only sees these traits. [`SqliteStore`] is the production
//! implementation; tests substitute in-memory doubles.

mod sqlite;
mod timeout;

pub use sqlite::SqliteStore;
pub use timeout::WithTimeout;

use async_trait::async_trait;
use phylo_common::db::PostRecord;
use phylo_common::Result;
use std::collections::HashSet;

/// A stored tree document matched by a content search
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTree {
    pub classification_id: i64,
    pub content: String,
}

/// Raw tree documents keyed by classification
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Classification id for an exact name
    async fn classification_id(&self, name: &str) -> Result<Option<i64>>;

    /// Raw tree text attached to a classification, if any
    async fn tree_text(&self, classification_id: i64) -> Result<Option<String>>;

    /// Every stored tree whose raw text contains `needle` (case-insensitive)
    async fn search_trees(&self, needle: &str) -> Result<Vec<StoredTree>>;

    /// Raw tree text for a classification name
    async fn tree_text_for_name(&self, name: &str) -> Result<Option<String>> {
        match self.classification_id(name).await? {
            Some(id) => self.tree_text(id).await,
            None => Ok(None),
        }
    }
}

/// Posts and the user data needed to project them
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Posts whose classification is one of `names`, newest first
    ///
    /// One round trip per call; callers keep `names` within the store's
    /// query-size limit. `is_liked` is left false for the caller to fill.
    async fn posts_in_classifications(&self, names: &[String]) -> Result<Vec<PostRecord>>;

    /// Ids of posts liked by `user_id`
    async fn liked_post_ids(&self, user_id: i64) -> Result<HashSet<i64>>;

    /// Every distinct non-empty classification used by any post
    async fn distinct_classifications(&self) -> Result<Vec<String>>;

    /// User owning a session token
    async fn user_for_token(&self, token: &str) -> Result<Option<i64>>;
}
