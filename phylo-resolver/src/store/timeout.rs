//! Per-call timeout adapter
//!
//! Wraps any store so that every call is bounded; expiry surfaces as
//! [`Error::Timeout`] and is handled like any other store failure.

use super::{PostStore, StoredTree, TreeStore};
use async_trait::async_trait;
use phylo_common::db::PostRecord;
use phylo_common::{Error, Result};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Store wrapper applying one timeout to every call
pub struct WithTimeout<S: ?Sized> {
    inner: Arc<S>,
    timeout: Duration,
}

impl<S: ?Sized> WithTimeout<S> {
    pub fn new(inner: Arc<S>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(&self, operation: &str, call: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "{} exceeded {} ms",
                    operation,
                    self.timeout.as_millis()
                ))
            })?
    }
}

#[async_trait]
impl<S: TreeStore + ?Sized> TreeStore for WithTimeout<S> {
    async fn classification_id(&self, name: &str) -> Result<Option<i64>> {
        self.bounded("classification lookup", self.inner.classification_id(name))
            .await
    }

    async fn tree_text(&self, classification_id: i64) -> Result<Option<String>> {
        self.bounded("tree lookup", self.inner.tree_text(classification_id))
            .await
    }

    async fn search_trees(&self, needle: &str) -> Result<Vec<StoredTree>> {
        self.bounded("tree search", self.inner.search_trees(needle))
            .await
    }
}

#[async_trait]
impl<S: PostStore + ?Sized> PostStore for WithTimeout<S> {
    async fn posts_in_classifications(&self, names: &[String]) -> Result<Vec<PostRecord>> {
        self.bounded("post fetch", self.inner.posts_in_classifications(names))
            .await
    }

    async fn liked_post_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        self.bounded("liked post lookup", self.inner.liked_post_ids(user_id))
            .await
    }

    async fn distinct_classifications(&self) -> Result<Vec<String>> {
        self.bounded("classification listing", self.inner.distinct_classifications())
            .await
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<i64>> {
        self.bounded("session lookup", self.inner.user_for_token(token))
            .await
    }
}
