//! Batched post fetching
//!
//! Names are split into fixed-size chunks (the store's query-size limit) and
//! fetched one chunk per query. A failing chunk is logged and skipped; the
//! remaining chunks still run.

use super::phase::Phase;
use crate::store::PostStore;
use phylo_common::db::PostRecord;
use phylo_common::Result;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Default names per relational query
pub const FETCH_CHUNK_SIZE: usize = 100;

/// Posts fetched for one chunk of names
#[derive(Debug, Clone)]
pub struct Batch {
    /// 1-based position of the chunk within its phase
    pub batch_number: usize,
    pub classification_count: usize,
    pub posts: Vec<PostRecord>,
}

/// Batch breakdown entry reported in phase diagnostics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub batch_number: usize,
    pub classification_count: usize,
    pub post_count: usize,
}

impl From<&Batch> for BatchSummary {
    fn from(batch: &Batch) -> Self {
        Self {
            batch_number: batch.batch_number,
            classification_count: batch.classification_count,
            post_count: batch.posts.len(),
        }
    }
}

/// Result of fetching every chunk for a phase
#[derive(Debug, Clone, Default)]
pub struct FetchResult {
    /// Concatenation of every successful batch, in batch order
    pub posts: Vec<PostRecord>,
    /// Successful batches only; failed chunks leave a gap in numbering
    pub batches: Vec<Batch>,
}

pub struct BatchedFetcher<'a> {
    store: &'a dyn PostStore,
    chunk_size: usize,
}

impl<'a> BatchedFetcher<'a> {
    pub fn new(store: &'a dyn PostStore, chunk_size: usize) -> Self {
        Self {
            store,
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Fetch posts for `names`, tolerating individual chunk failures
    pub async fn fetch(&self, names: &[String], liked: &HashSet<i64>, phase: Phase) -> FetchResult {
        let mut result = FetchResult::default();

        for (index, chunk) in names.chunks(self.chunk_size).enumerate() {
            let batch_number = index + 1;
            match self.fetch_chunk(chunk, liked).await {
                Ok(posts) => {
                    debug!(
                        phase = phase.label(),
                        batch = batch_number,
                        names = chunk.len(),
                        posts = posts.len(),
                        "Fetched batch"
                    );
                    result.posts.extend(posts.iter().cloned());
                    result.batches.push(Batch {
                        batch_number,
                        classification_count: chunk.len(),
                        posts,
                    });
                }
                Err(e) => {
                    warn!(
                        phase = phase.label(),
                        batch = batch_number,
                        names = chunk.len(),
                        "Batch fetch failed, skipping: {}",
                        e
                    );
                }
            }
        }

        result
    }

    /// Fetch a single chunk and mark posts liked by the requesting user
    ///
    /// `chunk` must not exceed the chunk size.
    pub async fn fetch_chunk(&self, chunk: &[String], liked: &HashSet<i64>) -> Result<Vec<PostRecord>> {
        if chunk.is_empty() {
            return Ok(Vec::new());
        }

        let mut posts = self.store.posts_in_classifications(chunk).await?;
        for post in &mut posts {
            post.is_liked = liked.contains(&post.id);
        }
        Ok(posts)
    }
}
