//! In-memory store and matcher doubles for unit tests

use crate::matcher::{MatcherError, SemanticMatcher};
use crate::store::{PostStore, StoredTree, TreeStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use phylo_common::db::{Author, PostRecord};
use phylo_common::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Post with the given id, classification and RFC 3339 creation time
pub fn post(id: i64, classification: &str, created_at: &str) -> PostRecord {
    PostRecord {
        id,
        content: None,
        classification: Some(classification.to_string()),
        created_at: DateTime::parse_from_rfc3339(created_at)
            .unwrap()
            .with_timezone(&Utc),
        author: Author {
            id: 1,
            username: "tester".to_string(),
            avatar_url: None,
        },
        images: Vec::new(),
        like_count: 0,
        is_liked: false,
    }
}

/// Tree and post store backed by plain collections
///
/// Classification ids are assigned in `with_tree` order, starting at 1.
#[derive(Default)]
pub struct MemoryStore {
    trees: Vec<(String, String)>,
    posts: Vec<PostRecord>,
    sessions: HashMap<String, i64>,
    likes: HashMap<i64, HashSet<i64>>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    fail_search: bool,
    fetch_sizes: Mutex<Vec<usize>>,
    search_calls: AtomicUsize,
    distinct_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn with_tree(mut self, name: &str, text: &str) -> Self {
        self.trees.push((name.to_string(), text.to_string()));
        self
    }

    pub fn with_post(mut self, post: PostRecord) -> Self {
        self.posts.push(post);
        self
    }

    pub fn with_session(mut self, token: &str, user_id: i64) -> Self {
        self.sessions.insert(token.to_string(), user_id);
        self
    }

    pub fn with_like(mut self, user_id: i64, post_id: i64) -> Self {
        self.likes.entry(user_id).or_default().insert(post_id);
        self
    }

    /// Post fetches for any chunk containing `name` fail
    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    /// Post fetches for any chunk containing `name` panic
    pub fn panicking_on(mut self, name: &str) -> Self {
        self.panicking.insert(name.to_string());
        self
    }

    /// Every tree search fails
    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn raw_tree(&self, name: &str) -> Option<&str> {
        self.trees
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, text)| text.as_str())
    }

    /// Chunk sizes of every post fetch, including failed ones
    pub fn fetch_sizes(&self) -> Vec<usize> {
        self.fetch_sizes.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn distinct_calls(&self) -> usize {
        self.distinct_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TreeStore for MemoryStore {
    async fn classification_id(&self, name: &str) -> Result<Option<i64>> {
        Ok(self
            .trees
            .iter()
            .position(|(n, _)| n == name)
            .map(|index| index as i64 + 1))
    }

    async fn tree_text(&self, classification_id: i64) -> Result<Option<String>> {
        let index = (classification_id - 1) as usize;
        Ok(self.trees.get(index).map(|(_, text)| text.clone()))
    }

    async fn search_trees(&self, needle: &str) -> Result<Vec<StoredTree>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(Error::Internal("tree search unavailable".to_string()));
        }

        let needle = needle.to_lowercase();
        Ok(self
            .trees
            .iter()
            .enumerate()
            .filter(|(_, (_, text))| text.to_lowercase().contains(&needle))
            .map(|(index, (_, text))| StoredTree {
                classification_id: index as i64 + 1,
                content: text.clone(),
            })
            .collect())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn posts_in_classifications(&self, names: &[String]) -> Result<Vec<PostRecord>> {
        self.fetch_sizes.lock().unwrap().push(names.len());

        if names.iter().any(|n| self.panicking.contains(n)) {
            panic!("post store exploded");
        }
        if names.iter().any(|n| self.failing.contains(n)) {
            return Err(Error::Internal("post fetch failed".to_string()));
        }

        let mut posts: Vec<PostRecord> = self
            .posts
            .iter()
            .filter(|p| {
                p.classification
                    .as_ref()
                    .is_some_and(|c| names.contains(c))
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn liked_post_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        Ok(self.likes.get(&user_id).cloned().unwrap_or_default())
    }

    async fn distinct_classifications(&self) -> Result<Vec<String>> {
        self.distinct_calls.fetch_add(1, Ordering::SeqCst);

        let mut seen = HashSet::new();
        Ok(self
            .posts
            .iter()
            .filter_map(|p| p.classification.clone())
            .filter(|c| !c.is_empty() && seen.insert(c.clone()))
            .collect())
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<i64>> {
        Ok(self.sessions.get(token).copied())
    }
}

/// Matcher returning a fixed reply and counting calls
pub struct CountingMatcher {
    reply: String,
    calls: AtomicUsize,
}

impl CountingMatcher {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticMatcher for CountingMatcher {
    async fn complete(&self, _prompt: &str) -> std::result::Result<String, MatcherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}
