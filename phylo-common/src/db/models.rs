//! Database models
//!
//! Wire shapes for posts as returned by the resolution endpoints. Field names
//! serialize in camelCase to match the client contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post as delivered to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: i64,
    pub content: Option<String>,
    /// Classification name tagging this post (nullable)
    pub classification: Option<String>,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    /// Attachments sorted by `order_index`
    pub images: Vec<PostImage>,
    pub like_count: i64,
    /// Whether the requesting user liked this post
    pub is_liked: bool,
}

/// Author projection joined onto a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: i64,
    pub username: String,
    pub avatar_url: Option<String>,
}

/// Image attachment projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    pub url: String,
    pub order_index: i64,
}
