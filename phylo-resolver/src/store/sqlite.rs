//! SQLite-backed store

use super::{PostStore, StoredTree, TreeStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use phylo_common::db::{Author, PostImage, PostRecord};
use phylo_common::Result;
use serde::Deserialize;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::collections::HashSet;
use tracing::warn;

/// Store backed by the service's SQLite database
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageRow {
    url: Option<String>,
    order_index: Option<i64>,
}

/// Escape LIKE wildcards so the needle matches literally
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn post_from_row(row: &SqliteRow) -> Result<PostRecord> {
    let images_json: Option<String> = row.try_get("images_json")?;
    let mut images: Vec<PostImage> = images_json
        .as_deref()
        .map(|json| match serde_json::from_str::<Vec<ImageRow>>(json) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Ignoring unreadable image projection: {}", e);
                Vec::new()
            }
        })
        .unwrap_or_default()
        .into_iter()
        .filter_map(|image| {
            Some(PostImage {
                url: image.url?,
                order_index: image.order_index.unwrap_or(0),
            })
        })
        .collect();
    images.sort_by_key(|image| image.order_index);

    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    Ok(PostRecord {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        classification: row.try_get("classification")?,
        created_at,
        author: Author {
            id: row.try_get("author_id")?,
            username: row.try_get("username")?,
            avatar_url: row.try_get("avatar_url")?,
        },
        images,
        like_count: row.try_get("like_count")?,
        is_liked: false,
    })
}

#[async_trait]
impl TreeStore for SqliteStore {
    async fn classification_id(&self, name: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar("SELECT id FROM classifications WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn tree_text(&self, classification_id: i64) -> Result<Option<String>> {
        let content: Option<Option<String>> =
            sqlx::query_scalar("SELECT content FROM trees WHERE classification_id = ?")
                .bind(classification_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(content.flatten().filter(|text| !text.trim().is_empty()))
    }

    async fn search_trees(&self, needle: &str) -> Result<Vec<StoredTree>> {
        let rows = sqlx::query(
            r#"
            SELECT classification_id, content
            FROM trees
            WHERE content LIKE ? ESCAPE '\'
            ORDER BY classification_id
            "#,
        )
        .bind(like_pattern(needle))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<StoredTree> {
                Ok(StoredTree {
                    classification_id: row.try_get("classification_id")?,
                    content: row.try_get("content")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostStore for SqliteStore {
    async fn posts_in_classifications(&self, names: &[String]) -> Result<Vec<PostRecord>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; names.len()].join(", ");
        let sql = format!(
            r#"
            SELECT p.id, p.content, p.classification, p.created_at,
                   u.id AS author_id, u.username, u.avatar_url,
                   (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS like_count,
                   (SELECT json_group_array(json_object('url', i.url, 'orderIndex', i.order_index))
                      FROM post_images i WHERE i.post_id = p.id) AS images_json
            FROM posts p
            JOIN users u ON u.id = p.user_id
            WHERE p.classification IN ({})
            ORDER BY p.created_at DESC, p.id DESC
            "#,
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for name in names {
            query = query.bind(name);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn liked_post_ids(&self, user_id: i64) -> Result<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT post_id FROM likes WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn distinct_classifications(&self) -> Result<Vec<String>> {
        let names = sqlx::query_scalar(
            r#"
            SELECT DISTINCT classification
            FROM posts
            WHERE classification IS NOT NULL AND classification <> ''
            ORDER BY classification
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    async fn user_for_token(&self, token: &str) -> Result<Option<i64>> {
        let user_id = sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user_id)
    }
}
