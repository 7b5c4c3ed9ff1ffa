//! phylo-resolver library - classification post resolution service
//!
//! Resolves a classification name into every post filed under it, guided by
//! user-maintained phylogenetic trees with tree-search and semantic fallbacks.

use axum::Router;
use phylo_common::AgeIndex;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod error;
pub mod matcher;
pub mod resolve;
pub mod store;

#[cfg(test)]
mod test_support;

use matcher::SemanticMatcher;
use resolve::{Resolver, ResolverSettings};
use store::SqliteStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Resolver,
    /// Process-wide, read-only age hierarchy
    pub age_index: &'static AgeIndex,
}

impl AppState {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            age_index: AgeIndex::global(),
        }
    }

    /// State backed by a SQLite pool for both trees and posts
    pub fn from_pool(
        pool: SqlitePool,
        matcher: Option<Arc<dyn SemanticMatcher>>,
        settings: ResolverSettings,
    ) -> Self {
        let store = Arc::new(SqliteStore::new(pool));
        Self::new(Resolver::new(store.clone(), store, matcher, settings))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let routes = Router::new()
        .route(
            "/api/posts/classification/:name",
            get(api::get_posts_by_classification),
        )
        .route(
            "/api/posts/classification/:name/stream",
            get(api::stream_posts_by_classification),
        )
        .route(
            "/api/classifications/:name/tree",
            get(api::get_classification_tree),
        )
        .route("/api/ages", get(api::get_ages));

    Router::new()
        .merge(routes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
