//! Buffered classification resolution endpoint

use axum::{
    extract::{Path, State},
    Json,
};
use phylo_common::db::PostRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use super::user::UserToken;
use crate::error::{ApiError, ApiResult};
use crate::resolve::{BatchSummary, PhaseOutcome, PhaseReport, Resolution, ResolveError};
use crate::AppState;

/// Buffered resolution document
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResponse {
    pub posts: Vec<PostRecord>,
    /// Keyed `phase1` through `phase4`
    pub phase_results: BTreeMap<&'static str, PhaseResult>,
    pub total_count: usize,
}

/// Per-phase diagnostics
#[derive(Debug, Serialize)]
pub struct PhaseResult {
    pub phase: &'static str,
    /// `ok`, `failed` or `skipped`
    pub status: &'static str,
    pub posts: Vec<PostRecord>,
    pub count: usize,
    pub batches: Vec<BatchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<PhaseReport> for PhaseResult {
    fn from(report: PhaseReport) -> Self {
        let phase = report.phase.label();
        match report.outcome {
            Some(PhaseOutcome::Ok { posts, batches }) => PhaseResult {
                phase,
                status: "ok",
                count: posts.len(),
                posts,
                batches: batches.iter().map(BatchSummary::from).collect(),
                error: None,
            },
            Some(PhaseOutcome::Failed(reason)) => PhaseResult {
                phase,
                status: "failed",
                posts: Vec::new(),
                count: 0,
                batches: Vec::new(),
                error: Some(reason),
            },
            None => PhaseResult {
                phase,
                status: "skipped",
                posts: Vec::new(),
                count: 0,
                batches: Vec::new(),
                error: None,
            },
        }
    }
}

impl From<Resolution> for ResolutionResponse {
    fn from(resolution: Resolution) -> Self {
        let total_count = resolution.total_count();
        let phase_results = resolution
            .phases
            .into_iter()
            .map(|report| (report.phase.key(), PhaseResult::from(report)))
            .collect();

        Self {
            posts: resolution.posts,
            phase_results,
            total_count,
        }
    }
}

/// GET /api/posts/classification/:name
///
/// Runs the full cascade and returns one merged document. The cascade runs in
/// its own task so an unexpected failure still yields a 500 response.
pub async fn get_posts_by_classification(
    State(state): State<AppState>,
    Path(name): Path<String>,
    token: UserToken,
) -> ApiResult<Json<ResolutionResponse>> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Classification name is empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("resolve", %request_id, classification = %name);
    let resolver = state.resolver.clone();

    let task = tokio::spawn(
        async move {
            let liked = resolver.liked_ids_for_token(token.as_deref()).await;
            resolver.resolve(&name, &liked).await
        }
        .instrument(span),
    );

    let resolution = task.await.map_err(|e| {
        error!(%request_id, "{}", ResolveError::Task(e.to_string()));
        ApiError::Internal("Failed to resolve classification".to_string())
    })?;

    Ok(Json(ResolutionResponse::from(resolution)))
}
