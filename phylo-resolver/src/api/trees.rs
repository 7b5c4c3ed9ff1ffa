//! Tree display endpoints: age-filtered trees and the age hierarchy

use axum::{
    extract::{Path, Query, State},
    Json,
};
use phylo_common::age::filter_tree;
use phylo_common::{AgeIndex, TreeNode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiResult;
use crate::AppState;

/// Query parameters for tree display
#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    /// Comma-separated age names (any level of the hierarchy)
    pub ages: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TreeResponse {
    pub classification: String,
    /// `None` when no tree is attached or nothing survives the filter
    pub tree: Option<TreeNode>,
}

fn selected_age_names(ages: Option<&str>) -> Option<Vec<&str>> {
    let names: Vec<&str> = ages?
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    (!names.is_empty()).then_some(names)
}

/// GET /api/classifications/:name/tree
///
/// Without `ages` the attached tree is returned as parsed.
pub async fn get_classification_tree(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<TreeQuery>,
) -> ApiResult<Json<TreeResponse>> {
    let tree = state.resolver.attached_tree(&name).await?;

    let tree = match selected_age_names(query.ages.as_deref()) {
        Some(names) => {
            let selected = state.age_index.ids_for_names(names.iter().copied());
            debug!(classification = %name, ages = names.len(), selected = selected.len(), "Filtering tree by age");
            filter_tree(tree.as_ref(), &selected, state.age_index)
        }
        None => tree,
    };

    Ok(Json(TreeResponse {
        classification: name,
        tree,
    }))
}

/// GET /api/ages
pub async fn get_ages(State(state): State<AppState>) -> Json<&'static AgeIndex> {
    Json(state.age_index)
}
