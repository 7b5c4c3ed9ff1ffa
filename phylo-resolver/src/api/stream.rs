//! Streaming classification resolution endpoint (SSE)

use axum::{
    extract::{Path, State},
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use phylo_common::sse::{json_event, keep_alive};
use std::convert::Infallible;
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::user::UserToken;
use crate::error::{ApiError, ApiResult};
use crate::resolve::spawn_stream;
use crate::AppState;

/// GET /api/posts/classification/:name/stream
///
/// Streams events:
/// - `batch` for every resolved batch, in phase then batch order
/// - `warn` for a failed phase or batch (the stream continues)
/// - `end` once the cascade finishes, or a single `error` on unexpected failure
///
/// Closing the connection cancels the remaining work. A blank name is
/// rejected with 400 before any event is sent.
pub async fn stream_posts_by_classification(
    State(state): State<AppState>,
    Path(name): Path<String>,
    token: UserToken,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Classification name is empty".to_string()));
    }

    let request_id = Uuid::new_v4();
    let span = info_span!("resolve_stream", %request_id, classification = %name);

    let mut rx = async {
        info!("Stream client connected");
        let liked = state.resolver.liked_ids_for_token(token.as_deref()).await;
        spawn_stream(state.resolver.clone(), name.clone(), liked)
    }
    .instrument(span)
    .await;

    let stream = async_stream::stream! {
        while let Some(frame) = rx.recv().await {
            let terminal = frame.is_terminal();
            yield Ok(json_event(frame.event_name(), &frame.payload()));
            if terminal {
                debug!(%request_id, "Stream finished");
                break;
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(keep_alive()))
}
