//! Server-Sent Events (SSE) utilities
//!
//! Shared SSE helpers: named JSON events and the keep-alive policy.

use axum::response::sse::{Event, KeepAlive};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

/// Keep-alive comment interval
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// Build a named SSE event carrying `payload` as JSON
///
/// Serialization failure degrades to an `error` event so the client still
/// receives a well-formed frame.
///
/// # Example
/// ```rust,ignore
/// let event = phylo_common::sse::json_event("end", &serde_json::json!({ "done": true }));
/// ```
pub fn json_event<T: Serialize>(name: &str, payload: &T) -> Event {
    match serde_json::to_string(payload) {
        Ok(data) => Event::default().event(name).data(data),
        Err(e) => {
            warn!("SSE: Failed to serialize {} payload: {}", name, e);
            Event::default()
                .event("error")
                .data(r#"{"message":"failed to serialize event"}"#)
        }
    }
}

/// Keep-alive policy shared by every SSE endpoint
pub fn keep_alive() -> KeepAlive {
    KeepAlive::new()
        .interval(KEEP_ALIVE_INTERVAL)
        .text("heartbeat")
}
