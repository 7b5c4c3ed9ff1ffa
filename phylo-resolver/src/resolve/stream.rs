//! Streaming delivery
//!
//! The cascade runs in a spawned task and pushes [`StreamFrame`]s into a
//! bounded channel as each batch resolves. Dropping the receiver is the
//! cancellation signal; the task checks for it before every phase and batch.
//!
//! The semantic phase is not part of this variant.

use super::phase::Phase;
use super::{CascadeState, ResolveError, Resolver};
use phylo_common::db::PostRecord;
use serde_json::{json, Value};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn, Instrument, Span};

/// Default names per streamed batch
pub const STREAM_CHUNK_SIZE: usize = 50;

const CHANNEL_CAPACITY: usize = 16;

/// One server-push frame
#[derive(Debug, Clone)]
pub enum StreamFrame {
    Batch {
        phase: Phase,
        batch_number: usize,
        posts: Vec<PostRecord>,
    },
    Warn {
        phase: Phase,
        batch_number: Option<usize>,
        message: String,
        error: String,
    },
    Error {
        message: String,
    },
    End,
}

impl StreamFrame {
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamFrame::Batch { .. } => "batch",
            StreamFrame::Warn { .. } => "warn",
            StreamFrame::Error { .. } => "error",
            StreamFrame::End => "end",
        }
    }

    /// JSON payload carried by the frame's event
    pub fn payload(&self) -> Value {
        match self {
            StreamFrame::Batch {
                phase,
                batch_number,
                posts,
            } => json!({
                "phase": phase.label(),
                "batchNumber": batch_number,
                "posts": posts,
            }),
            StreamFrame::Warn {
                phase,
                batch_number,
                message,
                error,
            } => {
                let mut payload = json!({
                    "phase": phase.label(),
                    "message": message,
                    "error": error,
                });
                if let Some(number) = batch_number {
                    payload["batchNumber"] = json!(number);
                }
                payload
            }
            StreamFrame::Error { message } => json!({ "message": message }),
            StreamFrame::End => json!({ "done": true }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamFrame::Error { .. } | StreamFrame::End)
    }
}

/// Receiver side went away
#[derive(Debug)]
struct StreamClosed;

type Sink = mpsc::Sender<StreamFrame>;

async fn send(sink: &Sink, frame: StreamFrame) -> Result<(), StreamClosed> {
    sink.send(frame).await.map_err(|_| StreamClosed)
}

fn ensure_open(sink: &Sink) -> Result<(), StreamClosed> {
    if sink.is_closed() {
        Err(StreamClosed)
    } else {
        Ok(())
    }
}

/// Start streaming resolution of `name`
///
/// The returned receiver yields frames in order and always finishes with
/// either `End` or a single `Error` frame.
pub fn spawn_stream(resolver: Resolver, name: String, liked: HashSet<i64>) -> mpsc::Receiver<StreamFrame> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let span = Span::current();

    let driver = async move {
        let cascade_tx = tx.clone();
        let cascade_name = name.clone();
        let cascade = tokio::spawn(
            async move {
                resolver
                    .run_stream(&cascade_name, &liked, &cascade_tx)
                    .await
            }
            .instrument(Span::current()),
        );

        match cascade.await {
            Ok(Ok(())) => {
                info!(classification = %name, "Stream resolution complete");
                let _ = send(&tx, StreamFrame::End).await;
            }
            Ok(Err(StreamClosed)) => {
                debug!(classification = %name, "Stream receiver closed, resolution cancelled");
            }
            Err(e) => {
                error!(classification = %name, "{}", ResolveError::Task(e.to_string()));
                let _ = send(
                    &tx,
                    StreamFrame::Error {
                        message: "Failed to resolve classification".to_string(),
                    },
                )
                .await;
            }
        }
    };
    tokio::spawn(driver.instrument(span));

    rx
}

impl Resolver {
    async fn run_stream(&self, name: &str, liked: &HashSet<i64>, sink: &Sink) -> Result<(), StreamClosed> {
        let mut state = CascadeState {
            has_linked_tree: false,
        };
        let mut emitted: HashSet<i64> = HashSet::new();

        for phase in Phase::ALL {
            ensure_open(sink)?;

            if phase == Phase::Semantic {
                debug!(classification = %name, "Semantic phase not streamed");
                continue;
            }
            if phase.is_skipped(state.has_linked_tree) {
                debug!(phase = phase.label(), classification = %name, "Phase skipped, tree attached");
                continue;
            }

            let names = match self.phase_names(phase, name, &mut state).await {
                Ok(names) => names,
                Err(e) => {
                    warn!(phase = phase.label(), classification = %name, "Phase failed: {}", e);
                    send(
                        sink,
                        StreamFrame::Warn {
                            phase,
                            batch_number: None,
                            message: format!("Phase {} failed", phase.label()),
                            error: e.to_string(),
                        },
                    )
                    .await?;
                    continue;
                }
            };

            self.stream_phase(phase, &names, liked, &mut emitted, sink).await?;
        }

        Ok(())
    }

    async fn stream_phase(
        &self,
        phase: Phase,
        names: &[String],
        liked: &HashSet<i64>,
        emitted: &mut HashSet<i64>,
        sink: &Sink,
    ) -> Result<(), StreamClosed> {
        let fetcher = self.fetcher();
        let chunk_size = self.settings.stream_chunk_size.min(fetcher.chunk_size()).max(1);
        // exact match always reports its single batch, even when empty
        let report_empty = phase == Phase::Exact;

        for (index, chunk) in names.chunks(chunk_size).enumerate() {
            ensure_open(sink)?;
            let batch_number = index + 1;

            match fetcher.fetch_chunk(chunk, liked).await {
                Ok(mut posts) => {
                    posts.retain(|post| emitted.insert(post.id));
                    debug!(
                        phase = phase.label(),
                        batch = batch_number,
                        names = chunk.len(),
                        posts = posts.len(),
                        "Streaming batch"
                    );
                    if posts.is_empty() && !report_empty {
                        continue;
                    }
                    send(
                        sink,
                        StreamFrame::Batch {
                            phase,
                            batch_number,
                            posts,
                        },
                    )
                    .await?;
                }
                Err(e) => {
                    warn!(
                        phase = phase.label(),
                        batch = batch_number,
                        "Batch fetch failed, skipping: {}",
                        e
                    );
                    send(
                        sink,
                        StreamFrame::Warn {
                            phase,
                            batch_number: Some(batch_number),
                            message: format!("Batch {} failed", batch_number),
                            error: e.to_string(),
                        },
                    )
                    .await?;
                }
            }
        }

        Ok(())
    }
}
