//! Buffered delivery: run the whole cascade, then merge

use super::phase::{merge_posts, Phase, PhaseOutcome};
use super::{CascadeState, Resolver};
use phylo_common::db::PostRecord;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// One phase's slot in the diagnostics; `outcome` is `None` when skipped
#[derive(Debug, Clone)]
pub struct PhaseReport {
    pub phase: Phase,
    pub outcome: Option<PhaseOutcome>,
}

/// Merged result of a buffered resolution
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Id-deduplicated union across phases, newest first
    pub posts: Vec<PostRecord>,
    /// Every phase in cascade order
    pub phases: Vec<PhaseReport>,
    pub has_linked_tree: bool,
}

impl Resolution {
    pub fn total_count(&self) -> usize {
        self.posts.len()
    }

    pub fn report(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|report| report.phase == phase)
    }
}

impl Resolver {
    /// Resolve `name` into every post filed under it
    ///
    /// Never fails: phase failures are recorded in the returned diagnostics.
    pub async fn resolve(&self, name: &str, liked: &HashSet<i64>) -> Resolution {
        let mut state = CascadeState {
            has_linked_tree: false,
        };
        let mut phases = Vec::with_capacity(Phase::ALL.len());

        for phase in Phase::ALL {
            if phase.is_skipped(state.has_linked_tree) {
                debug!(phase = phase.label(), classification = %name, "Phase skipped, tree attached");
                phases.push(PhaseReport {
                    phase,
                    outcome: None,
                });
                continue;
            }

            let outcome = match self.phase_names(phase, name, &mut state).await {
                Ok(names) => {
                    let fetched = self.fetcher().fetch(&names, liked, phase).await;
                    debug!(
                        phase = phase.label(),
                        names = names.len(),
                        posts = fetched.posts.len(),
                        "Phase resolved"
                    );
                    PhaseOutcome::Ok {
                        posts: fetched.posts,
                        batches: fetched.batches,
                    }
                }
                Err(e) => {
                    warn!(phase = phase.label(), classification = %name, "Phase failed: {}", e);
                    PhaseOutcome::Failed(e.to_string())
                }
            };

            phases.push(PhaseReport {
                phase,
                outcome: Some(outcome),
            });
        }

        let posts = merge_posts(phases.iter().filter_map(|report| report.outcome.as_ref()));

        info!(
            classification = %name,
            has_linked_tree = state.has_linked_tree,
            total = posts.len(),
            "Classification resolved"
        );

        Resolution {
            posts,
            phases,
            has_linked_tree: state.has_linked_tree,
        }
    }
}
