//! Semantic fallback matcher
//!
//! Used only by Phase 4, when a classification has no tree anywhere. The
//! matcher is asked which of the known classification names belong under the
//! requested one and answers in free text containing a JSON object.

mod extract;
mod http;

pub use extract::{extract_json_object, matched_names};
pub use http::HttpMatcher;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Matcher errors
#[derive(Debug, Error)]
pub enum MatcherError {
    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the matcher API
    #[error("API error {0}: {1}")]
    Status(u16, String),

    /// Response body could not be read
    #[error("Parse error: {0}")]
    Parse(String),
}

impl MatcherError {
    /// Rate-limit class errors (429 Too Many Requests, 529 Overloaded)
    pub fn is_transient(&self) -> bool {
        matches!(self, MatcherError::Status(429 | 529, _))
    }
}

/// Free-text completion backend
#[async_trait]
pub trait SemanticMatcher: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, MatcherError>;
}

/// Retry policy for rate-limited matcher calls
///
/// `max_attempts` counts every call, the first included: the default of 4 is
/// one call plus up to 3 retries. Attempt `n` that fails transiently is
/// followed by a sleep of `backoff_base * n` before attempt `n + 1`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            backoff_base: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// Sleep after failed attempt `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base * attempt
    }
}

/// Call the matcher, retrying only rate-limit class errors
pub async fn complete_with_retry(
    matcher: &dyn SemanticMatcher,
    prompt: &str,
    policy: RetryPolicy,
) -> Result<String, MatcherError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match matcher.complete(prompt).await {
            Ok(text) => return Ok(text),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let backoff = policy.backoff(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    backoff_ms = backoff.as_millis() as u64,
                    "Matcher rate limited, will retry after backoff: {}",
                    err
                );
                tokio::time::sleep(backoff).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Prompt asking which `candidates` belong under `target`
pub fn build_prompt(target: &str, candidates: &[String]) -> String {
    let candidates_json =
        serde_json::to_string(candidates).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are an expert in biological taxonomy.\n\
         Target classification: \"{target}\"\n\
         Candidate classifications (JSON array): {candidates_json}\n\n\
         Select every candidate that is a descendant taxon of the target \
         (a lower rank contained in it). Names may be Japanese or scientific names.\n\
         Reply with exactly one JSON object and nothing else, in this form:\n\
         {{\"matchedClassifications\": [\"name\", ...]}}\n\
         Use an empty array when nothing matches."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Instant;

    /// Fails with the given statuses in order, then succeeds
    struct ScriptedMatcher {
        failures: Vec<u16>,
        calls: AtomicU32,
    }

    #[async_trait]
    impl SemanticMatcher for ScriptedMatcher {
        async fn complete(&self, _prompt: &str) -> Result<String, MatcherError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            match self.failures.get(call) {
                Some(&status) => Err(MatcherError::Status(status, "scripted".to_string())),
                None => Ok("ok".to_string()),
            }
        }
    }

    /// Always rate limited, recording when each call arrives
    struct TimedMatcher {
        calls: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl SemanticMatcher for TimedMatcher {
        async fn complete(&self, _prompt: &str) -> Result<String, MatcherError> {
            self.calls.lock().unwrap().push(Instant::now());
            Err(MatcherError::Status(429, "scripted".to_string()))
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            backoff_base: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_transient_errors_retried_until_success() {
        let matcher = ScriptedMatcher {
            failures: vec![429, 529],
            calls: AtomicU32::new(0),
        };
        let result = complete_with_retry(&matcher, "p", fast_policy()).await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(matcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retries_bounded_by_max_attempts() {
        let matcher = ScriptedMatcher {
            failures: vec![429, 429, 429, 429, 429],
            calls: AtomicU32::new(0),
        };
        let result = complete_with_retry(&matcher, "p", fast_policy()).await;
        assert!(matches!(result, Err(MatcherError::Status(429, _))));
        // one call plus three retries
        assert_eq!(matcher.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_third_retry_succeeds() {
        let matcher = ScriptedMatcher {
            failures: vec![429, 529, 429],
            calls: AtomicU32::new(0),
        };
        let result = complete_with_retry(&matcher, "p", fast_policy()).await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(matcher.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_default_backoff_grows_linearly() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 4);

        let sleeps: Vec<u128> = (1..policy.max_attempts)
            .map(|attempt| policy.backoff(attempt).as_millis())
            .collect();
        assert_eq!(sleeps, vec![2000, 4000, 6000]);
    }

    #[tokio::test]
    async fn test_sleeps_between_attempts_follow_backoff() {
        let matcher = TimedMatcher {
            calls: Mutex::new(Vec::new()),
        };
        let policy = RetryPolicy {
            max_attempts: 4,
            backoff_base: Duration::from_millis(20),
        };
        let result = complete_with_retry(&matcher, "p", policy).await;
        assert!(matches!(result, Err(MatcherError::Status(429, _))));

        let calls = matcher.calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        for (index, pair) in calls.windows(2).enumerate() {
            let gap = pair[1].duration_since(pair[0]);
            let expected = policy.backoff(index as u32 + 1);
            assert!(gap >= expected, "gap {gap:?} shorter than {expected:?}");
        }
    }

    #[tokio::test]
    async fn test_non_transient_error_not_retried() {
        let matcher = ScriptedMatcher {
            failures: vec![500],
            calls: AtomicU32::new(0),
        };
        let result = complete_with_retry(&matcher, "p", fast_policy()).await;
        assert!(matches!(result, Err(MatcherError::Status(500, _))));
        assert_eq!(matcher.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_prompt_embeds_target_and_candidates() {
        let prompt = build_prompt("ワニ目", &["クロコダイル科".to_string()]);
        assert!(prompt.contains("\"ワニ目\""));
        assert!(prompt.contains(r#"["クロコダイル科"]"#));
        assert!(prompt.contains("matchedClassifications"));
    }
}
