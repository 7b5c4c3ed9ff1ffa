//! Optional user token extraction
//!
//! Tokens only personalise `isLiked`; a missing or unknown token never
//! rejects a request. Browser event-stream clients cannot set headers, so the
//! `token` query parameter is accepted alongside `Authorization: Bearer`.

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;
use std::convert::Infallible;

/// Session token supplied with the request, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserToken(pub Option<String>);

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?;
    non_blank(token)
}

fn query_token(parts: &Parts) -> Option<String> {
    let Query(query) = Query::<TokenQuery>::try_from_uri(&parts.uri).ok()?;
    query.token.as_deref().and_then(non_blank)
}

#[async_trait]
impl<S> FromRequestParts<S> for UserToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(UserToken(bearer_token(parts).or_else(|| query_token(parts))))
    }
}

impl UserToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(request: Request<()>) -> UserToken {
        let (mut parts, _) = request.into_parts();
        UserToken::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_bearer_header_preferred_over_query() {
        let request = Request::builder()
            .uri("/api/posts/classification/x?token=from-query")
            .header(AUTHORIZATION, "Bearer from-header")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.as_deref(), Some("from-header"));
    }

    #[tokio::test]
    async fn test_query_token_accepted() {
        let request = Request::builder()
            .uri("/api/posts/classification/x/stream?token=abc")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_missing_or_blank_token_is_anonymous() {
        let request = Request::builder()
            .uri("/api/posts/classification/x?token=%20")
            .header(AUTHORIZATION, "Basic abc")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await, UserToken(None));
    }
}
