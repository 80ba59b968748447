//! Bearer-token authentication.
//!
//! The accepted tokens are fixed at startup. Handlers opt in by taking an
//! [`Authenticated`] argument ahead of any query, path or body extractor,
//! so credentials are checked before request parameters are parsed.

use std::collections::HashSet;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use validation_core::emit_auth_rejected;

use crate::error::ApiError;

/// Process-wide set of accepted bearer tokens.
#[derive(Debug, Clone, Default)]
pub struct AuthTokens(Arc<HashSet<String>>);

impl AuthTokens {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuthTokens(Arc::new(
            tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        ))
    }

    pub fn accepts(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Token from an `Authorization: Bearer <token>` header, if well formed.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Proof that the request carried an accepted token.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated;

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    AuthTokens: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = AuthTokens::from_ref(state);
        match bearer_token(&parts.headers) {
            Some(token) if tokens.accepts(token) => Ok(Authenticated),
            Some(_) => {
                emit_auth_rejected(parts.uri.path(), "unknown token");
                Err(ApiError::NotAuthenticated)
            }
            None => {
                emit_auth_rejected(parts.uri.path(), "missing or malformed credentials");
                Err(ApiError::NotAuthenticated)
            }
        }
    }
}
