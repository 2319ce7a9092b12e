//! Trusted identity header.
//!
//! Authentication happens upstream; the gateway forwards the resolved user
//! ID in a configurable header. This middleware moves it into request
//! extensions as [`Identity`] and answers 401 when it is missing or blank.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use nakuma_core::UserId;
use tracing::debug;

/// Authenticated user of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity(pub UserId);

/// Name of the header carrying the user ID, lowercased.
#[derive(Clone, Debug)]
pub struct IdentityHeader(pub Arc<str>);

impl IdentityHeader {
    /// Header name from configuration.
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name.to_ascii_lowercase()))
    }
}

/// Reject requests without an identity; attach [`Identity`] otherwise.
pub async fn require_identity(
    State(header): State<IdentityHeader>,
    mut req: Request,
    next: Next,
) -> Response {
    let user = req
        .headers()
        .get(header.0.as_ref())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(UserId::from);

    let Some(user) = user else {
        debug!(header = %header.0, "request without identity");
        return (StatusCode::UNAUTHORIZED, "missing identity").into_response();
    };
    let _ = req.extensions_mut().insert(Identity(user));
    next.run(req).await
}
