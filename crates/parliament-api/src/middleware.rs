//! Admin API authentication (spec §6): a single shared secret compared
//! byte-for-byte against the `X-Api-Key` header. Missing or mismatched
//! ⇒ 401, with no distinction in the response between the two so the
//! header's presence can't be probed.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn require_api_key(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Result<Response, ApiError> {
    let provided = request.headers().get("X-Api-Key").and_then(|v| v.to_str().ok()).unwrap_or("");

    let expected = state.config.pipeline_api_key.as_bytes();
    let matches = !expected.is_empty() && provided.as_bytes().ct_eq(expected).into();

    if matches {
        Ok(next.run(request).await)
    } else {
        Err(ApiError::Unauthorized)
    }
}
