//! Axum handler for the autofill endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::auth::bearer_token;
use crate::autofill::models::{AutofillRequest, RawAutofillRequest};
use crate::autofill::pipeline::run_autofill;
use crate::errors::AppError;
use crate::state::AppState;

/// ANY /autofill-prep
///
/// `OPTIONS` answers the preflight before anything else. Then, in order: method,
/// identity configuration, bearer token, identity lookup, body, `jobUrl`,
/// generation credential. Nothing touches a third-party page until all pass.
pub async fn handle_autofill(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    if method == Method::OPTIONS {
        return Ok((StatusCode::OK, "ok").into_response());
    }
    if method != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    state.identity.ensure_configured()?;

    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if bearer_token(authorization).is_none() {
        return Err(AppError::Unauthorized);
    }
    let principal = state.identity.verify(authorization).await?;
    debug!(
        "Authenticated principal {} ({})",
        principal.id,
        principal.email.as_deref().unwrap_or("no email")
    );

    let raw: RawAutofillRequest = serde_json::from_slice(&body)
        .map_err(|_| AppError::Validation("Invalid JSON body".to_string()))?;
    let request = AutofillRequest::try_from(raw)?;

    state.llm.ensure_configured()?;

    let result = run_autofill(state.fetcher.as_ref(), &state.llm, &request).await?;
    Ok(Json(result).into_response())
}
