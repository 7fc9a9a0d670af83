pub mod health;

use axum::{
    http::{header, HeaderValue},
    middleware,
    response::Response,
    routing::{any, get},
    Router,
};

use crate::autofill::handlers::handle_autofill;
use crate::state::AppState;

const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Stamps the cross-origin headers onto every response, errors included.
async fn with_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/autofill-prep", any(handle_autofill))
        .layer(middleware::map_response(with_cors_headers))
        .with_state(state)
}
