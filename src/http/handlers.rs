use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use super::AppState;
use super::types::{ErrorResponse, HealthResponse, RenderBody, RenderResponse, URL_REQUIRED};
use crate::render::{RenderBackend, RenderRequest};

pub async fn health<B: RenderBackend>(State(state): State<AppState<B>>) -> Json<HealthResponse> {
    Json(HealthResponse::from(state.executor.status()))
}

/// `POST /render`
///
/// A body sent without a JSON content type, or an empty one, is read as `{}`,
/// which then fails the URL check like the empty object does.
pub async fn render<B: RenderBackend>(
    State(state): State<AppState<B>>,
    headers: HeaderMap,
    payload: Bytes,
) -> Response {
    let body = match parse_body(&headers, &payload) {
        Ok(body) => body,
        Err(rejection) => {
            debug!("Rejected render body: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::bad_request(rejection.body_text())),
            )
                .into_response();
        }
    };

    let Some(url) = body.url() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(URL_REQUIRED)),
        )
            .into_response();
    };

    let request = RenderRequest::new(url).with_headers(body.headers.clone().unwrap_or_default());
    match state.executor.render(request).await {
        Ok(result) => (StatusCode::OK, Json(RenderResponse::from(result))).into_response(),
        Err(err) => {
            state.executor.stats().record_error();
            error!(url = %err.url, error = ?err, "{}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::from(&err)),
            )
                .into_response()
        }
    }
}

fn parse_body(headers: &HeaderMap, payload: &[u8]) -> Result<RenderBody, JsonRejection> {
    if !has_json_content_type(headers) || payload.iter().all(u8::is_ascii_whitespace) {
        return Ok(RenderBody::default());
    }
    Json::<RenderBody>::from_bytes(payload).map(|Json(body)| body)
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(essence) = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(str::trim)
    else {
        return false;
    };
    essence.eq_ignore_ascii_case("application/json")
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}
