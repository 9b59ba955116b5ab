use axum::response::{IntoResponse, Response};
use http::{header, StatusCode};
use serde::Serialize;

/// JSON body rendered with indentation, for humans poking at the endpoint
/// with curl while watching an autoscaler.
pub(crate) struct PrettyJson<T>(pub(crate) T);

impl<T> IntoResponse for PrettyJson<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        match serde_json::to_string_pretty(&self.0) {
            Ok(body) => (
                [(header::CONTENT_TYPE, mime::APPLICATION_JSON.to_string())],
                body,
            )
                .into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Unable to serialize response: {}", err),
            )
                .into_response(),
        }
    }
}
