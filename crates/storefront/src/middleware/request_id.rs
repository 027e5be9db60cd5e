//! Request ID middleware.
//!
//! Every response carries an `x-request-id`. An id supplied by an upstream
//! proxy is kept when it looks sane; otherwise a UUID v4 is generated. The id
//! is recorded on the `http_request` span and tagged on the Sentry scope, so
//! an error page reported by a user can be matched to its log lines.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream id accepted before a fresh one is generated.
const MAX_REQUEST_ID_LEN: usize = 128;

/// The upstream id, if it is printable and not absurdly long.
fn incoming_id(headers: &HeaderMap) -> Option<&str> {
    let id = headers.get(REQUEST_ID_HEADER)?.to_str().ok()?;
    (!id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN).then_some(id)
}

pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id =
        incoming_id(request.headers()).map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);

    tracing::Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| scope.set_tag("request_id", &request_id));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_id_filter() {
        let mut headers = HeaderMap::new();
        assert_eq!(incoming_id(&headers), None);

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("abc-123"));
        assert_eq!(incoming_id(&headers), Some("abc-123"));

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(""));
        assert_eq!(incoming_id(&headers), None);

        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&long).unwrap());
        assert_eq!(incoming_id(&headers), None);
    }
}
