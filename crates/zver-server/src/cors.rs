//! Permissive CORS: every response advertises `*`, and `OPTIONS` is
//! answered per the preflight contract.

use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

pub const ALLOWED_METHODS: &str = "GET, HEAD, POST, OPTIONS";

/// Middleware attaching the CORS headers every response carries,
/// including 404s and 405s.
pub async fn cors_layer(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    response
}

/// `OPTIONS` handler. A request carrying the three preflight headers
/// gets the full CORS reply with a day of caching; anything else gets a
/// plain `Allow` listing.
pub async fn preflight(headers: HeaderMap) -> Response {
    let is_preflight = headers.contains_key(header::ORIGIN)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD)
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_HEADERS);

    if is_preflight {
        (
            StatusCode::OK,
            [
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
                (header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS),
                (header::ACCESS_CONTROL_ALLOW_HEADERS, "*"),
                (header::ACCESS_CONTROL_MAX_AGE, "86400"),
            ],
        )
            .into_response()
    } else {
        (StatusCode::OK, [(header::ALLOW, ALLOWED_METHODS)]).into_response()
    }
}
