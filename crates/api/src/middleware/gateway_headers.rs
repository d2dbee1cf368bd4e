use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_MAX_AGE, SERVER,
};
use axum::http::{HeaderName, HeaderValue};
use axum::response::Response;

pub const SERVER_NAME: &str = concat!("ferrous-doh/", env!("CARGO_PKG_VERSION"));

const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");

/// Stamps identification and CORS headers on every response, errors included.
pub async fn gateway_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(SERVER, HeaderValue::from_static(SERVER_NAME));
    headers.insert(X_POWERED_BY, HeaderValue::from_static(SERVER_NAME));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, HEAD, OPTIONS, POST"),
    );
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("3600"));
    response
}
