//! Caller identity taken from request headers.

use axum::http::HeaderMap;

pub const UNKNOWN_ORIGIN: &str = "unknown";

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// First `x-forwarded-for` hop, else `x-real-ip`, else `"unknown"`.
pub fn client_origin(headers: &HeaderMap) -> String {
    header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header(headers, "x-real-ip"))
        .unwrap_or(UNKNOWN_ORIGIN)
        .to_string()
}

/// Optional submitter identity from `x-user-email`.
pub fn submitter(headers: &HeaderMap) -> Option<String> {
    header(headers, "x-user-email").map(str::to_string)
}
