//! Cross-origin policy.
//!
//! A single allowed origin, a fixed method list and a fixed request header
//! list. Requests from any other origin do not get a matching
//! `Access-Control-Allow-Origin` header; actix-cors rejects them.

use actix_cors::Cors;
use actix_web::http::{header, Method};

/// Preflight responses may be cached for 12 hours.
const PREFLIGHT_MAX_AGE_SECS: usize = 12 * 60 * 60;

pub fn allowed_methods() -> [Method; 6] {
    [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ]
}

pub fn allowed_headers() -> [header::HeaderName; 4] {
    [
        header::ORIGIN,
        header::CONTENT_TYPE,
        header::ACCEPT,
        header::AUTHORIZATION,
    ]
}

/// Builds the policy for `origin`, e.g. `http://localhost:3000`.
pub fn policy(origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(origin)
        .allowed_methods(allowed_methods())
        .allowed_headers(allowed_headers())
        .max_age(PREFLIGHT_MAX_AGE_SECS)
}
