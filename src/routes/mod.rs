pub mod auth;
pub mod health;
pub mod root;
pub mod tasks;

use actix_web::web;

use crate::error::AppError;

/// Registers every endpoint: the root and health checks, then the
/// authentication and task collaborators under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(root::index)
        .service(health::health)
        .service(health::ready)
        .service(
            web::scope("/api")
                .configure(auth::routes)
                .configure(tasks::routes),
        );
}

/// Renders JSON extraction failures (malformed body, missing fields) as
/// `400 Bad Request` with the usual `{"error": ...}` body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}

/// Same treatment for query strings that do not deserialize, such as an
/// unknown `status` filter.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into())
}
