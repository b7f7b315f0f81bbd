use std::time::Duration;

use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use mongodb::Database;
use serde_json::json;

use crate::db;

const READY_PING_TIMEOUT: Duration = Duration::from_secs(2);

/// Liveness check
///
/// Returns the current status of the API and timestamp. Does not touch the database.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "timestamp": Utc::now()
    }))
}

/// Readiness check
///
/// Pings the database; 503 when it does not answer within two seconds.
#[get("/ready")]
pub async fn ready(database: web::Data<Database>) -> impl Responder {
    match db::ping(&database, READY_PING_TIMEOUT).await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ready",
            "timestamp": Utc::now()
        })),
        Err(err) => {
            log::warn!("Readiness check failed: {}", err);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "unavailable",
                "timestamp": Utc::now()
            }))
        }
    }
}
