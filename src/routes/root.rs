use actix_web::{get, http::header::ContentType, HttpResponse, Responder};

/// Smoke-test endpoint. Never touches the database.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("Hello World")
}
