//! HTTP server assembly.

use std::net::TcpListener;

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};
use mongodb::Database;

use crate::auth::TokenService;
use crate::{cors, routes};

/// Builds the server on an already bound listener.
///
/// The returned `Server` must be awaited (or spawned) to start serving. The
/// database handle and token service are shared by every worker.
pub fn run(
    listener: TcpListener,
    database: Database,
    tokens: TokenService,
    cors_origin: &str,
) -> std::io::Result<Server> {
    let database = web::Data::new(database);
    let tokens = web::Data::new(tokens);
    let cors_origin = cors_origin.to_string();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(database.clone())
            .app_data(tokens.clone())
            .wrap(cors::policy(&cors_origin))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
