use std::net::TcpListener;
use std::process;

use taskhub::auth::TokenService;
use taskhub::config::Config;
use taskhub::{db, server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().unwrap_or_else(|err| {
        log::error!("{}", err);
        process::exit(1);
    });

    // No request is served before the database answers a ping.
    let database = match db::connect(&config.database).await {
        Ok(database) => database,
        Err(err) => {
            log::error!("{}", err);
            process::exit(1);
        }
    };
    if let Err(err) = db::ensure_indexes(&database).await {
        log::error!("{}", err);
        process::exit(1);
    }
    let client = database.client().clone();

    let listener = TcpListener::bind(config.bind_address())?;
    log::info!("Starting taskhub server at {}", config.server_url());

    let tokens = TokenService::new(&config.jwt_secret, config.jwt_ttl_hours);
    server::run(listener, database, tokens, &config.cors_origin)?.await?;

    log::info!("Server stopped, closing MongoDB client");
    client.shutdown().await;
    Ok(())
}
