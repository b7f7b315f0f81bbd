#![allow(dead_code)]

use std::net::TcpListener;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use mongodb::{Client, Database};
use taskhub::auth::TokenService;
use taskhub::config::DatabaseConfig;

pub const TEST_ORIGIN: &str = "http://localhost:3000";
pub const TEST_SECRET: &str = "integration-test-secret";

/// Builds the full application (CORS, logging, every route) around the given
/// database handle, ready for `actix_web::test` helpers.
macro_rules! init_app {
    ($database:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($database))
                .app_data(actix_web::web::Data::new(common::tokens()))
                .wrap(taskhub::cors::policy(common::TEST_ORIGIN))
                .wrap(actix_web::middleware::Logger::default())
                .configure(taskhub::routes::config),
        )
    };
}

pub fn tokens() -> TokenService {
    TokenService::new(TEST_SECRET, 1)
}

/// A handle to a server that is never there. The driver connects lazily, so
/// building it succeeds; any operation fails after the short selection timeout.
pub async fn unreachable_database() -> Database {
    Client::with_uri_str(
        "mongodb://127.0.0.1:1/?directConnection=true&serverSelectionTimeoutMS=200",
    )
    .await
    .expect("static connection string parses")
    .database("taskhub_test")
}

/// Connects to the MongoDB instance named by `MONGODB_URI`.
pub async fn live_database() -> Database {
    dotenv::dotenv().ok();
    let config = DatabaseConfig {
        uri: std::env::var("MONGODB_URI").expect("MONGODB_URI must be set for tests"),
        database_name: std::env::var("MONGODB_TEST_DATABASE")
            .unwrap_or_else(|_| "taskhub_test".to_string()),
        connect_timeout: Duration::from_secs(10),
        connect_attempts: 1,
        retry_backoff: Duration::from_millis(100),
    };
    let database = taskhub::db::connect(&config)
        .await
        .expect("Failed to connect to test database");
    taskhub::db::ensure_indexes(&database)
        .await
        .expect("Failed to create indexes");
    database
}

pub struct RunningServer {
    pub base_url: String,
    handle: ServerHandle,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

/// Starts the real server on a random local port.
pub fn spawn_server(database: Database) -> RunningServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let server = taskhub::server::run(listener, database, tokens(), TEST_ORIGIN)
        .expect("Failed to build server");
    let handle = server.handle();
    actix_rt::spawn(server);

    RunningServer {
        base_url: format!("http://127.0.0.1:{}", port),
        handle,
    }
}
