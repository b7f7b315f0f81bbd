//! Connection Initializer.
//!
//! Opens a MongoDB client, verifies the cluster answers a `ping`, and hands back
//! the named `Database`. Every network step runs inside a time budget. The
//! returned handle is meant to be injected into handlers with `web::Data`;
//! nothing here stores it globally, so calling `connect` twice yields two
//! independent clients.

use std::future::IntoFuture;
use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use tokio::time::timeout;

use crate::config::DatabaseConfig;
use crate::error::StartupError;
use crate::models::{TaskDocument, UserDocument};

pub const USERS_COLLECTION: &str = "users";
pub const TASKS_COLLECTION: &str = "tasks";

/// Connects to the configured database, retrying with exponential backoff
/// until `connect_attempts` is exhausted.
pub async fn connect(config: &DatabaseConfig) -> Result<Database, StartupError> {
    let mut attempt = 1;
    let mut delay = config.retry_backoff;

    loop {
        match try_connect(config).await {
            Ok(database) => {
                log::info!(
                    "Connected to MongoDB database '{}' (attempt {}/{})",
                    config.database_name,
                    attempt,
                    config.connect_attempts
                );
                return Ok(database);
            }
            Err(err) if attempt < config.connect_attempts => {
                log::warn!(
                    "MongoDB connection attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    config.connect_attempts,
                    err,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

async fn try_connect(config: &DatabaseConfig) -> Result<Database, StartupError> {
    let budget = config.connect_timeout;

    // SRV connection strings resolve DNS while parsing.
    let mut options = timeout(budget, ClientOptions::parse(&config.uri).into_future())
        .await
        .map_err(|_| StartupError::Timeout {
            stage: "connect",
            after: budget,
        })?
        .map_err(|e| StartupError::Connect(e.to_string()))?;

    options.connect_timeout = Some(budget);
    options.server_selection_timeout = Some(budget);
    if options.app_name.is_none() {
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    }

    let client = Client::with_options(options).map_err(|e| StartupError::Connect(e.to_string()))?;
    let database = client.database(&config.database_name);
    ping(&database, budget).await?;

    Ok(database)
}

/// Liveness check: a `{ping: 1}` round trip bounded by `budget`.
pub async fn ping(database: &Database, budget: Duration) -> Result<(), StartupError> {
    timeout(budget, database.run_command(doc! { "ping": 1 }).into_future())
        .await
        .map_err(|_| StartupError::Timeout {
            stage: "ping",
            after: budget,
        })?
        .map_err(|e| StartupError::Ping(e.to_string()))?;
    Ok(())
}

/// Creates the indexes the route collaborators rely on.
///
/// `createIndexes` is a no-op for indexes that already exist with the same spec.
pub async fn ensure_indexes(database: &Database) -> Result<(), StartupError> {
    let email_index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
                .build(),
        )
        .build();
    users(database)
        .create_index(email_index)
        .await
        .map_err(|e| StartupError::Index(e.to_string()))?;

    let owner_index = IndexModel::builder()
        .keys(doc! { "user_id": 1, "created_at": -1 })
        .options(IndexOptions::builder().name("owner_created".to_string()).build())
        .build();
    tasks(database)
        .create_index(owner_index)
        .await
        .map_err(|e| StartupError::Index(e.to_string()))?;

    log::debug!("MongoDB indexes are in place");
    Ok(())
}

pub fn users(database: &Database) -> Collection<UserDocument> {
    database.collection(USERS_COLLECTION)
}

pub fn tasks(database: &Database) -> Collection<TaskDocument> {
    database.collection(TASKS_COLLECTION)
}
