#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "Bootstrap for an authentication and task-management HTTP backend on MongoDB:"]
#![doc = "configuration, the database connection initializer, CORS policy, route"]
#![doc = "registration and the request handlers behind it. The binary (`main.rs`)"]
#![doc = "wires these together and owns process exit on startup failure."]

pub mod auth;
pub mod config;
pub mod cors;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod server;

pub use crate::error::{AppError, StartupError};
