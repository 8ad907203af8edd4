/// Posts Service Library
///
/// Serves the posts resource of the social API: posts with nested likes,
/// comments and video entries.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route registration
/// - `models`: Post documents and request bodies
/// - `services`: Business logic layer
/// - `db`: Post store trait with PostgreSQL and in-memory implementations
/// - `middleware`: Bearer-token authentication and request timing
/// - `error`: Error types and their HTTP rendering
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
