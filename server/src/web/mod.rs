// server/src/web/mod.rs

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use crate::errors::AppError;
use actix_web::web;

pub use routes::configure_app_routes;

/// Malformed bodies, query strings and path segments are reported in the
/// usual error envelope rather than actix's plain-text default.
pub fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(format!("Invalid JSON body: {}", err)).into())
}

pub fn query_config() -> web::QueryConfig {
  web::QueryConfig::default()
    .error_handler(|err, _req| AppError::Validation(format!("Invalid query parameters: {}", err)).into())
}

pub fn path_config() -> web::PathConfig {
  web::PathConfig::default().error_handler(|err, _req| AppError::Validation(format!("Invalid path parameter: {}", err)).into())
}
