// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tiffin_core::FeeSchedule;

/// Where the repository keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Postgres,
  /// Process-local store, lost on restart. Used by tests and local demos.
  Memory,
}

impl FromStr for StorageBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
      "memory" => Ok(StorageBackend::Memory),
      other => Err(AppError::Config(format!(
        "Invalid STORAGE_BACKEND '{}', expected 'postgres' or 'memory'",
        other
      ))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub storage_backend: StorageBackend,
  pub database_url: Option<String>,
  pub db_max_connections: u32,
  pub db_acquire_timeout: Duration,
  pub run_migrations: bool,

  pub jwt_secret: String,
  pub jwt_ttl_hours: i64,

  pub upload_dir: PathBuf,
  pub request_timeout: Duration,
  pub fees: FeeSchedule,

  // Optional bootstrap admin, created at startup when missing.
  pub admin_email: Option<String>,
  pub admin_password: Option<String>,
}

const MIN_JWT_SECRET_LEN: usize = 16;

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    let config = Self::from_lookup(|key| std::env::var(key).ok())?;
    tracing::info!(
      host = %config.server_host,
      port = config.server_port,
      backend = ?config.storage_backend,
      "Application configuration loaded."
    );
    Ok(config)
  }

  /// Builds the configuration from any key lookup, so it can be exercised
  /// without touching the process environment.
  pub fn from_lookup<F>(lookup: F) -> Result<Self>
  where
    F: Fn(&str) -> Option<String>,
  {
    let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    fn parse<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T>
    where
      T::Err: std::fmt::Display,
    {
      match raw {
        Some(value) => value
          .parse::<T>()
          .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", key, value, e))),
        None => Ok(default),
      }
    }

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse("PORT", get("PORT").or_else(|| get("SERVER_PORT")), 8080u16)?;

    let storage_backend = match get("STORAGE_BACKEND") {
      Some(raw) => raw.parse::<StorageBackend>()?,
      None => StorageBackend::Postgres,
    };
    let database_url = get("DATABASE_URL");
    if storage_backend == StorageBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required with STORAGE_BACKEND=postgres)".to_string(),
      ));
    }

    let jwt_secret = get("JWT_SECRET")
      .ok_or_else(|| AppError::Config("Missing environment variable 'JWT_SECRET'".to_string()))?;
    if jwt_secret.len() < MIN_JWT_SECRET_LEN {
      return Err(AppError::Config(format!(
        "JWT_SECRET must be at least {} characters long",
        MIN_JWT_SECRET_LEN
      )));
    }
    let jwt_ttl_hours = parse("JWT_TTL_HOURS", get("JWT_TTL_HOURS"), 168i64)?;
    if jwt_ttl_hours <= 0 {
      return Err(AppError::Config("JWT_TTL_HOURS must be positive".to_string()));
    }

    let defaults = FeeSchedule::default();
    let fees = FeeSchedule {
      free_delivery_threshold_cents: parse(
        "FREE_DELIVERY_THRESHOLD_CENTS",
        get("FREE_DELIVERY_THRESHOLD_CENTS"),
        defaults.free_delivery_threshold_cents,
      )?,
      delivery_fee_cents: parse("DELIVERY_FEE_CENTS", get("DELIVERY_FEE_CENTS"), defaults.delivery_fee_cents)?,
      service_fee_min_cents: parse(
        "SERVICE_FEE_MIN_CENTS",
        get("SERVICE_FEE_MIN_CENTS"),
        defaults.service_fee_min_cents,
      )?,
      service_fee_percent: parse("SERVICE_FEE_PERCENT", get("SERVICE_FEE_PERCENT"), defaults.service_fee_percent)?,
    };

    let admin_email = get("ADMIN_EMAIL").map(|e| e.to_lowercase());
    let admin_password = get("ADMIN_PASSWORD");
    if admin_email.is_some() != admin_password.is_some() {
      return Err(AppError::Config(
        "ADMIN_EMAIL and ADMIN_PASSWORD must be set together".to_string(),
      ));
    }

    Ok(Self {
      server_host,
      server_port,
      storage_backend,
      database_url,
      db_max_connections: parse("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 10u32)?,
      db_acquire_timeout: Duration::from_secs(parse(
        "DB_ACQUIRE_TIMEOUT_SECS",
        get("DB_ACQUIRE_TIMEOUT_SECS"),
        5u64,
      )?),
      run_migrations: parse("RUN_MIGRATIONS", get("RUN_MIGRATIONS"), true)?,
      jwt_secret,
      jwt_ttl_hours,
      upload_dir: PathBuf::from(get("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
      request_timeout: Duration::from_secs(parse("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), 30u64)?),
      fees,
      admin_email,
      admin_password,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key: &str| map.get(key).cloned()
  }

  #[test]
  fn defaults_apply_with_minimal_env() {
    let config = AppConfig::from_lookup(lookup(&[
      ("DATABASE_URL", "postgres://localhost/tiffin"),
      ("JWT_SECRET", "0123456789abcdef"),
    ]))
    .unwrap();

    assert_eq!(config.server_port, 8080);
    assert_eq!(config.storage_backend, StorageBackend::Postgres);
    assert_eq!(config.jwt_ttl_hours, 168);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.fees, FeeSchedule::default());
    assert!(config.run_migrations);
  }

  #[test]
  fn port_takes_precedence_over_server_port() {
    let config = AppConfig::from_lookup(lookup(&[
      ("STORAGE_BACKEND", "memory"),
      ("JWT_SECRET", "0123456789abcdef"),
      ("PORT", "5000"),
      ("SERVER_PORT", "6000"),
    ]))
    .unwrap();
    assert_eq!(config.server_port, 5000);
    assert_eq!(config.bind_address(), "127.0.0.1:5000");
  }

  #[test]
  fn short_secret_is_rejected() {
    let err = AppConfig::from_lookup(lookup(&[("STORAGE_BACKEND", "memory"), ("JWT_SECRET", "short")])).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
  }

  #[test]
  fn postgres_needs_a_database_url() {
    let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "0123456789abcdef")])).unwrap_err();
    assert!(err.to_string().contains("DATABASE_URL"));
  }

  #[test]
  fn fee_overrides_are_parsed() {
    let config = AppConfig::from_lookup(lookup(&[
      ("STORAGE_BACKEND", "memory"),
      ("JWT_SECRET", "0123456789abcdef"),
      ("DELIVERY_FEE_CENTS", "4000"),
      ("SERVICE_FEE_PERCENT", "3"),
    ]))
    .unwrap();
    assert_eq!(config.fees.delivery_fee_cents, 4000);
    assert_eq!(config.fees.service_fee_percent, 3);
    assert_eq!(config.fees.service_fee_min_cents, 1000);
  }
}
