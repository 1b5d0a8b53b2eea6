// server/tests/config_env_tests.rs

use serial_test::serial;
use tiffin_server::config::{AppConfig, StorageBackend};

const KEYS: [&str; 5] = ["STORAGE_BACKEND", "JWT_SECRET", "DATABASE_URL", "PORT", "SERVER_PORT"];

fn clear() {
  for key in KEYS {
    std::env::remove_var(key);
  }
}

#[test]
#[serial]
fn reads_the_process_environment() {
  clear();
  std::env::set_var("STORAGE_BACKEND", "memory");
  std::env::set_var("JWT_SECRET", "env-test-secret-value");
  std::env::set_var("PORT", "5055");

  let config = AppConfig::from_env().unwrap();
  assert_eq!(config.storage_backend, StorageBackend::Memory);
  assert_eq!(config.server_port, 5055);
  clear();
}

#[test]
#[serial]
fn missing_secret_fails_startup() {
  clear();
  std::env::set_var("STORAGE_BACKEND", "memory");
  assert!(AppConfig::from_env().is_err());
  clear();
}
