// server/src/bootstrap.rs

use crate::errors::{AppError, Result};
use crate::models::{NewAccount, NewUser};
use crate::services::auth_service;
use crate::state::AppState;
use tiffin_core::Role;
use tracing::{info, instrument};

/// Creates the admin named by `ADMIN_EMAIL`/`ADMIN_PASSWORD` unless an
/// account with that email already exists. Returns whether one was created.
#[instrument(name = "bootstrap::ensure_admin", skip_all)]
pub async fn ensure_admin(app_state: &AppState) -> Result<bool> {
  let (Some(email), Some(password)) = (
    app_state.config.admin_email.clone(),
    app_state.config.admin_password.clone(),
  ) else {
    return Ok(false);
  };

  if app_state.repo.email_exists(&email).await? {
    info!(%email, "Bootstrap admin already present.");
    return Ok(false);
  }

  let password_hash = tokio::task::spawn_blocking(move || auth_service::hash_password(&password))
    .await
    .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))??;

  let admin = app_state
    .repo
    .create_account(NewAccount {
      user: NewUser {
        name: "Administrator".to_string(),
        email,
        password_hash,
        phone: None,
        address: None,
        role: Role::Admin,
        license_url: None,
      },
      restaurant: None,
    })
    .await?;
  info!(admin_id = %admin.id, email = %admin.email, "Bootstrap admin created.");
  Ok(true)
}
