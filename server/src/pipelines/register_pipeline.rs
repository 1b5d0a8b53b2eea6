// server/src/pipelines/register_pipeline.rs

use crate::errors::{AppError, Result};
use crate::models::{NewAccount, NewUser};
use crate::pipelines::contexts::RegisterCtxData;
use crate::services::auth_service::{self, MIN_PASSWORD_LEN};
use crate::services::blob_store::decode_upload;
use std::sync::Arc;
use tiffin_core::{ContextData, Pipeline, PipelineControl, Registry, Role};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub fn register_registration_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<RegisterCtxData, AppError>::new(
    "register",
    &[
      ("validate_registration_input", false, None),
      ("check_existing_email", false, None),
      (
        "store_license",
        true,
        Some(Arc::new(|data: &RegisterCtxData| data.role != Role::Rider)),
      ),
      ("create_account", false, None),
    ],
  );

  p.on("validate_registration_input", validate_registration_input);
  p.on("check_existing_email", check_existing_email);
  p.on("store_license", store_license);
  p.on("create_account", create_account);

  registry.register(p);
  info!("Registration pipeline registered.");
}

#[instrument(name = "register::validate_input", skip_all)]
async fn validate_registration_input(ctx: ContextData<RegisterCtxData>) -> Result<PipelineControl> {
  let mut guard = ctx.write();
  guard.email = guard.email.trim().to_lowercase();
  guard.name = guard.name.trim().to_string();

  if guard.name.is_empty() {
    return Err(AppError::Validation("Name is required.".to_string()));
  }
  let email = &guard.email;
  let well_formed = email
    .split_once('@')
    .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !email.contains(char::is_whitespace));
  if !well_formed {
    return Err(AppError::Validation("A valid email address is required.".to_string()));
  }
  if guard.password.chars().count() < MIN_PASSWORD_LEN {
    return Err(AppError::Validation(format!(
      "Password must be at least {} characters long.",
      MIN_PASSWORD_LEN
    )));
  }

  match guard.role {
    Role::Admin => {
      warn!(email = %guard.email, "Refused public registration of an admin account.");
      Err(AppError::Validation("Admin accounts cannot be self-registered.".to_string()))
    }
    Role::Restaurant => {
      let details_ok = guard
        .restaurant
        .as_ref()
        .is_some_and(|r| !r.name.trim().is_empty() && !r.address.trim().is_empty());
      if details_ok {
        Ok(PipelineControl::Continue)
      } else {
        Err(AppError::Validation(
          "Restaurant accounts need a restaurant name and address.".to_string(),
        ))
      }
    }
    Role::Rider => {
      if guard.license_image.as_deref().is_some_and(|l| !l.trim().is_empty()) {
        Ok(PipelineControl::Continue)
      } else {
        Err(AppError::Validation("Riders must upload a driving licence.".to_string()))
      }
    }
    Role::Customer => {
      guard.restaurant = None;
      Ok(PipelineControl::Continue)
    }
  }
}

#[instrument(name = "register::check_existing_email", skip_all)]
async fn check_existing_email(ctx: ContextData<RegisterCtxData>) -> Result<PipelineControl> {
  let (email, repo) = {
    let guard = ctx.read();
    (guard.email.clone(), guard.app_state.repo.clone())
  };

  if repo.email_exists(&email).await? {
    warn!(%email, "Registration attempted with an existing email.");
    return Err(AppError::Conflict("An account with this email already exists.".to_string()));
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "register::store_license", skip_all)]
async fn store_license(ctx: ContextData<RegisterCtxData>) -> Result<PipelineControl> {
  let (raw, blobs) = {
    let guard = ctx.read();
    (guard.license_image.clone().unwrap_or_default(), guard.app_state.blobs.clone())
  };

  let upload = decode_upload(&raw)?;
  let key = format!("licenses/{}.{}", Uuid::new_v4(), upload.extension);
  let url = blobs.put(&key, upload.bytes).await?;
  debug!(%url, "Rider licence stored.");

  ctx.write().license_url = Some(url);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "register::create_account", skip_all)]
async fn create_account(ctx: ContextData<RegisterCtxData>) -> Result<PipelineControl> {
  let (mut account, password, repo) = {
    let guard = ctx.read();
    let account = NewAccount {
      user: NewUser {
        name: guard.name.clone(),
        email: guard.email.clone(),
        password_hash: String::new(),
        phone: guard.phone.clone(),
        address: guard.address.clone(),
        role: guard.role,
        license_url: guard.license_url.clone(),
      },
      restaurant: guard.restaurant.clone(),
    };
    (account, guard.password.clone(), guard.app_state.repo.clone())
  };

  account.user.password_hash = tokio::task::spawn_blocking(move || auth_service::hash_password(&password))
    .await
    .map_err(|e| AppError::Internal(format!("password hashing task failed: {}", e)))??;
  let user = repo.create_account(account).await?;
  info!(user_id = %user.id, role = %user.role, approved = user.is_approved, "Account registered.");

  ctx.write().created_user = Some(user);
  Ok(PipelineControl::Continue)
}
