// server/src/pipelines/login_pipeline.rs

use crate::errors::{AppError, Result};
use crate::pipelines::contexts::LoginCtxData;
use crate::services::auth_service;
use tiffin_core::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, instrument, warn};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

pub fn register_login_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<LoginCtxData, AppError>::new(
    "login",
    &[
      ("validate_credentials_input", false, None),
      ("fetch_user_by_email", false, None),
      ("verify_password", false, None),
      ("check_account_standing", false, None),
      ("issue_token", false, None),
    ],
  );

  p.on("validate_credentials_input", |ctx: ContextData<LoginCtxData>| async move {
    let mut guard = ctx.write();
    guard.email = guard.email.trim().to_lowercase();
    if guard.email.is_empty() || guard.password.is_empty() {
      return Err(AppError::Validation("Email and password are required.".to_string()));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("fetch_user_by_email", fetch_user_by_email);
  p.on("verify_password", verify_password);

  p.on("check_account_standing", |ctx: ContextData<LoginCtxData>| async move {
    let standing = ctx.with(|data| data.user.as_ref().map(|u| u.standing()));
    let standing = standing.ok_or_else(|| AppError::Internal("login context has no user".to_string()))?;
    if let Err(refusal) = standing.check_login() {
      warn!(role = %standing.role, %refusal, "Sign-in refused after a correct password.");
      return Err(AppError::from(refusal));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("issue_token", issue_token);

  registry.register(p);
  info!("Login pipeline registered.");
}

#[instrument(name = "login::fetch_user_by_email", skip_all)]
async fn fetch_user_by_email(ctx: ContextData<LoginCtxData>) -> Result<PipelineControl> {
  let (email, repo) = {
    let guard = ctx.read();
    (guard.email.clone(), guard.app_state.repo.clone())
  };

  match repo.find_user_by_email(&email).await? {
    Some(user) => {
      ctx.write().user = Some(user);
      Ok(PipelineControl::Continue)
    }
    None => {
      warn!(%email, "Sign-in for an unknown email.");
      Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()))
    }
  }
}

#[instrument(name = "login::verify_password", skip_all)]
async fn verify_password(ctx: ContextData<LoginCtxData>) -> Result<PipelineControl> {
  let (stored_hash, password) = {
    let guard = ctx.read();
    let hash = guard.user.as_ref().map(|u| u.password_hash.clone()).unwrap_or_default();
    (hash, guard.password.clone())
  };

  // Argon2 runs on the blocking pool.
  let matches = tokio::task::spawn_blocking(move || auth_service::verify_password(&stored_hash, &password))
    .await
    .map_err(|e| AppError::Internal(format!("password check task failed: {}", e)))??;

  if matches {
    Ok(PipelineControl::Continue)
  } else {
    warn!("Sign-in with a wrong password.");
    Err(AppError::Unauthorized(BAD_CREDENTIALS.to_string()))
  }
}

#[instrument(name = "login::issue_token", skip_all)]
async fn issue_token(ctx: ContextData<LoginCtxData>) -> Result<PipelineControl> {
  let mut guard = ctx.write();
  let token = match guard.user.as_ref() {
    Some(user) => guard.app_state.tokens.issue(user)?,
    None => return Err(AppError::Internal("login context has no user".to_string())),
  };
  if let Some(user) = guard.user.as_ref() {
    info!(user_id = %user.id, role = %user.role, "User signed in.");
  }
  guard.token = Some(token);
  Ok(PipelineControl::Continue)
}
