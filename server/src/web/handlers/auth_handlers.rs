// server/src/web/handlers/auth_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::NewRestaurant;
use crate::pipelines::contexts::{LoginCtxData, RegisterCtxData};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;
use tiffin_core::{ContextData, PipelineResult, Role, RoleSet};

const ADMIN_ONLY: RoleSet = RoleSet::only(Role::Admin);

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestPayload {
  pub name: String,
  pub email: String,
  pub password: String,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub role: Option<String>,
  /// Restaurant owners only.
  pub restaurant: Option<NewRestaurant>,
  /// Riders only: base64 or data URL.
  pub license_image: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct UserListQuery {
  pub role: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusPayload {
  pub is_active: bool,
}

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let role = match payload.role.as_deref() {
    Some(raw) => raw.parse::<Role>()?,
    None => Role::Customer,
  };

  let ctx = ContextData::new(RegisterCtxData {
    app_state: app_state.get_ref().clone(),
    name: payload.name,
    email: payload.email,
    password: payload.password,
    phone: payload.phone,
    address: payload.address,
    role,
    restaurant: payload.restaurant,
    license_image: payload.license_image,
    license_url: None,
    created_user: None,
  });

  match app_state.flows.run(ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      let user = ctx.write().created_user.take().ok_or_else(|| {
        warn!("Registration pipeline completed without a user.");
        AppError::Internal("Registration completed without creating a user.".to_string())
      })?;
      let message = if user.standing().needs_approval() {
        "Registration successful. Your account is pending admin approval."
      } else {
        "Registration successful."
      };
      Ok(response::created(json!({ "user": user, "message": message })))
    }
    Ok(PipelineResult::Stopped) => Err(AppError::Internal(
      "Registration was halted by an internal step.".to_string(),
    )),
    Err(app_err) => Err(app_err),
  }
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(LoginCtxData {
    app_state: app_state.get_ref().clone(),
    email: payload.email,
    password: payload.password,
    user: None,
    token: None,
  });

  match app_state.flows.run(ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      let mut guard = ctx.write();
      let (token, user) = guard
        .token
        .take()
        .zip(guard.user.take())
        .ok_or_else(|| AppError::Internal("Login completed without a session token.".to_string()))?;
      Ok(response::ok(json!({ "token": token, "user": user })))
    }
    Ok(PipelineResult::Stopped) => Err(AppError::Unauthorized(
      "Authentication process was unexpectedly halted.".to_string(),
    )),
    Err(app_err) => Err(app_err),
  }
}

#[instrument(name = "handler::me", skip_all, fields(user_id = %auth.id))]
pub async fn me_handler(auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(response::ok(auth.user))
}

#[instrument(name = "handler::list_users", skip(app_state, auth))]
pub async fn list_users_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  query: web::Query<UserListQuery>,
) -> Result<HttpResponse, AppError> {
  auth.require(ADMIN_ONLY)?;
  let role = match query.role.as_deref().filter(|r| !r.is_empty()) {
    Some(raw) => Some(raw.parse::<Role>()?),
    None => None,
  };
  let users = app_state.repo.list_users(role).await?;
  Ok(response::ok(users))
}

#[instrument(name = "handler::approve_user", skip(app_state, auth))]
pub async fn approve_user_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  auth.require(ADMIN_ONLY)?;
  let user_id = path.into_inner();
  let user = app_state
    .repo
    .find_user(user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found.", user_id)))?;

  if !user.standing().needs_approval() {
    return Ok(response::ok(json!({ "user": user, "message": "User is already approved." })));
  }

  let approved = app_state
    .repo
    .approve_user(user_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found.", user_id)))?;
  info!(%user_id, role = %approved.role, approved_by = %auth.id, "User approved.");
  Ok(response::ok(json!({ "user": approved, "message": "User approved successfully." })))
}

#[instrument(name = "handler::set_user_status", skip(app_state, auth, body))]
pub async fn set_user_status_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<UserStatusPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(ADMIN_ONLY)?;
  let user_id = path.into_inner();
  if user_id == auth.id {
    return Err(AppError::Validation("You cannot change the status of your own account.".to_string()));
  }
  let user = app_state
    .repo
    .set_user_active(user_id, body.is_active)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("User with ID {} not found.", user_id)))?;
  info!(%user_id, is_active = user.is_active, "User status changed.");
  Ok(response::ok(user))
}

#[instrument(name = "handler::delete_user", skip(app_state, auth))]
pub async fn delete_user_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  auth.require(ADMIN_ONLY)?;
  let user_id = path.into_inner();
  if user_id == auth.id {
    return Err(AppError::Validation("You cannot delete your own account.".to_string()));
  }
  if !app_state.repo.delete_user(user_id).await? {
    return Err(AppError::NotFound(format!("User with ID {} not found.", user_id)));
  }
  info!(%user_id, deleted_by = %auth.id, "User deleted.");
  Ok(response::ok(json!({ "message": "User deleted successfully." })))
}
