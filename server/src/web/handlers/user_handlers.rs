// server/src/web/handlers/user_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::ProfileUpdate;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;

#[instrument(name = "handler::get_profile", skip_all, fields(user_id = %auth.id))]
pub async fn get_profile_handler(auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  Ok(response::ok(auth.user))
}

#[instrument(name = "handler::update_profile", skip_all, fields(user_id = %auth.id))]
pub async fn update_profile_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  body: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
  let mut update = body.into_inner();
  if let Some(name) = update.name.as_mut() {
    *name = name.trim().to_string();
    if name.is_empty() {
      return Err(AppError::Validation("Name cannot be empty.".to_string()));
    }
  }

  let user = app_state
    .repo
    .update_profile(auth.id, update)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;
  info!("Profile updated.");
  Ok(response::ok(user))
}
