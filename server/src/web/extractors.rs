// server/src/web/extractors.rs

use crate::errors::AppError;
use crate::models::User;
use crate::pipelines::contexts::Actor;
use crate::state::AppState;
use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tiffin_core::{Role, RoleSet};
use tracing::{debug, warn};
use uuid::Uuid;

/// The caller, resolved from `Authorization: Bearer <token>` and reloaded
/// from the store on every request, so role and approval are always current.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub id: Uuid,
  pub role: Role,
  pub is_approved: bool,
  pub user: User,
}

impl AuthenticatedUser {
  pub fn actor(&self) -> Actor {
    Actor {
      id: self.id,
      role: self.role,
    }
  }

  /// Role guard. Callers outside `allowed` get `Forbidden`.
  pub fn require(&self, allowed: RoleSet) -> Result<(), AppError> {
    if allowed.contains(self.role) {
      Ok(())
    } else {
      warn!(user_id = %self.id, role = %self.role, %allowed, "Role not allowed for this route.");
      Err(AppError::Forbidden(format!(
        "This action requires one of the roles: {}.",
        allowed
      )))
    }
  }
}

fn bearer_token(req: &HttpRequest) -> Result<String, AppError> {
  let header = req
    .headers()
    .get(AUTHORIZATION)
    .ok_or_else(|| AppError::Unauthorized("Missing authorization token.".to_string()))?;
  let value = header
    .to_str()
    .map_err(|_| AppError::Unauthorized("Malformed authorization header.".to_string()))?;
  let (scheme, token) = value
    .trim()
    .split_once(' ')
    .ok_or_else(|| AppError::Unauthorized("Malformed authorization header.".to_string()))?;
  let token = token.trim();
  if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
    return Err(AppError::Unauthorized("Authorization must use the Bearer scheme.".to_string()));
  }
  Ok(token.to_string())
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let state = req.app_data::<web::Data<AppState>>().cloned();
    let token = bearer_token(req);

    Box::pin(async move {
      let state = state.ok_or_else(|| AppError::Internal("application state is not configured".to_string()))?;
      let user_id = state.tokens.verify(&token?)?;

      let user = state
        .repo
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("The account for this token no longer exists.".to_string()))?;
      if !user.is_active {
        return Err(AppError::Forbidden("This account has been deactivated.".to_string()));
      }

      debug!(user_id = %user.id, role = %user.role, "Request authenticated.");
      Ok(AuthenticatedUser {
        id: user.id,
        role: user.role,
        is_approved: user.is_approved,
        user,
      })
    })
  }
}
