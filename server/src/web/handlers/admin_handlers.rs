// server/src/web/handlers/admin_handlers.rs

use actix_web::http::header::CONTENT_TYPE;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;
use tiffin_core::{Role, RoleSet};

const ADMIN_ONLY: RoleSet = RoleSet::only(Role::Admin);
const DEFAULT_LISTING: i64 = 5;
const MAX_LISTING: i64 = 50;

#[derive(Deserialize, Debug)]
pub struct DashboardQuery {
  pub top: Option<i64>,
  pub recent: Option<i64>,
}

#[instrument(name = "handler::dashboard_stats", skip(app_state, auth), fields(user_id = %auth.id))]
pub async fn dashboard_stats_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
  auth.require(ADMIN_ONLY)?;
  let top = query.top.unwrap_or(DEFAULT_LISTING).clamp(1, MAX_LISTING);
  let recent = query.recent.unwrap_or(DEFAULT_LISTING).clamp(1, MAX_LISTING);
  let stats = app_state.repo.dashboard_stats(top, recent).await?;
  Ok(response::ok(stats))
}

/// Liveness plus a round trip to the store.
#[instrument(name = "handler::health", skip_all)]
pub async fn health_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let backend = app_state.repo.backend_name();
  if let Err(e) = app_state.repo.ping().await {
    warn!(backend, error = %e, "Health check failed.");
    return Err(AppError::ServiceUnavailable(format!("The {} store is not reachable.", backend)));
  }
  Ok(response::ok(json!({ "status": "ok", "backend": backend })))
}

/// Serves an uploaded rider licence to an admin.
#[instrument(name = "handler::upload", skip(app_state, auth), fields(user_id = %auth.id))]
pub async fn upload_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
  auth.require(ADMIN_ONLY)?;
  let key = path.into_inner();
  let bytes = app_state
    .blobs
    .get(&key)
    .await?
    .ok_or_else(|| AppError::NotFound("File not found.".to_string()))?;

  let content_type = match key.rsplit_once('.').map(|(_, ext)| ext) {
    Some("png") => "image/png",
    Some("jpg") => "image/jpeg",
    Some("webp") => "image/webp",
    Some("pdf") => "application/pdf",
    _ => "application/octet-stream",
  };
  Ok(HttpResponse::Ok().insert_header((CONTENT_TYPE, content_type)).body(bytes))
}
