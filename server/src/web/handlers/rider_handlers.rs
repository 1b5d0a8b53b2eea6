// server/src/web/handlers/rider_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::PresenceUpdate;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;
use tiffin_core::domain::rider::can_accept_orders;
use tiffin_core::domain::GeoPoint;
use tiffin_core::{Role, RoleSet, RiderStatus};

const RIDER_ONLY: RoleSet = RoleSet::only(Role::Rider);
const ADMIN_ONLY: RoleSet = RoleSet::only(Role::Admin);

#[derive(Deserialize, Debug)]
pub struct PresencePayload {
  pub status: String,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
}

fn missing_profile() -> AppError {
  AppError::NotFound("Rider profile not found.".to_string())
}

#[instrument(name = "handler::rider_me", skip_all, fields(user_id = %auth.id))]
pub async fn rider_me_handler(app_state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  auth.require(RIDER_ONLY)?;
  let profile = app_state.repo.rider_profile(auth.id).await?.ok_or_else(missing_profile)?;
  Ok(response::ok(profile))
}

#[instrument(name = "handler::rider_presence", skip(app_state, auth), fields(user_id = %auth.id))]
pub async fn update_presence_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  body: web::Json<PresencePayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(RIDER_ONLY)?;
  let status = body.status.parse::<RiderStatus>()?;
  let location = match (body.latitude, body.longitude) {
    (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)?),
    (None, None) => None,
    _ => {
      return Err(AppError::Validation(
        "Latitude and longitude must be given together.".to_string(),
      ))
    }
  };

  let profile = app_state
    .repo
    .update_presence(auth.id, PresenceUpdate { status, location })
    .await?
    .ok_or_else(missing_profile)?;
  info!(%status, "Rider presence updated.");
  Ok(response::ok(profile))
}

#[instrument(name = "handler::available_orders", skip_all, fields(user_id = %auth.id))]
pub async fn available_orders_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth.require(RIDER_ONLY)?;
  let orders = app_state.repo.available_orders().await?;
  Ok(response::ok(orders))
}

#[instrument(name = "handler::accept_order", skip(app_state, auth), fields(user_id = %auth.id))]
pub async fn accept_order_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  auth.require(RIDER_ONLY)?;
  let order_id = path.into_inner();
  let profile = app_state.repo.rider_profile(auth.id).await?.ok_or_else(missing_profile)?;
  if !can_accept_orders(profile.is_approved, profile.status) {
    warn!(is_approved = profile.is_approved, status = %profile.status, "Rider cannot take orders.");
    return Err(AppError::Forbidden(
      "Only approved riders who are online can accept orders.".to_string(),
    ));
  }

  if app_state.repo.find_order(order_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Order with ID {} not found.", order_id)));
  }
  match app_state.repo.assign_rider(order_id, auth.id).await? {
    Some(order) => {
      info!(%order_id, "Order accepted by rider.");
      Ok(response::ok(order))
    }
    None => Err(AppError::Conflict(
      "This order is no longer available for pickup.".to_string(),
    )),
  }
}

#[instrument(name = "handler::list_riders", skip_all, fields(user_id = %auth.id))]
pub async fn list_riders_handler(app_state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  auth.require(ADMIN_ONLY)?;
  let riders = app_state.repo.list_riders().await?;
  Ok(response::ok(riders))
}
