// server/src/web/handlers/restaurant_handlers.rs

use actix_web::{web, HttpResponse};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Restaurant, RestaurantUpdate};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;
use tiffin_core::{Role, RoleSet};

pub(crate) const OWNER_ONLY: RoleSet = RoleSet::only(Role::Restaurant);

/// The restaurant owned by the caller.
pub(crate) async fn owned_restaurant(app_state: &AppState, owner_id: Uuid) -> Result<Restaurant, AppError> {
  app_state
    .repo
    .find_restaurant_by_owner(owner_id)
    .await?
    .ok_or_else(|| AppError::NotFound("You do not have a restaurant yet.".to_string()))
}

#[instrument(name = "handler::list_restaurants", skip_all)]
pub async fn list_restaurants_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let restaurants = app_state.repo.list_restaurants(true).await?;
  Ok(response::ok(restaurants))
}

/// Public detail; restaurants that are inactive or not yet approved are
/// reported as missing.
#[instrument(name = "handler::get_restaurant", skip(app_state))]
pub async fn get_restaurant_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let restaurant_id = path.into_inner();
  let restaurant = app_state
    .repo
    .find_restaurant(restaurant_id)
    .await?
    .filter(Restaurant::is_open_for_orders)
    .ok_or_else(|| AppError::NotFound(format!("Restaurant with ID {} not found.", restaurant_id)))?;
  Ok(response::ok(restaurant))
}

#[instrument(name = "handler::get_my_restaurant", skip_all, fields(user_id = %auth.id))]
pub async fn get_my_restaurant_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth.require(OWNER_ONLY)?;
  Ok(response::ok(owned_restaurant(&app_state, auth.id).await?))
}

#[instrument(name = "handler::update_my_restaurant", skip_all, fields(user_id = %auth.id))]
pub async fn update_my_restaurant_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  body: web::Json<RestaurantUpdate>,
) -> Result<HttpResponse, AppError> {
  auth.require(OWNER_ONLY)?;
  let update = body.into_inner();
  if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(AppError::Validation("Restaurant name cannot be empty.".to_string()));
  }
  if update.address.as_deref().is_some_and(|a| a.trim().is_empty()) {
    return Err(AppError::Validation("Restaurant address cannot be empty.".to_string()));
  }
  if update.delivery_time_minutes.is_some_and(|m| m <= 0) {
    return Err(AppError::Validation("Delivery time must be positive.".to_string()));
  }
  if update.minimum_order_cents.is_some_and(|m| m < 0) {
    return Err(AppError::Validation("Minimum order cannot be negative.".to_string()));
  }

  let restaurant = owned_restaurant(&app_state, auth.id).await?;
  let updated = app_state
    .repo
    .update_restaurant(restaurant.id, update)
    .await?
    .ok_or_else(|| AppError::NotFound("Restaurant not found.".to_string()))?;
  info!(restaurant_id = %updated.id, "Restaurant updated.");
  Ok(response::ok(updated))
}
