// server/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tiffin_core::domain::pricing::MAX_PRICE_CENTS;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::restaurant_handlers::{owned_restaurant, OWNER_ONLY};
use crate::web::response;

const DEFAULT_PREPARATION_MINUTES: i32 = 15;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub is_available: Option<bool>,
  pub is_vegetarian: Option<bool>,
  pub preparation_time_minutes: Option<i32>,
}

fn check_price(price_cents: i64) -> Result<(), AppError> {
  if price_cents <= 0 {
    return Err(AppError::Validation("Price must be greater than zero.".to_string()));
  }
  if price_cents > MAX_PRICE_CENTS {
    return Err(AppError::Validation(format!(
      "Price may not exceed {} cents.",
      MAX_PRICE_CENTS
    )));
  }
  Ok(())
}

fn check_preparation_time(minutes: i32) -> Result<(), AppError> {
  if minutes > 0 {
    Ok(())
  } else {
    Err(AppError::Validation("Preparation time must be positive.".to_string()))
  }
}

/// Loads the product and checks it belongs to the caller's restaurant.
async fn owned_product(app_state: &AppState, auth: &AuthenticatedUser, product_id: Uuid) -> Result<Product, AppError> {
  let product = app_state
    .repo
    .find_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
  let restaurant = owned_restaurant(app_state, auth.id).await?;
  if product.restaurant_id != restaurant.id {
    warn!(%product_id, user_id = %auth.id, "Product belongs to another restaurant.");
    return Err(AppError::Forbidden("You can only manage your own products.".to_string()));
  }
  Ok(product)
}

#[instrument(name = "handler::create_product", skip_all, fields(user_id = %auth.id))]
pub async fn create_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  body: web::Json<CreateProductPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(OWNER_ONLY)?;
  let payload = body.into_inner();
  let name = payload.name.trim().to_string();
  if name.is_empty() {
    return Err(AppError::Validation("Product name is required.".to_string()));
  }
  check_price(payload.price_cents)?;
  let preparation_time_minutes = payload.preparation_time_minutes.unwrap_or(DEFAULT_PREPARATION_MINUTES);
  check_preparation_time(preparation_time_minutes)?;

  let restaurant = owned_restaurant(&app_state, auth.id).await?;
  let product = app_state
    .repo
    .create_product(NewProduct {
      restaurant_id: restaurant.id,
      name,
      description: payload.description,
      price_cents: payload.price_cents,
      category: payload.category,
      image_url: payload.image_url,
      is_available: payload.is_available.unwrap_or(true),
      is_vegetarian: payload.is_vegetarian.unwrap_or(false),
      preparation_time_minutes,
    })
    .await?;
  info!(product_id = %product.id, restaurant_id = %restaurant.id, "Product created.");
  Ok(response::created(product))
}

/// The owner's full menu, unavailable items included.
#[instrument(name = "handler::list_my_products", skip_all, fields(user_id = %auth.id))]
pub async fn list_my_products_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  auth.require(OWNER_ONLY)?;
  let restaurant = owned_restaurant(&app_state, auth.id).await?;
  let products = app_state.repo.list_products(restaurant.id, false).await?;
  Ok(response::ok(products))
}

#[instrument(name = "handler::list_restaurant_products", skip(app_state))]
pub async fn list_restaurant_products_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let restaurant_id = path.into_inner();
  if app_state.repo.find_restaurant(restaurant_id).await?.is_none() {
    return Err(AppError::NotFound(format!("Restaurant with ID {} not found.", restaurant_id)));
  }
  let products = app_state.repo.list_products(restaurant_id, true).await?;
  Ok(response::ok(products))
}

#[instrument(name = "handler::update_product", skip(app_state, auth, body))]
pub async fn update_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<ProductUpdate>,
) -> Result<HttpResponse, AppError> {
  auth.require(OWNER_ONLY)?;
  let product_id = path.into_inner();
  let update = body.into_inner();
  if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(AppError::Validation("Product name cannot be empty.".to_string()));
  }
  if let Some(price) = update.price_cents {
    check_price(price)?;
  }
  if let Some(minutes) = update.preparation_time_minutes {
    check_preparation_time(minutes)?;
  }

  owned_product(&app_state, &auth, product_id).await?;
  let product = app_state
    .repo
    .update_product(product_id, update)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
  info!(%product_id, "Product updated.");
  Ok(response::ok(product))
}

#[instrument(name = "handler::delete_product", skip(app_state, auth))]
pub async fn delete_product_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  auth.require(OWNER_ONLY)?;
  let product_id = path.into_inner();
  owned_product(&app_state, &auth, product_id).await?;
  if !app_state.repo.delete_product(product_id).await? {
    return Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)));
  }
  info!(%product_id, "Product deleted.");
  Ok(response::ok(json!({ "message": "Product deleted successfully." })))
}
