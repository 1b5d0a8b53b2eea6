// server/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::CartView;
use crate::pipelines::contexts::{AddToCartCtxData, CheckoutCtxData};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::response;
use tiffin_core::domain::cart;
use tiffin_core::{ContextData, PipelineResult, Role, RoleSet};

const CUSTOMER_ONLY: RoleSet = RoleSet::only(Role::Customer);

fn default_quantity() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartPayload {
  pub product_id: Uuid,
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
  pub delivery_address: String,
  pub payment_method: Option<String>,
  pub notes: Option<String>,
}

/// The customer's cart priced the way checkout would price it right now.
async fn cart_view(app_state: &AppState, user_id: Uuid) -> Result<CartView, AppError> {
  let items = app_state.repo.cart_items(user_id).await?;
  let restaurant_id = items.first().map(|i| i.restaurant_id);
  let item_count = items.iter().map(|i| i64::from(i.quantity)).sum();
  let pricing = if items.is_empty() {
    None
  } else {
    Some(app_state.config.fees.price_lines(items.iter().map(|i| (i.price_cents, i.quantity)))?)
  };
  Ok(CartView {
    restaurant_id,
    items,
    item_count,
    pricing,
  })
}

#[instrument(name = "handler::get_cart", skip_all, fields(user_id = %auth.id))]
pub async fn get_cart_handler(app_state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  auth.require(CUSTOMER_ONLY)?;
  Ok(response::ok(cart_view(&app_state, auth.id).await?))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, auth),
  fields(user_id = %auth.id)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  req_payload: web::Json<AddToCartPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(CUSTOMER_ONLY)?;
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(AddToCartCtxData {
    app_state: app_state.get_ref().clone(),
    user_id: auth.id,
    product_id: payload.product_id,
    quantity: payload.quantity,
    product: None,
    cart_item: None,
  });

  match app_state.flows.run(ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      info!(product_id = %payload.product_id, "Item added to cart.");
      Ok(response::ok(cart_view(&app_state, auth.id).await?))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Add-to-cart pipeline stopped early.");
      Err(AppError::Internal("Adding to the cart was halted by an internal step.".to_string()))
    }
    Err(app_err) => Err(app_err),
  }
}

#[instrument(name = "handler::update_cart", skip(app_state, auth), fields(user_id = %auth.id))]
pub async fn update_cart_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  body: web::Json<UpdateCartPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(CUSTOMER_ONLY)?;
  let UpdateCartPayload { product_id, quantity } = body.into_inner();
  if quantity != 0 {
    cart::validate_quantity(quantity)?;
  }
  if !app_state.repo.set_cart_quantity(auth.id, product_id, quantity).await? {
    return Err(AppError::NotFound("That product is not in your cart.".to_string()));
  }
  Ok(response::ok(cart_view(&app_state, auth.id).await?))
}

#[instrument(name = "handler::remove_from_cart", skip(app_state, auth), fields(user_id = %auth.id))]
pub async fn remove_from_cart_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  auth.require(CUSTOMER_ONLY)?;
  let product_id = path.into_inner();
  if !app_state.repo.remove_cart_item(auth.id, product_id).await? {
    return Err(AppError::NotFound("That product is not in your cart.".to_string()));
  }
  Ok(response::ok(cart_view(&app_state, auth.id).await?))
}

#[instrument(name = "handler::clear_cart", skip_all, fields(user_id = %auth.id))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>, auth: AuthenticatedUser) -> Result<HttpResponse, AppError> {
  auth.require(CUSTOMER_ONLY)?;
  let removed = app_state.repo.clear_cart(auth.id).await?;
  info!(removed, "Cart cleared.");
  Ok(response::ok(json!({ "message": "Cart cleared.", "removed": removed })))
}

#[instrument(name = "handler::checkout", skip(app_state, auth, req_payload), fields(user_id = %auth.id))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  req_payload: web::Json<CheckoutPayload>,
) -> Result<HttpResponse, AppError> {
  auth.require(CUSTOMER_ONLY)?;
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(CheckoutCtxData {
    app_state: app_state.get_ref().clone(),
    user_id: auth.id,
    delivery_address: payload.delivery_address,
    payment_method: payload.payment_method.unwrap_or_default(),
    notes: payload.notes,
    items: Vec::new(),
    restaurant: None,
    pricing: None,
    order: None,
  });

  match app_state.flows.run(ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      let order = ctx
        .write()
        .order
        .take()
        .ok_or_else(|| AppError::Internal("Checkout completed without an order.".to_string()))?;
      Ok(response::created(order))
    }
    Ok(PipelineResult::Stopped) => Err(AppError::Internal("Checkout was halted by an internal step.".to_string())),
    Err(app_err) => Err(app_err),
  }
}
