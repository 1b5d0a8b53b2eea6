// server/src/pipelines/checkout_pipeline.rs

//! Cart → order. Prices come from the cart's snapshots, never from the live
//! catalog, and are stored once on the order.

use crate::errors::{AppError, Result};
use crate::models::{NewOrder, OrderItem};
use crate::pipelines::contexts::CheckoutCtxData;
use tiffin_core::domain::cart;
use tiffin_core::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, instrument, warn};

pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

pub fn register_checkout_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(
    "checkout",
    &[
      ("validate_checkout_input", false, None),
      ("load_cart", false, None),
      ("verify_restaurant", false, None),
      ("price_order", false, None),
      ("place_order", false, None),
    ],
  );

  p.on("validate_checkout_input", |ctx: ContextData<CheckoutCtxData>| async move {
    let mut guard = ctx.write();
    guard.delivery_address = guard.delivery_address.trim().to_string();
    if guard.delivery_address.is_empty() {
      return Err(AppError::Validation("A delivery address is required.".to_string()));
    }
    let method = guard.payment_method.trim().to_lowercase();
    guard.payment_method = if method.is_empty() {
      DEFAULT_PAYMENT_METHOD.to_string()
    } else {
      method
    };
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("load_cart", load_cart);
  p.on("verify_restaurant", verify_restaurant);

  p.on("price_order", |ctx: ContextData<CheckoutCtxData>| async move {
    let mut guard = ctx.write();
    let lines: Vec<(i64, i32)> = guard.items.iter().map(|i| (i.price_cents, i.quantity)).collect();
    let pricing = guard.app_state.config.fees.price_lines(lines)?;
    if !pricing.is_consistent() {
      return Err(AppError::Internal(format!("inconsistent price breakdown {:?}", pricing)));
    }
    guard.pricing = Some(pricing);
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("place_order", place_order);

  registry.register(p);
  info!("Checkout pipeline registered.");
}

#[instrument(name = "checkout::load_cart", skip_all)]
async fn load_cart(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl> {
  let (user_id, repo) = {
    let guard = ctx.read();
    (guard.user_id, guard.app_state.repo.clone())
  };

  let items = repo.cart_items(user_id).await?;
  if let Err(e) = cart::single_restaurant(items.iter().map(|i| i.restaurant_id)) {
    warn!(%user_id, error = %e, "Cart cannot be checked out.");
    return Err(e.into());
  }
  ctx.write().items = items;
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout::verify_restaurant", skip_all)]
async fn verify_restaurant(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl> {
  let (restaurant_id, subtotal, repo) = {
    let guard = ctx.read();
    let restaurant_id = guard.items.first().map(|i| i.restaurant_id);
    let subtotal = tiffin_core::domain::pricing::subtotal_of(guard.items.iter().map(|i| (i.price_cents, i.quantity)));
    (restaurant_id, subtotal, guard.app_state.repo.clone())
  };
  let subtotal = subtotal?;
  let restaurant_id = restaurant_id.ok_or_else(|| AppError::Internal("checkout context has no items".to_string()))?;

  let restaurant = repo
    .find_restaurant(restaurant_id)
    .await?
    .ok_or_else(|| AppError::NotFound("The restaurant for this cart no longer exists.".to_string()))?;
  if !restaurant.is_open_for_orders() {
    return Err(AppError::Validation(format!(
      "{} is not accepting orders right now.",
      restaurant.name
    )));
  }
  if subtotal < restaurant.minimum_order_cents {
    return Err(AppError::Validation(format!(
      "{} requires a minimum order of {} cents.",
      restaurant.name, restaurant.minimum_order_cents
    )));
  }

  ctx.write().restaurant = Some(restaurant);
  Ok(PipelineControl::Continue)
}

#[instrument(name = "checkout::place_order", skip_all)]
async fn place_order(ctx: ContextData<CheckoutCtxData>) -> Result<PipelineControl> {
  let (new_order, repo) = {
    let guard = ctx.read();
    let restaurant_id = guard
      .restaurant
      .as_ref()
      .map(|r| r.id)
      .ok_or_else(|| AppError::Internal("checkout context has no restaurant".to_string()))?;
    let pricing = guard
      .pricing
      .ok_or_else(|| AppError::Internal("checkout context has no pricing".to_string()))?;
    let new_order = NewOrder {
      user_id: guard.user_id,
      restaurant_id,
      items: guard
        .items
        .iter()
        .map(|line| OrderItem {
          product_id: line.product_id,
          name: line.name.clone(),
          quantity: line.quantity,
          price_cents: line.price_cents,
        })
        .collect(),
      delivery_address: guard.delivery_address.clone(),
      payment_method: guard.payment_method.clone(),
      notes: guard.notes.clone().filter(|n| !n.trim().is_empty()),
      pricing,
    };
    (new_order, guard.app_state.repo.clone())
  };

  let order = repo.place_order(new_order).await?;
  info!(order_id = %order.id, total_cents = order.total_cents, "Order placed.");
  ctx.write().order = Some(order);
  Ok(PipelineControl::Continue)
}
