// server/src/pipelines/cart_pipeline.rs

use crate::errors::{AppError, Result};
use crate::models::NewCartItem;
use crate::pipelines::contexts::AddToCartCtxData;
use tiffin_core::domain::cart;
use tiffin_core::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, instrument, warn};

pub fn register_add_to_cart_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(
    "add_to_cart",
    &[
      ("validate_cart_input", false, None),
      ("load_product", false, None),
      ("check_single_restaurant", false, None),
      ("add_or_increment_line", false, None),
    ],
  );

  p.on("validate_cart_input", |ctx: ContextData<AddToCartCtxData>| async move {
    let quantity = ctx.with(|data| data.quantity);
    cart::validate_quantity(quantity)?;
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("load_product", load_product);
  p.on("check_single_restaurant", check_single_restaurant);
  p.on("add_or_increment_line", add_or_increment_line);

  registry.register(p);
  info!("Add-to-cart pipeline registered.");
}

#[instrument(name = "cart::load_product", skip_all)]
async fn load_product(ctx: ContextData<AddToCartCtxData>) -> Result<PipelineControl> {
  let (product_id, repo) = {
    let guard = ctx.read();
    (guard.product_id, guard.app_state.repo.clone())
  };

  let product = repo
    .find_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Product with ID {} not found.", product_id)))?;
  if !product.is_available {
    return Err(AppError::Validation(format!("'{}' is currently unavailable.", product.name)));
  }

  let open = repo
    .find_restaurant(product.restaurant_id)
    .await?
    .is_some_and(|r| r.is_open_for_orders());
  if !open {
    return Err(AppError::Validation(
      "This restaurant is not accepting orders right now.".to_string(),
    ));
  }

  ctx.write().product = Some(product);
  Ok(PipelineControl::Continue)
}

/// The cart is left untouched when the product comes from another
/// restaurant.
#[instrument(name = "cart::check_single_restaurant", skip_all)]
async fn check_single_restaurant(ctx: ContextData<AddToCartCtxData>) -> Result<PipelineControl> {
  let (user_id, incoming, repo) = {
    let guard = ctx.read();
    let incoming = guard.product.as_ref().map(|p| p.restaurant_id);
    (guard.user_id, incoming, guard.app_state.repo.clone())
  };
  let incoming = incoming.ok_or_else(|| AppError::Internal("cart context has no product".to_string()))?;

  let current = repo.cart_items(user_id).await?.first().map(|line| line.restaurant_id);
  if let Err(e) = cart::check_addition(current, incoming) {
    warn!(%user_id, error = %e, "Refused to mix restaurants in one cart.");
    return Err(e.into());
  }
  Ok(PipelineControl::Continue)
}

#[instrument(name = "cart::add_or_increment_line", skip_all)]
async fn add_or_increment_line(ctx: ContextData<AddToCartCtxData>) -> Result<PipelineControl> {
  let (item, repo) = {
    let guard = ctx.read();
    let product = guard
      .product
      .as_ref()
      .ok_or_else(|| AppError::Internal("cart context has no product".to_string()))?;
    let item = NewCartItem {
      user_id: guard.user_id,
      product_id: product.id,
      restaurant_id: product.restaurant_id,
      name: product.name.clone(),
      price_cents: product.price_cents,
      quantity: guard.quantity,
    };
    (item, guard.app_state.repo.clone())
  };

  let line = repo.add_cart_item(item).await?;
  info!(user_id = %line.user_id, product_id = %line.product_id, quantity = line.quantity, "Cart line updated.");
  ctx.write().cart_item = Some(line);
  Ok(PipelineControl::Continue)
}
