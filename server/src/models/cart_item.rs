// server/src/models/cart_item.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tiffin_core::PriceBreakdown;
use uuid::Uuid;

/// One product line in a customer's cart. Name and price are snapshots taken
/// the first time the product was added.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub restaurant_id: Uuid,
  pub name: String,
  pub price_cents: i64,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCartItem {
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub restaurant_id: Uuid,
  pub name: String,
  pub price_cents: i64,
  /// Added to the existing quantity when the product is already in the cart.
  pub quantity: i32,
}

/// The cart as shown to the customer, with the price checkout would charge.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
  pub restaurant_id: Option<Uuid>,
  pub items: Vec<CartItem>,
  pub item_count: i64,
  pub pricing: Option<PriceBreakdown>,
}
