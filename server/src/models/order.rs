// server/src/models/order.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tiffin_core::{OrderStatus, PriceBreakdown};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub product_id: Uuid,
  pub name: String,
  pub quantity: i32,
  pub price_cents: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub restaurant_id: Uuid,
  pub rider_id: Option<Uuid>,
  #[sqlx(skip)]
  pub items: Vec<OrderItem>,
  pub delivery_address: String,
  pub payment_method: String,
  pub notes: Option<String>,
  pub subtotal_cents: i64,
  pub delivery_fee_cents: i64,
  pub service_fee_cents: i64,
  pub total_cents: i64,
  pub status: OrderStatus,
  pub version: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  pub delivered_at: Option<DateTime<Utc>>,
}

impl Order {
  pub fn pricing(&self) -> PriceBreakdown {
    PriceBreakdown {
      subtotal_cents: self.subtotal_cents,
      delivery_fee_cents: self.delivery_fee_cents,
      service_fee_cents: self.service_fee_cents,
      total_cents: self.total_cents,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
  pub user_id: Uuid,
  pub restaurant_id: Uuid,
  pub items: Vec<OrderItem>,
  pub delivery_address: String,
  pub payment_method: String,
  pub notes: Option<String>,
  pub pricing: PriceBreakdown,
}

/// Whose orders a listing may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
  All,
  Customer(Uuid),
  Restaurant(Uuid),
  Rider(Uuid),
}

#[derive(Debug, Clone, Copy)]
pub struct OrderFilter {
  pub scope: OrderScope,
  pub status: Option<OrderStatus>,
  pub limit: i64,
}
