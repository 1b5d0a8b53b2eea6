// server/src/models/restaurant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A restaurant as read back from the store. `is_approved` is the owner's
/// approval flag, joined in at read time.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
  pub id: Uuid,
  pub owner_id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub address: String,
  pub cuisine: Option<String>,
  pub phone: Option<String>,
  pub image_url: Option<String>,
  pub is_active: bool,
  pub is_approved: bool,
  pub rating: f64,
  pub total_reviews: i32,
  pub delivery_time_minutes: i32,
  pub minimum_order_cents: i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Restaurant {
  /// Visible to customers and able to take orders.
  pub fn is_open_for_orders(&self) -> bool {
    self.is_active && self.is_approved
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
  pub name: String,
  pub description: Option<String>,
  pub address: String,
  pub cuisine: Option<String>,
  pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantUpdate {
  pub name: Option<String>,
  pub description: Option<String>,
  pub address: Option<String>,
  pub cuisine: Option<String>,
  pub phone: Option<String>,
  pub image_url: Option<String>,
  pub is_active: Option<bool>,
  pub delivery_time_minutes: Option<i32>,
  pub minimum_order_cents: Option<i64>,
}
