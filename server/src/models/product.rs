// server/src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub restaurant_id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub is_available: bool,
  pub is_vegetarian: bool,
  pub preparation_time_minutes: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
  pub restaurant_id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price_cents: i64,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub is_available: bool,
  pub is_vegetarian: bool,
  pub preparation_time_minutes: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
  pub name: Option<String>,
  pub description: Option<String>,
  pub price_cents: Option<i64>,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub is_available: Option<bool>,
  pub is_vegetarian: Option<bool>,
  pub preparation_time_minutes: Option<i32>,
}
