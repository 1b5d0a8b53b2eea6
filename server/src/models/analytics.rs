// server/src/models/analytics.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tiffin_core::domain::analytics::{OrderTotals, Ratios, UserCounts};
use tiffin_core::OrderStatus;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopRestaurant {
  pub restaurant_id: Uuid,
  pub name: String,
  pub order_count: i64,
  pub revenue_cents: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
  pub id: Uuid,
  pub user_id: Uuid,
  pub customer_name: String,
  pub restaurant_id: Uuid,
  pub restaurant_name: String,
  pub status: OrderStatus,
  pub total_cents: i64,
  pub created_at: DateTime<Utc>,
}

/// Payload of the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
  pub users: UserCounts,
  pub total_users: i64,
  pub total_restaurants: i64,
  pub orders: OrderTotals,
  pub ratios: Ratios,
  pub top_restaurants: Vec<TopRestaurant>,
  pub recent_orders: Vec<RecentOrder>,
}
