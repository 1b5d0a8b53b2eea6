// server/src/models/rider.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tiffin_core::domain::GeoPoint;
use tiffin_core::RiderStatus;
use uuid::Uuid;

/// Rider presence and delivery counters, joined with the rider's account.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RiderProfile {
  pub user_id: Uuid,
  pub name: String,
  pub phone: Option<String>,
  pub is_approved: bool,
  pub license_url: Option<String>,
  pub status: RiderStatus,
  pub latitude: Option<f64>,
  pub longitude: Option<f64>,
  pub active_deliveries: i32,
  pub total_deliveries: i32,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct PresenceUpdate {
  pub status: RiderStatus,
  /// Left unchanged when `None`.
  pub location: Option<GeoPoint>,
}
