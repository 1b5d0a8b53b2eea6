// server/src/models/review.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub id: Uuid,
  pub restaurant_id: Uuid,
  pub user_id: Uuid,
  /// Author's display name.
  pub user_name: String,
  pub rating: i16,
  pub comment: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
  pub restaurant_id: Uuid,
  pub user_id: Uuid,
  pub rating: i16,
  pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUpdate {
  pub rating: Option<i16>,
  pub comment: Option<String>,
}
