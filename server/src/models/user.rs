// server/src/models/user.rs

use crate::models::restaurant::NewRestaurant;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tiffin_core::{AccountStanding, Role};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: Uuid,
  pub name: String,
  pub email: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub role: Role,
  pub is_approved: bool,
  pub is_active: bool,
  pub license_url: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn standing(&self) -> AccountStanding {
    AccountStanding {
      role: self.role,
      is_approved: self.is_approved,
      is_active: self.is_active,
    }
  }
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub name: String,
  /// Already lowercased.
  pub email: String,
  pub password_hash: String,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub role: Role,
  pub license_url: Option<String>,
}

/// Everything written when an account is created: the user, plus the
/// restaurant for a restaurant owner. Riders get their profile implicitly.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub user: NewUser,
  pub restaurant: Option<NewRestaurant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
  pub name: Option<String>,
  pub phone: Option<String>,
  pub address: Option<String>,
}
