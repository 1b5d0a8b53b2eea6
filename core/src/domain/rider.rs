// core/src/domain/rider.rs

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "rider_status", rename_all = "lowercase"))]
pub enum RiderStatus {
  Online,
  #[default]
  Offline,
}

impl RiderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      RiderStatus::Online => "online",
      RiderStatus::Offline => "offline",
    }
  }
}

impl fmt::Display for RiderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for RiderStatus {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "online" => Ok(RiderStatus::Online),
      "offline" => Ok(RiderStatus::Offline),
      other => Err(DomainError::UnknownRiderStatus(other.to_string())),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub latitude: f64,
  pub longitude: f64,
}

impl GeoPoint {
  pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
    let valid = latitude.is_finite()
      && longitude.is_finite()
      && (-90.0..=90.0).contains(&latitude)
      && (-180.0..=180.0).contains(&longitude);
    if valid {
      Ok(GeoPoint { latitude, longitude })
    } else {
      Err(DomainError::InvalidCoordinates { latitude, longitude })
    }
  }
}

/// A rider may pick up a new order only while approved and online.
pub fn can_accept_orders(is_approved: bool, status: RiderStatus) -> bool {
  is_approved && status == RiderStatus::Online
}
