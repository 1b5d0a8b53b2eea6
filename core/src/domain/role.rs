// core/src/domain/role.rs

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four account kinds on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_role", rename_all = "lowercase"))]
pub enum Role {
  Customer,
  Restaurant,
  Rider,
  Admin,
}

impl Role {
  pub const ALL: [Role; 4] = [Role::Customer, Role::Restaurant, Role::Rider, Role::Admin];

  pub fn as_str(self) -> &'static str {
    match self {
      Role::Customer => "customer",
      Role::Restaurant => "restaurant",
      Role::Rider => "rider",
      Role::Admin => "admin",
    }
  }

  /// Restaurant and rider accounts wait for an admin before they can sign in.
  pub fn requires_approval(self) -> bool {
    matches!(self, Role::Restaurant | Role::Rider)
  }

  /// Value of `is_approved` for a freshly registered account of this role.
  pub fn approved_on_signup(self) -> bool {
    !self.requires_approval()
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "customer" => Ok(Role::Customer),
      "restaurant" => Ok(Role::Restaurant),
      "rider" => Ok(Role::Rider),
      "admin" => Ok(Role::Admin),
      other => Err(DomainError::UnknownRole(other.to_string())),
    }
  }
}

/// A set of roles allowed through a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet(u8);

impl RoleSet {
  pub const ANY: RoleSet = RoleSet(0b1111);

  pub const fn empty() -> Self {
    RoleSet(0)
  }

  const fn bit(role: Role) -> u8 {
    match role {
      Role::Customer => 0b0001,
      Role::Restaurant => 0b0010,
      Role::Rider => 0b0100,
      Role::Admin => 0b1000,
    }
  }

  pub const fn of(roles: &[Role]) -> Self {
    let mut bits = 0;
    let mut i = 0;
    while i < roles.len() {
      bits |= Self::bit(roles[i]);
      i += 1;
    }
    RoleSet(bits)
  }

  pub const fn only(role: Role) -> Self {
    RoleSet(Self::bit(role))
  }

  pub const fn contains(self, role: Role) -> bool {
    self.0 & Self::bit(role) != 0
  }

  pub fn roles(self) -> Vec<Role> {
    Role::ALL.into_iter().filter(|r| self.contains(*r)).collect()
  }
}

impl fmt::Display for RoleSet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names: Vec<&str> = self.roles().into_iter().map(Role::as_str).collect();
    f.write_str(&names.join("|"))
  }
}
