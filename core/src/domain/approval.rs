// core/src/domain/approval.rs

//! Who may sign in.

use crate::domain::role::Role;
use thiserror::Error;

/// Why a sign-in with correct credentials is still refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoginRefusal {
  #[error("{0} account is waiting for admin approval")]
  PendingApproval(Role),

  #[error("account has been deactivated")]
  Deactivated,
}

/// The account facts the gate looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountStanding {
  pub role: Role,
  pub is_approved: bool,
  pub is_active: bool,
}

impl AccountStanding {
  /// Applied after the password check succeeds.
  pub fn check_login(&self) -> Result<(), LoginRefusal> {
    if !self.is_active {
      return Err(LoginRefusal::Deactivated);
    }
    if self.role.requires_approval() && !self.is_approved {
      return Err(LoginRefusal::PendingApproval(self.role));
    }
    Ok(())
  }

  /// Whether an approve action changes anything.
  pub fn needs_approval(&self) -> bool {
    self.role.requires_approval() && !self.is_approved
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn standing(role: Role, is_approved: bool, is_active: bool) -> AccountStanding {
    AccountStanding {
      role,
      is_approved,
      is_active,
    }
  }

  #[test]
  fn unapproved_restaurant_and_rider_are_pending() {
    for role in [Role::Restaurant, Role::Rider] {
      assert_eq!(
        standing(role, false, true).check_login(),
        Err(LoginRefusal::PendingApproval(role))
      );
      assert_eq!(standing(role, true, true).check_login(), Ok(()));
    }
  }

  #[test]
  fn customers_never_wait() {
    assert_eq!(standing(Role::Customer, false, true).check_login(), Ok(()));
    assert!(!standing(Role::Customer, false, true).needs_approval());
  }

  #[test]
  fn deactivation_wins_over_pending() {
    assert_eq!(
      standing(Role::Rider, false, false).check_login(),
      Err(LoginRefusal::Deactivated)
    );
  }
}
