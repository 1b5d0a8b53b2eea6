// core/src/domain/order_status.rs

//! The order lifecycle.
//!
//! ```text
//! pending -> confirmed -> preparing -> ready -> out_for_delivery -> delivered
//!    \___________\____________\__________\_____________\_________-> cancelled
//! ```
//!
//! `delivered` and `cancelled` are terminal. Every status change in the
//! system goes through [`OrderStatus::transition`] and, for requests made on
//! behalf of a user, [`authorize_transition`].

use crate::domain::error::DomainError;
use crate::domain::role::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "order_status", rename_all = "snake_case"))]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Preparing,
  Ready,
  OutForDelivery,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 7] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::Ready,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Preparing => "preparing",
      OrderStatus::Ready => "ready",
      OrderStatus::OutForDelivery => "out_for_delivery",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }

  /// The forward successor on the happy path, `None` for terminal states.
  pub fn next(self) -> Option<OrderStatus> {
    match self {
      OrderStatus::Pending => Some(OrderStatus::Confirmed),
      OrderStatus::Confirmed => Some(OrderStatus::Preparing),
      OrderStatus::Preparing => Some(OrderStatus::Ready),
      OrderStatus::Ready => Some(OrderStatus::OutForDelivery),
      OrderStatus::OutForDelivery => Some(OrderStatus::Delivered),
      OrderStatus::Delivered | OrderStatus::Cancelled => None,
    }
  }

  pub fn can_transition_to(self, to: OrderStatus) -> bool {
    if self.is_terminal() {
      return false;
    }
    to == OrderStatus::Cancelled || self.next() == Some(to)
  }

  /// Every status reachable from `self` in one move.
  pub fn allowed_targets(self) -> Vec<OrderStatus> {
    OrderStatus::ALL
      .into_iter()
      .filter(|to| self.can_transition_to(*to))
      .collect()
  }

  /// The single validated transition function.
  pub fn transition(self, to: OrderStatus) -> Result<OrderStatus, DomainError> {
    if self.can_transition_to(to) {
      Ok(to)
    } else {
      Err(DomainError::IllegalTransition { from: self, to })
    }
  }

  /// Orders counted towards revenue.
  pub fn counts_as_revenue(self) -> bool {
    self == OrderStatus::Delivered
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase().replace(&['-', ' '][..], "_");
    OrderStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == normalized)
      .ok_or_else(|| DomainError::UnknownStatus(s.to_string()))
  }
}

/// Which statuses a role may set, assuming the caller already established the
/// relationship to the order (customer placed it, restaurant owns it, rider is
/// assigned to it).
pub fn role_may_set(role: Role, from: OrderStatus, to: OrderStatus) -> bool {
  match role {
    Role::Admin => true,
    Role::Customer => from == OrderStatus::Pending && to == OrderStatus::Cancelled,
    Role::Restaurant => matches!(
      to,
      OrderStatus::Confirmed | OrderStatus::Preparing | OrderStatus::Ready | OrderStatus::Cancelled
    ),
    Role::Rider => matches!(to, OrderStatus::OutForDelivery | OrderStatus::Delivered),
  }
}

/// Validates a status change requested by `role`.
///
/// Legality is checked first, so an impossible move reports
/// `IllegalTransition` whoever asks for it.
pub fn authorize_transition(role: Role, from: OrderStatus, to: OrderStatus) -> Result<OrderStatus, DomainError> {
  let to = from.transition(to)?;
  if role_may_set(role, from, to) {
    Ok(to)
  } else {
    Err(DomainError::TransitionNotPermitted { role, to })
  }
}

/// Bookkeeping that must be written together with a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionEffects {
  /// Stamp `delivered_at`.
  pub mark_delivered: bool,
  /// Decrement the assigned rider's active deliveries.
  pub release_rider: bool,
  /// Increment the assigned rider's completed deliveries.
  pub credit_rider: bool,
}

impl TransitionEffects {
  pub fn of(to: OrderStatus, has_rider: bool) -> Self {
    match to {
      OrderStatus::Delivered => TransitionEffects {
        mark_delivered: true,
        release_rider: has_rider,
        credit_rider: has_rider,
      },
      OrderStatus::Cancelled => TransitionEffects {
        release_rider: has_rider,
        ..Default::default()
      },
      _ => TransitionEffects::default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn happy_path_walks_forward_one_step_at_a_time() {
    let mut status = OrderStatus::Pending;
    let mut seen = vec![status];
    while let Some(next) = status.next() {
      status = status.transition(next).unwrap();
      seen.push(status);
    }
    assert_eq!(
      seen,
      vec![
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
      ]
    );
  }

  #[test]
  fn skipping_ahead_is_rejected() {
    assert_eq!(
      OrderStatus::Pending.transition(OrderStatus::Ready),
      Err(DomainError::IllegalTransition {
        from: OrderStatus::Pending,
        to: OrderStatus::Ready
      })
    );
  }

  #[test]
  fn parses_hyphenated_and_spaced_forms() {
    assert_eq!("out-for-delivery".parse::<OrderStatus>().unwrap(), OrderStatus::OutForDelivery);
    assert_eq!("Out For Delivery".parse::<OrderStatus>().unwrap(), OrderStatus::OutForDelivery);
    assert!("shipped".parse::<OrderStatus>().is_err());
  }

  #[test]
  fn effects_only_touch_rider_when_assigned() {
    assert_eq!(
      TransitionEffects::of(OrderStatus::Cancelled, false),
      TransitionEffects::default()
    );
    let delivered = TransitionEffects::of(OrderStatus::Delivered, true);
    assert!(delivered.mark_delivered && delivered.release_rider && delivered.credit_rider);
  }
}
