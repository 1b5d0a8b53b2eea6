// core/src/domain/error.rs
use crate::domain::cart::MAX_LINE_QUANTITY;
use crate::domain::order_status::OrderStatus;
use crate::domain::role::Role;
use thiserror::Error;
use uuid::Uuid;

/// Violations of the platform's business rules.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
  #[error("cannot move an order from '{from}' to '{to}'")]
  IllegalTransition { from: OrderStatus, to: OrderStatus },

  #[error("a {role} may not set an order to '{to}'")]
  TransitionNotPermitted { role: Role, to: OrderStatus },

  #[error("the cart is empty")]
  EmptyCart,

  #[error("the cart mixes items from restaurants {first} and {second}")]
  MixedRestaurants { first: Uuid, second: Uuid },

  #[error("quantity must be between 1 and {max}, got {0}", max = MAX_LINE_QUANTITY)]
  InvalidQuantity(i32),

  #[error("the amount is too large to be priced")]
  AmountOverflow,

  #[error("rating must be between 1 and 5, got {0}")]
  InvalidRating(i16),

  #[error("unknown role '{0}'")]
  UnknownRole(String),

  #[error("unknown order status '{0}'")]
  UnknownStatus(String),

  #[error("unknown rider status '{0}'")]
  UnknownRiderStatus(String),

  #[error("coordinates out of range: lat {latitude}, lng {longitude}")]
  InvalidCoordinates { latitude: f64, longitude: f64 },
}
