// core/src/domain/cart.rs

//! A cart holds items from exactly one restaurant.

use crate::domain::error::DomainError;
use uuid::Uuid;

/// Returns the single restaurant the cart belongs to.
pub fn single_restaurant<I>(restaurant_ids: I) -> Result<Uuid, DomainError>
where
  I: IntoIterator<Item = Uuid>,
{
  let mut ids = restaurant_ids.into_iter();
  let first = ids.next().ok_or(DomainError::EmptyCart)?;
  match ids.find(|id| *id != first) {
    Some(second) => Err(DomainError::MixedRestaurants { first, second }),
    None => Ok(first),
  }
}

/// Checks that an item from `incoming` may join a cart currently holding
/// items from `current` (if any).
pub fn check_addition(current: Option<Uuid>, incoming: Uuid) -> Result<(), DomainError> {
  match current {
    Some(first) if first != incoming => Err(DomainError::MixedRestaurants {
      first,
      second: incoming,
    }),
    _ => Ok(()),
  }
}

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i32 = 999;

pub fn validate_quantity(quantity: i32) -> Result<i32, DomainError> {
  if (1..=MAX_LINE_QUANTITY).contains(&quantity) {
    Ok(quantity)
  } else {
    Err(DomainError::InvalidQuantity(quantity))
  }
}

/// Quantity of a line after `added` more units join `current`.
pub fn combined_quantity(current: i32, added: i32) -> Result<i32, DomainError> {
  let combined = current.checked_add(added).ok_or(DomainError::InvalidQuantity(i32::MAX))?;
  validate_quantity(combined)
}
