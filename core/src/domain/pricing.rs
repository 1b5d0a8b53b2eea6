// core/src/domain/pricing.rs

//! Checkout pricing. All amounts are integer minor units (cents).

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

/// Highest unit price a product may carry: 1,000,000.00.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSchedule {
  /// Delivery is free when the subtotal is strictly above this.
  pub free_delivery_threshold_cents: i64,
  pub delivery_fee_cents: i64,
  pub service_fee_min_cents: i64,
  /// Whole percent of the subtotal, rounded half up to the cent.
  pub service_fee_percent: i64,
}

impl Default for FeeSchedule {
  fn default() -> Self {
    FeeSchedule {
      free_delivery_threshold_cents: 29_900,
      delivery_fee_cents: 3_500,
      service_fee_min_cents: 1_000,
      service_fee_percent: 2,
    }
  }
}

/// The four stored money fields of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
  pub subtotal_cents: i64,
  pub delivery_fee_cents: i64,
  pub service_fee_cents: i64,
  pub total_cents: i64,
}

impl FeeSchedule {
  pub fn delivery_fee(&self, subtotal_cents: i64) -> i64 {
    if subtotal_cents > self.free_delivery_threshold_cents {
      0
    } else {
      self.delivery_fee_cents
    }
  }

  pub fn service_fee(&self, subtotal_cents: i64) -> Result<i64, DomainError> {
    let percentage = subtotal_cents
      .max(0)
      .checked_mul(self.service_fee_percent)
      .and_then(|scaled| scaled.checked_add(50))
      .ok_or(DomainError::AmountOverflow)?
      / 100;
    Ok(percentage.max(self.service_fee_min_cents))
  }

  pub fn price(&self, subtotal_cents: i64) -> Result<PriceBreakdown, DomainError> {
    let delivery_fee_cents = self.delivery_fee(subtotal_cents);
    let service_fee_cents = self.service_fee(subtotal_cents)?;
    let total_cents = subtotal_cents
      .checked_add(delivery_fee_cents)
      .and_then(|sum| sum.checked_add(service_fee_cents))
      .ok_or(DomainError::AmountOverflow)?;
    Ok(PriceBreakdown {
      subtotal_cents,
      delivery_fee_cents,
      service_fee_cents,
      total_cents,
    })
  }

  /// Prices a set of `(unit price, quantity)` lines.
  pub fn price_lines<I>(&self, lines: I) -> Result<PriceBreakdown, DomainError>
  where
    I: IntoIterator<Item = (i64, i32)>,
  {
    self.price(subtotal_of(lines)?)
  }
}

pub fn subtotal_of<I>(lines: I) -> Result<i64, DomainError>
where
  I: IntoIterator<Item = (i64, i32)>,
{
  lines.into_iter().try_fold(0i64, |subtotal, (price_cents, quantity)| {
    price_cents
      .checked_mul(i64::from(quantity))
      .and_then(|line| subtotal.checked_add(line))
      .ok_or(DomainError::AmountOverflow)
  })
}

impl PriceBreakdown {
  pub fn is_consistent(&self) -> bool {
    self
      .subtotal_cents
      .checked_add(self.delivery_fee_cents)
      .and_then(|sum| sum.checked_add(self.service_fee_cents))
      == Some(self.total_cents)
  }
}
