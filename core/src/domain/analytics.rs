// core/src/domain/analytics.rs

//! Dashboard figures derived from orders and accounts.
//!
//! The Postgres repository computes the raw counts with SQL aggregates and
//! only uses [`Ratios::compute`]; the in-process repository and the
//! benchmarks feed plain [`OrderFact`]s through [`summarize_orders`] and
//! [`rank_restaurants`].

use crate::domain::order_status::OrderStatus;
use crate::domain::role::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Order count per status. Every status is present, zero or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
  pub pending: i64,
  pub confirmed: i64,
  pub preparing: i64,
  pub ready: i64,
  pub out_for_delivery: i64,
  pub delivered: i64,
  pub cancelled: i64,
}

impl StatusCounts {
  fn slot(&mut self, status: OrderStatus) -> &mut i64 {
    match status {
      OrderStatus::Pending => &mut self.pending,
      OrderStatus::Confirmed => &mut self.confirmed,
      OrderStatus::Preparing => &mut self.preparing,
      OrderStatus::Ready => &mut self.ready,
      OrderStatus::OutForDelivery => &mut self.out_for_delivery,
      OrderStatus::Delivered => &mut self.delivered,
      OrderStatus::Cancelled => &mut self.cancelled,
    }
  }

  pub fn add(&mut self, status: OrderStatus, count: i64) {
    *self.slot(status) += count;
  }

  pub fn get(&self, status: OrderStatus) -> i64 {
    match status {
      OrderStatus::Pending => self.pending,
      OrderStatus::Confirmed => self.confirmed,
      OrderStatus::Preparing => self.preparing,
      OrderStatus::Ready => self.ready,
      OrderStatus::OutForDelivery => self.out_for_delivery,
      OrderStatus::Delivered => self.delivered,
      OrderStatus::Cancelled => self.cancelled,
    }
  }

  pub fn total(&self) -> i64 {
    OrderStatus::ALL.into_iter().map(|s| self.get(s)).sum()
  }

  /// Orders that are neither delivered nor cancelled.
  pub fn in_progress(&self) -> i64 {
    OrderStatus::ALL
      .into_iter()
      .filter(|s| !s.is_terminal())
      .map(|s| self.get(s))
      .sum()
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCounts {
  pub customers: i64,
  pub restaurants: i64,
  pub riders: i64,
  pub admins: i64,
  /// Restaurant and rider accounts still waiting for approval.
  pub pending_approvals: i64,
}

impl UserCounts {
  pub fn add(&mut self, role: Role, count: i64) {
    match role {
      Role::Customer => self.customers += count,
      Role::Restaurant => self.restaurants += count,
      Role::Rider => self.riders += count,
      Role::Admin => self.admins += count,
    }
  }

  pub fn total(&self) -> i64 {
    self.customers + self.restaurants + self.riders + self.admins
  }
}

/// Everything the aggregation needs to know about one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFact {
  pub restaurant_id: Uuid,
  pub status: OrderStatus,
  pub total_cents: i64,
  pub service_fee_cents: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
  pub total_orders: i64,
  pub by_status: StatusCounts,
  /// Sum of stored order totals over delivered orders.
  pub revenue_cents: i64,
  /// Sum of stored service fees over delivered orders.
  pub platform_fees_cents: i64,
}

pub fn summarize_orders<'a, I>(facts: I) -> OrderTotals
where
  I: IntoIterator<Item = &'a OrderFact>,
{
  let mut totals = OrderTotals::default();
  for fact in facts {
    totals.total_orders += 1;
    totals.by_status.add(fact.status, 1);
    if fact.status.counts_as_revenue() {
      totals.revenue_cents += fact.total_cents;
      totals.platform_fees_cents += fact.service_fee_cents;
    }
  }
  totals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRank {
  pub restaurant_id: Uuid,
  pub order_count: i64,
  pub revenue_cents: i64,
}

/// Top `limit` restaurants by number of orders (any status), with their
/// delivered revenue. Ties go to the higher revenue, then the lower id so the
/// ordering is stable.
pub fn rank_restaurants<'a, I>(facts: I, limit: usize) -> Vec<RestaurantRank>
where
  I: IntoIterator<Item = &'a OrderFact>,
{
  let mut by_restaurant: HashMap<Uuid, RestaurantRank> = HashMap::new();
  for fact in facts {
    let entry = by_restaurant.entry(fact.restaurant_id).or_insert(RestaurantRank {
      restaurant_id: fact.restaurant_id,
      order_count: 0,
      revenue_cents: 0,
    });
    entry.order_count += 1;
    if fact.status.counts_as_revenue() {
      entry.revenue_cents += fact.total_cents;
    }
  }
  let mut ranked: Vec<RestaurantRank> = by_restaurant.into_values().collect();
  ranked.sort_by(|a, b| {
    b.order_count
      .cmp(&a.order_count)
      .then(b.revenue_cents.cmp(&a.revenue_cents))
      .then(a.restaurant_id.cmp(&b.restaurant_id))
  });
  ranked.truncate(limit);
  ranked
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
  if denominator == 0.0 {
    0.0
  } else {
    numerator / denominator
  }
}

fn round_to(value: f64, decimals: i32) -> f64 {
  let factor = 10f64.powi(decimals);
  (value * factor).round() / factor
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ratios {
  /// delivered / total orders, in `[0, 1]`.
  pub completion_rate: f64,
  /// revenue / delivered orders.
  pub average_order_value_cents: i64,
  /// total orders / total users.
  pub orders_per_user: f64,
}

impl Ratios {
  pub fn compute(totals: &OrderTotals, total_users: i64) -> Self {
    let delivered = totals.by_status.delivered as f64;
    Ratios {
      completion_rate: round_to(ratio(delivered, totals.total_orders as f64), 4),
      average_order_value_cents: ratio(totals.revenue_cents as f64, delivered).round() as i64,
      orders_per_user: round_to(ratio(totals.total_orders as f64, total_users as f64), 2),
    }
  }
}
