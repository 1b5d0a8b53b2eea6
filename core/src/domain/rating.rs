// core/src/domain/rating.rs

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

pub fn validate_rating(rating: i16) -> Result<i16, DomainError> {
  if (MIN_RATING..=MAX_RATING).contains(&rating) {
    Ok(rating)
  } else {
    Err(DomainError::InvalidRating(rating))
  }
}

/// A restaurant's aggregate rating, recomputed whenever one of its reviews
/// is written or removed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
  /// Mean rating rounded to one decimal, 0 with no reviews.
  pub rating: f64,
  pub total_reviews: i32,
}

impl RatingSummary {
  pub fn from_ratings<I>(ratings: I) -> Self
  where
    I: IntoIterator<Item = i16>,
  {
    let (sum, count) = ratings
      .into_iter()
      .fold((0i64, 0i32), |(sum, count), r| (sum + i64::from(r), count + 1));
    Self::from_totals(sum, count)
  }

  pub fn from_totals(sum: i64, count: i32) -> Self {
    if count == 0 {
      return RatingSummary {
        rating: 0.0,
        total_reviews: 0,
      };
    }
    let mean = sum as f64 / f64::from(count);
    RatingSummary {
      rating: (mean * 10.0).round() / 10.0,
      total_reviews: count,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mean_is_rounded_to_one_decimal() {
    let summary = RatingSummary::from_ratings([5, 4, 4]);
    assert_eq!(summary.total_reviews, 3);
    assert!((summary.rating - 4.3).abs() < f64::EPSILON);
  }

  #[test]
  fn no_reviews_means_zero() {
    let summary = RatingSummary::from_ratings(std::iter::empty());
    assert_eq!(summary.total_reviews, 0);
    assert_eq!(summary.rating, 0.0);
  }

  #[test]
  fn bounds() {
    assert!(validate_rating(0).is_err());
    assert!(validate_rating(6).is_err());
    assert_eq!(validate_rating(1), Ok(1));
  }
}
