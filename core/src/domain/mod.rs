//! Business rules of the platform, free of I/O.

pub mod analytics;
pub mod approval;
pub mod cart;
pub mod error;
pub mod order_status;
pub mod pricing;
pub mod rating;
pub mod rider;
pub mod role;

pub use analytics::{OrderFact, OrderTotals, Ratios, RestaurantRank, StatusCounts, UserCounts};
pub use approval::{AccountStanding, LoginRefusal};
pub use error::DomainError;
pub use order_status::{authorize_transition, OrderStatus, TransitionEffects};
pub use pricing::{FeeSchedule, PriceBreakdown};
pub use rating::RatingSummary;
pub use rider::{GeoPoint, RiderStatus};
pub use role::{Role, RoleSet};
