// server/src/db/mod.rs

//! Storage seam. Handlers and workflows talk to `dyn Repository`; the
//! implementation is PostgreSQL in production and an in-process store in
//! tests and local demos.
//!
//! Every method that touches more than one record is atomic: a transaction
//! in Postgres, one critical section in memory.

pub mod memory;
pub mod postgres;

use crate::errors::Result;
use crate::models::{
  CartItem, DashboardStats, NewAccount, NewCartItem, NewOrder, NewProduct, NewReview, Order, OrderFilter, PresenceUpdate,
  Product, ProductUpdate, ProfileUpdate, Restaurant, RestaurantUpdate, Review, ReviewUpdate, RiderProfile, User,
};
use async_trait::async_trait;
use tiffin_core::{OrderStatus, Role};
use uuid::Uuid;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[async_trait]
pub trait UserStore: Send + Sync {
  /// Creates the user together with its restaurant (restaurant owners) or
  /// rider profile (riders).
  async fn create_account(&self, account: NewAccount) -> Result<User>;
  async fn find_user(&self, id: Uuid) -> Result<Option<User>>;
  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
  async fn email_exists(&self, email: &str) -> Result<bool>;
  async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>>;
  /// Sets `is_approved`. Approving an approved account changes nothing.
  async fn approve_user(&self, id: Uuid) -> Result<Option<User>>;
  async fn set_user_active(&self, id: Uuid, is_active: bool) -> Result<Option<User>>;
  async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>>;
  /// Deletes the user and everything that belongs to it.
  async fn delete_user(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait RestaurantStore: Send + Sync {
  /// With `open_only`, only active restaurants whose owner is approved.
  async fn list_restaurants(&self, open_only: bool) -> Result<Vec<Restaurant>>;
  async fn find_restaurant(&self, id: Uuid) -> Result<Option<Restaurant>>;
  async fn find_restaurant_by_owner(&self, owner_id: Uuid) -> Result<Option<Restaurant>>;
  async fn update_restaurant(&self, id: Uuid, update: RestaurantUpdate) -> Result<Option<Restaurant>>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  async fn create_product(&self, product: NewProduct) -> Result<Product>;
  async fn find_product(&self, id: Uuid) -> Result<Option<Product>>;
  async fn list_products(&self, restaurant_id: Uuid, available_only: bool) -> Result<Vec<Product>>;
  async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Option<Product>>;
  async fn delete_product(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
  async fn cart_items(&self, user_id: Uuid) -> Result<Vec<CartItem>>;
  /// Inserts the line or adds to its quantity, keeping the first price snapshot.
  async fn add_cart_item(&self, item: NewCartItem) -> Result<CartItem>;
  /// Sets the quantity; 0 removes the line. `false` when the line does not exist.
  async fn set_cart_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<bool>;
  async fn remove_cart_item(&self, user_id: Uuid, product_id: Uuid) -> Result<bool>;
  async fn clear_cart(&self, user_id: Uuid) -> Result<u64>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Inserts the order with its items and removes exactly those lines from the customer's cart.
  async fn place_order(&self, order: NewOrder) -> Result<Order>;
  async fn find_order(&self, id: Uuid) -> Result<Option<Order>>;
  /// Newest first.
  async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>>;
  /// Moves the order to `to` only if it is still in `expected`, bumping its
  /// version and applying the rider bookkeeping of the move. `None` when the
  /// order changed underneath the caller.
  async fn transition_order(&self, id: Uuid, expected: OrderStatus, to: OrderStatus) -> Result<Option<Order>>;
  /// Assigns a `ready`, unassigned order to the rider. `None` when another
  /// rider got there first or the order is no longer ready.
  async fn assign_rider(&self, order_id: Uuid, rider_id: Uuid) -> Result<Option<Order>>;
  async fn available_orders(&self) -> Result<Vec<Order>>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
  /// Each write below also refreshes the restaurant's rating summary.
  async fn create_review(&self, review: NewReview) -> Result<Review>;
  async fn find_review(&self, id: Uuid) -> Result<Option<Review>>;
  async fn list_reviews(&self, restaurant_id: Uuid) -> Result<Vec<Review>>;
  async fn update_review(&self, id: Uuid, update: ReviewUpdate) -> Result<Option<Review>>;
  async fn delete_review(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait RiderStore: Send + Sync {
  async fn rider_profile(&self, user_id: Uuid) -> Result<Option<RiderProfile>>;
  async fn update_presence(&self, user_id: Uuid, update: PresenceUpdate) -> Result<Option<RiderProfile>>;
  async fn list_riders(&self) -> Result<Vec<RiderProfile>>;
}

#[async_trait]
pub trait AnalyticsStore: Send + Sync {
  async fn dashboard_stats(&self, top: i64, recent: i64) -> Result<DashboardStats>;
}

/// The full storage surface the application needs.
#[async_trait]
pub trait Repository:
  UserStore + RestaurantStore + ProductStore + CartStore + OrderStore + ReviewStore + RiderStore + AnalyticsStore
{
  fn backend_name(&self) -> &'static str;

  /// Cheap connectivity check for the health endpoint.
  async fn ping(&self) -> Result<()>;
}
