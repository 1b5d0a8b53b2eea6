// server/src/pipelines/contexts.rs

//! Data structs the workflows run over. Handlers wrap them in
//! `tiffin_core::ContextData` and read the outcome back after the run.

use crate::models::{CartItem, NewRestaurant, Order, Product, Restaurant, User};
use crate::state::AppState;
use tiffin_core::{OrderStatus, PriceBreakdown, Role};
use uuid::Uuid;

/// Who is acting, as resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
  pub id: Uuid,
  pub role: Role,
}

#[derive(Clone)]
pub struct RegisterCtxData {
  pub app_state: AppState,
  pub name: String,
  pub email: String,
  pub password: String,
  pub phone: Option<String>,
  pub address: Option<String>,
  pub role: Role,
  pub restaurant: Option<NewRestaurant>,
  /// Base64 licence image, riders only.
  pub license_image: Option<String>,
  pub license_url: Option<String>,
  pub created_user: Option<User>,
}

#[derive(Clone)]
pub struct LoginCtxData {
  pub app_state: AppState,
  pub email: String,
  pub password: String,
  pub user: Option<User>,
  pub token: Option<String>,
}

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub product: Option<Product>,
  pub cart_item: Option<CartItem>,
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub user_id: Uuid,
  pub delivery_address: String,
  pub payment_method: String,
  pub notes: Option<String>,
  pub items: Vec<CartItem>,
  pub restaurant: Option<Restaurant>,
  pub pricing: Option<PriceBreakdown>,
  pub order: Option<Order>,
}

#[derive(Clone)]
pub struct OrderStatusCtxData {
  pub app_state: AppState,
  pub actor: Actor,
  pub order_id: Uuid,
  pub target: OrderStatus,
  pub order: Option<Order>,
  pub updated: Option<Order>,
}
