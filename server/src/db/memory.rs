// server/src/db/memory.rs

//! In-process repository. All tables sit behind one lock, so every method is
//! a single critical section and the multi-record writes are atomic the same
//! way the Postgres transactions are. The lock is never held across `.await`.

use crate::db::{
  AnalyticsStore, CartStore, OrderStore, ProductStore, Repository, RestaurantStore, ReviewStore, RiderStore, UserStore,
};
use crate::errors::{AppError, Result};
use crate::models::{
  CartItem, DashboardStats, NewAccount, NewCartItem, NewOrder, NewProduct, NewReview, Order, OrderFilter, OrderScope,
  PresenceUpdate, Product, ProductUpdate, ProfileUpdate, RecentOrder, Restaurant, RestaurantUpdate, Review,
  ReviewUpdate, RiderProfile, TopRestaurant, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tiffin_core::domain::analytics::{rank_restaurants, summarize_orders, OrderFact, Ratios, UserCounts};
use tiffin_core::domain::{cart, RatingSummary, TransitionEffects};
use tiffin_core::{OrderStatus, RiderStatus, Role};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct RiderRow {
  status: RiderStatus,
  latitude: Option<f64>,
  longitude: Option<f64>,
  active_deliveries: i32,
  total_deliveries: i32,
  updated_at: DateTime<Utc>,
}

impl RiderRow {
  fn new() -> Self {
    RiderRow {
      status: RiderStatus::Offline,
      latitude: None,
      longitude: None,
      active_deliveries: 0,
      total_deliveries: 0,
      updated_at: Utc::now(),
    }
  }
}

#[derive(Default)]
struct Tables {
  users: HashMap<Uuid, User>,
  /// `is_approved` is filled from the owner on every read.
  restaurants: HashMap<Uuid, Restaurant>,
  products: HashMap<Uuid, Product>,
  /// Per customer, in insertion order.
  carts: HashMap<Uuid, Vec<CartItem>>,
  /// Oldest first.
  orders: Vec<Order>,
  /// `user_name` is filled from the author on every read.
  reviews: HashMap<Uuid, Review>,
  riders: HashMap<Uuid, RiderRow>,
}

impl Tables {
  fn restaurant_view(&self, restaurant: &Restaurant) -> Restaurant {
    let mut view = restaurant.clone();
    view.is_approved = self.users.get(&restaurant.owner_id).is_some_and(|u| u.is_approved);
    view
  }

  fn review_view(&self, review: &Review) -> Review {
    let mut view = review.clone();
    if let Some(author) = self.users.get(&review.user_id) {
      view.user_name = author.name.clone();
    }
    view
  }

  fn rider_view(&self, user_id: Uuid) -> Option<RiderProfile> {
    let user = self.users.get(&user_id)?;
    let row = self.riders.get(&user_id)?;
    Some(RiderProfile {
      user_id,
      name: user.name.clone(),
      phone: user.phone.clone(),
      is_approved: user.is_approved,
      license_url: user.license_url.clone(),
      status: row.status,
      latitude: row.latitude,
      longitude: row.longitude,
      active_deliveries: row.active_deliveries,
      total_deliveries: row.total_deliveries,
      updated_at: row.updated_at,
    })
  }

  fn refresh_rating(&mut self, restaurant_id: Uuid) {
    let summary = RatingSummary::from_ratings(
      self
        .reviews
        .values()
        .filter(|r| r.restaurant_id == restaurant_id)
        .map(|r| r.rating),
    );
    if let Some(restaurant) = self.restaurants.get_mut(&restaurant_id) {
      restaurant.rating = summary.rating;
      restaurant.total_reviews = summary.total_reviews;
      restaurant.updated_at = Utc::now();
    }
  }

  fn release_rider(&mut self, rider_id: Uuid, effects: TransitionEffects) {
    if let Some(row) = self.riders.get_mut(&rider_id) {
      if effects.release_rider {
        row.active_deliveries = (row.active_deliveries - 1).max(0);
      }
      if effects.credit_rider {
        row.total_deliveries += 1;
      }
      row.updated_at = Utc::now();
    }
  }

  /// Removes a restaurant and everything hanging off it.
  fn drop_restaurant(&mut self, restaurant_id: Uuid) {
    self.restaurants.remove(&restaurant_id);
    self.products.retain(|_, p| p.restaurant_id != restaurant_id);
    for lines in self.carts.values_mut() {
      lines.retain(|l| l.restaurant_id != restaurant_id);
    }
    self.reviews.retain(|_, r| r.restaurant_id != restaurant_id);
    let mut released = Vec::new();
    self.orders.retain(|o| {
      if o.restaurant_id != restaurant_id {
        return true;
      }
      if let (Some(rider_id), false) = (o.rider_id, o.status.is_terminal()) {
        released.push(rider_id);
      }
      false
    });
    for rider_id in released {
      self.release_rider(rider_id, TransitionEffects::of(OrderStatus::Cancelled, true));
    }
  }
}

/// Process-local [`Repository`]. Clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryRepository {
  tables: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
  pub fn new() -> Self {
    Self::default()
  }
}

fn page(limit: i64) -> usize {
  usize::try_from(limit).unwrap_or(0)
}

#[async_trait]
impl UserStore for MemoryRepository {
  async fn create_account(&self, account: NewAccount) -> Result<User> {
    let NewAccount { user, restaurant } = account;
    let mut tables = self.tables.write();
    if tables.users.values().any(|u| u.email == user.email) {
      return Err(AppError::Conflict(
        "A record with the same unique value already exists.".to_string(),
      ));
    }

    let now = Utc::now();
    let created = User {
      id: Uuid::new_v4(),
      name: user.name,
      email: user.email,
      password_hash: user.password_hash,
      phone: user.phone,
      address: user.address,
      role: user.role,
      is_approved: user.role.approved_on_signup(),
      is_active: true,
      license_url: user.license_url,
      created_at: now,
      updated_at: now,
    };

    if let Some(restaurant) = restaurant {
      let id = Uuid::new_v4();
      tables.restaurants.insert(
        id,
        Restaurant {
          id,
          owner_id: created.id,
          name: restaurant.name,
          description: restaurant.description,
          address: restaurant.address,
          cuisine: restaurant.cuisine,
          phone: restaurant.phone,
          image_url: None,
          is_active: true,
          is_approved: false,
          rating: 0.0,
          total_reviews: 0,
          delivery_time_minutes: 30,
          minimum_order_cents: 0,
          created_at: now,
          updated_at: now,
        },
      );
    }
    if created.role == Role::Rider {
      tables.riders.insert(created.id, RiderRow::new());
    }
    tables.users.insert(created.id, created.clone());
    Ok(created)
  }

  async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
    Ok(self.tables.read().users.get(&id).cloned())
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    Ok(self.tables.read().users.values().find(|u| u.email == email).cloned())
  }

  async fn email_exists(&self, email: &str) -> Result<bool> {
    Ok(self.tables.read().users.values().any(|u| u.email == email))
  }

  async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
    let tables = self.tables.read();
    let mut users: Vec<User> = tables
      .users
      .values()
      .filter(|u| role.map_or(true, |r| u.role == r))
      .cloned()
      .collect();
    users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(users)
  }

  async fn approve_user(&self, id: Uuid) -> Result<Option<User>> {
    let mut tables = self.tables.write();
    Ok(tables.users.get_mut(&id).map(|user| {
      user.is_approved = true;
      user.updated_at = Utc::now();
      user.clone()
    }))
  }

  async fn set_user_active(&self, id: Uuid, is_active: bool) -> Result<Option<User>> {
    let mut tables = self.tables.write();
    Ok(tables.users.get_mut(&id).map(|user| {
      user.is_active = is_active;
      user.updated_at = Utc::now();
      user.clone()
    }))
  }

  async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>> {
    let mut tables = self.tables.write();
    Ok(tables.users.get_mut(&id).map(|user| {
      if let Some(name) = update.name {
        user.name = name;
      }
      if update.phone.is_some() {
        user.phone = update.phone;
      }
      if update.address.is_some() {
        user.address = update.address;
      }
      user.updated_at = Utc::now();
      user.clone()
    }))
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    if tables.users.remove(&id).is_none() {
      return Ok(false);
    }

    let owned: Vec<Uuid> = tables
      .restaurants
      .values()
      .filter(|r| r.owner_id == id)
      .map(|r| r.id)
      .collect();
    for restaurant_id in owned {
      tables.drop_restaurant(restaurant_id);
    }

    let mut reviewed: Vec<Uuid> = tables
      .reviews
      .values()
      .filter(|r| r.user_id == id)
      .map(|r| r.restaurant_id)
      .collect();
    reviewed.sort();
    reviewed.dedup();
    tables.reviews.retain(|_, r| r.user_id != id);
    for restaurant_id in reviewed {
      tables.refresh_rating(restaurant_id);
    }

    tables.carts.remove(&id);
    tables.riders.remove(&id);
    let mut released = Vec::new();
    tables.orders.retain(|o| {
      if o.user_id != id {
        return true;
      }
      if let (Some(rider_id), false) = (o.rider_id, o.status.is_terminal()) {
        released.push(rider_id);
      }
      false
    });
    for rider_id in released {
      tables.release_rider(rider_id, TransitionEffects::of(OrderStatus::Cancelled, true));
    }
    for order in tables.orders.iter_mut().filter(|o| o.rider_id == Some(id)) {
      order.rider_id = None;
    }
    Ok(true)
  }
}

#[async_trait]
impl RestaurantStore for MemoryRepository {
  async fn list_restaurants(&self, open_only: bool) -> Result<Vec<Restaurant>> {
    let tables = self.tables.read();
    let mut restaurants: Vec<Restaurant> = tables
      .restaurants
      .values()
      .map(|r| tables.restaurant_view(r))
      .filter(|r| !open_only || r.is_open_for_orders())
      .collect();
    restaurants.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.name.cmp(&b.name)));
    Ok(restaurants)
  }

  async fn find_restaurant(&self, id: Uuid) -> Result<Option<Restaurant>> {
    let tables = self.tables.read();
    Ok(tables.restaurants.get(&id).map(|r| tables.restaurant_view(r)))
  }

  async fn find_restaurant_by_owner(&self, owner_id: Uuid) -> Result<Option<Restaurant>> {
    let tables = self.tables.read();
    Ok(
      tables
        .restaurants
        .values()
        .find(|r| r.owner_id == owner_id)
        .map(|r| tables.restaurant_view(r)),
    )
  }

  async fn update_restaurant(&self, id: Uuid, update: RestaurantUpdate) -> Result<Option<Restaurant>> {
    let mut tables = self.tables.write();
    let Some(restaurant) = tables.restaurants.get_mut(&id) else {
      return Ok(None);
    };
    if let Some(name) = update.name {
      restaurant.name = name;
    }
    if update.description.is_some() {
      restaurant.description = update.description;
    }
    if let Some(address) = update.address {
      restaurant.address = address;
    }
    if update.cuisine.is_some() {
      restaurant.cuisine = update.cuisine;
    }
    if update.phone.is_some() {
      restaurant.phone = update.phone;
    }
    if update.image_url.is_some() {
      restaurant.image_url = update.image_url;
    }
    if let Some(is_active) = update.is_active {
      restaurant.is_active = is_active;
    }
    if let Some(minutes) = update.delivery_time_minutes {
      restaurant.delivery_time_minutes = minutes;
    }
    if let Some(minimum) = update.minimum_order_cents {
      restaurant.minimum_order_cents = minimum;
    }
    restaurant.updated_at = Utc::now();
    let snapshot = restaurant.clone();
    Ok(Some(tables.restaurant_view(&snapshot)))
  }
}

#[async_trait]
impl ProductStore for MemoryRepository {
  async fn create_product(&self, product: NewProduct) -> Result<Product> {
    let mut tables = self.tables.write();
    if !tables.restaurants.contains_key(&product.restaurant_id) {
      return Err(AppError::NotFound("Restaurant not found.".to_string()));
    }
    let now = Utc::now();
    let created = Product {
      id: Uuid::new_v4(),
      restaurant_id: product.restaurant_id,
      name: product.name,
      description: product.description,
      price_cents: product.price_cents,
      category: product.category,
      image_url: product.image_url,
      is_available: product.is_available,
      is_vegetarian: product.is_vegetarian,
      preparation_time_minutes: product.preparation_time_minutes,
      created_at: now,
      updated_at: now,
    };
    tables.products.insert(created.id, created.clone());
    Ok(created)
  }

  async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
    Ok(self.tables.read().products.get(&id).cloned())
  }

  async fn list_products(&self, restaurant_id: Uuid, available_only: bool) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    let mut products: Vec<Product> = tables
      .products
      .values()
      .filter(|p| p.restaurant_id == restaurant_id && (!available_only || p.is_available))
      .cloned()
      .collect();
    products.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
    Ok(products)
  }

  async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Option<Product>> {
    let mut tables = self.tables.write();
    Ok(tables.products.get_mut(&id).map(|product| {
      if let Some(name) = update.name {
        product.name = name;
      }
      if update.description.is_some() {
        product.description = update.description;
      }
      if let Some(price) = update.price_cents {
        product.price_cents = price;
      }
      if update.category.is_some() {
        product.category = update.category;
      }
      if update.image_url.is_some() {
        product.image_url = update.image_url;
      }
      if let Some(available) = update.is_available {
        product.is_available = available;
      }
      if let Some(vegetarian) = update.is_vegetarian {
        product.is_vegetarian = vegetarian;
      }
      if let Some(minutes) = update.preparation_time_minutes {
        product.preparation_time_minutes = minutes;
      }
      product.updated_at = Utc::now();
      product.clone()
    }))
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    if tables.products.remove(&id).is_none() {
      return Ok(false);
    }
    for lines in tables.carts.values_mut() {
      lines.retain(|l| l.product_id != id);
    }
    Ok(true)
  }
}

#[async_trait]
impl CartStore for MemoryRepository {
  async fn cart_items(&self, user_id: Uuid) -> Result<Vec<CartItem>> {
    Ok(self.tables.read().carts.get(&user_id).cloned().unwrap_or_default())
  }

  async fn add_cart_item(&self, item: NewCartItem) -> Result<CartItem> {
    let mut tables = self.tables.write();
    let lines = tables.carts.entry(item.user_id).or_default();
    if let Some(line) = lines.iter_mut().find(|l| l.product_id == item.product_id) {
      line.quantity = cart::combined_quantity(line.quantity, item.quantity)?;
      return Ok(line.clone());
    }
    let line = CartItem {
      user_id: item.user_id,
      product_id: item.product_id,
      restaurant_id: item.restaurant_id,
      name: item.name,
      price_cents: item.price_cents,
      quantity: item.quantity,
      added_at: Utc::now(),
    };
    lines.push(line.clone());
    Ok(line)
  }

  async fn set_cart_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<bool> {
    let mut tables = self.tables.write();
    let Some(lines) = tables.carts.get_mut(&user_id) else {
      return Ok(false);
    };
    let Some(index) = lines.iter().position(|l| l.product_id == product_id) else {
      return Ok(false);
    };
    if quantity == 0 {
      lines.remove(index);
    } else {
      lines[index].quantity = quantity;
    }
    Ok(true)
  }

  async fn remove_cart_item(&self, user_id: Uuid, product_id: Uuid) -> Result<bool> {
    self.set_cart_quantity(user_id, product_id, 0).await
  }

  async fn clear_cart(&self, user_id: Uuid) -> Result<u64> {
    let removed = self.tables.write().carts.remove(&user_id);
    Ok(removed.map_or(0, |lines| lines.len() as u64))
  }
}

#[async_trait]
impl OrderStore for MemoryRepository {
  async fn place_order(&self, order: NewOrder) -> Result<Order> {
    let mut tables = self.tables.write();
    let now = Utc::now();
    let placed = Order {
      id: Uuid::new_v4(),
      user_id: order.user_id,
      restaurant_id: order.restaurant_id,
      rider_id: None,
      items: order.items,
      delivery_address: order.delivery_address,
      payment_method: order.payment_method,
      notes: order.notes,
      subtotal_cents: order.pricing.subtotal_cents,
      delivery_fee_cents: order.pricing.delivery_fee_cents,
      service_fee_cents: order.pricing.service_fee_cents,
      total_cents: order.pricing.total_cents,
      status: OrderStatus::Pending,
      version: 0,
      created_at: now,
      updated_at: now,
      delivered_at: None,
    };
    tables.orders.push(placed.clone());
    if let Some(lines) = tables.carts.get_mut(&order.user_id) {
      lines.retain(|l| !placed.items.iter().any(|i| i.product_id == l.product_id));
      if lines.is_empty() {
        tables.carts.remove(&order.user_id);
      }
    }
    Ok(placed)
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    Ok(self.tables.read().orders.iter().find(|o| o.id == id).cloned())
  }

  async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    let in_scope = |o: &&Order| match filter.scope {
      OrderScope::All => true,
      OrderScope::Customer(id) => o.user_id == id,
      OrderScope::Restaurant(id) => o.restaurant_id == id,
      OrderScope::Rider(id) => o.rider_id == Some(id),
    };
    Ok(
      tables
        .orders
        .iter()
        .rev()
        .filter(in_scope)
        .filter(|o| filter.status.map_or(true, |s| o.status == s))
        .take(page(filter.limit))
        .cloned()
        .collect(),
    )
  }

  async fn transition_order(&self, id: Uuid, expected: OrderStatus, to: OrderStatus) -> Result<Option<Order>> {
    let mut tables = self.tables.write();
    let Some(order) = tables.orders.iter_mut().find(|o| o.id == id && o.status == expected) else {
      return Ok(None);
    };
    let now = Utc::now();
    let effects = TransitionEffects::of(to, order.rider_id.is_some());
    order.status = to;
    order.version += 1;
    order.updated_at = now;
    if effects.mark_delivered {
      order.delivered_at = Some(now);
    }
    let updated = order.clone();
    if let Some(rider_id) = updated.rider_id {
      tables.release_rider(rider_id, effects);
    }
    Ok(Some(updated))
  }

  async fn assign_rider(&self, order_id: Uuid, rider_id: Uuid) -> Result<Option<Order>> {
    let mut tables = self.tables.write();
    let Some(order) = tables
      .orders
      .iter_mut()
      .find(|o| o.id == order_id && o.status == OrderStatus::Ready && o.rider_id.is_none())
    else {
      return Ok(None);
    };
    order.rider_id = Some(rider_id);
    order.version += 1;
    order.updated_at = Utc::now();
    let assigned = order.clone();
    if let Some(row) = tables.riders.get_mut(&rider_id) {
      row.active_deliveries += 1;
      row.updated_at = Utc::now();
    }
    Ok(Some(assigned))
  }

  async fn available_orders(&self) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    Ok(
      tables
        .orders
        .iter()
        .filter(|o| o.status == OrderStatus::Ready && o.rider_id.is_none())
        .cloned()
        .collect(),
    )
  }
}

#[async_trait]
impl ReviewStore for MemoryRepository {
  async fn create_review(&self, review: NewReview) -> Result<Review> {
    let mut tables = self.tables.write();
    if !tables.restaurants.contains_key(&review.restaurant_id) {
      return Err(AppError::NotFound("Restaurant not found.".to_string()));
    }
    if tables
      .reviews
      .values()
      .any(|r| r.restaurant_id == review.restaurant_id && r.user_id == review.user_id)
    {
      return Err(AppError::Conflict(
        "A record with the same unique value already exists.".to_string(),
      ));
    }
    let now = Utc::now();
    let created = Review {
      id: Uuid::new_v4(),
      restaurant_id: review.restaurant_id,
      user_id: review.user_id,
      user_name: String::new(),
      rating: review.rating,
      comment: review.comment,
      created_at: now,
      updated_at: now,
    };
    tables.reviews.insert(created.id, created.clone());
    tables.refresh_rating(created.restaurant_id);
    Ok(tables.review_view(&created))
  }

  async fn find_review(&self, id: Uuid) -> Result<Option<Review>> {
    let tables = self.tables.read();
    Ok(tables.reviews.get(&id).map(|r| tables.review_view(r)))
  }

  async fn list_reviews(&self, restaurant_id: Uuid) -> Result<Vec<Review>> {
    let tables = self.tables.read();
    let mut reviews: Vec<Review> = tables
      .reviews
      .values()
      .filter(|r| r.restaurant_id == restaurant_id)
      .map(|r| tables.review_view(r))
      .collect();
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(reviews)
  }

  async fn update_review(&self, id: Uuid, update: ReviewUpdate) -> Result<Option<Review>> {
    let mut tables = self.tables.write();
    let Some(review) = tables.reviews.get_mut(&id) else {
      return Ok(None);
    };
    if let Some(rating) = update.rating {
      review.rating = rating;
    }
    if update.comment.is_some() {
      review.comment = update.comment;
    }
    review.updated_at = Utc::now();
    let updated = review.clone();
    tables.refresh_rating(updated.restaurant_id);
    Ok(Some(tables.review_view(&updated)))
  }

  async fn delete_review(&self, id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    match tables.reviews.remove(&id) {
      Some(removed) => {
        tables.refresh_rating(removed.restaurant_id);
        Ok(true)
      }
      None => Ok(false),
    }
  }
}

#[async_trait]
impl RiderStore for MemoryRepository {
  async fn rider_profile(&self, user_id: Uuid) -> Result<Option<RiderProfile>> {
    Ok(self.tables.read().rider_view(user_id))
  }

  async fn update_presence(&self, user_id: Uuid, update: PresenceUpdate) -> Result<Option<RiderProfile>> {
    let mut tables = self.tables.write();
    let Some(row) = tables.riders.get_mut(&user_id) else {
      return Ok(None);
    };
    row.status = update.status;
    if let Some(point) = update.location {
      row.latitude = Some(point.latitude);
      row.longitude = Some(point.longitude);
    }
    row.updated_at = Utc::now();
    Ok(tables.rider_view(user_id))
  }

  async fn list_riders(&self) -> Result<Vec<RiderProfile>> {
    let tables = self.tables.read();
    let mut riders: Vec<RiderProfile> = tables.riders.keys().filter_map(|id| tables.rider_view(*id)).collect();
    riders.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(riders)
  }
}

#[async_trait]
impl AnalyticsStore for MemoryRepository {
  async fn dashboard_stats(&self, top: i64, recent: i64) -> Result<DashboardStats> {
    let tables = self.tables.read();

    let mut users = UserCounts::default();
    for user in tables.users.values() {
      users.add(user.role, 1);
      if user.standing().needs_approval() {
        users.pending_approvals += 1;
      }
    }

    let facts: Vec<OrderFact> = tables
      .orders
      .iter()
      .map(|o| OrderFact {
        restaurant_id: o.restaurant_id,
        status: o.status,
        total_cents: o.total_cents,
        service_fee_cents: o.service_fee_cents,
      })
      .collect();
    let orders = summarize_orders(&facts);

    let restaurant_name = |id: Uuid| tables.restaurants.get(&id).map(|r| r.name.clone()).unwrap_or_default();
    let top_restaurants = rank_restaurants(&facts, page(top))
      .into_iter()
      .map(|rank| TopRestaurant {
        restaurant_id: rank.restaurant_id,
        name: restaurant_name(rank.restaurant_id),
        order_count: rank.order_count,
        revenue_cents: rank.revenue_cents,
      })
      .collect();

    let recent_orders = tables
      .orders
      .iter()
      .rev()
      .take(page(recent))
      .map(|o| RecentOrder {
        id: o.id,
        user_id: o.user_id,
        customer_name: tables.users.get(&o.user_id).map(|u| u.name.clone()).unwrap_or_default(),
        restaurant_id: o.restaurant_id,
        restaurant_name: restaurant_name(o.restaurant_id),
        status: o.status,
        total_cents: o.total_cents,
        created_at: o.created_at,
      })
      .collect();

    let total_users = users.total();
    Ok(DashboardStats {
      users,
      total_users,
      total_restaurants: tables.restaurants.len() as i64,
      ratios: Ratios::compute(&orders, total_users),
      orders,
      top_restaurants,
      recent_orders,
    })
  }
}

#[async_trait]
impl Repository for MemoryRepository {
  fn backend_name(&self) -> &'static str {
    "memory"
  }

  async fn ping(&self) -> Result<()> {
    Ok(())
  }
}
