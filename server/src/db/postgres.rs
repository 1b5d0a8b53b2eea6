// server/src/db/postgres.rs

use crate::config::AppConfig;
use crate::db::{
  AnalyticsStore, CartStore, OrderStore, ProductStore, Repository, RestaurantStore, ReviewStore, RiderStore, UserStore,
};
use crate::errors::{AppError, Result};
use crate::models::{
  CartItem, DashboardStats, NewAccount, NewCartItem, NewOrder, NewProduct, NewReview, Order, OrderFilter, OrderItem,
  OrderScope, PresenceUpdate, Product, ProductUpdate, ProfileUpdate, RecentOrder, Restaurant, RestaurantUpdate, Review,
  ReviewUpdate, RiderProfile, TopRestaurant, User,
};
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgConnection, PgPool};
use std::collections::HashMap;
use tiffin_core::domain::analytics::{OrderTotals, Ratios, UserCounts};
use tiffin_core::domain::cart::MAX_LINE_QUANTITY;
use tiffin_core::domain::TransitionEffects;
use tiffin_core::{OrderStatus, Role};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const USER_COLUMNS: &str =
  "id, name, email, password_hash, phone, address, role, is_approved, is_active, license_url, created_at, updated_at";

const RESTAURANT_SELECT: &str = "SELECT r.id, r.owner_id, r.name, r.description, r.address, r.cuisine, r.phone, \
  r.image_url, r.is_active, u.is_approved, r.rating, r.total_reviews, r.delivery_time_minutes, \
  r.minimum_order_cents, r.created_at, r.updated_at FROM restaurants r JOIN users u ON u.id = r.owner_id";

const PRODUCT_COLUMNS: &str = "id, restaurant_id, name, description, price_cents, category, image_url, is_available, \
  is_vegetarian, preparation_time_minutes, created_at, updated_at";

const CART_COLUMNS: &str = "user_id, product_id, restaurant_id, name, price_cents, quantity, added_at";

const ORDER_COLUMNS: &str = "id, user_id, restaurant_id, rider_id, delivery_address, payment_method, notes, \
  subtotal_cents, delivery_fee_cents, service_fee_cents, total_cents, status, version, created_at, updated_at, \
  delivered_at";

const REVIEW_SELECT: &str = "SELECT rv.id, rv.restaurant_id, rv.user_id, u.name AS user_name, rv.rating, rv.comment, \
  rv.created_at, rv.updated_at FROM reviews rv JOIN users u ON u.id = rv.user_id";

const RIDER_SELECT: &str = "SELECT p.user_id, u.name, u.phone, u.is_approved, u.license_url, p.status, p.latitude, \
  p.longitude, p.active_deliveries, p.total_deliveries, p.updated_at FROM rider_profiles p \
  JOIN users u ON u.id = p.user_id";

#[derive(FromRow)]
struct OrderItemRow {
  order_id: Uuid,
  product_id: Uuid,
  name: String,
  quantity: i32,
  price_cents: i64,
}

#[derive(FromRow)]
struct StatusRow {
  status: OrderStatus,
  order_count: i64,
  total_cents: i64,
  service_fee_cents: i64,
}

#[derive(Clone)]
pub struct PgRepository {
  pool: PgPool,
}

impl PgRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Opens the pool with the configured limits and, unless disabled, applies
  /// the embedded migrations.
  pub async fn connect(config: &AppConfig) -> Result<Self> {
    let url = config
      .database_url
      .as_deref()
      .ok_or_else(|| AppError::Config("DATABASE_URL is not set".to_string()))?;
    let pool = PgPoolOptions::new()
      .max_connections(config.db_max_connections)
      .acquire_timeout(config.db_acquire_timeout)
      .connect(url)
      .await?;
    info!(max_connections = config.db_max_connections, "Connected to the database.");

    if config.run_migrations {
      sqlx::migrate!("./migrations").run(&pool).await?;
      info!("Database migrations applied.");
    }
    Ok(Self::new(pool))
  }

  pub fn pool(&self) -> &PgPool {
    &self.pool
  }

  async fn attach_items(&self, orders: &mut [Order]) -> Result<()> {
    if orders.is_empty() {
      return Ok(());
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let rows = sqlx::query_as::<_, OrderItemRow>(
      "SELECT order_id, product_id, name, quantity, price_cents FROM order_items \
       WHERE order_id = ANY($1) ORDER BY order_id, position",
    )
    .bind(ids)
    .fetch_all(&self.pool)
    .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for row in rows {
      by_order.entry(row.order_id).or_default().push(OrderItem {
        product_id: row.product_id,
        name: row.name,
        quantity: row.quantity,
        price_cents: row.price_cents,
      });
    }
    for order in orders.iter_mut() {
      order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(())
  }

  async fn with_items(&self, order: Option<Order>) -> Result<Option<Order>> {
    match order {
      Some(order) => {
        let mut one = [order];
        self.attach_items(&mut one).await?;
        let [order] = one;
        Ok(Some(order))
      }
      None => Ok(None),
    }
  }
}

/// Recomputes a restaurant's rating summary from its reviews.
async fn refresh_rating(conn: &mut PgConnection, restaurant_id: Uuid) -> Result<()> {
  sqlx::query(
    "UPDATE restaurants SET \
       rating = COALESCE((SELECT ROUND(AVG(rating)::numeric, 1)::float8 FROM reviews WHERE restaurant_id = $1), 0), \
       total_reviews = (SELECT COUNT(*)::int FROM reviews WHERE restaurant_id = $1), \
       updated_at = now() \
     WHERE id = $1",
  )
  .bind(restaurant_id)
  .execute(conn)
  .await?;
  Ok(())
}

#[async_trait]
impl UserStore for PgRepository {
  #[instrument(name = "pg::create_account", skip_all, fields(role = %account.user.role))]
  async fn create_account(&self, account: NewAccount) -> Result<User> {
    let NewAccount { user, restaurant } = account;
    let mut tx = self.pool.begin().await?;

    let created = sqlx::query_as::<_, User>(&format!(
      "INSERT INTO users (id, name, email, password_hash, phone, address, role, is_approved, license_url) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
      USER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.phone)
    .bind(&user.address)
    .bind(user.role)
    .bind(user.role.approved_on_signup())
    .bind(&user.license_url)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(restaurant) = restaurant {
      sqlx::query(
        "INSERT INTO restaurants (id, owner_id, name, description, address, cuisine, phone) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
      )
      .bind(Uuid::new_v4())
      .bind(created.id)
      .bind(&restaurant.name)
      .bind(&restaurant.description)
      .bind(&restaurant.address)
      .bind(&restaurant.cuisine)
      .bind(&restaurant.phone)
      .execute(&mut *tx)
      .await?;
    }

    if created.role == Role::Rider {
      sqlx::query("INSERT INTO rider_profiles (user_id) VALUES ($1)")
        .bind(created.id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!(user_id = %created.id, "Account created.");
    Ok(created)
  }

  async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
      .bind(email)
      .fetch_optional(&self.pool)
      .await?;
    Ok(user)
  }

  async fn email_exists(&self, email: &str) -> Result<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
      .bind(email)
      .fetch_one(&self.pool)
      .await?;
    Ok(exists)
  }

  async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
      "SELECT {} FROM users WHERE ($1::user_role IS NULL OR role = $1) ORDER BY created_at DESC",
      USER_COLUMNS
    ))
    .bind(role)
    .fetch_all(&self.pool)
    .await?;
    Ok(users)
  }

  #[instrument(name = "pg::approve_user", skip(self))]
  async fn approve_user(&self, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
      "UPDATE users SET is_approved = TRUE, updated_at = now() WHERE id = $1 RETURNING {}",
      USER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(user)
  }

  async fn set_user_active(&self, id: Uuid, is_active: bool) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
      "UPDATE users SET is_active = $2, updated_at = now() WHERE id = $1 RETURNING {}",
      USER_COLUMNS
    ))
    .bind(id)
    .bind(is_active)
    .fetch_optional(&self.pool)
    .await?;
    Ok(user)
  }

  async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
      "UPDATE users SET name = COALESCE($2, name), phone = COALESCE($3, phone), \
       address = COALESCE($4, address), updated_at = now() WHERE id = $1 RETURNING {}",
      USER_COLUMNS
    ))
    .bind(id)
    .bind(update.name)
    .bind(update.phone)
    .bind(update.address)
    .fetch_optional(&self.pool)
    .await?;
    Ok(user)
  }

  #[instrument(name = "pg::delete_user", skip(self))]
  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let mut tx = self.pool.begin().await?;
    let reviewed: Vec<Uuid> = sqlx::query_scalar("SELECT DISTINCT restaurant_id FROM reviews WHERE user_id = $1")
      .bind(id)
      .fetch_all(&mut *tx)
      .await?;

    let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
      .bind(id)
      .execute(&mut *tx)
      .await?
      .rows_affected();

    for restaurant_id in reviewed {
      refresh_rating(&mut tx, restaurant_id).await?;
    }
    tx.commit().await?;
    Ok(deleted > 0)
  }
}

#[async_trait]
impl RestaurantStore for PgRepository {
  async fn list_restaurants(&self, open_only: bool) -> Result<Vec<Restaurant>> {
    let restaurants = sqlx::query_as::<_, Restaurant>(&format!(
      "{} WHERE (NOT $1 OR (r.is_active AND u.is_approved)) ORDER BY r.rating DESC, r.name",
      RESTAURANT_SELECT
    ))
    .bind(open_only)
    .fetch_all(&self.pool)
    .await?;
    Ok(restaurants)
  }

  async fn find_restaurant(&self, id: Uuid) -> Result<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!("{} WHERE r.id = $1", RESTAURANT_SELECT))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(restaurant)
  }

  async fn find_restaurant_by_owner(&self, owner_id: Uuid) -> Result<Option<Restaurant>> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!("{} WHERE r.owner_id = $1", RESTAURANT_SELECT))
      .bind(owner_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(restaurant)
  }

  async fn update_restaurant(&self, id: Uuid, update: RestaurantUpdate) -> Result<Option<Restaurant>> {
    let updated = sqlx::query(
      "UPDATE restaurants SET name = COALESCE($2, name), description = COALESCE($3, description), \
       address = COALESCE($4, address), cuisine = COALESCE($5, cuisine), phone = COALESCE($6, phone), \
       image_url = COALESCE($7, image_url), is_active = COALESCE($8, is_active), \
       delivery_time_minutes = COALESCE($9, delivery_time_minutes), \
       minimum_order_cents = COALESCE($10, minimum_order_cents), updated_at = now() \
       WHERE id = $1",
    )
    .bind(id)
    .bind(update.name)
    .bind(update.description)
    .bind(update.address)
    .bind(update.cuisine)
    .bind(update.phone)
    .bind(update.image_url)
    .bind(update.is_active)
    .bind(update.delivery_time_minutes)
    .bind(update.minimum_order_cents)
    .execute(&self.pool)
    .await?
    .rows_affected();
    if updated == 0 {
      return Ok(None);
    }
    self.find_restaurant(id).await
  }
}

#[async_trait]
impl ProductStore for PgRepository {
  async fn create_product(&self, product: NewProduct) -> Result<Product> {
    let created = sqlx::query_as::<_, Product>(&format!(
      "INSERT INTO products (id, restaurant_id, name, description, price_cents, category, image_url, \
       is_available, is_vegetarian, preparation_time_minutes) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(product.restaurant_id)
    .bind(product.name)
    .bind(product.description)
    .bind(product.price_cents)
    .bind(product.category)
    .bind(product.image_url)
    .bind(product.is_available)
    .bind(product.is_vegetarian)
    .bind(product.preparation_time_minutes)
    .fetch_one(&self.pool)
    .await?;
    Ok(created)
  }

  async fn find_product(&self, id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  async fn list_products(&self, restaurant_id: Uuid, available_only: bool) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products WHERE restaurant_id = $1 AND (NOT $2 OR is_available) ORDER BY category, name",
      PRODUCT_COLUMNS
    ))
    .bind(restaurant_id)
    .bind(available_only)
    .fetch_all(&self.pool)
    .await?;
    Ok(products)
  }

  async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
      "UPDATE products SET name = COALESCE($2, name), description = COALESCE($3, description), \
       price_cents = COALESCE($4, price_cents), category = COALESCE($5, category), \
       image_url = COALESCE($6, image_url), is_available = COALESCE($7, is_available), \
       is_vegetarian = COALESCE($8, is_vegetarian), \
       preparation_time_minutes = COALESCE($9, preparation_time_minutes), updated_at = now() \
       WHERE id = $1 RETURNING {}",
      PRODUCT_COLUMNS
    ))
    .bind(id)
    .bind(update.name)
    .bind(update.description)
    .bind(update.price_cents)
    .bind(update.category)
    .bind(update.image_url)
    .bind(update.is_available)
    .bind(update.is_vegetarian)
    .bind(update.preparation_time_minutes)
    .fetch_optional(&self.pool)
    .await?;
    Ok(product)
  }

  async fn delete_product(&self, id: Uuid) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM products WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?
      .rows_affected();
    Ok(deleted > 0)
  }
}

#[async_trait]
impl CartStore for PgRepository {
  async fn cart_items(&self, user_id: Uuid) -> Result<Vec<CartItem>> {
    let items = sqlx::query_as::<_, CartItem>(&format!(
      "SELECT {} FROM cart_items WHERE user_id = $1 ORDER BY added_at",
      CART_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(items)
  }

  async fn add_cart_item(&self, item: NewCartItem) -> Result<CartItem> {
    let stored = sqlx::query_as::<_, CartItem>(&format!(
      "INSERT INTO cart_items (user_id, product_id, restaurant_id, name, price_cents, quantity) \
       VALUES ($1, $2, $3, $4, $5, $6) \
       ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity \
       WHERE cart_items.quantity::BIGINT + EXCLUDED.quantity <= $7 \
       RETURNING {}",
      CART_COLUMNS
    ))
    .bind(item.user_id)
    .bind(item.product_id)
    .bind(item.restaurant_id)
    .bind(item.name)
    .bind(item.price_cents)
    .bind(item.quantity)
    .bind(MAX_LINE_QUANTITY)
    .fetch_optional(&self.pool)
    .await?;
    // no row back means the conflict guard refused the increment
    stored.ok_or_else(|| {
      AppError::Validation(format!(
        "A cart line may hold at most {} of one product.",
        MAX_LINE_QUANTITY
      ))
    })
  }

  async fn set_cart_quantity(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<bool> {
    let query = if quantity == 0 {
      sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
    } else {
      sqlx::query("UPDATE cart_items SET quantity = $3 WHERE user_id = $1 AND product_id = $2")
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
    };
    let affected = query.execute(&self.pool).await?.rows_affected();
    Ok(affected > 0)
  }

  async fn remove_cart_item(&self, user_id: Uuid, product_id: Uuid) -> Result<bool> {
    self.set_cart_quantity(user_id, product_id, 0).await
  }

  async fn clear_cart(&self, user_id: Uuid) -> Result<u64> {
    let cleared = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(user_id)
      .execute(&self.pool)
      .await?
      .rows_affected();
    Ok(cleared)
  }
}

#[async_trait]
impl OrderStore for PgRepository {
  #[instrument(name = "pg::place_order", skip_all, fields(user_id = %order.user_id, restaurant_id = %order.restaurant_id))]
  async fn place_order(&self, order: NewOrder) -> Result<Order> {
    let NewOrder {
      user_id,
      restaurant_id,
      items,
      delivery_address,
      payment_method,
      notes,
      pricing,
    } = order;
    let mut tx = self.pool.begin().await?;

    let mut placed = sqlx::query_as::<_, Order>(&format!(
      "INSERT INTO orders (id, user_id, restaurant_id, delivery_address, payment_method, notes, \
       subtotal_cents, delivery_fee_cents, service_fee_cents, total_cents) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(restaurant_id)
    .bind(delivery_address)
    .bind(payment_method)
    .bind(notes)
    .bind(pricing.subtotal_cents)
    .bind(pricing.delivery_fee_cents)
    .bind(pricing.service_fee_cents)
    .bind(pricing.total_cents)
    .fetch_one(&mut *tx)
    .await?;

    for (position, item) in items.iter().enumerate() {
      sqlx::query(
        "INSERT INTO order_items (order_id, position, product_id, name, quantity, price_cents) \
         VALUES ($1, $2, $3, $4, $5, $6)",
      )
      .bind(placed.id)
      .bind(position as i32)
      .bind(item.product_id)
      .bind(&item.name)
      .bind(item.quantity)
      .bind(item.price_cents)
      .execute(&mut *tx)
      .await?;
    }

    let ordered: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = ANY($2)")
      .bind(user_id)
      .bind(ordered)
      .execute(&mut *tx)
      .await?;

    tx.commit().await?;
    placed.items = items;
    Ok(placed)
  }

  async fn find_order(&self, id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    self.with_items(order).await
  }

  async fn list_orders(&self, filter: OrderFilter) -> Result<Vec<Order>> {
    let (customer, restaurant, rider) = match filter.scope {
      OrderScope::All => (None, None, None),
      OrderScope::Customer(id) => (Some(id), None, None),
      OrderScope::Restaurant(id) => (None, Some(id), None),
      OrderScope::Rider(id) => (None, None, Some(id)),
    };
    let mut orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders \
       WHERE ($1::uuid IS NULL OR user_id = $1) \
         AND ($2::uuid IS NULL OR restaurant_id = $2) \
         AND ($3::uuid IS NULL OR rider_id = $3) \
         AND ($4::order_status IS NULL OR status = $4) \
       ORDER BY created_at DESC LIMIT $5",
      ORDER_COLUMNS
    ))
    .bind(customer)
    .bind(restaurant)
    .bind(rider)
    .bind(filter.status)
    .bind(filter.limit)
    .fetch_all(&self.pool)
    .await?;
    self.attach_items(&mut orders).await?;
    Ok(orders)
  }

  #[instrument(name = "pg::transition_order", skip(self))]
  async fn transition_order(&self, id: Uuid, expected: OrderStatus, to: OrderStatus) -> Result<Option<Order>> {
    let mut tx = self.pool.begin().await?;
    let updated = sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET status = $3, version = version + 1, updated_at = now(), \
       delivered_at = CASE WHEN $4 THEN now() ELSE delivered_at END \
       WHERE id = $1 AND status = $2 RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(id)
    .bind(expected)
    .bind(to)
    .bind(to == OrderStatus::Delivered)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(order) = updated else {
      debug!("Order was not in the expected status, nothing updated.");
      return Ok(None);
    };

    let effects = TransitionEffects::of(to, order.rider_id.is_some());
    if let Some(rider_id) = order.rider_id {
      if effects.release_rider || effects.credit_rider {
        sqlx::query(
          "UPDATE rider_profiles SET active_deliveries = GREATEST(active_deliveries - $2, 0), \
           total_deliveries = total_deliveries + $3, updated_at = now() WHERE user_id = $1",
        )
        .bind(rider_id)
        .bind(i32::from(effects.release_rider))
        .bind(i32::from(effects.credit_rider))
        .execute(&mut *tx)
        .await?;
      }
    }
    tx.commit().await?;
    self.with_items(Some(order)).await
  }

  #[instrument(name = "pg::assign_rider", skip(self))]
  async fn assign_rider(&self, order_id: Uuid, rider_id: Uuid) -> Result<Option<Order>> {
    let mut tx = self.pool.begin().await?;
    let assigned = sqlx::query_as::<_, Order>(&format!(
      "UPDATE orders SET rider_id = $2, version = version + 1, updated_at = now() \
       WHERE id = $1 AND status = 'ready' AND rider_id IS NULL RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(order_id)
    .bind(rider_id)
    .fetch_optional(&mut *tx)
    .await?;

    if assigned.is_none() {
      return Ok(None);
    }
    sqlx::query(
      "UPDATE rider_profiles SET active_deliveries = active_deliveries + 1, updated_at = now() WHERE user_id = $1",
    )
    .bind(rider_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    self.with_items(assigned).await
  }

  async fn available_orders(&self) -> Result<Vec<Order>> {
    let mut orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE status = 'ready' AND rider_id IS NULL ORDER BY created_at",
      ORDER_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await?;
    self.attach_items(&mut orders).await?;
    Ok(orders)
  }
}

#[async_trait]
impl ReviewStore for PgRepository {
  async fn create_review(&self, review: NewReview) -> Result<Review> {
    let mut tx = self.pool.begin().await?;
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO reviews (id, restaurant_id, user_id, rating, comment) VALUES ($1, $2, $3, $4, $5)")
      .bind(id)
      .bind(review.restaurant_id)
      .bind(review.user_id)
      .bind(review.rating)
      .bind(review.comment)
      .execute(&mut *tx)
      .await?;
    refresh_rating(&mut tx, review.restaurant_id).await?;
    tx.commit().await?;

    self
      .find_review(id)
      .await?
      .ok_or_else(|| AppError::Internal("review vanished after insert".to_string()))
  }

  async fn find_review(&self, id: Uuid) -> Result<Option<Review>> {
    let review = sqlx::query_as::<_, Review>(&format!("{} WHERE rv.id = $1", REVIEW_SELECT))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(review)
  }

  async fn list_reviews(&self, restaurant_id: Uuid) -> Result<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(&format!(
      "{} WHERE rv.restaurant_id = $1 ORDER BY rv.created_at DESC",
      REVIEW_SELECT
    ))
    .bind(restaurant_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(reviews)
  }

  async fn update_review(&self, id: Uuid, update: ReviewUpdate) -> Result<Option<Review>> {
    let mut tx = self.pool.begin().await?;
    let restaurant_id: Option<Uuid> = sqlx::query_scalar(
      "UPDATE reviews SET rating = COALESCE($2, rating), comment = COALESCE($3, comment), updated_at = now() \
       WHERE id = $1 RETURNING restaurant_id",
    )
    .bind(id)
    .bind(update.rating)
    .bind(update.comment)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(restaurant_id) = restaurant_id else {
      return Ok(None);
    };
    refresh_rating(&mut tx, restaurant_id).await?;
    tx.commit().await?;
    self.find_review(id).await
  }

  async fn delete_review(&self, id: Uuid) -> Result<bool> {
    let mut tx = self.pool.begin().await?;
    let restaurant_id: Option<Uuid> = sqlx::query_scalar("DELETE FROM reviews WHERE id = $1 RETURNING restaurant_id")
      .bind(id)
      .fetch_optional(&mut *tx)
      .await?;

    let Some(restaurant_id) = restaurant_id else {
      return Ok(false);
    };
    refresh_rating(&mut tx, restaurant_id).await?;
    tx.commit().await?;
    Ok(true)
  }
}

#[async_trait]
impl RiderStore for PgRepository {
  async fn rider_profile(&self, user_id: Uuid) -> Result<Option<RiderProfile>> {
    let profile = sqlx::query_as::<_, RiderProfile>(&format!("{} WHERE p.user_id = $1", RIDER_SELECT))
      .bind(user_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(profile)
  }

  async fn update_presence(&self, user_id: Uuid, update: PresenceUpdate) -> Result<Option<RiderProfile>> {
    let (latitude, longitude) = match update.location {
      Some(point) => (Some(point.latitude), Some(point.longitude)),
      None => (None, None),
    };
    let updated = sqlx::query(
      "UPDATE rider_profiles SET status = $2, latitude = COALESCE($3, latitude), \
       longitude = COALESCE($4, longitude), updated_at = now() WHERE user_id = $1",
    )
    .bind(user_id)
    .bind(update.status)
    .bind(latitude)
    .bind(longitude)
    .execute(&self.pool)
    .await?
    .rows_affected();
    if updated == 0 {
      return Ok(None);
    }
    self.rider_profile(user_id).await
  }

  async fn list_riders(&self) -> Result<Vec<RiderProfile>> {
    let riders = sqlx::query_as::<_, RiderProfile>(&format!("{} ORDER BY u.name", RIDER_SELECT))
      .fetch_all(&self.pool)
      .await?;
    Ok(riders)
  }
}

#[async_trait]
impl AnalyticsStore for PgRepository {
  #[instrument(name = "pg::dashboard_stats", skip(self))]
  async fn dashboard_stats(&self, top: i64, recent: i64) -> Result<DashboardStats> {
    let role_counts: Vec<(Role, i64)> = sqlx::query_as("SELECT role, COUNT(*)::bigint FROM users GROUP BY role")
      .fetch_all(&self.pool)
      .await?;
    let mut users = UserCounts::default();
    for (role, count) in role_counts {
      users.add(role, count);
    }
    users.pending_approvals = sqlx::query_scalar(
      "SELECT COUNT(*)::bigint FROM users WHERE role IN ('restaurant', 'rider') AND NOT is_approved",
    )
    .fetch_one(&self.pool)
    .await?;

    let total_restaurants: i64 = sqlx::query_scalar("SELECT COUNT(*)::bigint FROM restaurants")
      .fetch_one(&self.pool)
      .await?;

    let status_rows = sqlx::query_as::<_, StatusRow>(
      "SELECT status, COUNT(*)::bigint AS order_count, \
       COALESCE(SUM(total_cents), 0)::bigint AS total_cents, \
       COALESCE(SUM(service_fee_cents), 0)::bigint AS service_fee_cents \
       FROM orders GROUP BY status",
    )
    .fetch_all(&self.pool)
    .await?;
    let mut orders = OrderTotals::default();
    for row in status_rows {
      orders.total_orders += row.order_count;
      orders.by_status.add(row.status, row.order_count);
      if row.status.counts_as_revenue() {
        orders.revenue_cents += row.total_cents;
        orders.platform_fees_cents += row.service_fee_cents;
      }
    }

    let top_restaurants = sqlx::query_as::<_, TopRestaurant>(
      "SELECT r.id AS restaurant_id, r.name, COUNT(o.id)::bigint AS order_count, \
       COALESCE(SUM(o.total_cents) FILTER (WHERE o.status = 'delivered'), 0)::bigint AS revenue_cents \
       FROM restaurants r JOIN orders o ON o.restaurant_id = r.id \
       GROUP BY r.id, r.name \
       ORDER BY order_count DESC, revenue_cents DESC, r.id \
       LIMIT $1",
    )
    .bind(top)
    .fetch_all(&self.pool)
    .await?;

    let recent_orders = sqlx::query_as::<_, RecentOrder>(
      "SELECT o.id, o.user_id, u.name AS customer_name, o.restaurant_id, r.name AS restaurant_name, \
       o.status, o.total_cents, o.created_at \
       FROM orders o JOIN users u ON u.id = o.user_id JOIN restaurants r ON r.id = o.restaurant_id \
       ORDER BY o.created_at DESC LIMIT $1",
    )
    .bind(recent)
    .fetch_all(&self.pool)
    .await?;

    let total_users = users.total();
    Ok(DashboardStats {
      users,
      total_users,
      total_restaurants,
      ratios: Ratios::compute(&orders, total_users),
      orders,
      top_restaurants,
      recent_orders,
    })
  }
}

#[async_trait]
impl Repository for PgRepository {
  fn backend_name(&self) -> &'static str {
    "postgres"
  }

  async fn ping(&self) -> Result<()> {
    sqlx::query("SELECT 1").execute(&self.pool).await?;
    Ok(())
  }
}
