// server/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod auth_handlers;
pub mod cart_handlers;
pub mod order_handlers;
pub mod product_handlers;
pub mod restaurant_handlers;
pub mod review_handlers;
pub mod rider_handlers;
pub mod user_handlers;
