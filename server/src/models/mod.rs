// server/src/models/mod.rs

//! Records stored by the repository layer and the inputs used to write them.

pub mod analytics;
pub mod cart_item;
pub mod order;
pub mod product;
pub mod restaurant;
pub mod review;
pub mod rider;
pub mod user;

pub use analytics::{DashboardStats, RecentOrder, TopRestaurant};
pub use cart_item::{CartItem, CartView, NewCartItem};
pub use order::{NewOrder, Order, OrderFilter, OrderItem, OrderScope};
pub use product::{NewProduct, Product, ProductUpdate};
pub use restaurant::{NewRestaurant, Restaurant, RestaurantUpdate};
pub use review::{NewReview, Review, ReviewUpdate};
pub use rider::{PresenceUpdate, RiderProfile};
pub use user::{NewAccount, NewUser, ProfileUpdate, User};
