// server/src/web/routes.rs

use crate::web::handlers::{
  admin_handlers, auth_handlers, cart_handlers, order_handlers, product_handlers, restaurant_handlers, review_handlers,
  rider_handlers, user_handlers,
};
use actix_web::web;

// Called from `main.rs` and from the integration tests.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(admin_handlers::health_handler))
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/me", web::get().to(auth_handlers::me_handler))
          .route("/users", web::get().to(auth_handlers::list_users_handler))
          .route("/users/{id}/approve", web::put().to(auth_handlers::approve_user_handler))
          .route("/users/{id}/status", web::put().to(auth_handlers::set_user_status_handler))
          .route("/users/{id}", web::delete().to(auth_handlers::delete_user_handler)),
      )
      .service(
        web::scope("/users")
          .route("/profile", web::get().to(user_handlers::get_profile_handler))
          .route("/profile", web::put().to(user_handlers::update_profile_handler)),
      )
      // `/mine` must be registered ahead of `/{id}`.
      .service(
        web::scope("/restaurants")
          .route("", web::get().to(restaurant_handlers::list_restaurants_handler))
          .route("/mine", web::get().to(restaurant_handlers::get_my_restaurant_handler))
          .route("/mine", web::put().to(restaurant_handlers::update_my_restaurant_handler))
          .route("/{id}", web::get().to(restaurant_handlers::get_restaurant_handler)),
      )
      .service(
        web::scope("/products")
          .route("", web::post().to(product_handlers::create_product_handler))
          .route("/mine", web::get().to(product_handlers::list_my_products_handler))
          .route(
            "/restaurant/{id}",
            web::get().to(product_handlers::list_restaurant_products_handler),
          )
          .route("/{id}", web::put().to(product_handlers::update_product_handler))
          .route("/{id}", web::delete().to(product_handlers::delete_product_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/update", web::put().to(cart_handlers::update_cart_handler))
          .route("/remove/{product_id}", web::delete().to(cart_handlers::remove_from_cart_handler))
          .route("/clear", web::delete().to(cart_handlers::clear_cart_handler))
          .route("/checkout", web::post().to(cart_handlers::checkout_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{id}", web::get().to(order_handlers::get_order_handler))
          .route("/{id}/status", web::patch().to(order_handlers::update_order_status_handler))
          .route("/{id}/status", web::put().to(order_handlers::update_order_status_handler)),
      )
      .service(
        web::scope("/riders")
          .route("", web::get().to(rider_handlers::list_riders_handler))
          .route("/me", web::get().to(rider_handlers::rider_me_handler))
          .route("/status", web::put().to(rider_handlers::update_presence_handler))
          .route("/available-orders", web::get().to(rider_handlers::available_orders_handler))
          .route("/orders/{id}/accept", web::post().to(rider_handlers::accept_order_handler)),
      )
      .service(
        web::scope("/reviews")
          .route("", web::post().to(review_handlers::create_review_handler))
          .route("/restaurant/{id}", web::get().to(review_handlers::list_reviews_handler))
          .route("/{id}", web::put().to(review_handlers::update_review_handler))
          .route("/{id}", web::delete().to(review_handlers::delete_review_handler)),
      )
      .service(
        web::scope("/admin").route(
          "/dashboard/stats",
          web::get().to(admin_handlers::dashboard_stats_handler),
        ),
      ),
  );
  cfg.route("/uploads/{key:.*}", web::get().to(admin_handlers::upload_handler));
}
