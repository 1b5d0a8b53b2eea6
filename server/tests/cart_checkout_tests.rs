// server/tests/cart_checkout_tests.rs

mod common;

use actix_web::http::StatusCode;
use common::*;
use serde_json::json;
use tiffin_core::FeeSchedule;
use tiffin_server::db::{CartStore, OrderStore};
use tiffin_server::models::{NewCartItem, NewOrder, OrderItem};
use uuid::Uuid;

#[actix_web::test]
async fn adding_from_a_second_restaurant_is_refused() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (first_owner, _) = approved_restaurant(&app, &admin, "one@r.test", "One").await;
  let (second_owner, _) = approved_restaurant(&app, &admin, "two@r.test", "Two").await;
  let dal = add_product(&app, &first_owner, "Dal", 8_000).await;
  let naan = add_product(&app, &second_owner, "Naan", 2_000).await;
  let customer = customer(&app, "c@c.test").await;

  let (status, _) = send(&app, post("/api/cart/add", Some(&customer), json!({ "productId": dal })).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  let (status, body) = send(
    &app,
    post("/api/cart/add", Some(&customer), json!({ "productId": naan })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["code"], "INVALID_CART");

  let (_, cart) = send(&app, get("/api/cart", Some(&customer)).to_request()).await;
  assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn mixed_cart_checkout_leaves_the_cart_alone() {
  let (state, repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (first_owner, first_id) = approved_restaurant(&app, &admin, "one@r.test", "One").await;
  let (second_owner, second_id) = approved_restaurant(&app, &admin, "two@r.test", "Two").await;
  let dal = add_product(&app, &first_owner, "Dal", 8_000).await;
  let naan = add_product(&app, &second_owner, "Naan", 2_000).await;
  let customer = customer(&app, "c@c.test").await;
  let (_, me) = send(&app, get("/api/auth/me", Some(&customer)).to_request()).await;
  let customer_id: Uuid = me["data"]["id"].as_str().unwrap().parse().unwrap();

  // A cart that reached the store with two restaurants in it.
  for (product, restaurant) in [(&dal, &first_id), (&naan, &second_id)] {
    repo
      .add_cart_item(NewCartItem {
        user_id: customer_id,
        product_id: product.parse().unwrap(),
        restaurant_id: restaurant.parse().unwrap(),
        name: "item".to_string(),
        price_cents: 1_000,
        quantity: 1,
      })
      .await
      .unwrap();
  }

  let (status, body) = send(
    &app,
    post("/api/cart/checkout", Some(&customer), json!({ "deliveryAddress": "9 Elm Rd" })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["error"]["code"], "INVALID_CART");
  assert_eq!(repo.cart_items(customer_id).await.unwrap().len(), 2);

  let (_, orders) = send(&app, get("/api/orders", Some(&customer)).to_request()).await;
  assert!(orders["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn empty_cart_cannot_be_checked_out() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let customer = customer(&app, "c@c.test").await;
  let (status, body) = send(
    &app,
    post("/api/cart/checkout", Some(&customer), json!({ "deliveryAddress": "9 Elm Rd" })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn order_keeps_the_price_seen_at_add_time() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (owner, _) = approved_restaurant(&app, &admin, "one@r.test", "One").await;
  let thali = add_product(&app, &owner, "Thali", 20_000).await;
  let customer = customer(&app, "c@c.test").await;

  send(&app, post("/api/cart/add", Some(&customer), json!({ "productId": thali, "quantity": 2 })).to_request()).await;
  let (status, _) = send(
    &app,
    put(&format!("/api/products/{}", thali), Some(&owner), json!({ "priceCents": 99_000 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, order) = send(
    &app,
    post("/api/cart/checkout", Some(&customer), json!({ "deliveryAddress": "9 Elm Rd", "paymentMethod": "Card" }))
      .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let order = &order["data"];
  assert_eq!(order["subtotalCents"], 40_000);
  // Above the free-delivery threshold; service fee is 2% of the subtotal.
  assert_eq!(order["deliveryFeeCents"], 0);
  assert_eq!(order["serviceFeeCents"], 1_000);
  assert_eq!(order["totalCents"], 41_000);
  assert_eq!(order["paymentMethod"], "card");
  assert_eq!(order["items"][0]["priceCents"], 20_000);
}

#[actix_web::test]
async fn cart_quantities_can_be_edited() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (owner, _) = approved_restaurant(&app, &admin, "one@r.test", "One").await;
  let idli = add_product(&app, &owner, "Idli", 3_000).await;
  let customer = customer(&app, "c@c.test").await;

  send(&app, post("/api/cart/add", Some(&customer), json!({ "productId": idli })).to_request()).await;
  let (_, cart) = send(&app, post("/api/cart/add", Some(&customer), json!({ "productId": idli })).to_request()).await;
  assert_eq!(cart["data"]["items"][0]["quantity"], 2);

  let (status, cart) = send(
    &app,
    put("/api/cart/update", Some(&customer), json!({ "productId": idli, "quantity": 5 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(cart["data"]["itemCount"], 5);

  let (status, _) = send(
    &app,
    put("/api/cart/update", Some(&customer), json!({ "productId": idli, "quantity": -1 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, cart) = send(
    &app,
    put("/api/cart/update", Some(&customer), json!({ "productId": idli, "quantity": 0 })).to_request(),
  )
  .await;
  assert!(cart["data"]["items"].as_array().unwrap().is_empty());

  let (status, _) = send(&app, delete(&format!("/api/cart/remove/{}", idli), Some(&customer)).to_request()).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn only_customers_use_the_cart() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (status, body) = send(&app, get("/api/cart", Some(&admin)).to_request()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[actix_web::test]
async fn prices_too_large_to_total_are_validation_errors() {
  let (state, repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (owner, restaurant_id) = approved_restaurant(&app, &admin, "one@r.test", "One").await;
  let customer = customer(&app, "c@c.test").await;
  let (_, me) = send(&app, get("/api/auth/me", Some(&customer)).to_request()).await;
  let customer_id: Uuid = me["data"]["id"].as_str().unwrap().parse().unwrap();

  let (status, body) = send(
    &app,
    post("/api/products", Some(&owner), json!({ "name": "Gold Leaf", "priceCents": 5_000_000_000_000_000_000i64 }))
      .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

  // A line priced before the ceiling existed.
  repo
    .add_cart_item(NewCartItem {
      user_id: customer_id,
      product_id: Uuid::new_v4(),
      restaurant_id: restaurant_id.parse().unwrap(),
      name: "Gold Leaf".to_string(),
      price_cents: 5_000_000_000_000_000_000,
      quantity: 2,
    })
    .await
    .unwrap();

  let (status, body) = send(&app, get("/api/cart", Some(&customer)).to_request()).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

  let (status, body) = send(
    &app,
    post("/api/cart/checkout", Some(&customer), json!({ "deliveryAddress": "9 Elm Rd" })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn cart_line_quantity_has_a_ceiling() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (owner, _) = approved_restaurant(&app, &admin, "one@r.test", "One").await;
  let samosa = add_product(&app, &owner, "Samosa", 500).await;
  let customer = customer(&app, "c@c.test").await;

  let (status, body) = send(
    &app,
    post("/api/cart/add", Some(&customer), json!({ "productId": samosa, "quantity": 2147483647 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

  let (status, _) = send(
    &app,
    post("/api/cart/add", Some(&customer), json!({ "productId": samosa, "quantity": 999 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, body) = send(
    &app,
    post("/api/cart/add", Some(&customer), json!({ "productId": samosa, "quantity": 1 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

  let (status, _) = send(
    &app,
    put("/api/cart/update", Some(&customer), json!({ "productId": samosa, "quantity": 1000 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, cart) = send(&app, get("/api/cart", Some(&customer)).to_request()).await;
  assert_eq!(cart["data"]["items"][0]["quantity"], 999);
}

#[actix_web::test]
async fn placing_an_order_removes_only_the_ordered_lines() {
  let repo = tiffin_server::db::MemoryRepository::new();
  let (user_id, restaurant_id) = (Uuid::new_v4(), Uuid::new_v4());
  let (ordered, late) = (Uuid::new_v4(), Uuid::new_v4());
  for product_id in [ordered, late] {
    repo
      .add_cart_item(NewCartItem {
        user_id,
        product_id,
        restaurant_id,
        name: "Idli".to_string(),
        price_cents: 3_000,
        quantity: 1,
      })
      .await
      .unwrap();
  }

  // `late` joined the cart after checkout priced it.
  repo
    .place_order(NewOrder {
      user_id,
      restaurant_id,
      items: vec![OrderItem {
        product_id: ordered,
        name: "Idli".to_string(),
        quantity: 1,
        price_cents: 3_000,
      }],
      delivery_address: "9 Elm Rd".to_string(),
      payment_method: "cash".to_string(),
      notes: None,
      pricing: FeeSchedule::default().price_lines([(3_000, 1)]).unwrap(),
    })
    .await
    .unwrap();

  let left = repo.cart_items(user_id).await.unwrap();
  assert_eq!(left.len(), 1);
  assert_eq!(left[0].product_id, late);
}
