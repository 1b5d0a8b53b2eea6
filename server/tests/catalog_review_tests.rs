// server/tests/catalog_review_tests.rs

mod common;

use actix_web::http::StatusCode;
use common::*;
use serde_json::json;

#[actix_web::test]
async fn owners_only_touch_their_own_products() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (first, first_id) = approved_restaurant(&app, &admin, "one@r.test", "One").await;
  let (second, _) = approved_restaurant(&app, &admin, "two@r.test", "Two").await;
  let soup = add_product(&app, &first, "Soup", 4_500).await;

  let (status, _) = send(
    &app,
    put(&format!("/api/products/{}", soup), Some(&second), json!({ "priceCents": 1 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send(&app, delete(&format!("/api/products/{}", soup), Some(&second)).to_request()).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, _) = send(
    &app,
    post("/api/products", Some(&first), json!({ "name": "Free lunch", "priceCents": 0 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  // Unavailable items stay on the owner's menu but leave the public one.
  send(
    &app,
    put(&format!("/api/products/{}", soup), Some(&first), json!({ "isAvailable": false })).to_request(),
  )
  .await;
  let (_, public) = send(&app, get(&format!("/api/products/restaurant/{}", first_id), None).to_request()).await;
  assert!(public["data"].as_array().unwrap().is_empty());
  let (_, mine) = send(&app, get("/api/products/mine", Some(&first)).to_request()).await;
  assert_eq!(mine["data"][0]["isAvailable"], false);
  assert_eq!(mine["data"][0]["preparationTimeMinutes"], 15);

  let customer = customer(&app, "c@c.test").await;
  let (status, _) = send(&app, post("/api/cart/add", Some(&customer), json!({ "productId": soup })).to_request()).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(&app, delete(&format!("/api/products/{}", soup), Some(&first)).to_request()).await;
  assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn owners_edit_their_restaurant() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (owner, id) = approved_restaurant(&app, &admin, "one@r.test", "One").await;

  let (status, body) = send(
    &app,
    put(
      "/api/restaurants/mine",
      Some(&owner),
      json!({ "name": "One Bistro", "minimumOrderCents": 5_000 }),
    )
    .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["name"], "One Bistro");

  let (status, _) = send(
    &app,
    put("/api/restaurants/mine", Some(&owner), json!({ "deliveryTimeMinutes": 0 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  // Closing the restaurant hides it from the public.
  send(&app, put("/api/restaurants/mine", Some(&owner), json!({ "isActive": false })).to_request()).await;
  let (status, _) = send(&app, get(&format!("/api/restaurants/{}", id), None).to_request()).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn minimum_order_is_enforced_at_checkout() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (owner, _) = approved_restaurant(&app, &admin, "one@r.test", "One").await;
  send(&app, put("/api/restaurants/mine", Some(&owner), json!({ "minimumOrderCents": 10_000 })).to_request()).await;
  let tea = add_product(&app, &owner, "Tea", 1_500).await;
  let customer = customer(&app, "c@c.test").await;
  send(&app, post("/api/cart/add", Some(&customer), json!({ "productId": tea })).to_request()).await;

  let (status, _) = send(
    &app,
    post("/api/cart/checkout", Some(&customer), json!({ "deliveryAddress": "9 Elm Rd" })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn reviews_drive_the_restaurant_rating() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (owner, restaurant_id) = approved_restaurant(&app, &admin, "one@r.test", "One").await;
  let ann = customer(&app, "ann@c.test").await;
  let bob = customer(&app, "bob@c.test").await;

  let (status, _) = send(
    &app,
    post("/api/reviews", Some(&ann), json!({ "restaurantId": restaurant_id, "rating": 6 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  let (status, _) = send(
    &app,
    post("/api/reviews", Some(&owner), json!({ "restaurantId": restaurant_id, "rating": 5 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (status, review) = send(
    &app,
    post("/api/reviews", Some(&ann), json!({ "restaurantId": restaurant_id, "rating": 5, "comment": "Great" })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let review_id = review["data"]["id"].as_str().unwrap().to_string();
  let (status, _) = send(
    &app,
    post("/api/reviews", Some(&ann), json!({ "restaurantId": restaurant_id, "rating": 1 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  send(
    &app,
    post("/api/reviews", Some(&bob), json!({ "restaurantId": restaurant_id, "rating": 4 })).to_request(),
  )
  .await;

  let (_, restaurant) = send(&app, get(&format!("/api/restaurants/{}", restaurant_id), None).to_request()).await;
  assert_eq!(restaurant["data"]["rating"], 4.5);
  assert_eq!(restaurant["data"]["totalReviews"], 2);

  let (status, _) = send(
    &app,
    put(&format!("/api/reviews/{}", review_id), Some(&bob), json!({ "rating": 1 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) = send(
    &app,
    put(&format!("/api/reviews/{}", review_id), Some(&ann), json!({ "rating": 3 })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, _) = send(&app, delete(&format!("/api/reviews/{}", review_id), Some(&admin)).to_request()).await;
  assert_eq!(status, StatusCode::OK);

  let (_, reviews) = send(&app, get(&format!("/api/reviews/restaurant/{}", restaurant_id), None).to_request()).await;
  assert_eq!(reviews["data"].as_array().unwrap().len(), 1);
  assert_eq!(reviews["data"][0]["rating"], 4);
  let (_, restaurant) = send(&app, get(&format!("/api/restaurants/{}", restaurant_id), None).to_request()).await;
  assert_eq!(restaurant["data"]["rating"], 4.0);
  assert_eq!(restaurant["data"]["totalReviews"], 1);
}
