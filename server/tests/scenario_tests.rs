// server/tests/scenario_tests.rs

mod common;

use actix_web::http::StatusCode;
use common::*;
use serde_json::json;

#[actix_web::test]
async fn restaurant_signup_to_first_order() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);

  // Owner registers; the account waits for approval.
  let (status, body) = send(
    &app,
    post(
      "/api/auth/register",
      None,
      restaurant_body("Rita", "rita@burgers.test", "Rita's Burgers"),
    )
    .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["success"], true);
  assert_eq!(body["data"]["user"]["isApproved"], false);
  assert!(body["data"]["user"].get("passwordHash").is_none());
  let owner_id = body["data"]["user"]["id"].as_str().unwrap().to_string();

  let (status, body) = send(
    &app,
    post(
      "/api/auth/login",
      None,
      json!({ "email": "rita@burgers.test", "password": "secret123" }),
    )
    .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  assert_eq!(body["success"], false);
  assert_eq!(body["error"]["code"], "PENDING_APPROVAL");

  // The unapproved restaurant is not listed publicly.
  let (_, listed) = send(&app, get("/api/restaurants", None).to_request()).await;
  assert_eq!(listed["data"].as_array().unwrap().len(), 0);

  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
  let (status, body) = send(
    &app,
    put(&format!("/api/auth/users/{}/approve", owner_id), Some(&admin), json!({})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["user"]["isApproved"], true);

  let owner = login(&app, "rita@burgers.test", "secret123").await;
  let (_, mine) = send(&app, get("/api/restaurants/mine", Some(&owner)).to_request()).await;
  assert_eq!(mine["data"]["isApproved"], true);
  let restaurant_id = mine["data"]["id"].as_str().unwrap().to_string();

  let (_, listed) = send(&app, get("/api/restaurants", None).to_request()).await;
  assert_eq!(listed["data"].as_array().unwrap().len(), 1);

  let burger = add_product(&app, &owner, "Burger", 15_000).await;
  let (_, menu) = send(
    &app,
    get(&format!("/api/products/restaurant/{}", restaurant_id), None).to_request(),
  )
  .await;
  assert_eq!(menu["data"][0]["name"], "Burger");

  let customer = customer(&app, "carl@customer.test").await;
  let (status, cart) = send(
    &app,
    post("/api/cart/add", Some(&customer), json!({ "productId": burger })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "{}", cart);
  assert_eq!(cart["data"]["itemCount"], 1);
  assert_eq!(cart["data"]["pricing"]["totalCents"], 19_500);

  let (status, order) = send(
    &app,
    post(
      "/api/cart/checkout",
      Some(&customer),
      json!({ "deliveryAddress": "123 Main St" }),
    )
    .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{}", order);
  let order = &order["data"];
  assert_eq!(order["subtotalCents"], 15_000);
  assert_eq!(order["deliveryFeeCents"], 3_500);
  assert_eq!(order["serviceFeeCents"], 1_000);
  assert_eq!(order["totalCents"], 19_500);
  assert_eq!(order["status"], "pending");
  assert_eq!(order["deliveryAddress"], "123 Main St");
  assert_eq!(order["paymentMethod"], "cash");

  // Checkout empties the cart.
  let (_, cart) = send(&app, get("/api/cart", Some(&customer)).to_request()).await;
  assert_eq!(cart["data"]["items"].as_array().unwrap().len(), 0);
  assert!(cart["data"]["pricing"].is_null());
}

#[actix_web::test]
async fn approving_twice_is_harmless() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let admin = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

  let (_, body) = send(
    &app,
    post("/api/auth/register", None, rider_body("Ravi", "ravi@rider.test")).to_request(),
  )
  .await;
  let rider_id = body["data"]["user"]["id"].as_str().unwrap().to_string();
  let license_url = body["data"]["user"]["licenseUrl"].as_str().unwrap().to_string();
  assert!(license_url.starts_with("/uploads/licenses/"));
  assert!(license_url.ends_with(".png"));

  let resp = actix_web::test::call_service(&app, get(&license_url, Some(&admin)).to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");

  for _ in 0..2 {
    let (status, body) = send(
      &app,
      put(&format!("/api/auth/users/{}/approve", rider_id), Some(&admin), json!({})).to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["isApproved"], true);
  }
  login(&app, "ravi@rider.test", "secret123").await;
}

#[actix_web::test]
async fn health_reports_the_backend() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let (status, body) = send(&app, get("/api/health", None).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["backend"], "memory");
}
