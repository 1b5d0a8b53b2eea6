// server/tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tiffin_server::config::AppConfig;
use tiffin_server::db::MemoryRepository;
use tiffin_server::services::blob_store::MemoryBlobStore;
use tiffin_server::state::AppState;
use tracing::Level;

pub const ADMIN_EMAIL: &str = "admin@tiffin.test";
pub const ADMIN_PASSWORD: &str = "admin-secret";
/// A 1x1 PNG, base64-encoded.
pub const LICENSE_PNG: &str =
  "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn test_config() -> AppConfig {
  let vars: HashMap<&str, &str> = [
    ("STORAGE_BACKEND", "memory"),
    ("JWT_SECRET", "integration-test-secret"),
    ("ADMIN_EMAIL", ADMIN_EMAIL),
    ("ADMIN_PASSWORD", ADMIN_PASSWORD),
  ]
  .into_iter()
  .collect();
  AppConfig::from_lookup(|key: &str| vars.get(key).map(|v| v.to_string())).unwrap()
}

/// Fresh state over an empty in-memory store, with the bootstrap admin seeded.
pub async fn test_state() -> (AppState, MemoryRepository) {
  setup_tracing();
  let repo = MemoryRepository::new();
  let state = AppState::new(test_config(), Arc::new(repo.clone()), Arc::new(MemoryBlobStore::new()));
  tiffin_server::bootstrap::ensure_admin(&state).await.unwrap();
  (state, repo)
}

/// Builds the full application around `state`.
#[macro_export]
macro_rules! test_app {
  ($state:expr) => {
    actix_web::test::init_service(
      actix_web::App::new()
        .app_data(actix_web::web::Data::new($state.clone()))
        .app_data(tiffin_server::web::json_config())
        .app_data(tiffin_server::web::query_config())
        .app_data(tiffin_server::web::path_config())
        .wrap(tiffin_server::web::middleware::RequestTimeout::new(std::time::Duration::from_secs(30)))
        .configure(tiffin_server::web::configure_app_routes),
    )
    .await
  };
}

/// Sends a request and returns its status with the decoded JSON envelope.
pub async fn send<S, R, B>(app: &S, req: R) -> (StatusCode, Value)
where
  S: Service<R, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let resp = test::call_service(app, req).await;
  let status = resp.status();
  let body = test::read_body(resp).await;
  let value = if body.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&body).unwrap_or_else(|e| panic!("non-JSON body ({}): {:?}", e, body))
  };
  (status, value)
}

pub fn get(uri: &str, token: Option<&str>) -> test::TestRequest {
  with_token(test::TestRequest::get().uri(uri), token)
}

pub fn post(uri: &str, token: Option<&str>, body: Value) -> test::TestRequest {
  with_token(test::TestRequest::post().uri(uri), token).set_json(body)
}

pub fn put(uri: &str, token: Option<&str>, body: Value) -> test::TestRequest {
  with_token(test::TestRequest::put().uri(uri), token).set_json(body)
}

pub fn patch(uri: &str, token: Option<&str>, body: Value) -> test::TestRequest {
  with_token(test::TestRequest::patch().uri(uri), token).set_json(body)
}

pub fn delete(uri: &str, token: Option<&str>) -> test::TestRequest {
  with_token(test::TestRequest::delete().uri(uri), token)
}

fn with_token(req: test::TestRequest, token: Option<&str>) -> test::TestRequest {
  match token {
    Some(t) => req.insert_header(("Authorization", format!("Bearer {}", t))),
    None => req,
  }
}

pub fn customer_body(name: &str, email: &str) -> Value {
  json!({ "name": name, "email": email, "password": "secret123", "address": "1 Test Lane" })
}

pub fn restaurant_body(owner: &str, email: &str, restaurant_name: &str) -> Value {
  json!({
    "name": owner,
    "email": email,
    "password": "secret123",
    "role": "restaurant",
    "restaurant": { "name": restaurant_name, "address": "42 Food Street", "cuisine": "Burgers" }
  })
}

pub fn rider_body(name: &str, email: &str) -> Value {
  json!({
    "name": name,
    "email": email,
    "password": "secret123",
    "role": "rider",
    "licenseImage": LICENSE_PNG
  })
}

/// Logs in and returns the bearer token, asserting success.
pub async fn login<S, B>(app: &S, email: &str, password: &str) -> String
where
  S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let (status, body) = send(
    app,
    post("/api/auth/login", None, json!({ "email": email, "password": password })).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK, "login failed for {}: {}", email, body);
  body["data"]["token"].as_str().unwrap().to_string()
}

/// Registers a restaurant owner, approves them as admin and returns the
/// owner's token with the restaurant id.
pub async fn approved_restaurant<S, B>(app: &S, admin_token: &str, email: &str, name: &str) -> (String, String)
where
  S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let (status, body) = send(
    app,
    post("/api/auth/register", None, restaurant_body("Owner", email, name)).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{}", body);
  let user_id = body["data"]["user"]["id"].as_str().unwrap().to_string();

  let (status, _) = send(
    app,
    put(&format!("/api/auth/users/{}/approve", user_id), Some(admin_token), json!({})).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let token = login(app, email, "secret123").await;
  let (_, mine) = send(app, get("/api/restaurants/mine", Some(&token)).to_request()).await;
  let restaurant_id = mine["data"]["id"].as_str().unwrap().to_string();
  (token, restaurant_id)
}

/// Creates a product as the owner and returns its id.
pub async fn add_product<S, B>(app: &S, owner_token: &str, name: &str, price_cents: i64) -> String
where
  S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let (status, body) = send(
    app,
    post(
      "/api/products",
      Some(owner_token),
      json!({ "name": name, "priceCents": price_cents }),
    )
    .to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{}", body);
  body["data"]["id"].as_str().unwrap().to_string()
}

/// Registers and logs in a customer.
pub async fn customer<S, B>(app: &S, email: &str) -> String
where
  S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
  B: MessageBody,
{
  let (status, body) = send(
    app,
    post("/api/auth/register", None, customer_body("Customer", email)).to_request(),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{}", body);
  login(app, email, "secret123").await
}
