// server/tests/middleware_tests.rs

mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web, App, HttpResponse};
use common::*;
use std::time::Duration;
use tiffin_server::web::middleware::RequestTimeout;

async fn slow_handler() -> HttpResponse {
  tokio::time::sleep(Duration::from_millis(500)).await;
  HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": "late" }))
}

async fn quick_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "success": true, "data": "on time" }))
}

#[actix_web::test]
async fn slow_requests_get_service_unavailable() {
  setup_tracing();
  let app = test::init_service(
    App::new()
      .wrap(RequestTimeout::new(Duration::from_millis(10)))
      .route("/slow", web::get().to(slow_handler))
      .route("/quick", web::get().to(quick_handler)),
  )
  .await;

  let (status, body) = send(&app, test::TestRequest::get().uri("/slow").to_request()).await;
  assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
  assert_eq!(body["success"], false);
  assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");

  let (status, body) = send(&app, test::TestRequest::get().uri("/quick").to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"], "on time");
}

#[actix_web::test]
async fn application_routes_pass_through_the_timeout() {
  let (state, _repo) = test_state().await;
  let app = test_app!(state);
  let (status, body) = send(&app, get("/api/health", None).to_request()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["status"], "ok");
}
