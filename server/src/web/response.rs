// server/src/web/response.rs

//! The success half of the response envelope. Errors are rendered by
//! `AppError`'s `ResponseError` impl.

use actix_web::HttpResponse;
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<T: Serialize> {
  success: bool,
  data: T,
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
  HttpResponse::Ok().json(Envelope { success: true, data })
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
  HttpResponse::Created().json(Envelope { success: true, data })
}
