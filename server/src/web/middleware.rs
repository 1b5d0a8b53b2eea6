// server/src/web/middleware.rs

use crate::errors::AppError;
use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error;
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::time::Duration;
use tracing::warn;

/// Fails any request that takes longer than `duration` with a 503.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeout {
  duration: Duration,
}

impl RequestTimeout {
  pub fn new(duration: Duration) -> Self {
    Self { duration }
  }
}

impl<S, B> Transform<S, ServiceRequest> for RequestTimeout
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Transform = RequestTimeoutMiddleware<S>;
  type InitError = ();
  type Future = Ready<Result<Self::Transform, Self::InitError>>;

  fn new_transform(&self, service: S) -> Self::Future {
    ready(Ok(RequestTimeoutMiddleware {
      service,
      duration: self.duration,
    }))
  }
}

pub struct RequestTimeoutMiddleware<S> {
  service: S,
  duration: Duration,
}

impl<S, B> Service<ServiceRequest> for RequestTimeoutMiddleware<S>
where
  S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
  B: 'static,
{
  type Response = ServiceResponse<EitherBody<B>>;
  type Error = Error;
  type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

  forward_ready!(service);

  fn call(&self, req: ServiceRequest) -> Self::Future {
    let duration = self.duration;
    let http_req = req.request().clone();
    let fut = self.service.call(req);

    Box::pin(async move {
      match tokio::time::timeout(duration, fut).await {
        Ok(result) => result.map(ServiceResponse::map_into_left_body),
        Err(_) => {
          warn!(path = %http_req.path(), timeout_ms = duration.as_millis() as u64, "Request timed out.");
          let error = AppError::ServiceUnavailable("The request took too long, please retry.".to_string());
          Ok(ServiceResponse::from_err(error, http_req).map_into_right_body())
        }
      }
    })
  }
}
