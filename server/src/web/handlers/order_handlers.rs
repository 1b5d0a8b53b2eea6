// server/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{OrderFilter, OrderScope};
use crate::pipelines::contexts::OrderStatusCtxData;
use crate::pipelines::order_status_pipeline::is_party_to_order;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;
use crate::web::handlers::restaurant_handlers::owned_restaurant;
use crate::web::response;
use tiffin_core::{ContextData, OrderStatus, PipelineResult, Role};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

#[derive(Deserialize, Debug)]
pub struct OrderListQuery {
  pub status: Option<String>,
  pub limit: Option<i64>,
}

#[derive(Deserialize, Debug)]
pub struct StatusUpdatePayload {
  pub status: String,
}

#[instrument(name = "handler::list_orders", skip(app_state, auth), fields(user_id = %auth.id, role = %auth.role))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, AppError> {
  let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
    Some(raw) => Some(raw.parse::<OrderStatus>()?),
    None => None,
  };
  let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

  let scope = match auth.role {
    Role::Admin => OrderScope::All,
    Role::Customer => OrderScope::Customer(auth.id),
    Role::Rider => OrderScope::Rider(auth.id),
    Role::Restaurant => OrderScope::Restaurant(owned_restaurant(&app_state, auth.id).await?.id),
  };

  let orders = app_state.repo.list_orders(OrderFilter { scope, status, limit }).await?;
  Ok(response::ok(orders))
}

#[instrument(name = "handler::get_order", skip(app_state, auth), fields(user_id = %auth.id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = app_state
    .repo
    .find_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found.", order_id)))?;

  if !is_party_to_order(&app_state, auth.actor(), order.user_id, order.restaurant_id, order.rider_id).await? {
    warn!(%order_id, "Order read refused.");
    return Err(AppError::Forbidden("You are not allowed to view this order.".to_string()));
  }
  Ok(response::ok(order))
}

#[instrument(name = "handler::update_order_status", skip(app_state, auth), fields(user_id = %auth.id, role = %auth.role))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  auth: AuthenticatedUser,
  path: web::Path<Uuid>,
  body: web::Json<StatusUpdatePayload>,
) -> Result<HttpResponse, AppError> {
  let target = body.status.parse::<OrderStatus>()?;
  let ctx = ContextData::new(OrderStatusCtxData {
    app_state: app_state.get_ref().clone(),
    actor: auth.actor(),
    order_id: path.into_inner(),
    target,
    order: None,
    updated: None,
  });

  match app_state.flows.run(ctx.clone()).await {
    Ok(PipelineResult::Completed) => {
      let order = ctx
        .write()
        .updated
        .take()
        .ok_or_else(|| AppError::Internal("Status update completed without an order.".to_string()))?;
      Ok(response::ok(order))
    }
    Ok(PipelineResult::Stopped) => Err(AppError::Internal(
      "Status update was halted by an internal step.".to_string(),
    )),
    Err(app_err) => Err(app_err),
  }
}
