// server/src/pipelines/order_status_pipeline.rs

use crate::errors::{AppError, Result};
use crate::pipelines::contexts::{Actor, OrderStatusCtxData};
use crate::state::AppState;
use tiffin_core::domain::authorize_transition;
use tiffin_core::{ContextData, Pipeline, PipelineControl, Registry, Role};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub fn register_order_status_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<OrderStatusCtxData, AppError>::new(
    "order_status",
    &[
      ("load_order", false, None),
      ("check_relationship", false, None),
      ("authorize_transition", false, None),
      ("persist_transition", false, None),
    ],
  );

  p.on("load_order", load_order);
  p.on("check_relationship", check_relationship);

  p.on("authorize_transition", |ctx: ContextData<OrderStatusCtxData>| async move {
    let (actor, from, to) = ctx.with(|data| (data.actor, data.order.as_ref().map(|o| o.status), data.target));
    let from = from.ok_or_else(|| AppError::Internal("status context has no order".to_string()))?;
    if let Err(e) = authorize_transition(actor.role, from, to) {
      warn!(role = %actor.role, %from, %to, error = %e, "Order transition refused.");
      return Err(AppError::from(e));
    }
    Ok::<_, AppError>(PipelineControl::Continue)
  });

  p.on("persist_transition", persist_transition);

  registry.register(p);
  info!("Order status pipeline registered.");
}

#[instrument(name = "order_status::load_order", skip_all)]
async fn load_order(ctx: ContextData<OrderStatusCtxData>) -> Result<PipelineControl> {
  let (order_id, repo) = {
    let guard = ctx.read();
    (guard.order_id, guard.app_state.repo.clone())
  };
  let order = repo
    .find_order(order_id)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order with ID {} not found.", order_id)))?;
  ctx.write().order = Some(order);
  Ok(PipelineControl::Continue)
}

/// Whether `actor` is a party to the order: its customer, the owner of its
/// restaurant, its assigned rider, or an admin.
pub async fn is_party_to_order(
  app_state: &AppState,
  actor: Actor,
  customer_id: Uuid,
  restaurant_id: Uuid,
  rider_id: Option<Uuid>,
) -> Result<bool> {
  Ok(match actor.role {
    Role::Admin => true,
    Role::Customer => customer_id == actor.id,
    Role::Rider => rider_id == Some(actor.id),
    Role::Restaurant => app_state
      .repo
      .find_restaurant_by_owner(actor.id)
      .await?
      .is_some_and(|r| r.id == restaurant_id),
  })
}

#[instrument(name = "order_status::check_relationship", skip_all)]
async fn check_relationship(ctx: ContextData<OrderStatusCtxData>) -> Result<PipelineControl> {
  let (app_state, actor, parties) = {
    let guard = ctx.read();
    let parties = guard.order.as_ref().map(|o| (o.user_id, o.restaurant_id, o.rider_id));
    (guard.app_state.clone(), guard.actor, parties)
  };
  let (customer_id, restaurant_id, rider_id) =
    parties.ok_or_else(|| AppError::Internal("status context has no order".to_string()))?;

  if is_party_to_order(&app_state, actor, customer_id, restaurant_id, rider_id).await? {
    Ok(PipelineControl::Continue)
  } else {
    warn!(actor_id = %actor.id, role = %actor.role, "Actor is not a party to the order.");
    Err(AppError::Forbidden("You are not allowed to update this order.".to_string()))
  }
}

/// Conditional on the status read in `load_order`; a concurrent change in
/// between surfaces as a conflict.
#[instrument(name = "order_status::persist_transition", skip_all)]
async fn persist_transition(ctx: ContextData<OrderStatusCtxData>) -> Result<PipelineControl> {
  let (order_id, from, to, repo) = {
    let guard = ctx.read();
    let from = guard.order.as_ref().map(|o| o.status);
    (guard.order_id, from, guard.target, guard.app_state.repo.clone())
  };
  let from = from.ok_or_else(|| AppError::Internal("status context has no order".to_string()))?;

  match repo.transition_order(order_id, from, to).await? {
    Some(updated) => {
      info!(%order_id, %from, %to, version = updated.version, "Order status changed.");
      ctx.write().updated = Some(updated);
      Ok(PipelineControl::Continue)
    }
    None => {
      warn!(%order_id, %from, %to, "Order changed concurrently, transition not applied.");
      Err(AppError::Conflict(
        "The order was updated by someone else. Reload it and try again.".to_string(),
      ))
    }
  }
}
