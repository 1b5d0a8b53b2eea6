// server/src/pipelines/mod.rs

//! The multi-step workflows, each a `tiffin_core::Pipeline` registered by the
//! type of context it runs over.

use crate::errors::AppError;
use tiffin_core::Registry;

pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod login_pipeline;
pub mod order_status_pipeline;
pub mod register_pipeline;

/// Registers every workflow with `registry`. Called once at startup.
pub fn register_all_pipelines(registry: &Registry<AppError>) {
  register_pipeline::register_registration_pipeline(registry);
  login_pipeline::register_login_pipeline(registry);
  cart_pipeline::register_add_to_cart_pipeline(registry);
  checkout_pipeline::register_checkout_pipeline(registry);
  order_status_pipeline::register_order_status_pipeline(registry);

  tracing::info!(count = registry.len(), "All application pipelines registered.");
}
