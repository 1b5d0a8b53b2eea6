// server/src/state.rs

use crate::config::AppConfig;
use crate::db::Repository;
use crate::errors::AppError;
use crate::pipelines;
use crate::services::blob_store::BlobStore;
use crate::services::token_service::TokenService;
use std::sync::Arc;
use tiffin_core::Registry;

#[derive(Clone)]
pub struct AppState {
  pub repo: Arc<dyn Repository>,
  pub flows: Arc<Registry<AppError>>,
  pub config: Arc<AppConfig>,
  pub tokens: Arc<TokenService>,
  pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
  /// Wires the shared services and registers every workflow.
  pub fn new(config: AppConfig, repo: Arc<dyn Repository>, blobs: Arc<dyn BlobStore>) -> Self {
    let flows = Registry::<AppError>::new();
    pipelines::register_all_pipelines(&flows);
    let tokens = TokenService::new(&config.jwt_secret, config.jwt_ttl_hours);

    Self {
      repo,
      flows: Arc::new(flows),
      config: Arc::new(config),
      tokens: Arc::new(tokens),
      blobs,
    }
  }
}
