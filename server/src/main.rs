// server/src/main.rs

use std::sync::Arc;

use actix_web::{web as actix_data, App, HttpServer};
use tiffin_server::config::{AppConfig, StorageBackend};
use tiffin_server::db::{MemoryRepository, PgRepository, Repository};
use tiffin_server::services::blob_store::LocalDiskBlobStore;
use tiffin_server::state::AppState;
use tiffin_server::web::middleware::RequestTimeout;
use tiffin_server::{bootstrap, telemetry, web};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  telemetry::init_tracing();
  tracing::info!("Starting Tiffin server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let repo: Arc<dyn Repository> = match app_config.storage_backend {
    StorageBackend::Postgres => match PgRepository::connect(&app_config).await {
      Ok(repo) => {
        tracing::info!("Successfully connected to the database.");
        Arc::new(repo)
      }
      Err(e) => {
        tracing::error!(error = %e, "Failed to connect to the database.");
        return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e.to_string()));
      }
    },
    StorageBackend::Memory => {
      tracing::warn!("Using the in-memory store; all data is lost on restart.");
      Arc::new(MemoryRepository::new())
    }
  };

  let blobs = Arc::new(LocalDiskBlobStore::new(app_config.upload_dir.clone()));
  let server_address = app_config.bind_address();
  let request_timeout = app_config.request_timeout;
  let app_state = AppState::new(app_config, repo, blobs);

  if let Err(e) = bootstrap::ensure_admin(&app_state).await {
    tracing::error!(error = %e, "Failed to create the bootstrap admin.");
    return Err(std::io::Error::other(e.to_string()));
  }

  tracing::info!("Attempting to bind server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .app_data(web::json_config())
      .app_data(web::query_config())
      .app_data(web::path_config())
      .wrap(RequestTimeout::new(request_timeout))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
