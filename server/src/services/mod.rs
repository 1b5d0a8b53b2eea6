// server/src/services/mod.rs

pub mod auth_service;
pub mod blob_store;
pub mod token_service;
