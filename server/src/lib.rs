// server/src/lib.rs

//! HTTP backend of the Tiffin food-delivery platform.
//!
//! `main.rs` wires these modules into an actix-web server; the integration
//! tests drive the same routes against the in-memory repository.

pub mod bootstrap;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod web;
