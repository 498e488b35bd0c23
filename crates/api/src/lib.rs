//! HTTP API: binds the isolation layer to axum.
//!
//! - `middleware`: bearer auth (builds the initial request scope) and scope
//!   enforcement (replaces it before handlers run)
//! - `app`: router, services wiring, routes
//! - `config`: environment-driven configuration

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
