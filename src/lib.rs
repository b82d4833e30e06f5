//! Per-user movie recommendation lists cached in Redis with TTL.
//!
//! Layers, bottom-up: [`db`] persists records behind a key-value backend,
//! [`services`] applies the default-list fallback, and [`routes`] exposes the
//! HTTP API.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

pub use config::Config;
pub use routes::{create_router, AppState, RoutePaths};
