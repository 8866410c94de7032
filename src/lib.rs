//! Tavola reservation server
//!
//! REST JSON API for a restaurant's online booking calendar: which dates can
//! be reserved, given the lead window, the closure calendar and the daily
//! capacity, plus administration of reservations and closures.

use std::sync::Arc;

pub mod api;
pub mod availability;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
