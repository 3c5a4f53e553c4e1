//! Rentiva Equipment Rental Marketplace
//!
//! A Rust implementation of the Rentiva marketplace backend, providing a
//! REST JSON API for the booking, delivery, recollection and
//! supplier-request lifecycles and the pricing that accompanies them.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod pricing;
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
