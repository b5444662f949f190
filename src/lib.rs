//! # ShopRate
//!
//! A role-based REST backend for a store-rating platform: users register and
//! log in, administrators manage users and stores, store owners manage their
//! stores, and customers submit ratings.
//!
//! ## Overview
//!
//! ShopRate can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `shoprate-server` binary
//! 2. **As a library** - Embed the router in your own Rust project
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use shoprate::{api::routes::create_router, auth::AuthService, db::DbClient, AppState};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(DbClient::new_local("shoprate.db").await?);
//!     let auth_service = Arc::new(AuthService::new("secret".into(), 3600));
//!
//!     let app = create_router(AppState { db, auth_service });
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers and routes
//! - [`auth`] - JWT authentication, password hashing, and middleware
//! - [`config`] - Environment-driven configuration
//! - [`db`] - Embedded SQLite persistence (libsql)
//! - [`types`] - Domain models, DTOs, and error handling
//!
//! ## Roles
//!
//! Every account carries one of three roles which drive authorization:
//! `user` (submits ratings), `owner` (manages their stores), and `admin`
//! (manages everything).

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// JWT authentication, password hashing, and middleware.
pub mod auth;
/// Environment-driven configuration.
pub mod config;
/// Embedded SQLite persistence layer.
pub mod db;
/// Core types (domain models, DTOs, errors).
#[allow(missing_docs)]
pub mod types;

// Re-export commonly used types
pub use auth::AuthService;
pub use config::Config;
pub use db::DbClient;
pub use types::{AppError, Result, Role};

use std::sync::Arc;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database client
    pub db: Arc<DbClient>,
    /// Authentication service
    pub auth_service: Arc<AuthService>,
}
