//! Authentication and Authorization
//!
//! This module provides the authentication infrastructure for the ShopRate
//! API: password hashing, JWT issue/verify, and the Axum middleware that
//! enforces tokens and role allow-lists.
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id (memory-hard) for secure password storage
//! - **JWT Tokens**: HS256 signed tokens with a fixed expiry window
//! - **Claims**: `{sub, role, iat, exp}` — role drives route authorization
//!
//! # Usage
//!
//! ## Issuing a token
//!
//! ```ignore
//! use shoprate::auth::AuthService;
//! use shoprate::types::Role;
//!
//! let auth = AuthService::new(secret, 3600);
//! let token = auth.issue_token(&user.id, Role::User)?;
//! ```
//!
//! ## Extracting the caller in handlers
//!
//! ```ignore
//! use shoprate::auth::AuthUser;
//!
//! async fn handler(AuthUser(claims): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", claims.sub)
//! }
//! ```

/// JWT issue/verify and Argon2id password hashing.
pub mod service;

/// Authentication middleware, role guard, and claims extractor.
pub mod middleware;

pub use middleware::{auth_middleware, require_role, AuthUser};
pub use service::AuthService;
