//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for ShopRate, built on the Axum
//! web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each resource
//! - [`api::routes`](crate::api::routes) - Route definitions and router assembly
//!
//! # API Endpoints
//!
//! ## Authentication (`/api/auth`) — public
//! - `POST /api/auth/register` - Register and receive a JWT token
//! - `POST /api/auth/login` - Login and receive a JWT token
//!
//! ## Users (`/api/user`)
//! - `GET /api/user` - List users with filters/sorting (admin)
//! - `GET /api/user/{id}` - User with owned stores and ratings (admin)
//! - `PUT /api/user/{id}` - Partial user update (admin)
//! - `PUT /api/user/password` - Change own password (any authenticated)
//!
//! ## Stores (`/api/store`)
//! - `POST /api/store` - Create a store (admin, owner)
//! - `GET /api/store` - List stores with rating aggregates
//! - `GET /api/store/{id}` - Store with owner and ratings
//! - `PUT /api/store/{id}` - Update (admin or the store's owner)
//! - `DELETE /api/store/{id}` - Delete store and its ratings (admin or owner)
//! - `GET /api/store/owner/{user_id}` - Stores owned by a user (self or admin)
//! - `GET /api/store/{user_id}/ratings` - Ratings received per owned store
//!
//! ## Ratings (`/api/rating`) — any authenticated
//! - `POST /api/rating` - Submit a rating (score in [1,5])
//! - `GET /api/rating` - List ratings, filterable by store/user
//! - `GET /api/rating/stats/{store_id}` - Mean and count for a store
//! - `PUT /api/rating/{id}` - Edit a rating
//!
//! ## Admin (`/api/admin`) — admin only
//! - `GET /api/admin/dashboard` - Entity totals
//! - `POST /api/admin/users` - Create a user with an explicit role
//! - `GET /api/admin/users`, `GET /api/admin/users/{id}`, `GET /api/admin/stores`
//!
//! # Authentication
//!
//! Protected endpoints require a valid JWT in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! When the `swagger-ui` feature is enabled, interactive API documentation
//! is available at `/swagger-ui/`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

/// OpenAPI document for the annotated endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::ratings::add_rating,
        handlers::ratings::rating_stats,
        handlers::admin::dashboard_stats,
        handlers::admin::add_user,
    ),
    components(schemas(
        crate::types::RegisterRequest,
        crate::types::LoginRequest,
        crate::types::AuthResponse,
        crate::types::PublicUser,
        crate::types::Role,
        crate::types::AddRatingRequest,
        crate::types::RatingCreated,
        crate::types::RatingStats,
        crate::types::DashboardStats,
        crate::types::AddUserRequest,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "rating", description = "Store ratings"),
        (name = "admin", description = "Administration")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
