//! Core types: domain models, request/response DTOs, and error handling.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============= Roles & Identity =============

/// Access role attached to every user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Owner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Owner => "owner",
            Role::Admin => "admin",
        }
    }

    /// Parses a role from its wire/database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Role::User),
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims payload: subject is the user id, role drives authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

// ============= Domain Models =============

/// User account row. The password hash never leaves the server.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Store row, owned by exactly one user.
#[derive(Debug, Clone)]
pub struct Store {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Rating row: one user's score for one store. Score is always in [1,5],
/// enforced at the handler boundary.
#[derive(Debug, Clone)]
pub struct Rating {
    pub id: String,
    pub user_id: String,
    pub store_id: String,
    pub score: i64,
    pub comment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============= Auth DTOs =============

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user, safe to return to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

// ============= User DTOs =============

/// Query parameters for the admin user listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub sort_key: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub new_password: Option<String>,
}

/// Partial user update; absent fields keep their prior values.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Vec<RatingEntry>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
    pub created_at: i64,
    pub stores: Vec<StoreSummary>,
    pub ratings: Vec<RatingEntry>,
}

// ============= Store DTOs =============

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub owner_id: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Partial store update; absent fields keep their prior values.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub image: Option<String>,
}

/// Store listing row with on-the-fly rating aggregates.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub average_rating: Option<f64>,
    pub total_ratings: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetail {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub owner: PublicUser,
    pub ratings: Vec<RatingEntry>,
    pub average_rating: Option<f64>,
    pub total_ratings: i64,
}

/// One owned store with the ratings it has received.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedStoreRatings {
    pub store_id: String,
    pub store_name: String,
    pub ratings: Vec<RatingEntry>,
}

// ============= Rating DTOs =============

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddRatingRequest {
    pub store_id: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRatingRequest {
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingListQuery {
    pub store_id: Option<String>,
    pub user_id: Option<String>,
}

/// Minimal identity of the user who submitted a rating.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RaterRef {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Minimal reference to the rated store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoreRef {
    pub id: String,
    pub name: String,
}

/// A rating joined with its rater (and optionally its store).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingEntry {
    pub id: String,
    pub rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: i64,
    pub user: RaterRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreRef>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingCreated {
    pub id: String,
    pub store_id: String,
    pub user_id: String,
    pub rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: i64,
}

impl From<&Rating> for RatingCreated {
    fn from(r: &Rating) -> Self {
        Self {
            id: r.id.clone(),
            store_id: r.store_id.clone(),
            user_id: r.user_id.clone(),
            rating: r.score,
            comment: r.comment.clone(),
            created_at: r.created_at,
        }
    }
}

/// Aggregate rating figures for one store. The average keeps the historical
/// two-decimal string format on the wire.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingStats {
    pub store_id: String,
    pub average_rating: String,
    pub total_ratings: i64,
}

// ============= Admin DTOs =============

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
}

/// Admin user detail; `rating` is the average across the user's owned
/// stores' ratings when the user is an owner, absent otherwise.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminUserDetail {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStoreRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub rating: String,
}

// ============= Shared DTOs =============

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (axum::http::StatusCode::BAD_REQUEST, msg),
            AppError::Auth(msg) => (axum::http::StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (axum::http::StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (axum::http::StatusCode::NOT_FOUND, msg),
            AppError::Database(msg) | AppError::Internal(msg) => {
                // Detail stays server-side; clients get a generic message.
                tracing::error!("internal error: {}", msg);
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::User, Role::Owner, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("OWNER"), Some(Role::Owner));
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn test_role_serde_is_lowercase() {
        let json = serde_json::to_string(&Role::Owner).unwrap();
        assert_eq!(json, "\"owner\"");

        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_public_user_omits_password_hash() {
        let user = User {
            id: "u1".into(),
            name: "A".into(),
            email: "a@x.com".into(),
            address: "addr".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::User,
            created_at: 0,
            updated_at: 0,
        };

        let public = PublicUser::from(&user);
        let json = serde_json::to_string(&public).unwrap();
        assert!(!json.contains("argon2"), "hash must never serialize");
    }
}
