use crate::{
    auth::AuthUser,
    db::{UserFilters, UserSort, UserSortKey},
    types::{
        AppError, MessageResponse, PublicUser, Result, Role, StoreSummary, UpdatePasswordRequest,
        UpdateUserRequest, UserDetail, UserListQuery, UserRow,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};

/// Builds the database filter set from the listing query, rejecting role and
/// sort values outside the whitelists.
fn parse_list_query(query: &UserListQuery) -> Result<(UserFilters, Option<UserSort>)> {
    let role = match query.role.as_deref().filter(|v| !v.is_empty()) {
        Some(value) => Some(
            Role::parse(value).ok_or_else(|| AppError::Validation("Invalid role".to_string()))?,
        ),
        None => None,
    };

    let filters = UserFilters {
        name: query.name.clone(),
        email: query.email.clone(),
        address: query.address.clone(),
        role,
    };

    let sort = match query.sort_key.as_deref() {
        Some(key) => {
            let key = UserSortKey::parse(key)
                .ok_or_else(|| AppError::Validation("Invalid sort key".to_string()))?;
            let ascending = match query.sort_order.as_deref() {
                None | Some("asc") => true,
                Some("desc") => false,
                Some(_) => {
                    return Err(AppError::Validation("Invalid sort order".to_string()));
                }
            };
            Some(UserSort { key, ascending })
        }
        None => None,
    };

    Ok((filters, sort))
}

/// List users with filters and optional sorting. Admin only.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<UserRow>>> {
    let (filters, sort) = parse_list_query(&query)?;
    let users = state.db.list_users(&filters, sort).await?;

    let mut rows = Vec::with_capacity(users.len());
    for user in users {
        let ratings = state
            .db
            .list_ratings(None, Some(&user.id))
            .await?
            .into_iter()
            .map(|d| super::rating_entry(d, true))
            .collect();

        rows.push(UserRow {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
            created_at: user.created_at,
            ratings: Some(ratings),
        });
    }

    Ok(Json(rows))
}

/// Fetch one user with their owned stores and submitted ratings. Admin only.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserDetail>> {
    let user = state
        .db
        .get_user_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut stores = Vec::new();
    for store in state.db.stores_by_owner(&user.id).await? {
        let (average, total) = state.db.store_rating_stats(&store.id).await?;
        stores.push(StoreSummary {
            id: store.id,
            owner_id: store.owner_id,
            name: store.name,
            email: store.email,
            address: store.address,
            image: store.image,
            average_rating: average,
            total_ratings: total,
        });
    }

    let ratings = state
        .db
        .list_ratings(None, Some(&user.id))
        .await?
        .into_iter()
        .map(|d| super::rating_entry(d, true))
        .collect();

    Ok(Json(UserDetail {
        id: user.id,
        name: user.name,
        email: user.email,
        address: user.address,
        role: user.role,
        created_at: user.created_at,
        stores,
        ratings,
    }))
}

/// Change the caller's own password. Any authenticated user.
///
/// The target account is the token identity; the new password is always
/// re-hashed before persisting.
pub async fn update_password(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let new_password = payload
        .new_password
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("New password is required".to_string()))?;

    let password_hash = state.auth_service.hash_password(new_password)?;
    state.db.update_password(&claims.sub, &password_hash).await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Partially update a user; absent fields keep prior values. Admin only.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>> {
    let mut user = state
        .db
        .get_user_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(name) = payload.name {
        user.name = name;
    }
    if let Some(email) = payload.email {
        user.email = email;
    }
    if let Some(address) = payload.address {
        user.address = address;
    }
    if let Some(role) = payload.role.as_deref() {
        user.role =
            Role::parse(role).ok_or_else(|| AppError::Validation("Invalid role".to_string()))?;
    }
    // Password is re-hashed only when one was supplied.
    if let Some(password) = payload.password.as_deref().filter(|v| !v.is_empty()) {
        user.password_hash = state.auth_service.hash_password(password)?;
    }

    state.db.update_user(&user).await?;

    Ok(Json(PublicUser::from(&user)))
}
