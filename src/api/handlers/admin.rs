use crate::{
    db::UserFilters,
    types::{
        AddUserRequest, AdminStoreRow, AdminUserDetail, AdminUserRow, AppError, DashboardStats,
        PublicUser, Result, Role, StoreListQuery, UserListQuery,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

/// Platform-wide totals for the admin dashboard.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    responses(
        (status = 200, description = "Total users, stores, and ratings", body = DashboardStats)
    ),
    tag = "admin",
    security(("bearer" = []))
)]
pub async fn dashboard_stats(State(state): State<AppState>) -> Result<Json<DashboardStats>> {
    Ok(Json(DashboardStats {
        total_users: state.db.count_users().await?,
        total_stores: state.db.count_stores().await?,
        total_ratings: state.db.count_ratings().await?,
    }))
}

/// Create a user with an explicit role.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = AddUserRequest,
    responses(
        (status = 201, description = "User created", body = PublicUser),
        (status = 400, description = "Missing field, invalid role, or email taken")
    ),
    tag = "admin",
    security(("bearer" = []))
)]
pub async fn add_user(
    State(state): State<AppState>,
    Json(payload): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    let (name, email, password, address, role) = match (
        payload.name.as_deref().filter(|v| !v.is_empty()),
        payload.email.as_deref().filter(|v| !v.is_empty()),
        payload.password.as_deref().filter(|v| !v.is_empty()),
        payload.address.as_deref().filter(|v| !v.is_empty()),
        payload.role.as_deref().filter(|v| !v.is_empty()),
    ) {
        (Some(n), Some(e), Some(p), Some(a), Some(r)) => (n, e, p, a, r),
        _ => {
            return Err(AppError::Validation("All fields are required".to_string()));
        }
    };

    let role = Role::parse(role).ok_or_else(|| AppError::Validation("Invalid role".to_string()))?;

    if state.db.get_user_by_email(email).await?.is_some() {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    let password_hash = state.auth_service.hash_password(password)?;
    let user = state
        .db
        .create_user(name, email, address, &password_hash, role)
        .await?;

    tracing::info!(user_id = %user.id, role = %user.role, "admin created user");

    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

/// Flat user listing with the same filters as the user controller.
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<Vec<AdminUserRow>>> {
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

    let users = state.db.list_users(&filters, None).await?;

    Ok(Json(
        users
            .into_iter()
            .map(|u| AdminUserRow {
                id: u.id,
                name: u.name,
                email: u.email,
                address: u.address,
                role: u.role,
            })
            .collect(),
    ))
}

/// One user's details; owners additionally carry the average rating across
/// their stores (0 when unrated), other roles carry no rating field.
pub async fn user_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AdminUserDetail>> {
    let user = state
        .db
        .get_user_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let rating = match user.role {
        Role::Owner => Some(state.db.owner_average_rating(&user.id).await?.unwrap_or(0.0)),
        _ => None,
    };

    Ok(Json(AdminUserDetail {
        id: user.id,
        name: user.name,
        email: user.email,
        address: user.address,
        role: user.role,
        rating,
    }))
}

/// Store listing with the average as a two-decimal string ("0.00" when
/// unrated).
pub async fn list_stores(
    State(state): State<AppState>,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<Vec<AdminStoreRow>>> {
    let aggregates = state
        .db
        .list_stores(
            query.name.as_deref(),
            query.email.as_deref(),
            query.address.as_deref(),
        )
        .await?;

    Ok(Json(
        aggregates
            .into_iter()
            .map(|a| AdminStoreRow {
                id: a.store.id,
                name: a.store.name,
                email: a.store.email,
                address: a.store.address,
                rating: format!("{:.2}", a.average_rating.unwrap_or(0.0)),
            })
            .collect(),
    ))
}
