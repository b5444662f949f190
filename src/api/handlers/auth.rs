use crate::{
    types::{
        AppError, AuthResponse, LoginRequest, PublicUser, RegisterRequest, Result, Role,
    },
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};

/// Register a new user account with the `user` role.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Missing field or email already registered")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let (name, email, address, password) = match (
        payload.name.as_deref().filter(|v| !v.is_empty()),
        payload.email.as_deref().filter(|v| !v.is_empty()),
        payload.address.as_deref().filter(|v| !v.is_empty()),
        payload.password.as_deref().filter(|v| !v.is_empty()),
    ) {
        (Some(n), Some(e), Some(a), Some(p)) => (n, e, a, p),
        _ => {
            return Err(AppError::Validation("All fields are required".to_string()));
        }
    };

    if state.db.get_user_by_email(email).await?.is_some() {
        return Err(AppError::Validation(
            "Email already registered".to_string(),
        ));
    }

    let password_hash = state.auth_service.hash_password(password)?;
    let user = state
        .db
        .create_user(name, email, address, &password_hash, Role::User)
        .await?;

    let token = state.auth_service.issue_token(&user.id, user.role)?;

    tracing::info!(user_id = %user.id, "registered new user");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

/// Login with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Password mismatch"),
        (status = 404, description = "Unknown email")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    // Unknown email and bad password share one message so the response
    // doesn't reveal which emails are registered.
    let user = state
        .db
        .get_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid email or password".to_string()))?;

    if !state
        .auth_service
        .verify_password(&payload.password, &user.password_hash)?
    {
        return Err(AppError::Auth("Invalid email or password".to_string()));
    }

    let token = state.auth_service.issue_token(&user.id, user.role)?;

    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
    }))
}
