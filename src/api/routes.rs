use crate::api::handlers::{admin, auth, ratings, stores, users};
use crate::auth::{auth_middleware, require_role};
use crate::types::Role;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const ADMIN_OR_OWNER: &[Role] = &[Role::Admin, Role::Owner];

/// Liveness probe.
pub async fn health() -> &'static str {
    "OK"
}

/// Assembles the full application router.
///
/// Public routes (`/health`, `/api/auth/*`) bypass authentication; every
/// other `/api` route passes through the bearer-token middleware, and
/// role-gated routes additionally pass through a role allow-list layer.
pub fn create_router(state: AppState) -> Router {
    let auth_service = state.auth_service.clone();

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // GET /user and per-id operations are admin-only; the password change
    // applies to the caller's own account and needs no role.
    let user_routes = Router::new()
        .route("/password", put(users::update_password))
        .merge(
            Router::new()
                .route("/", get(users::list_users))
                .route("/{id}", get(users::get_user).put(users::update_user))
                .route_layer(middleware::from_fn(|req, next| {
                    require_role(ADMIN_ONLY, req, next)
                })),
        );

    // Reads are open to any authenticated user; create/update/delete and the
    // owner listing are gated to admins and owners (handlers enforce the
    // per-store ownership rule on top).
    let store_routes = Router::new()
        .route("/", get(stores::list_stores))
        .route("/{id}", get(stores::get_store))
        .route("/{user_id}/ratings", get(stores::owner_store_ratings))
        .merge(
            Router::new()
                .route("/", post(stores::create_store))
                .route(
                    "/{id}",
                    put(stores::update_store).delete(stores::delete_store),
                )
                .route("/owner/{user_id}", get(stores::stores_by_owner))
                .route_layer(middleware::from_fn(|req, next| {
                    require_role(ADMIN_OR_OWNER, req, next)
                })),
        );

    let rating_routes = Router::new()
        .route("/", post(ratings::add_rating).get(ratings::list_ratings))
        .route("/{id}", put(ratings::update_rating))
        .route("/stats/{store_id}", get(ratings::rating_stats));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard_stats))
        .route("/users", post(admin::add_user).get(admin::list_users))
        .route("/users/{id}", get(admin::user_details))
        .route("/stores", get(admin::list_stores))
        .route_layer(middleware::from_fn(|req, next| {
            require_role(ADMIN_ONLY, req, next)
        }));

    let protected_routes = Router::new()
        .nest("/user", user_routes)
        .nest("/store", store_routes)
        .nest("/rating", rating_routes)
        .nest("/admin", admin_routes)
        .layer(middleware::from_fn(move |req, next| {
            auth_middleware(auth_service.clone(), req, next)
        }));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .merge(protected_routes);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api_routes)
        .with_state(state)
}
