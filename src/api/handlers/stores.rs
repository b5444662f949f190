use crate::{
    auth::AuthUser,
    types::{
        AppError, Claims, CreateStoreRequest, MessageResponse, OwnedStoreRatings, PublicUser,
        Result, Role, Store, StoreDetail, StoreListQuery, StoreSummary, UpdateStoreRequest,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

/// Ownership rule shared by update and delete: the caller must be an admin
/// or the store's owner.
fn ensure_can_manage(claims: &Claims, store: &Store, action: &str) -> Result<()> {
    if claims.role == Role::Admin || claims.sub == store.owner_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Forbidden: You can only {} your own stores",
            action
        )))
    }
}

async fn summarize(state: &AppState, store: Store) -> Result<StoreSummary> {
    let (average, total) = state.db.store_rating_stats(&store.id).await?;

    Ok(StoreSummary {
        id: store.id,
        owner_id: store.owner_id,
        name: store.name,
        email: store.email,
        address: store.address,
        image: store.image,
        average_rating: average,
        total_ratings: total,
    })
}

/// Create a store linked to an existing owner. Admin or owner role.
pub async fn create_store(
    State(state): State<AppState>,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<StoreSummary>)> {
    let (name, address, email, owner_id) = match (
        payload.name.as_deref().filter(|v| !v.is_empty()),
        payload.address.as_deref().filter(|v| !v.is_empty()),
        payload.email.as_deref().filter(|v| !v.is_empty()),
        payload.owner_id.as_deref().filter(|v| !v.is_empty()),
    ) {
        (Some(n), Some(a), Some(e), Some(o)) => (n, a, e, o),
        _ => {
            return Err(AppError::Validation(
                "Name, address, email and ownerId are required".to_string(),
            ));
        }
    };

    if state.db.get_user_by_id(owner_id).await?.is_none() {
        return Err(AppError::NotFound("Owner not found".to_string()));
    }

    let store = state
        .db
        .create_store(owner_id, name, email, address, payload.image.as_deref())
        .await?;

    tracing::info!(store_id = %store.id, owner_id = %store.owner_id, "created store");

    let summary = summarize(&state, store).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// List stores with substring filters; each row carries its computed
/// average rating and rating count. Any authenticated user.
pub async fn list_stores(
    State(state): State<AppState>,
    Query(query): Query<StoreListQuery>,
) -> Result<Json<Vec<StoreSummary>>> {
    let aggregates = state
        .db
        .list_stores(
            query.name.as_deref(),
            query.email.as_deref(),
            query.address.as_deref(),
        )
        .await?;

    let summaries = aggregates
        .into_iter()
        .map(|a| StoreSummary {
            id: a.store.id,
            owner_id: a.store.owner_id,
            name: a.store.name,
            email: a.store.email,
            address: a.store.address,
            image: a.store.image,
            average_rating: a.average_rating,
            total_ratings: a.total_ratings,
        })
        .collect();

    Ok(Json(summaries))
}

/// Fetch one store with its owner, ratings, and computed average.
pub async fn get_store(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoreDetail>> {
    let store = state
        .db
        .get_store_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;

    let owner = state
        .db
        .get_user_by_id(&store.owner_id)
        .await?
        .ok_or_else(|| AppError::Database("Store owner missing".to_string()))?;

    let ratings: Vec<_> = state
        .db
        .list_ratings(Some(&store.id), None)
        .await?
        .into_iter()
        .map(|d| super::rating_entry(d, false))
        .collect();

    let (average, total) = state.db.store_rating_stats(&store.id).await?;

    Ok(Json(StoreDetail {
        id: store.id,
        owner_id: store.owner_id,
        name: store.name,
        email: store.email,
        address: store.address,
        image: store.image,
        owner: PublicUser::from(&owner),
        ratings,
        average_rating: average,
        total_ratings: total,
    }))
}

/// Partially update a store. Caller must be an admin or the store's owner.
pub async fn update_store(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStoreRequest>,
) -> Result<Json<StoreSummary>> {
    let mut store = state
        .db
        .get_store_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;

    ensure_can_manage(&claims, &store, "update")?;

    if let Some(name) = payload.name {
        store.name = name;
    }
    if let Some(email) = payload.email {
        store.email = email;
    }
    if let Some(address) = payload.address {
        store.address = address;
    }
    if let Some(image) = payload.image {
        store.image = Some(image);
    }

    state.db.update_store(&store).await?;

    let summary = summarize(&state, store).await?;
    Ok(Json(summary))
}

/// Delete a store and all of its ratings. Same ownership rule as update.
pub async fn delete_store(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let store = state
        .db
        .get_store_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;

    ensure_can_manage(&claims, &store, "delete")?;

    state.db.delete_store_with_ratings(&store.id).await?;

    tracing::info!(store_id = %store.id, "deleted store and its ratings");

    Ok(Json(MessageResponse::new(
        "Store and related ratings deleted successfully",
    )))
}

/// List the stores owned by a user. Admins may view anyone's stores;
/// everyone else only their own.
pub async fn stores_by_owner(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<StoreSummary>>> {
    if claims.role != Role::Admin && claims.sub != user_id {
        return Err(AppError::Forbidden(
            "Forbidden: You can only view your own stores".to_string(),
        ));
    }

    let stores = state.db.stores_by_owner(&user_id).await?;

    let mut summaries = Vec::with_capacity(stores.len());
    for store in stores {
        summaries.push(summarize(&state, store).await?);
    }

    Ok(Json(summaries))
}

/// For each store owned by a user, its ratings with rater identity.
pub async fn owner_store_ratings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OwnedStoreRatings>>> {
    let stores = state.db.stores_by_owner(&user_id).await?;

    if stores.is_empty() {
        return Err(AppError::NotFound(
            "No stores found for this user".to_string(),
        ));
    }

    let mut result = Vec::with_capacity(stores.len());
    for store in stores {
        let ratings = state
            .db
            .list_ratings(Some(&store.id), None)
            .await?
            .into_iter()
            .map(|d| super::rating_entry(d, false))
            .collect();

        result.push(OwnedStoreRatings {
            store_id: store.id,
            store_name: store.name,
            ratings,
        });
    }

    Ok(Json(result))
}
