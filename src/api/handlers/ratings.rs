use crate::{
    auth::AuthUser,
    types::{
        AddRatingRequest, AppError, RatingCreated, RatingEntry, RatingListQuery, RatingStats,
        Result, UpdateRatingRequest,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

/// Valid score bounds, inclusive.
const MIN_SCORE: i64 = 1;
const MAX_SCORE: i64 = 5;

fn validate_score(score: Option<i64>) -> Result<i64> {
    match score {
        Some(s) if (MIN_SCORE..=MAX_SCORE).contains(&s) => Ok(s),
        _ => Err(AppError::Validation(
            "Rating must be between 1 and 5".to_string(),
        )),
    }
}

/// Submit a rating for a store.
///
/// The score is validated before any lookup so an out-of-range submission
/// never writes a row. The rater is the body's `userId` when present,
/// otherwise the caller's token identity.
#[utoipa::path(
    post,
    path = "/api/rating",
    request_body = AddRatingRequest,
    responses(
        (status = 201, description = "Rating created", body = RatingCreated),
        (status = 400, description = "Score outside [1,5] or missing storeId"),
        (status = 404, description = "Store not found")
    ),
    tag = "rating"
)]
pub async fn add_rating(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<AddRatingRequest>,
) -> Result<(StatusCode, Json<RatingCreated>)> {
    let score = validate_score(payload.rating)?;

    let store_id = payload
        .store_id
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Validation("storeId is required".to_string()))?;

    if state.db.get_store_by_id(store_id).await?.is_none() {
        return Err(AppError::NotFound("Store not found".to_string()));
    }

    let rater_id = payload.user_id.as_deref().unwrap_or(&claims.sub);

    let rating = state
        .db
        .create_rating(rater_id, store_id, score, payload.comment.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(RatingCreated::from(&rating))))
}

/// List ratings, optionally filtered by store and/or rater, with both
/// joined in.
pub async fn list_ratings(
    State(state): State<AppState>,
    Query(query): Query<RatingListQuery>,
) -> Result<Json<Vec<RatingEntry>>> {
    let ratings = state
        .db
        .list_ratings(query.store_id.as_deref(), query.user_id.as_deref())
        .await?
        .into_iter()
        .map(|d| super::rating_entry(d, true))
        .collect();

    Ok(Json(ratings))
}

/// Aggregate rating figures for one store; 404 when it has no ratings.
#[utoipa::path(
    get,
    path = "/api/rating/stats/{store_id}",
    params(("store_id" = String, Path, description = "Store id")),
    responses(
        (status = 200, description = "Mean (two decimals) and count", body = RatingStats),
        (status = 404, description = "Store has no ratings")
    ),
    tag = "rating"
)]
pub async fn rating_stats(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Result<Json<RatingStats>> {
    let (average, total) = state.db.store_rating_stats(&store_id).await?;

    let average = match average {
        Some(avg) if total > 0 => avg,
        _ => {
            return Err(AppError::NotFound(
                "No ratings for this store".to_string(),
            ));
        }
    };

    Ok(Json(RatingStats {
        store_id,
        average_rating: format!("{:.2}", average),
        total_ratings: total,
    }))
}

/// Update a rating's score and comment in place.
pub async fn update_rating(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRatingRequest>,
) -> Result<Json<RatingCreated>> {
    let score = validate_score(payload.rating)?;

    let mut rating = state
        .db
        .get_rating_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Rating not found".to_string()))?;

    rating.score = score;
    if payload.comment.is_some() {
        rating.comment = payload.comment;
    }

    state
        .db
        .update_rating(&rating.id, rating.score, rating.comment.as_deref())
        .await?;

    Ok(Json(RatingCreated::from(&rating)))
}
