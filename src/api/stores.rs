//! Store directory and rating endpoints for normal users.

use crate::api::AppState;
use crate::auth::{
    middleware::require_role,
    models::{Claims, Role},
};
use crate::error::ApiError;
use crate::models::{Rating, StoreListing};
use crate::validate::{self, rating_ok, Rule};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    /// Substring match on store name
    pub name: Option<String>,
    /// Substring match on store address
    pub address: Option<String>,
}

/// Browse stores - GET /stores (normal users)
///
/// Every store comes back with its overall mean and the caller's own rating.
pub async fn list_stores(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<StoreQuery>,
) -> Result<Json<Vec<StoreListing>>, ApiError> {
    require_role(&claims, Role::Normal)?;

    let user_id = claims
        .user_id()
        .ok_or(ApiError::Unauthenticated("Invalid or expired token"))?;

    let listings = state.db.stores().list_visible(
        user_id,
        params.name.as_deref(),
        params.address.as_deref(),
    )?;

    Ok(Json(listings))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: i64,
    pub rating: i64,
}

pub const SUBMIT_RATING_RULES: &[Rule<SubmitRatingRequest>] = &[Rule {
    field: "rating",
    message: "Rating must be between 1 and 5",
    check: |r| rating_ok(r.rating),
}];

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub message: String,
    pub rating: Rating,
}

/// Submit or revise a rating - POST /ratings (normal users)
pub async fn submit_rating(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitRatingRequest>,
) -> Result<Json<RatingResponse>, ApiError> {
    require_role(&claims, Role::Normal)?;
    validate::run(&payload, SUBMIT_RATING_RULES)?;

    let user_id = claims
        .user_id()
        .ok_or(ApiError::Unauthenticated("Invalid or expired token"))?;

    // Ratings only land on stores that exist.
    state
        .db
        .stores()
        .get_by_id(payload.store_id)?
        .ok_or(ApiError::NotFound("Store not found"))?;

    let (rating, created) = state
        .db
        .ratings()
        .submit(user_id, payload.store_id, payload.rating)?;

    let message = if created {
        "Rating submitted"
    } else {
        "Rating updated"
    };

    Ok(Json(RatingResponse {
        message: message.to_string(),
        rating,
    }))
}
