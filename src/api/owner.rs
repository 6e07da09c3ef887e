//! Store-owner endpoints: a dashboard over the owner's own store.

use crate::api::AppState;
use crate::auth::{
    middleware::require_role,
    models::{Claims, Role},
};
use crate::error::ApiError;
use crate::models::Store;
use axum::{extract::State, Extension, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct RaterSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct OwnerRatingEntry {
    pub id: i64,
    pub user: RaterSummary,
    pub rating: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerDashboard {
    pub store: Store,
    pub ratings: Vec<OwnerRatingEntry>,
    pub average_rating: Option<f64>,
}

/// Owner dashboard - GET /store-owner/dashboard (store_owner only)
///
/// 404s when the owner has no store assigned yet.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<OwnerDashboard>, ApiError> {
    require_role(&claims, Role::StoreOwner)?;

    let owner_id = claims
        .user_id()
        .ok_or(ApiError::Unauthenticated("Invalid or expired token"))?;

    let store = state
        .db
        .stores()
        .find_by_owner(owner_id)?
        .ok_or(ApiError::NotFound("Store not found"))?;

    let ratings = state
        .db
        .ratings()
        .list_for_store(store.id)?
        .into_iter()
        .map(|r| OwnerRatingEntry {
            id: r.id,
            user: RaterSummary {
                id: r.user_id,
                name: r.user_name,
                email: r.user_email,
            },
            rating: r.rating,
        })
        .collect();
    let average_rating = state.db.ratings().store_average(store.id)?;

    Ok(Json(OwnerDashboard {
        store,
        ratings,
        average_rating,
    }))
}
