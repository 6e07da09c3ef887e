//! Domain records shared across the API and storage layers.

use serde::Serialize;

/// A registered store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<i64>,
    pub created_at: String,
}

/// A single user's rating of a store
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub rating: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Store row as seen by a normal user browsing the directory.
/// `overall_rating` stays null until the store has at least one rating.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListing {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub overall_rating: Option<f64>,
    pub user_rating: Option<i64>,
}
