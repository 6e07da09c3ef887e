pub mod admin;
pub mod owner;
pub mod stores;

use crate::auth::{api as auth_api, auth_middleware, JwtHandler};
use crate::db::Database;
use crate::middleware::request_logging;
use axum::{
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtHandler>,
}

/// Create the API router
pub fn create_router(db: Database, jwt: Arc<JwtHandler>) -> Router {
    let state = AppState {
        db,
        jwt: jwt.clone(),
    };

    // Public routes (health check + auth entry points)
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(auth_api::signup))
        .route("/auth/login", post(auth_api::login))
        .with_state(state.clone());

    // Everything else requires a valid Bearer token; role gates live in
    // the handlers.
    let protected_routes = Router::new()
        .route("/auth/password", put(auth_api::change_password))
        .route("/stores", get(stores::list_stores))
        .route("/ratings", post(stores::submit_rating))
        .route(
            "/admin/users",
            post(admin::create_user).get(admin::list_users),
        )
        .route("/admin/users/:id", get(admin::get_user))
        .route(
            "/admin/stores",
            post(admin::create_store).get(admin::list_stores),
        )
        .route("/admin/dashboard", get(admin::dashboard_stats))
        .route("/store-owner/dashboard", get(owner::dashboard))
        .route_layer(middleware::from_fn_with_state(jwt, auth_middleware))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
