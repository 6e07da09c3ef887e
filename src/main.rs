//! RateHub Backend - Store Rating Platform API
//! Mission: One backend for shoppers, store owners, and admins

use anyhow::{Context, Result};
use dotenv::dotenv;
use ratehub_backend::{api::create_router, auth::JwtHandler, config::Config, db::Database};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logging
    load_env();
    init_tracing();

    info!("🚀 RateHub Backend Starting");

    let config = Config::from_env();

    let db = Database::open(&config.database_path)?;
    db.users()
        .ensure_default_admin(&config.admin_email, &config.admin_password)?;
    info!("📊 Database initialized at: {}", config.database_path);

    let jwt_handler = Arc::new(JwtHandler::new(config.jwt_secret.clone()));
    info!("🔐 Authentication ready");

    let app = create_router(db, jwt_handler);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the manifest dir .env (common when running with
    // --manifest-path from elsewhere).
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join(".env");
    if candidate.exists() {
        let _ = dotenv::from_path(&candidate);
    }
}

/// Initialize tracing with env-driven filtering
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratehub_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
