//! Authentication API Endpoints
//! Mission: Provide signup, login, and password change endpoints

use crate::api::AppState;
use crate::auth::models::{
    ChangePasswordRequest, Claims, LoginRequest, LoginResponse, Role, SignupRequest,
    SignupResponse, UserSummary, CHANGE_PASSWORD_RULES, LOGIN_RULES, SIGNUP_RULES,
};
use crate::db::users::NewUser;
use crate::error::ApiError;
use crate::validate;
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Self-registration - POST /auth/signup
/// Every self-registered account is a normal user; owners and admins are
/// created by an admin.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    validate::run(&payload, SIGNUP_RULES)?;

    let user = state.db.users().create(NewUser {
        name: &payload.name,
        email: &payload.email,
        password: &payload.password,
        address: payload.address.as_deref(),
        role: Role::Normal,
    })?;

    info!("✅ Signup successful: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User registered successfully".to_string(),
            user: UserSummary::from_user(&user),
        }),
    ))
}

/// Login endpoint - POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate::run(&payload, LOGIN_RULES)?;

    info!("🔐 Login attempt: {}", payload.email);

    // Verify credentials
    let valid = state
        .db
        .users()
        .verify_password(&payload.email, &payload.password)?;

    if !valid {
        warn!("❌ Failed login attempt: {}", payload.email);
        return Err(ApiError::InvalidCredentials);
    }

    let user = state
        .db
        .users()
        .get_by_email(&payload.email)?
        .ok_or(ApiError::InvalidCredentials)?;

    let (token, _) = state.jwt.generate_token(&user)?;

    info!("✅ Login successful: {} ({})", user.email, user.role.as_str());

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: UserSummary::from_user(&user),
    }))
}

/// Password change - PUT /auth/password
/// Open to any authenticated role; the old password must check out.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    validate::run(&payload, CHANGE_PASSWORD_RULES)?;

    let user_id = claims
        .user_id()
        .ok_or(ApiError::Unauthenticated("Invalid or expired token"))?;

    let user = state
        .db
        .users()
        .get_by_id(user_id)?
        .ok_or(ApiError::NotFound("User not found"))?;

    let valid = state
        .db
        .users()
        .verify_password(&user.email, &payload.old_password)?;

    if !valid {
        warn!("❌ Password change rejected for {}", user.email);
        return Err(ApiError::InvalidCredentials);
    }

    state.db.users().update_password(user_id, &payload.new_password)?;

    info!("🔑 Password updated: {}", user.email);

    Ok(Json(json!({ "message": "Password updated successfully" })))
}
