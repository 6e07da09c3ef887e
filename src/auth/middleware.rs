//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation

use crate::auth::{
    jwt::JwtHandler,
    models::{Claims, Role},
};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Auth middleware that validates Bearer tokens on protected routes.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .map(|t| t.to_string())
        .ok_or(ApiError::Unauthenticated("Missing authorization token"))?;

    let claims = jwt_handler
        .validate_token(&token)
        .map_err(|_| ApiError::Unauthenticated("Invalid or expired token"))?;

    // Handlers read these via Extension<Claims>
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

/// Role gates are exact: an admin token does not pass a normal-only gate.
pub fn require_role(claims: &Claims, role: Role) -> Result<(), ApiError> {
    if claims.role == role {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn claims_for(role: Role) -> Claims {
        Claims {
            sub: "1".to_string(),
            email: "test@example.com".to_string(),
            role,
            exp: 1234567890,
        }
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));

        headers.insert("Authorization", HeaderValue::from_static("Token abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert("Authorization", HeaderValue::from_static("bearer abc"));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_require_role_is_exact() {
        assert!(require_role(&claims_for(Role::Normal), Role::Normal).is_ok());
        assert!(require_role(&claims_for(Role::Admin), Role::Admin).is_ok());

        // Admin is not a superset of the other roles.
        let err = require_role(&claims_for(Role::Admin), Role::Normal).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));

        let err = require_role(&claims_for(Role::StoreOwner), Role::Admin).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }
}
