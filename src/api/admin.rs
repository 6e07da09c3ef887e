//! Admin endpoints: user and store management plus the platform dashboard.

use crate::api::AppState;
use crate::auth::{
    middleware::require_role,
    models::{Claims, Role, User},
};
use crate::db::{
    stores::{NewStore, StoreFilter, StoreSortField},
    users::{NewUser, UserFilter, UserSortField},
    SortOrder,
};
use crate::error::ApiError;
use crate::models::Store;
use crate::validate::{
    self, address_ok, email_ok, password_ok, store_name_ok, user_name_ok, FieldError, Rule,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

fn invalid_field(field: &'static str, message: &'static str) -> ApiError {
    ApiError::Validation(vec![FieldError { field, message }])
}

// ===== Users =====

/// Create user request (admin picks the role)
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
    pub role: String,
}

pub const CREATE_USER_RULES: &[Rule<CreateUserRequest>] = &[
    Rule {
        field: "name",
        message: "Name must be between 3 and 60 characters",
        check: |r| user_name_ok(&r.name),
    },
    Rule {
        field: "email",
        message: "Invalid email",
        check: |r| email_ok(&r.email),
    },
    Rule {
        field: "password",
        message: "Password must be 8-16 characters with at least one uppercase letter and one special character",
        check: |r| password_ok(&r.password),
    },
    Rule {
        field: "address",
        message: "Address must be less than 400 characters",
        check: |r| address_ok(&r.address),
    },
    Rule {
        field: "role",
        message: "Invalid role",
        check: |r| Role::from_str(&r.role).is_some(),
    },
];

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub message: String,
    pub user: User,
}

/// Create user - POST /admin/users (admin only)
pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    require_role(&claims, Role::Admin)?;
    validate::run(&payload, CREATE_USER_RULES)?;

    let Some(role) = Role::from_str(&payload.role) else {
        return Err(invalid_field("role", "Invalid role"));
    };

    let user = state.db.users().create(NewUser {
        name: &payload.name,
        email: &payload.email,
        password: &payload.password,
        address: payload.address.as_deref(),
        role,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedUser {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// List users - GET /admin/users (admin only)
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<UserListQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    require_role(&claims, Role::Admin)?;

    let sort = match params.sort_by.as_deref() {
        Some(s) => UserSortField::from_str(s)
            .ok_or_else(|| invalid_field("sortBy", "Invalid sort field"))?,
        None => UserSortField::Name,
    };
    let order = parse_order(params.order.as_deref())?;
    let role = match params.role.as_deref() {
        Some(r) => Some(Role::from_str(r).ok_or_else(|| invalid_field("role", "Invalid role"))?),
        None => None,
    };

    let filter = UserFilter {
        name: params.name.as_deref(),
        email: params.email.as_deref(),
        address: params.address.as_deref(),
        role,
    };

    let users = state.db.users().list(&filter, sort, order)?;
    Ok(Json(users))
}

/// User detail row. `rating` only exists for store owners with a store:
/// their store's mean, which may itself be null.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Option<f64>>,
}

/// User detail - GET /admin/users/:id (admin only)
pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Json<UserDetail>, ApiError> {
    require_role(&claims, Role::Admin)?;

    let user = state
        .db
        .users()
        .get_by_id(id)?
        .ok_or(ApiError::NotFound("User not found"))?;

    let rating = if user.role == Role::StoreOwner {
        match state.db.stores().find_by_owner(user.id)? {
            Some(store) => Some(state.db.ratings().store_average(store.id)?),
            None => None,
        }
    } else {
        None
    };

    Ok(Json(UserDetail {
        id: user.id,
        name: user.name,
        email: user.email,
        address: user.address,
        role: user.role,
        created_at: user.created_at,
        rating,
    }))
}

// ===== Stores =====

/// Create store request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
}

pub const CREATE_STORE_RULES: &[Rule<CreateStoreRequest>] = &[
    Rule {
        field: "name",
        message: "Name must be between 1 and 60 characters",
        check: |r| store_name_ok(&r.name),
    },
    Rule {
        field: "email",
        message: "Invalid email",
        check: |r| email_ok(&r.email),
    },
    Rule {
        field: "address",
        message: "Address must be less than 400 characters",
        check: |r| address_ok(&r.address),
    },
];

#[derive(Debug, Serialize)]
pub struct CreatedStore {
    pub message: String,
    pub store: Store,
}

/// Create store - POST /admin/stores (admin only)
///
/// `ownerId` is optional, but when given it must point at a store_owner user.
pub async fn create_store(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<CreatedStore>), ApiError> {
    require_role(&claims, Role::Admin)?;
    validate::run(&payload, CREATE_STORE_RULES)?;

    if let Some(owner_id) = payload.owner_id {
        let owner = state.db.users().get_by_id(owner_id)?;
        if !owner.is_some_and(|u| u.role == Role::StoreOwner) {
            return Err(invalid_field("ownerId", "Invalid owner ID"));
        }
    }

    let store = state.db.stores().create(NewStore {
        name: &payload.name,
        email: &payload.email,
        address: payload.address.as_deref(),
        owner_id: payload.owner_id,
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedStore {
            message: "Store created successfully".to_string(),
            store,
        }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// A store row in the admin listing, mean rating included.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStoreRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub owner_id: Option<i64>,
    pub rating: Option<f64>,
}

/// List stores - GET /admin/stores (admin only)
pub async fn list_stores(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<StoreListQuery>,
) -> Result<Json<Vec<AdminStoreRow>>, ApiError> {
    require_role(&claims, Role::Admin)?;

    let sort = match params.sort_by.as_deref() {
        Some(s) => StoreSortField::from_str(s)
            .ok_or_else(|| invalid_field("sortBy", "Invalid sort field"))?,
        None => StoreSortField::Name,
    };
    let order = parse_order(params.order.as_deref())?;

    let filter = StoreFilter {
        name: params.name.as_deref(),
        email: params.email.as_deref(),
        address: params.address.as_deref(),
    };

    let rows = state.db.stores().list(&filter, sort, order)?;
    let rows = rows
        .into_iter()
        .map(|(store, rating)| AdminStoreRow {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            owner_id: store.owner_id,
            rating,
        })
        .collect();

    Ok(Json(rows))
}

// ===== Dashboard =====

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

/// Platform counts - GET /admin/dashboard (admin only)
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DashboardStats>, ApiError> {
    require_role(&claims, Role::Admin)?;

    Ok(Json(DashboardStats {
        total_users: state.db.users().count()?,
        total_stores: state.db.stores().count()?,
        total_ratings: state.db.ratings().count()?,
    }))
}

fn parse_order(raw: Option<&str>) -> Result<SortOrder, ApiError> {
    match raw {
        Some(s) => SortOrder::from_str(s).ok_or_else(|| invalid_field("order", "Invalid sort order")),
        None => Ok(SortOrder::Asc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtHandler;
    use crate::db::Database;
    use std::sync::Arc;

    fn test_state() -> AppState {
        AppState {
            db: Database::open_in_memory().unwrap(),
            jwt: Arc::new(JwtHandler::new("test-secret-key-12345".to_string())),
        }
    }

    fn admin_claims() -> Claims {
        Claims {
            sub: "1".to_string(),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            exp: usize::MAX,
        }
    }

    fn user_payload(email: &str, role: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "Olive Proprietor".to_string(),
            email: email.to_string(),
            password: "Secret!12".to_string(),
            address: None,
            role: role.to_string(),
        }
    }

    #[tokio::test]
    async fn test_admin_gate_rejects_other_roles() {
        let state = test_state();
        let mut claims = admin_claims();
        claims.role = Role::Normal;

        let err = create_user(
            State(state),
            Extension(claims),
            Json(user_payload("olive@example.com", "store_owner")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn test_create_user_honors_role_and_rejects_unknown() {
        let state = test_state();

        let (status, Json(created)) = create_user(
            State(state.clone()),
            Extension(admin_claims()),
            Json(user_payload("olive@example.com", "store_owner")),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.user.role, Role::StoreOwner);

        let err = create_user(
            State(state),
            Extension(admin_claims()),
            Json(user_payload("pat@example.com", "superuser")),
        )
        .await
        .unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors[0].field, "role");
        assert_eq!(errors[0].message, "Invalid role");
    }

    #[tokio::test]
    async fn test_create_store_owner_must_be_store_owner_role() {
        let state = test_state();

        let (_, Json(normal)) = create_user(
            State(state.clone()),
            Extension(admin_claims()),
            Json(user_payload("norm@example.com", "normal")),
        )
        .await
        .unwrap();

        let err = create_store(
            State(state.clone()),
            Extension(admin_claims()),
            Json(CreateStoreRequest {
                name: "Harbor Goods".to_string(),
                email: "harbor@example.com".to_string(),
                address: None,
                owner_id: Some(normal.user.id),
            }),
        )
        .await
        .unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors[0].field, "ownerId");
        assert_eq!(errors[0].message, "Invalid owner ID");

        // A nonexistent owner reads the same as a wrong-role one.
        let err = create_store(
            State(state.clone()),
            Extension(admin_claims()),
            Json(CreateStoreRequest {
                name: "Harbor Goods".to_string(),
                email: "harbor@example.com".to_string(),
                address: None,
                owner_id: Some(999),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let (_, Json(owner)) = create_user(
            State(state.clone()),
            Extension(admin_claims()),
            Json(user_payload("olive@example.com", "store_owner")),
        )
        .await
        .unwrap();

        let (status, Json(created)) = create_store(
            State(state),
            Extension(admin_claims()),
            Json(CreateStoreRequest {
                name: "Harbor Goods".to_string(),
                email: "harbor@example.com".to_string(),
                address: None,
                owner_id: Some(owner.user.id),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.store.owner_id, Some(owner.user.id));
    }

    #[tokio::test]
    async fn test_user_detail_rating_key() {
        let state = test_state();

        let (_, Json(owner)) = create_user(
            State(state.clone()),
            Extension(admin_claims()),
            Json(user_payload("olive@example.com", "store_owner")),
        )
        .await
        .unwrap();
        let (_, Json(normal)) = create_user(
            State(state.clone()),
            Extension(admin_claims()),
            Json(user_payload("norm@example.com", "normal")),
        )
        .await
        .unwrap();

        // Owner without a store: no rating key at all.
        let Json(detail) = get_user(
            State(state.clone()),
            Extension(admin_claims()),
            Path(owner.user.id),
        )
        .await
        .unwrap();
        assert_eq!(detail.rating, None);

        let (_, Json(created)) = create_store(
            State(state.clone()),
            Extension(admin_claims()),
            Json(CreateStoreRequest {
                name: "Harbor Goods".to_string(),
                email: "harbor@example.com".to_string(),
                address: None,
                owner_id: Some(owner.user.id),
            }),
        )
        .await
        .unwrap();

        // Owner with an unrated store: rating present but null.
        let Json(detail) = get_user(
            State(state.clone()),
            Extension(admin_claims()),
            Path(owner.user.id),
        )
        .await
        .unwrap();
        assert_eq!(detail.rating, Some(None));
        let value = serde_json::to_value(&detail).unwrap();
        assert!(value.as_object().unwrap().contains_key("rating"));
        assert_eq!(value["rating"], serde_json::Value::Null);

        state
            .db
            .ratings()
            .submit(normal.user.id, created.store.id, 5)
            .unwrap();

        let Json(detail) = get_user(
            State(state.clone()),
            Extension(admin_claims()),
            Path(owner.user.id),
        )
        .await
        .unwrap();
        assert_eq!(detail.rating, Some(Some(5.0)));

        // Normal users never carry the key.
        let Json(detail) = get_user(
            State(state),
            Extension(admin_claims()),
            Path(normal.user.id),
        )
        .await
        .unwrap();
        let value = serde_json::to_value(&detail).unwrap();
        assert!(!value.as_object().unwrap().contains_key("rating"));
    }

    #[tokio::test]
    async fn test_unknown_sort_field_is_rejected() {
        let state = test_state();

        let err = list_users(
            State(state),
            Extension(admin_claims()),
            Query(UserListQuery {
                name: None,
                email: None,
                address: None,
                role: None,
                sort_by: Some("password_hash".to_string()),
                order: None,
            }),
        )
        .await
        .unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors[0].field, "sortBy");
        assert_eq!(errors[0].message, "Invalid sort field");
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let state = test_state();

        let (_, Json(owner)) = create_user(
            State(state.clone()),
            Extension(admin_claims()),
            Json(user_payload("olive@example.com", "store_owner")),
        )
        .await
        .unwrap();
        let (_, Json(normal)) = create_user(
            State(state.clone()),
            Extension(admin_claims()),
            Json(user_payload("norm@example.com", "normal")),
        )
        .await
        .unwrap();
        let (_, Json(created)) = create_store(
            State(state.clone()),
            Extension(admin_claims()),
            Json(CreateStoreRequest {
                name: "Harbor Goods".to_string(),
                email: "harbor@example.com".to_string(),
                address: None,
                owner_id: Some(owner.user.id),
            }),
        )
        .await
        .unwrap();
        state
            .db
            .ratings()
            .submit(normal.user.id, created.store.id, 4)
            .unwrap();

        let Json(stats) = dashboard_stats(State(state), Extension(admin_claims()))
            .await
            .unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_stores, 1);
        assert_eq!(stats.total_ratings, 1);
    }
}
