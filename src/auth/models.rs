//! Authentication Models
//! Mission: Define account, claims, and auth request/response structures

use crate::validate::{address_ok, email_ok, password_ok, user_name_ok, Rule};
use serde::{Deserialize, Serialize};

/// User account
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub address: Option<String>,
    pub role: Role,
    pub created_at: String,
}

/// Platform roles. Gates are exact matches, nothing is hierarchical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin, // Manages users, stores, and the dashboard
    #[serde(rename = "normal")]
    Normal, // Browses stores and submits ratings
    #[serde(rename = "store_owner")]
    StoreOwner, // Sees ratings received by their store
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Normal => "normal",
            Role::StoreOwner => "store_owner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "normal" => Some(Role::Normal),
            "store_owner" => Some(Role::StoreOwner),
            _ => None,
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id, stringified)
    pub email: String,
    pub role: Role,
    pub exp: usize, // expiration timestamp
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Signup request body
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
}

pub const SIGNUP_RULES: &[Rule<SignupRequest>] = &[
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
];

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub const LOGIN_RULES: &[Rule<LoginRequest>] = &[
    Rule {
        field: "email",
        message: "Invalid email",
        check: |r| email_ok(&r.email),
    },
    Rule {
        field: "password",
        message: "Password is required",
        check: |r| !r.password.is_empty(),
    },
];

/// Password change request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub const CHANGE_PASSWORD_RULES: &[Rule<ChangePasswordRequest>] = &[
    Rule {
        field: "oldPassword",
        message: "Old password is required",
        check: |r| !r.old_password.is_empty(),
    },
    Rule {
        field: "newPassword",
        message: "New password must be 8-16 characters with at least one uppercase letter and one special character",
        check: |r| password_ok(&r.new_password),
    },
];

/// User response (sanitized)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserSummary {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
        }
    }
}

/// Login response; the only place a token is issued.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

/// Signup response. No token; the client logs in next.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: UserSummary,
}
