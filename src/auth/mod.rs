//! Authentication Module
//! Mission: Secure API access with JWT tokens and exact role gates

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;

pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, require_role};
pub use models::{Claims, Role, User};
