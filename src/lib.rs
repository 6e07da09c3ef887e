//! RateHub Backend Library
//!
//! Store-rating platform: auth, role-gated REST API, SQLite persistence.
//! Exposes core modules for use by the server binary and integration tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod validate;
