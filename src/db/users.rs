//! User Storage
//! Mission: Securely store and manage user accounts with SQLite

use crate::auth::models::{Role, User};
use crate::db::{is_unique_violation, like_pattern, DbError, SortOrder};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::sync::Arc;
use tracing::{info, warn};

/// Fields required to register a user. The plaintext password never leaves
/// this layer; only its bcrypt hash is stored.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub address: Option<&'a str>,
    pub role: Role,
}

/// Filters for the admin user listing. All are optional and combined.
#[derive(Debug, Default)]
pub struct UserFilter<'a> {
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub address: Option<&'a str>,
    pub role: Option<Role>,
}

/// Sortable columns for the admin user listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Name,
    Email,
    Address,
    Role,
}

impl UserSortField {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "name" => Some(UserSortField::Name),
            "email" => Some(UserSortField::Email),
            "address" => Some(UserSortField::Address),
            "role" => Some(UserSortField::Role),
            _ => None,
        }
    }

    fn column(self) -> &'static str {
        match self {
            UserSortField::Name => "name",
            UserSortField::Email => "email",
            UserSortField::Address => "address",
            UserSortField::Role => "role",
        }
    }
}

/// User accounts backed by the shared SQLite connection.
#[derive(Clone)]
pub struct UserStore {
    conn: Arc<Mutex<Connection>>,
}

impl UserStore {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// Create a user. The email UNIQUE constraint is the source of truth
    /// for duplicates; a violation maps to `DbError::DuplicateEmail`.
    pub fn create(&self, new: NewUser<'_>) -> Result<User, DbError> {
        let password_hash = hash(new.password, DEFAULT_COST)?;
        let created_at = Utc::now().to_rfc3339();

        let conn = self.conn.lock();
        let result = conn.execute(
            "INSERT INTO users (name, email, password_hash, address, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.name,
                new.email,
                password_hash,
                new.address,
                new.role.as_str(),
                created_at,
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(DbError::DuplicateEmail),
            Err(e) => return Err(e.into()),
        }

        let user = User {
            id: conn.last_insert_rowid(),
            name: new.name.to_string(),
            email: new.email.to_string(),
            password_hash,
            address: new.address.map(|a| a.to_string()),
            role: new.role,
            created_at,
        };

        info!("✅ Created user: {} ({})", user.email, user.role.as_str());

        Ok(user)
    }

    /// Seed the first admin account if no admin exists yet. Without this the
    /// platform has no way to mint its first admin.
    pub fn ensure_default_admin(&self, email: &str, password: &str) -> Result<(), DbError> {
        {
            let conn = self.conn.lock();
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE role = 'admin'",
                [],
                |row| row.get(0),
            )?;
            if count > 0 {
                return Ok(());
            }
        }

        self.create(NewUser {
            name: "Platform Administrator",
            email,
            password,
            address: None,
            role: Role::Admin,
        })?;

        info!("🔐 Default admin user created ({})", email);
        warn!("⚠️  CHANGE THE DEFAULT ADMIN PASSWORD IN PRODUCTION!");

        Ok(())
    }

    /// Case-insensitive lookup (the email column collates NOCASE).
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, password_hash, address, role, created_at
             FROM users WHERE email = ?1",
        )?;

        match stmt.query_row(params![email], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, password_hash, address, role, created_at
             FROM users WHERE id = ?1",
        )?;

        match stmt.query_row(params![id], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Check a plaintext password against the stored hash. An unknown email
    /// reads as a plain mismatch.
    pub fn verify_password(&self, email: &str, password: &str) -> Result<bool, DbError> {
        match self.get_by_email(email)? {
            Some(user) => Ok(verify(password, &user.password_hash)?),
            None => Ok(false),
        }
    }

    /// Replace the stored hash with a fresh one (new random salt).
    pub fn update_password(&self, user_id: i64, new_password: &str) -> Result<(), DbError> {
        let password_hash = hash(new_password, DEFAULT_COST)?;

        let conn = self.conn.lock();
        conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, user_id],
        )?;

        Ok(())
    }

    /// Filtered, sorted listing for the admin view. The sort column comes
    /// from a closed enum, never from raw client input.
    pub fn list(
        &self,
        filter: &UserFilter<'_>,
        sort: UserSortField,
        order: SortOrder,
    ) -> Result<Vec<User>, DbError> {
        let sql = format!(
            "SELECT id, name, email, password_hash, address, role, created_at
             FROM users
             WHERE (?1 IS NULL OR name LIKE ?1)
               AND (?2 IS NULL OR email LIKE ?2)
               AND (?3 IS NULL OR address LIKE ?3)
               AND (?4 IS NULL OR role = ?4)
             ORDER BY {} COLLATE NOCASE {}",
            sort.column(),
            order.keyword()
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql)?;
        let users = stmt
            .query_map(
                params![
                    filter.name.map(like_pattern),
                    filter.email.map(like_pattern),
                    filter.address.map(like_pattern),
                    filter.role.as_ref().map(|r| r.as_str()),
                ],
                row_to_user,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    pub fn count(&self) -> Result<i64, DbError> {
        let conn = self.conn.lock();
        let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        address: row.get(4)?,
        role: Role::from_str(&role_str).unwrap_or(Role::Normal),
        created_at: row.get(6)?,
    })
}
