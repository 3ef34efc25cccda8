//! Repository for the `users` table.

use netcrm_core::roles::{ROLE_ADMIN, ROLE_MANAGER};
use netcrm_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, User, UserOption};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, last_login_at, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Active users who can approve projects, for the manager select.
    pub async fn list_managers(pool: &PgPool) -> Result<Vec<UserOption>, sqlx::Error> {
        sqlx::query_as::<_, UserOption>(
            "SELECT id, name FROM users
             WHERE is_active = true AND role IN ($1, $2)
             ORDER BY name",
        )
        .bind(ROLE_MANAGER)
        .bind(ROLE_ADMIN)
        .fetch_all(pool)
        .await
    }

    /// Active users with the given role, for assignment selects.
    pub async fn list_by_role(pool: &PgPool, role: &str) -> Result<Vec<UserOption>, sqlx::Error> {
        sqlx::query_as::<_, UserOption>(
            "SELECT id, name FROM users WHERE is_active = true AND role = $1 ORDER BY name",
        )
        .bind(role)
        .fetch_all(pool)
        .await
    }

    /// Record a successful login.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
