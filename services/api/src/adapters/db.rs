//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use storyteller_core::domain::{AuthSession, Identity, Story, User};
use storyteller_core::ports::{DatabaseService, PortError, PortResult};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct StoryRecord {
    id: Uuid,
    user_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}
impl StoryRecord {
    fn to_domain(self) -> Story {
        Story {
            id: self.id,
            user_id: self.user_id,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: Uuid,
    email: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            user_id: self.user_id,
            identity: Identity {
                email: self.email,
                name: self.display_name,
                picture: self.avatar_url,
            },
            expires_at: self.expires_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn ensure_user(&self, email: &str) -> PortResult<User> {
        // Conditional insert: a concurrent call for the same email lands on
        // the conflict arm and both calls read back the same row.
        sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2) ON CONFLICT (email) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(email)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let record =
            sqlx::query_as::<_, UserRecord>("SELECT id, email FROM users WHERE email = $1")
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => {
                        PortError::NotFound(format!("User {} not found", email))
                    }
                    _ => PortError::Unexpected(e.to_string()),
                })?;

        Ok(record.to_domain())
    }

    async fn list_stories(&self, user_id: Uuid) -> PortResult<Vec<Story>> {
        let records = sqlx::query_as::<_, StoryRecord>(
            "SELECT id, user_id, content, created_at FROM stories \
             WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn insert_story(&self, user_id: Uuid, content: &str) -> PortResult<Story> {
        // Rejected before any query is issued.
        if content.trim().is_empty() {
            return Err(PortError::Invalid(
                "Please write something before submitting.".to_string(),
            ));
        }

        let record = sqlx::query_as::<_, StoryRecord>(
            "INSERT INTO stories (id, user_id, content) VALUES ($1, $2, $3) \
             RETURNING id, user_id, content, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(record.to_domain())
    }

    async fn list_story_contents_in_range(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PortResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT content FROM stories \
             WHERE user_id = $1 AND created_at >= $2 AND created_at <= $3 \
             ORDER BY created_at ASC",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        rows.into_iter()
            .map(|row| {
                row.try_get::<String, _>("content")
                    .map_err(|e| PortError::Unexpected(e.to_string()))
            })
            .collect()
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        identity: &Identity,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO auth_sessions (id, user_id, email, display_name, avatar_url, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(session_id)
        .bind(user_id)
        .bind(&identity.email)
        .bind(&identity.name)
        .bind(&identity.picture)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, user_id, email, display_name, avatar_url, expires_at \
             FROM auth_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => PortError::Unexpected(e.to_string()),
        })?;

        if record.expires_at <= Utc::now() {
            // Expired rows are torn down on first sight.
            self.delete_auth_session(session_id).await?;
            return Err(PortError::Unauthorized);
        }

        Ok(record.to_domain())
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
