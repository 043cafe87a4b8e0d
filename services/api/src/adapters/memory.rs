//! services/api/src/adapters/memory.rs
//!
//! In-memory implementation of the `DatabaseService` port.
//!
//! Stores rows in maps protected by an RwLock for thread-safe access. All
//! data is lost when the store is dropped. Useful for unit tests and for
//! exercising the web layer without a running database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use storyteller_core::domain::{AuthSession, Identity, Story, User};
use storyteller_core::ports::{DatabaseService, PortError, PortResult};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Internal storage for one auth session.
#[derive(Debug, Clone)]
struct StoredSession {
    user_id: Uuid,
    identity: Identity,
    expires_at: DateTime<Utc>,
}

/// An in-memory store keyed the same way as the Postgres schema:
/// users by unique email, stories by owning user.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    stories: Arc<RwLock<Vec<Story>>>,
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored stories (for testing).
    pub async fn story_count(&self) -> usize {
        self.stories.read().await.len()
    }

    /// Inserts a story with an explicit timestamp so range scenarios are
    /// deterministic (for testing).
    pub async fn insert_story_at(
        &self,
        user_id: Uuid,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> Story {
        let story = Story {
            id: Uuid::new_v4(),
            user_id,
            content: content.to_string(),
            created_at,
        };
        self.stories.write().await.push(story.clone());
        story
    }
}

#[async_trait]
impl DatabaseService for InMemoryStore {
    async fn ensure_user(&self, email: &str) -> PortResult<User> {
        let mut users = self.users.write().await;
        let user = users.entry(email.to_string()).or_insert_with(|| User {
            id: Uuid::new_v4(),
            email: email.to_string(),
        });
        Ok(user.clone())
    }

    async fn list_stories(&self, user_id: Uuid) -> PortResult<Vec<Story>> {
        let mut stories: Vec<Story> = self
            .stories
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    async fn insert_story(&self, user_id: Uuid, content: &str) -> PortResult<Story> {
        if content.trim().is_empty() {
            return Err(PortError::Invalid(
                "Please write something before submitting.".to_string(),
            ));
        }
        Ok(self.insert_story_at(user_id, content, Utc::now()).await)
    }

    async fn list_story_contents_in_range(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PortResult<Vec<String>> {
        let mut in_range: Vec<Story> = self
            .stories
            .read()
            .await
            .iter()
            .filter(|s| s.user_id == user_id && s.created_at >= start && s.created_at <= end)
            .cloned()
            .collect();
        in_range.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(in_range.into_iter().map(|s| s.content).collect())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        identity: &Identity,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.sessions.write().await.insert(
            session_id.to_string(),
            StoredSession {
                user_id,
                identity: identity.clone(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .get(session_id)
            .cloned()
            .ok_or(PortError::Unauthorized)?;
        if stored.expires_at <= Utc::now() {
            sessions.remove(session_id);
            return Err(PortError::Unauthorized);
        }
        Ok(AuthSession {
            id: session_id.to_string(),
            user_id: stored.user_id,
            identity: stored.identity.clone(),
            expires_at: stored.expires_at,
        })
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }
}
