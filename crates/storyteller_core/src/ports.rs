//! crates/storyteller_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{AuthSession, Identity, Story, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Invalid(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Returns the user row for `email`, creating it if absent.
    ///
    /// The insert is conditional (insert-if-not-exists), so two concurrent
    /// calls for the same email never produce duplicate rows and never error.
    async fn ensure_user(&self, email: &str) -> PortResult<User>;

    // --- Story Management ---

    /// All stories for a user, newest first.
    async fn list_stories(&self, user_id: Uuid) -> PortResult<Vec<Story>>;

    /// Inserts a story with a store-assigned timestamp and returns the row.
    ///
    /// Empty or whitespace-only content is rejected locally with
    /// `PortError::Invalid` before any query is issued.
    async fn insert_story(&self, user_id: Uuid, content: &str) -> PortResult<Story>;

    /// Contents of the user's stories with `start <= created_at <= end`,
    /// oldest first. An inverted range yields an empty sequence.
    async fn list_story_contents_in_range(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> PortResult<Vec<String>>;

    // --- Auth Sessions ---

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        identity: &Identity,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Resolves a session cookie value to the signed-in principal.
    /// Unknown or expired sessions are `Unauthorized`.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait SummarizationService: Send + Sync {
    /// Generates a single free-text summary for a block of story text.
    async fn summarize(&self, text: &str) -> PortResult<String>;
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    /// The provider consent-page URL the browser is redirected to.
    /// `state` is the CSRF token round-tripped through the provider.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for the signed-in identity.
    async fn exchange_code(&self, code: &str) -> PortResult<Identity>;
}
