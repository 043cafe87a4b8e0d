//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use storyteller_core::ports::{DatabaseService, IdentityService, SummarizationService};

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub summary_adapter: Arc<dyn SummarizationService>,
    pub identity_adapter: Arc<dyn IdentityService>,
    /// Process-wide counter behind the summarize request tokens. Responses
    /// echo the token so a client can discard any response that is not the
    /// latest dispatch (an in-flight request is never cancelled).
    summarize_seq: AtomicU64,
}

impl AppState {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        config: Arc<Config>,
        summary_adapter: Arc<dyn SummarizationService>,
        identity_adapter: Arc<dyn IdentityService>,
    ) -> Self {
        Self {
            db,
            config,
            summary_adapter,
            identity_adapter,
            summarize_seq: AtomicU64::new(0),
        }
    }

    /// Draws the next summarize request token. Monotonically increasing for
    /// the lifetime of the process.
    pub fn next_summarize_token(&self) -> u64 {
        self.summarize_seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{GoogleIdentityAdapter, InMemoryStore};
    use async_trait::async_trait;
    use storyteller_core::ports::{PortResult, SummarizationService};

    struct NoopSummarizer;

    #[async_trait]
    impl SummarizationService for NoopSummarizer {
        async fn summarize(&self, _text: &str) -> PortResult<String> {
            Ok(String::new())
        }
    }

    fn test_config() -> Config {
        Config {
            bind_address: "127.0.0.1:0".parse().unwrap(),
            database_url: String::new(),
            log_level: tracing::Level::INFO,
            frontend_origin: "http://localhost:5173".to_string(),
            google_client_id: "id".to_string(),
            google_client_secret: "secret".to_string(),
            oauth_redirect_url: "http://localhost:3000/auth/callback".to_string(),
            summary_api_key: "key".to_string(),
            summary_api_base: "http://localhost".to_string(),
            summary_model: "model".to_string(),
        }
    }

    #[test]
    fn summarize_tokens_are_strictly_increasing() {
        let config = test_config();
        let state = AppState::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(config.clone()),
            Arc::new(NoopSummarizer),
            Arc::new(GoogleIdentityAdapter::new(
                config.google_client_id,
                config.google_client_secret,
                config.oauth_redirect_url,
            )),
        );
        let first = state.next_summarize_token();
        let second = state.next_summarize_token();
        let third = state.next_summarize_token();
        assert!(first < second && second < third);
    }
}
