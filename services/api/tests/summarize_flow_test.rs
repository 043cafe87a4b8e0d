//! Tests for the summarize flow: range selection, concatenation, and error
//! surfacing, driven against the in-memory store and a scripted summarizer.

use api_lib::adapters::InMemoryStore;
use api_lib::web::summarize_task::{summarize_time_frame, SummarizeError};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Mutex;
use storyteller_core::domain::TimeFrame;
use storyteller_core::ports::{DatabaseService, PortError, PortResult, SummarizationService};
use uuid::Uuid;

/// A summarizer that records every prompt it receives and answers from a
/// script instead of the network.
#[derive(Default)]
struct ScriptedSummarizer {
    fail: bool,
    received: Mutex<Vec<String>>,
}

impl ScriptedSummarizer {
    fn failing() -> Self {
        Self {
            fail: true,
            received: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummarizationService for ScriptedSummarizer {
    async fn summarize(&self, text: &str) -> PortResult<String> {
        self.received.lock().unwrap().push(text.to_string());
        if self.fail {
            Err(PortError::Unexpected("connection reset".to_string()))
        } else {
            Ok("one combined story".to_string())
        }
    }
}

/// Three stories dated today, 5 days ago, and 40 days ago.
async fn seed_three_stories(store: &InMemoryStore) -> Uuid {
    let user = store.ensure_user("writer@example.com").await.unwrap();
    let now = Utc::now();
    store
        .insert_story_at(user.id, "today's story", now - Duration::hours(1))
        .await;
    store
        .insert_story_at(user.id, "five days ago", now - Duration::days(5))
        .await;
    store
        .insert_story_at(user.id, "forty days ago", now - Duration::days(40))
        .await;
    user.id
}

#[tokio::test]
async fn one_day_summarizes_exactly_the_story_from_today() {
    let store = InMemoryStore::new();
    let summarizer = ScriptedSummarizer::default();
    let user_id = seed_three_stories(&store).await;

    let summary = summarize_time_frame(&store, &summarizer, user_id, TimeFrame::Day)
        .await
        .unwrap();
    assert_eq!(summary, "one combined story");

    let calls = summarizer.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("today's story"));
    assert!(!calls[0].contains("five days ago"));
    assert!(!calls[0].contains("forty days ago"));
}

#[tokio::test]
async fn one_week_summarizes_the_two_recent_stories() {
    let store = InMemoryStore::new();
    let summarizer = ScriptedSummarizer::default();
    let user_id = seed_three_stories(&store).await;

    summarize_time_frame(&store, &summarizer, user_id, TimeFrame::Week)
        .await
        .unwrap();

    let calls = summarizer.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].contains("today's story"));
    assert!(calls[0].contains("five days ago"));
    assert!(!calls[0].contains("forty days ago"));
}

#[tokio::test]
async fn one_month_excludes_the_forty_day_old_story() {
    let store = InMemoryStore::new();
    let summarizer = ScriptedSummarizer::default();
    let user_id = seed_three_stories(&store).await;

    summarize_time_frame(&store, &summarizer, user_id, TimeFrame::Month)
        .await
        .unwrap();

    let calls = summarizer.calls();
    assert!(calls[0].contains("today's story"));
    assert!(calls[0].contains("five days ago"));
    assert!(!calls[0].contains("forty days ago"));
}

#[tokio::test]
async fn stories_are_joined_oldest_first_with_a_blank_line() {
    let store = InMemoryStore::new();
    let summarizer = ScriptedSummarizer::default();
    let user_id = seed_three_stories(&store).await;

    summarize_time_frame(&store, &summarizer, user_id, TimeFrame::Week)
        .await
        .unwrap();

    let calls = summarizer.calls();
    assert!(calls[0].contains("five days ago\n\ntoday's story"));
}

#[tokio::test]
async fn empty_window_blocks_the_summarizer_call() {
    let store = InMemoryStore::new();
    let summarizer = ScriptedSummarizer::default();
    let user = store.ensure_user("writer@example.com").await.unwrap();

    for frame in [TimeFrame::Day, TimeFrame::Week, TimeFrame::Month] {
        let err = summarize_time_frame(&store, &summarizer, user.id, frame)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::EmptyRange));
        assert_eq!(
            err.user_message(),
            "No stories found in the selected time frame."
        );
    }

    // The completion endpoint was never reached.
    assert!(summarizer.calls().is_empty());
}

#[tokio::test]
async fn completion_failure_surfaces_the_retry_message() {
    let store = InMemoryStore::new();
    let summarizer = ScriptedSummarizer::failing();
    let user_id = seed_three_stories(&store).await;

    let err = summarize_time_frame(&store, &summarizer, user_id, TimeFrame::Week)
        .await
        .unwrap_err();
    assert!(matches!(err, SummarizeError::Summarizer(_)));
    assert_eq!(
        err.user_message(),
        "Failed to generate summary. Please try again."
    );
}
