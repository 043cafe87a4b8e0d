//! services/api/src/web/summarize_task.rs
//!
//! This module contains the asynchronous "worker" function responsible for
//! one summarize cycle: range query, concatenation, and the completion call.

use chrono::Utc;
use storyteller_core::domain::TimeFrame;
use storyteller_core::ports::{DatabaseService, PortError, SummarizationService};
use tracing::{error, info};
use uuid::Uuid;

/// Stories inside the window are joined with a blank line between them.
const STORY_SEPARATOR: &str = "\n\n";

/// The ways a summarize cycle can fail. An empty window is reported before
/// the summarizer is ever invoked.
#[derive(Debug)]
pub enum SummarizeError {
    EmptyRange,
    Store(PortError),
    Summarizer(PortError),
}

impl SummarizeError {
    /// The short user-facing message for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            SummarizeError::EmptyRange => "No stories found in the selected time frame.",
            SummarizeError::Store(_) => "Failed to fetch stories. Please try again.",
            SummarizeError::Summarizer(_) => "Failed to generate summary. Please try again.",
        }
    }
}

/// The main asynchronous task for handling a single summarize request.
pub async fn summarize_time_frame(
    db: &dyn DatabaseService,
    summarizer: &dyn SummarizationService,
    user_id: Uuid,
    time_frame: TimeFrame,
) -> Result<String, SummarizeError> {
    let (start, end) = time_frame.window(Utc::now());
    info!(
        "Summarizing stories for user {} in the '{}' window.",
        user_id,
        time_frame.label()
    );

    let contents = db
        .list_story_contents_in_range(user_id, start, end)
        .await
        .map_err(|e| {
            error!("Failed to fetch stories for summarization: {:?}", e);
            SummarizeError::Store(e)
        })?;

    // An empty window blocks the completion call entirely.
    if contents.is_empty() {
        return Err(SummarizeError::EmptyRange);
    }

    let combined = contents.join(STORY_SEPARATOR);

    summarizer.summarize(&combined).await.map_err(|e| {
        error!("Failed to generate summary: {:?}", e);
        SummarizeError::Summarizer(e)
    })
}
