//! crates/storyteller_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// The identity returned by the external OAuth provider after sign-in.
///
/// The application reads it once per session and carries it on the auth
/// session so the header can display the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Represents a user row, created lazily on first sign-in.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

/// A single user-authored journal entry.
///
/// Stories are immutable after creation: there is no edit or delete
/// operation anywhere in the application.
#[derive(Debug, Clone)]
pub struct Story {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    /// Assigned by the store on insert.
    pub created_at: DateTime<Utc>,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: Uuid,
    pub identity: Identity,
    pub expires_at: DateTime<Utc>,
}

/// One of the three fixed lookback windows used to bound the range query
/// for summarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFrame {
    Day,
    Week,
    Month,
}

impl TimeFrame {
    /// Number of days covered by this time frame.
    pub fn days(self) -> i64 {
        match self {
            TimeFrame::Day => 1,
            TimeFrame::Week => 7,
            TimeFrame::Month => 30,
        }
    }

    /// The label shown next to a generated summary.
    pub fn label(self) -> &'static str {
        match self {
            TimeFrame::Day => "1 Day",
            TimeFrame::Week => "1 Week",
            TimeFrame::Month => "1 Month",
        }
    }

    /// The inclusive `[now - days, now]` range bounded by this time frame.
    pub fn window(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (now - Duration::days(self.days()), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_spans_the_expected_number_of_days() {
        let now = Utc::now();
        for (frame, days) in [
            (TimeFrame::Day, 1),
            (TimeFrame::Week, 7),
            (TimeFrame::Month, 30),
        ] {
            let (start, end) = frame.window(now);
            assert_eq!(end, now);
            assert_eq!(end - start, Duration::days(days));
        }
    }

    #[test]
    fn window_start_never_exceeds_end() {
        let now = Utc::now();
        for frame in [TimeFrame::Day, TimeFrame::Week, TimeFrame::Month] {
            let (start, end) = frame.window(now);
            assert!(start <= end);
        }
    }

    #[test]
    fn labels_match_the_selection_buttons() {
        assert_eq!(TimeFrame::Day.label(), "1 Day");
        assert_eq!(TimeFrame::Week.label(), "1 Week");
        assert_eq!(TimeFrame::Month.label(), "1 Month");
    }
}
