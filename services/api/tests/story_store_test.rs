//! Tests for the in-memory story store against the `DatabaseService` contract.

use api_lib::adapters::InMemoryStore;
use chrono::{Duration, Utc};
use storyteller_core::ports::{DatabaseService, PortError};

#[tokio::test]
async fn insert_then_list_contains_the_content_exactly_once() {
    let store = InMemoryStore::new();
    let user = store.ensure_user("writer@example.com").await.unwrap();

    store.insert_story(user.id, "Today I planted a garden.").await.unwrap();

    let stories = store.list_stories(user.id).await.unwrap();
    let matching: Vec<_> = stories
        .iter()
        .filter(|s| s.content == "Today I planted a garden.")
        .collect();
    assert_eq!(matching.len(), 1);
}

#[tokio::test]
async fn listing_is_newest_first() {
    let store = InMemoryStore::new();
    let user = store.ensure_user("writer@example.com").await.unwrap();
    let now = Utc::now();

    store.insert_story_at(user.id, "oldest", now - Duration::days(2)).await;
    store.insert_story_at(user.id, "newest", now).await;
    store.insert_story_at(user.id, "middle", now - Duration::days(1)).await;

    let stories = store.list_stories(user.id).await.unwrap();
    let contents: Vec<&str> = stories.iter().map(|s| s.content.as_str()).collect();
    assert_eq!(contents, vec!["newest", "middle", "oldest"]);
}

#[tokio::test]
async fn whitespace_only_content_is_rejected_before_any_write() {
    let store = InMemoryStore::new();
    let user = store.ensure_user("writer@example.com").await.unwrap();

    for blank in ["", "   ", "\n\t "] {
        let err = store.insert_story(user.id, blank).await.unwrap_err();
        assert!(matches!(err, PortError::Invalid(_)));
    }

    // Nothing reached the store.
    assert_eq!(store.story_count().await, 0);
}

#[tokio::test]
async fn inverted_range_yields_an_empty_sequence() {
    let store = InMemoryStore::new();
    let user = store.ensure_user("writer@example.com").await.unwrap();
    store.insert_story(user.id, "a story").await.unwrap();

    let now = Utc::now();
    let contents = store
        .list_story_contents_in_range(user.id, now, now - Duration::days(7))
        .await
        .unwrap();
    assert!(contents.is_empty());
}

#[tokio::test]
async fn range_bounds_are_inclusive() {
    let store = InMemoryStore::new();
    let user = store.ensure_user("writer@example.com").await.unwrap();
    let now = Utc::now();
    let start = now - Duration::days(7);

    store.insert_story_at(user.id, "at start", start).await;
    store.insert_story_at(user.id, "at end", now).await;
    store.insert_story_at(user.id, "before start", start - Duration::seconds(1)).await;

    let contents = store
        .list_story_contents_in_range(user.id, start, now)
        .await
        .unwrap();
    assert_eq!(contents, vec!["at start".to_string(), "at end".to_string()]);
}

#[tokio::test]
async fn ensure_user_is_idempotent() {
    let store = InMemoryStore::new();

    let first = store.ensure_user("writer@example.com").await.unwrap();
    let second = store.ensure_user("writer@example.com").await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.email, "writer@example.com");
}

#[tokio::test]
async fn stories_are_scoped_to_their_owner() {
    let store = InMemoryStore::new();
    let alice = store.ensure_user("alice@example.com").await.unwrap();
    let bob = store.ensure_user("bob@example.com").await.unwrap();

    store.insert_story(alice.id, "Alice's day").await.unwrap();

    assert_eq!(store.list_stories(alice.id).await.unwrap().len(), 1);
    assert!(store.list_stories(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn expired_auth_sessions_are_rejected_and_torn_down() {
    let store = InMemoryStore::new();
    let user = store.ensure_user("writer@example.com").await.unwrap();
    let identity = storyteller_core::domain::Identity {
        email: user.email.clone(),
        name: Some("Writer".to_string()),
        picture: None,
    };

    store
        .create_auth_session("expired", user.id, &identity, Utc::now() - Duration::days(1))
        .await
        .unwrap();
    store
        .create_auth_session("live", user.id, &identity, Utc::now() + Duration::days(30))
        .await
        .unwrap();

    assert!(matches!(
        store.validate_auth_session("expired").await.unwrap_err(),
        PortError::Unauthorized
    ));

    let session = store.validate_auth_session("live").await.unwrap();
    assert_eq!(session.user_id, user.id);
    assert_eq!(session.identity.email, "writer@example.com");

    // Sign-out tears the session down; the cookie no longer resolves.
    store.delete_auth_session("live").await.unwrap();
    assert!(matches!(
        store.validate_auth_session("live").await.unwrap_err(),
        PortError::Unauthorized
    ));
}
