pub mod auth;
pub mod middleware;
pub mod rest;
pub mod state;
pub mod summarize_task;

// Re-export the handlers the binary needs to build the web server router.
pub use middleware::require_auth;
pub use rest::{
    create_story_handler, home_handler, list_stories_handler, summarize_handler,
    summarize_view_handler,
};
