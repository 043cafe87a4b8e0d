//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::auth::IdentityPayload;
use crate::web::middleware::optional_session;
use crate::web::state::AppState;
use crate::web::summarize_task::{summarize_time_frame, SummarizeError};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storyteller_core::domain::{AuthSession, Story, TimeFrame};
use storyteller_core::ports::PortError;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        home_handler,
        summarize_view_handler,
        list_stories_handler,
        create_story_handler,
        summarize_handler,
    ),
    components(
        schemas(
            HomeResponse,
            SummarizeViewResponse,
            StoryPayload,
            CreateStoryRequest,
            SummarizeRequest,
            SummarizeResponse,
            SummarizeFailure,
            TimeFrameParam,
            IdentityPayload,
        )
    ),
    tags(
        (name = "StoryTeller API", description = "API endpoints for the journaling application.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// A single story as shown on the home view cards.
#[derive(Serialize, ToSchema)]
pub struct StoryPayload {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<Story> for StoryPayload {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            content: story.content,
            created_at: story.created_at,
        }
    }
}

/// The home view payload. Unauthenticated visitors get the welcome state.
#[derive(Serialize, ToSchema)]
pub struct HomeResponse {
    pub signed_in: bool,
    pub identity: Option<IdentityPayload>,
    pub user_id: Option<Uuid>,
    pub stories: Vec<StoryPayload>,
}

/// The summarize view payload. The identity is empty for a direct visit
/// without a session.
#[derive(Serialize, ToSchema)]
pub struct SummarizeViewResponse {
    pub identity: Option<IdentityPayload>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateStoryRequest {
    pub content: String,
}

/// One of the three fixed lookback windows.
#[derive(Deserialize, Clone, Copy, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrameParam {
    Day,
    Week,
    Month,
}

impl From<TimeFrameParam> for TimeFrame {
    fn from(param: TimeFrameParam) -> Self {
        match param {
            TimeFrameParam::Day => TimeFrame::Day,
            TimeFrameParam::Week => TimeFrame::Week,
            TimeFrameParam::Month => TimeFrame::Month,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SummarizeRequest {
    pub time_frame: TimeFrameParam,
}

/// A generated summary. `request_token` is drawn from a process-wide
/// monotonically increasing counter; a client keeps only the response whose
/// token is the latest it dispatched.
#[derive(Serialize, ToSchema)]
pub struct SummarizeResponse {
    pub time_frame: String,
    pub summary: String,
    pub request_token: u64,
}

/// A failed summarize cycle, carrying the same request token as a success.
#[derive(Serialize, ToSchema)]
pub struct SummarizeFailure {
    pub error: String,
    pub request_token: u64,
}

//=========================================================================================
// View Payload Handlers
//=========================================================================================

/// The home view: welcome state when signed out, otherwise the user's
/// stories, newest first.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Home view payload", body = HomeResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn home_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<HomeResponse>, (StatusCode, String)> {
    let Some(session) = optional_session(&state, &headers).await else {
        return Ok(Json(HomeResponse {
            signed_in: false,
            identity: None,
            user_id: None,
            stories: Vec::new(),
        }));
    };

    // Re-ensure the user row on entry; the conditional insert makes this a
    // no-op for every visit after the first.
    let user = state.db.ensure_user(&session.identity.email).await.map_err(|e| {
        error!("Failed to ensure user record: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load stories.".to_string())
    })?;

    let stories = state.db.list_stories(user.id).await.map_err(|e| {
        error!("Failed to fetch stories: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load stories.".to_string())
    })?;

    Ok(Json(HomeResponse {
        signed_in: true,
        identity: Some(IdentityPayload::from(&session.identity)),
        user_id: Some(user.id),
        stories: stories.into_iter().map(StoryPayload::from).collect(),
    }))
}

/// The summarize view payload. A direct visit without a session renders with
/// an empty identity instead of failing.
#[utoipa::path(
    get,
    path = "/summarize",
    responses(
        (status = 200, description = "Summarize view payload", body = SummarizeViewResponse)
    )
)]
pub async fn summarize_view_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<SummarizeViewResponse> {
    let identity = optional_session(&state, &headers)
        .await
        .map(|session| IdentityPayload::from(&session.identity));
    Json(SummarizeViewResponse { identity })
}

//=========================================================================================
// Story Handlers
//=========================================================================================

/// List the signed-in user's stories, newest first.
#[utoipa::path(
    get,
    path = "/stories",
    responses(
        (status = 200, description = "The user's stories", body = Vec<StoryPayload>),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_stories_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<Vec<StoryPayload>>, (StatusCode, String)> {
    let stories = state.db.list_stories(session.user_id).await.map_err(|e| {
        error!("Failed to fetch stories: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load stories.".to_string())
    })?;

    Ok(Json(stories.into_iter().map(StoryPayload::from).collect()))
}

/// Submit a new story from the composer.
///
/// The stored row is returned so the caller can refresh its list from the
/// store's response rather than appending optimistically.
#[utoipa::path(
    post,
    path = "/stories",
    request_body = CreateStoryRequest,
    responses(
        (status = 201, description = "Story created", body = StoryPayload),
        (status = 401, description = "Not signed in"),
        (status = 422, description = "Blank content"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_story_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<CreateStoryRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let story = state
        .db
        .insert_story(session.user_id, &req.content)
        .await
        .map_err(|e| match e {
            PortError::Invalid(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
            other => {
                error!("Failed to add story: {:?}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to add story.".to_string())
            }
        })?;

    Ok((StatusCode::CREATED, Json(StoryPayload::from(story))))
}

//=========================================================================================
// Summarize Handler
//=========================================================================================

/// Summarize the user's stories inside the selected time frame.
#[utoipa::path(
    post,
    path = "/summarize",
    request_body = SummarizeRequest,
    responses(
        (status = 200, description = "Generated summary", body = SummarizeResponse),
        (status = 401, description = "Not signed in"),
        (status = 404, description = "No stories in the window", body = SummarizeFailure),
        (status = 500, description = "Store failure", body = SummarizeFailure),
        (status = 502, description = "Completion failure", body = SummarizeFailure)
    )
)]
pub async fn summarize_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, (StatusCode, Json<SummarizeFailure>)> {
    let request_token = state.next_summarize_token();
    let time_frame = TimeFrame::from(req.time_frame);

    match summarize_time_frame(
        state.db.as_ref(),
        state.summary_adapter.as_ref(),
        session.user_id,
        time_frame,
    )
    .await
    {
        Ok(summary) => Ok(Json(SummarizeResponse {
            time_frame: time_frame.label().to_string(),
            summary,
            request_token,
        })),
        Err(e) => {
            let status = match e {
                SummarizeError::EmptyRange => StatusCode::NOT_FOUND,
                SummarizeError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
                SummarizeError::Summarizer(_) => StatusCode::BAD_GATEWAY,
            };
            Err((
                status,
                Json(SummarizeFailure {
                    error: e.user_message().to_string(),
                    request_token,
                }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_home_payload_has_the_welcome_shape() {
        let payload = HomeResponse {
            signed_in: false,
            identity: None,
            user_id: None,
            stories: Vec::new(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["signed_in"], false);
        assert!(json["identity"].is_null());
        assert_eq!(json["stories"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn time_frame_params_deserialize_from_lowercase() {
        for (raw, expected) in [
            ("day", TimeFrame::Day),
            ("week", TimeFrame::Week),
            ("month", TimeFrame::Month),
        ] {
            let body = format!("{{\"time_frame\":\"{}\"}}", raw);
            let req: SummarizeRequest = serde_json::from_str(&body).unwrap();
            assert_eq!(TimeFrame::from(req.time_frame), expected);
        }
    }
}
