//! services/api/src/web/auth.rs
//!
//! Authentication endpoints: OAuth sign-in, callback, sign-out, and the
//! current-session probe used by the header.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storyteller_core::domain::Identity;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::{optional_session, session_id_from_headers};
use crate::web::state::AppState;

/// How long an auth session lives before the user must sign in again.
const SESSION_TTL_DAYS: i64 = 30;

/// The short-lived cookie carrying the CSRF state across the provider redirect.
const STATE_COOKIE: &str = "oauth_state";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// The signed-in identity as shown in the header.
#[derive(Serialize, ToSchema)]
pub struct IdentityPayload {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
}

impl From<&Identity> for IdentityPayload {
    fn from(identity: &Identity) -> Self {
        Self {
            email: identity.email.clone(),
            name: identity.name.clone(),
            picture: identity.picture.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub identity: Option<IdentityPayload>,
    pub user_id: Option<Uuid>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /auth/login - Redirect the browser to the provider's consent page
#[utoipa::path(
    get,
    path = "/auth/login",
    responses(
        (status = 303, description = "Redirect to the identity provider")
    )
)]
pub async fn login_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    // Round-trip a one-time token through the provider to tie the callback
    // to this sign-in attempt.
    let csrf_state = Uuid::new_v4().to_string();
    let url = state.identity_adapter.authorize_url(&csrf_state);

    let cookie = format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=600",
        STATE_COOKIE, csrf_state
    );

    ([(header::SET_COOKIE, cookie)], Redirect::to(&url))
}

/// GET /auth/callback - Complete the OAuth flow and establish a session
#[utoipa::path(
    get,
    path = "/auth/callback",
    responses(
        (status = 303, description = "Signed in, redirect to the home view"),
        (status = 401, description = "State mismatch"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn callback_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, (StatusCode, String)> {
    // A denied consent screen comes back as an `error` query parameter. The
    // user lands on the welcome view, signed out.
    if let Some(provider_error) = query.error {
        error!("Identity provider returned an error: {}", provider_error);
        return Ok((clear_state_cookie(), Redirect::to("/")).into_response());
    }

    // 1. Verify the CSRF state round-tripped through the provider.
    let expected_state = state_cookie_value(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "Missing OAuth state".to_string()))?;
    if query.state.as_deref() != Some(expected_state) {
        return Err((StatusCode::UNAUTHORIZED, "OAuth state mismatch".to_string()));
    }

    let code = query
        .code
        .ok_or((StatusCode::BAD_REQUEST, "Missing authorization code".to_string()))?;

    // 2. Exchange the code for the signed-in identity. Provider failures are
    // logged and surfaced as "not signed in" rather than an error page.
    let identity = match state.identity_adapter.exchange_code(&code).await {
        Ok(identity) => identity,
        Err(e) => {
            error!("Failed to exchange authorization code: {:?}", e);
            return Ok((clear_state_cookie(), Redirect::to("/")).into_response());
        }
    };

    // 3. Create the user row if this email has never been seen. This runs
    // before any story operation is reachable for the new user.
    let user = state.db.ensure_user(&identity.email).await.map_err(|e| {
        error!("Failed to ensure user record: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user".to_string())
    })?;

    // 4. Initialize the process-wide session state.
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
    state
        .db
        .create_auth_session(&auth_session_id, user.id, &identity, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to create auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session".to_string())
        })?;

    // 5. Set the session cookie. The state cookie expires on its own.
    let session_cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        auth_session_id,
        Duration::days(SESSION_TTL_DAYS).num_seconds()
    );

    Ok(([(header::SET_COOKIE, session_cookie)], Redirect::to("/")).into_response())
}

/// POST /auth/logout - Tear down the session and clear the cookie
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let auth_session_id = session_id_from_headers(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state
        .db
        .delete_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            error!("Failed to delete auth session: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to logout".to_string())
        })?;

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}

/// GET /auth/session - The current signed-in identity, or nulls when signed out.
///
/// Always 200: an unauthenticated caller renders an empty-identity header
/// instead of an error.
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current session state", body = SessionResponse)
    )
)]
pub async fn session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<SessionResponse> {
    match optional_session(&state, &headers).await {
        Some(session) => Json(SessionResponse {
            identity: Some(IdentityPayload::from(&session.identity)),
            user_id: Some(session.user_id),
        }),
        None => Json(SessionResponse {
            identity: None,
            user_id: None,
        }),
    }
}

//=========================================================================================
// Cookie Helpers
//=========================================================================================

fn state_cookie_value(headers: &HeaderMap) -> Option<&str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        let c = c.trim();
        c.strip_prefix("oauth_state=")
    })
}

fn clear_state_cookie() -> [(header::HeaderName, String); 1] {
    let cookie = format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        STATE_COOKIE
    );
    [(header::SET_COOKIE, cookie)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn state_cookie_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("session=abc; oauth_state=xyz-789"),
        );
        assert_eq!(state_cookie_value(&headers), Some("xyz-789"));
    }

    #[test]
    fn missing_state_cookie_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));
        assert_eq!(state_cookie_value(&headers), None);
    }
}
