//! services/api/src/adapters/google_oauth.rs
//!
//! This module contains the adapter for the external OAuth identity provider.
//! It implements the `IdentityService` port from the `core` crate using
//! Google's authorization-code flow.

use async_trait::async_trait;
use serde::Deserialize;
use storyteller_core::domain::Identity;
use storyteller_core::ports::{IdentityService, PortError, PortResult};
use url::Url;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const SCOPES: &str = "openid email profile";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `IdentityService` against Google's OAuth endpoints.
#[derive(Clone)]
pub struct GoogleIdentityAdapter {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

impl GoogleIdentityAdapter {
    /// Creates a new `GoogleIdentityAdapter`.
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
            client_secret,
            redirect_url,
        }
    }
}

//=========================================================================================
// Wire Payloads
//=========================================================================================

/// Raw token response from the provider (before mapping).
#[derive(Deserialize)]
struct TokenPayload {
    access_token: String,
}

/// Raw userinfo response from the provider (before mapping).
#[derive(Deserialize)]
struct UserInfoPayload {
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl From<UserInfoPayload> for Identity {
    fn from(raw: UserInfoPayload) -> Self {
        Identity {
            email: raw.email,
            name: raw.name,
            picture: raw.picture,
        }
    }
}

//=========================================================================================
// `IdentityService` Trait Implementation
//=========================================================================================

#[async_trait]
impl IdentityService for GoogleIdentityAdapter {
    fn authorize_url(&self, state: &str) -> String {
        // Url::parse_with_params percent-encodes every value for us.
        let url = Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
            ],
        )
        .expect("authorization endpoint URL is valid");
        url.to_string()
    }

    async fn exchange_code(&self, code: &str) -> PortResult<Identity> {
        let token: TokenPayload = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let userinfo: UserInfoPayload = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        Ok(userinfo.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_carries_client_and_state() {
        let adapter = GoogleIdentityAdapter::new(
            "client-123".to_string(),
            "secret".to_string(),
            "http://localhost:3000/auth/callback".to_string(),
        );
        let url = adapter.authorize_url("csrf-token");
        assert!(url.starts_with(AUTH_URL));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=csrf-token"));
        assert!(url.contains("response_type=code"));
        // The redirect URL must be percent-encoded.
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fcallback"));
    }
}
