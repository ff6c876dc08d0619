//! OAuth2 client-credentials authentication for the Workspace ONE API.
//!
//! Exchanges the OAuth client id and secret for a bearer token at the
//! tenant's regional token endpoint. The client id and secret travel in a
//! `Basic` authorization header and the form body carries only
//! `grant_type=client_credentials`.
//!
//! A sync run fetches exactly one token and uses it for the single device
//! search that follows. Tokens are not cached or refreshed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, SyncError};

/// Form body sent to the token endpoint.
/// Serialized as `application/x-www-form-urlencoded` by reqwest's `.form()`.
#[derive(Serialize)]
pub struct TokenRequest<'a> {
    grant_type: &'a str,
}

/// Subset of the token response that we need.
/// Unknown fields (`scope`, etc.) are ignored.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    /// Bearer token; absence is reported by [`TokenProvider::fetch_token`].
    #[serde(default)]
    pub access_token: Option<String>,
    /// Lifetime in seconds. Logged only.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Performs the client-credentials exchange against one token endpoint.
pub struct TokenProvider {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl TokenProvider {
    /// `token_url` is the full token endpoint, e.g.
    /// `https://na.uemauth.vmwservices.com/connect/token`.
    pub fn new(client: reqwest::Client, token_url: &str, client_id: &str, client_secret: &str) -> Self {
        TokenProvider {
            client,
            token_url: token_url.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    /// Requests a fresh bearer token.
    ///
    /// The response body is read as text before the status check so that the
    /// identity provider's error description ends up in the error message.
    pub async fn fetch_token(&self) -> Result<String> {
        debug!(url = %self.token_url, "requesting access token");

        let body = TokenRequest {
            grant_type: "client_credentials",
        };

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&body)
            .send()
            .await
            .map_err(|e| SyncError::Auth {
                message: format!("token endpoint unreachable: {}", self.token_url),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| SyncError::Auth {
            message: "failed to read token response".to_string(),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            return Err(SyncError::auth(format!(
                "token request failed ({status}): {body}"
            )));
        }

        let resp: TokenResponse = serde_json::from_str(&body).map_err(|e| SyncError::Auth {
            message: "failed to parse token response".to_string(),
            source: Some(Box::new(e)),
        })?;

        let token = resp
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SyncError::auth("token response has no access_token"))?;

        info!(expires_in = ?resp.expires_in, "access token acquired");
        Ok(token)
    }
}
