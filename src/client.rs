//! Authenticated HTTP client for the Workspace ONE MDM REST API.
//!
//! `MdmClient` wraps a `reqwest::Client`, the environment's API root, the
//! tenant API key and an already-acquired bearer token. Every request carries
//! the three headers the API requires:
//!
//! - `Accept: application/json`
//! - `Authorization: Bearer <token>`
//! - `aw-tenant-code: <api key>`
//!
//! There is no 401 retry: a run holds one token for one request, and any
//! non-success status is returned as `SyncError::Api` with the body intact.

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, SyncError};

/// Header Workspace ONE uses to carry the tenant API key.
pub const TENANT_CODE_HEADER: &str = "aw-tenant-code";

/// Authenticated HTTP client for the MDM REST API.
pub struct MdmClient {
    client: Client,
    base_url: String,
    api_key: String,
    token: String,
}

impl MdmClient {
    /// `base_url` is the environment API root (`https://host/api`); a trailing
    /// slash is accepted.
    pub fn new(client: Client, base_url: &str, api_key: &str, token: String) -> Self {
        MdmClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Sends an authenticated GET and deserializes the JSON response.
    /// `204 No Content` maps to `None`: Workspace ONE search endpoints answer
    /// that way when nothing matches.
    ///
    /// The body is read as text before the status check so that MDM error
    /// payloads survive into `SyncError::Api`.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let body = self.get_text(path, query).await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = self.url(path);
        debug!(%url, "GET");

        let resp = self
            .client
            .get(&url)
            .query(query)
            .header(ACCEPT, "application/json")
            .bearer_auth(&self.token)
            .header(TENANT_CODE_HEADER, &self.api_key)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(SyncError::Api { status, body });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(String::new());
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> MdmClient {
        MdmClient::new(Client::new(), base, "key", "tok".to_string())
    }

    #[test]
    fn url_joins_without_double_slash() {
        let c = client("https://as1506.awmdm.com/api/");
        assert_eq!(
            c.url("/mdm/devices/search"),
            "https://as1506.awmdm.com/api/mdm/devices/search"
        );
    }

    #[test]
    fn url_joins_when_neither_side_has_slash() {
        let c = client("https://as1506.awmdm.com/api");
        assert_eq!(
            c.url("mdm/devices/search"),
            "https://as1506.awmdm.com/api/mdm/devices/search"
        );
    }
}
