//! Device inventory lookup for the Workspace ONE MDM API.
//!
//! - [`search_devices`] — retrieve every device visible to the tenant via
//!   `GET /mdm/devices/search`.
//!
//! The response type [`DeviceRecord`] keeps only the fields the sync writes
//! to the sheet (plus `Platform` and `LastSeen`, which drive the filter).
//! Every field is optional: devices in early enrollment stages come back
//! sparse, and a missing value renders as an empty cell instead of failing
//! the run.

use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::client::MdmClient;

/// Search endpoint path, relative to the environment API root.
pub const SEARCH_PATH: &str = "mdm/devices/search";

// ── Response types ─────────────────────────────────────────────────────

/// A device as returned by the search endpoint.
///
/// Field names use PascalCase to match the Workspace ONE API contract.
/// Scalar values of any JSON type (string, number, bool) are kept as their
/// string rendering; `null` and absent fields become `None`. The sheet is a
/// text report, so booleans and numbers are written as text cells.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceRecord {
    /// Hardware serial.
    #[serde(default, deserialize_with = "scalar")]
    pub serial_number: Option<String>,

    /// Console display name.
    #[serde(default, deserialize_with = "scalar")]
    pub friendly_number: Option<String>,

    /// Enrolled user.
    #[serde(default, deserialize_with = "scalar")]
    pub user_name: Option<String>,

    /// Hardware model.
    #[serde(default, deserialize_with = "scalar")]
    pub model: Option<String>,

    /// Platform tag, e.g. `"WinRT"`, `"Apple"`, `"Android"`.
    #[serde(default, deserialize_with = "scalar")]
    pub platform: Option<String>,

    /// OS name including a family prefix, e.g. `"Windows 10.0.19045"`.
    #[serde(default, deserialize_with = "scalar")]
    pub operating_system: Option<String>,

    /// Build suffix appended to the OS version column.
    #[serde(rename = "OSBuildVersion", default, deserialize_with = "scalar")]
    pub os_build_version: Option<String>,

    /// Last check-in, e.g. `"2024-01-10 08:00:00"` or `"2024-01-10T08:00:00.533"`.
    #[serde(default, deserialize_with = "scalar")]
    pub last_seen: Option<String>,

    /// E.g. `"Enrolled"`.
    #[serde(default, deserialize_with = "scalar")]
    pub enrollment_status: Option<String>,

    /// E.g. `"Compliant"`, `"NonCompliant"`.
    #[serde(default, deserialize_with = "scalar")]
    pub compliance_status: Option<String>,

    /// A JSON boolean in practice; kept as `"true"` / `"false"`.
    #[serde(default, deserialize_with = "scalar")]
    pub compromised_status: Option<String>,
}

/// Envelope returned by the search endpoint. `Devices` is required; its
/// absence is a parse failure.
#[derive(Debug, Deserialize)]
pub struct DeviceSearchResponse {
    /// Every device on the page, in API order.
    #[serde(rename = "Devices")]
    pub devices: Vec<DeviceRecord>,
}

/// Accepts any JSON scalar and keeps its text form.
fn scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

// ── Endpoint functions ─────────────────────────────────────────────────

/// Retrieves all devices from the search endpoint, in API order.
///
/// When `platform` is `Some`, it is sent as the `platform` query parameter so
/// the server can narrow the result. Client-side filtering still applies.
///
/// A `204 No Content` answer (nothing matched) yields an empty list.
///
/// # Errors
///
/// - `SyncError::Api` — non-success status (401 bad token, 403 bad tenant
///   code, etc.).
/// - `SyncError::Parse` — malformed JSON or missing `Devices` field.
/// - `SyncError::Network` — transport-level failure.
pub async fn search_devices(
    client: &MdmClient,
    platform: Option<&str>,
) -> crate::error::Result<Vec<DeviceRecord>> {
    let query: Vec<(&str, &str)> = platform.map(|p| ("platform", p)).into_iter().collect();
    let response: Option<DeviceSearchResponse> = client.get_optional(SEARCH_PATH, &query).await?;
    let devices = response.map(|r| r.devices).unwrap_or_default();
    info!(count = devices.len(), "fetched device inventory");
    Ok(devices)
}
