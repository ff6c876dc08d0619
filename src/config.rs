//! Run configuration loaded from a TOML file.
//!
//! Replaces hard-coded endpoint and credential constants with an explicit
//! `SyncConfig` that is passed into the pipeline. Secrets can be left out of
//! the file and supplied through the environment instead (the CLI wires
//! `WS1_CLIENT_SECRET`, `WS1_API_KEY` and `GOOGLE_SHEETS_TOKEN` into
//! [`SyncConfig::with_secrets`]).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Result, SyncError};

/// Platform tag Workspace ONE reports for Windows desktop devices.
pub const DEFAULT_PLATFORM: &str = "WinRT";

/// Trailing activity window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

/// Tab that receives the device rows.
pub const DEFAULT_SHEET_NAME: &str = "Devices";

/// Google Sheets REST API root.
pub const DEFAULT_SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4";

/// Top-level configuration for one sync run.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// MDM tenant endpoints and OAuth client.
    pub mdm: MdmConfig,
    /// Which devices survive the filter.
    #[serde(default)]
    pub filter: FilterConfig,
    /// Destination spreadsheet.
    #[serde(default)]
    pub sheet: SheetConfig,
    /// HTTP client timeouts.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Workspace ONE tenant settings.
#[derive(Debug, Clone, Deserialize)]
pub struct MdmConfig {
    /// Environment API root, e.g. `https://as1506.awmdm.com/api`.
    pub api_base_url: String,
    /// OAuth token endpoint for the tenant's region.
    pub token_url: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Tenant API key, sent as `aw-tenant-code`.
    #[serde(default)]
    pub api_key: String,
}

/// Recency/platform filter settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Exact, case-sensitive platform tag to keep.
    pub platform: String,
    /// Devices last seen more than this many days before `now` are dropped.
    pub window_days: u32,
    /// Also pass `platform` as a query parameter on the search request.
    pub server_side_platform: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            platform: DEFAULT_PLATFORM.to_string(),
            window_days: DEFAULT_WINDOW_DAYS,
            server_side_platform: false,
        }
    }
}

impl FilterConfig {
    /// The window as a `chrono::Duration`.
    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.window_days))
    }
}

/// Google Sheets destination settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Spreadsheet ID from the sheet URL.
    pub spreadsheet_id: String,
    /// Tab name.
    pub sheet_name: String,
    /// OAuth access token with the spreadsheets scope.
    pub access_token: String,
    /// API root; overridden in tests.
    pub endpoint: String,
    /// Write the standard header into row 1 when the tab is completely empty.
    pub seed_header: bool,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            spreadsheet_id: String::new(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            access_token: String::new(),
            endpoint: DEFAULT_SHEETS_ENDPOINT.to_string(),
            seed_header: false,
        }
    }
}

/// Timeouts applied to every HTTP client the crate builds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// TCP + TLS handshake limit.
    pub connect_timeout_secs: u64,
    /// Full round-trip limit, including the response body.
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        HttpConfig {
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
        }
    }
}

impl HttpConfig {
    /// Builds a `reqwest::Client` with these timeouts.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()?)
    }
}

impl SyncConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SyncConfig =
            toml::from_str(content).map_err(|e| SyncError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SyncError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Overrides secrets with values from the environment, when present.
    /// Empty strings are treated as absent.
    pub fn with_secrets(
        mut self,
        client_secret: Option<String>,
        api_key: Option<String>,
        sheets_token: Option<String>,
    ) -> Self {
        if let Some(secret) = client_secret.filter(|s| !s.is_empty()) {
            self.mdm.client_secret = secret;
        }
        if let Some(key) = api_key.filter(|s| !s.is_empty()) {
            self.mdm.api_key = key;
        }
        if let Some(token) = sheets_token.filter(|s| !s.is_empty()) {
            self.sheet.access_token = token;
        }
        self
    }

    /// Checks the settings every run needs. Destination settings are checked
    /// separately when the Google Sheets writer is built, so dry runs work
    /// without them.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("mdm.api_base_url", &self.mdm.api_base_url),
            ("mdm.token_url", &self.mdm.token_url),
            ("mdm.client_id", &self.mdm.client_id),
            ("mdm.client_secret", &self.mdm.client_secret),
            ("mdm.api_key", &self.mdm.api_key),
            ("filter.platform", &self.filter.platform),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SyncError::Config(format!("{name} must not be empty")));
            }
        }
        if self.filter.window_days == 0 {
            return Err(SyncError::Config(
                "filter.window_days must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
