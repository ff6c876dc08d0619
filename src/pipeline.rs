//! End-to-end sync: authenticate, fetch, filter, format, replace.
//!
//! [`run_sync`] executes each stage exactly once and in order. The
//! destination is touched only after the token exchange, the device fetch
//! and the transformation have all succeeded, so an authentication or API
//! failure leaves the previous sheet contents intact.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::auth::TokenProvider;
use crate::client::MdmClient;
use crate::config::SyncConfig;
use crate::devices::search_devices;
use crate::error::Result;
use crate::filter::filter_recent;
use crate::row::{OutputRow, format_rows};
use crate::sheet::{ReplaceSummary, RowDestination, replace_rows};

/// Counts from one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Devices returned by the search endpoint.
    pub fetched: usize,
    /// Devices that passed the platform and recency filter.
    pub retained: usize,
    /// Target-platform devices dropped for an unparseable `LastSeen`.
    pub unparseable: usize,
    /// What the destination write did.
    pub replace: ReplaceSummary,
}

/// Fetches and transforms the device rows without touching any destination.
pub async fn collect_rows(
    config: &SyncConfig,
    http: reqwest::Client,
    now: DateTime<Utc>,
) -> Result<(Vec<OutputRow>, SyncReport)> {
    let tp = TokenProvider::new(
        http.clone(),
        &config.mdm.token_url,
        &config.mdm.client_id,
        &config.mdm.client_secret,
    );
    let token = tp.fetch_token().await?;

    let client = MdmClient::new(http, &config.mdm.api_base_url, &config.mdm.api_key, token);
    let platform = config
        .filter
        .server_side_platform
        .then_some(config.filter.platform.as_str());
    let devices = search_devices(&client, platform).await?;
    let fetched = devices.len();

    let outcome = filter_recent(
        devices,
        &config.filter.platform,
        config.filter.window(),
        now.naive_utc(),
    );
    info!(
        fetched,
        retained = outcome.retained.len(),
        unparseable = outcome.unparseable,
        platform = %config.filter.platform,
        "filtered devices"
    );

    let rows = format_rows(&outcome.retained);
    let report = SyncReport {
        fetched,
        retained: rows.len(),
        unparseable: outcome.unparseable,
        replace: ReplaceSummary::default(),
    };
    Ok((rows, report))
}

/// Runs one full sync into `dest`.
pub async fn run_sync<D: RowDestination>(
    config: &SyncConfig,
    http: reqwest::Client,
    dest: &mut D,
    now: DateTime<Utc>,
) -> Result<SyncReport> {
    let (rows, mut report) = collect_rows(config, http, now).await?;
    report.replace = replace_rows(dest, rows, config.sheet.seed_header).await?;
    Ok(report)
}
