//! Workspace ONE device inventory to Google Sheets synchronization.
//!
//! Authenticates against the Workspace ONE UEM API with OAuth client
//! credentials, fetches the device inventory, keeps recently active devices
//! of one platform, flattens them into 9-column rows, and replaces the data
//! rows of a spreadsheet tab below its header.
//!
//! # Modules
//!
//! - [`auth`] — OAuth2 client-credentials token exchange.
//! - [`client`] — Authenticated HTTP wrapper for the MDM REST API.
//! - [`config`] — TOML run configuration.
//! - [`devices`] — Device search endpoint and record types.
//! - [`error`] — Typed error hierarchy (`SyncError`).
//! - [`filter`] — Platform and recency filter.
//! - [`google_sheets`] — Google Sheets API v4 destination.
//! - [`pipeline`] — The end-to-end run.
//! - [`row`] — Device to sheet-row formatting.
//! - [`sheet`] — Destination trait, full-replace strategy, in-memory grid.
//!
//! # Quick Start
//!
//! ```ignore
//! use ws1_sync::config::SyncConfig;
//! use ws1_sync::google_sheets::GoogleSheet;
//! use ws1_sync::pipeline::run_sync;
//!
//! let config = SyncConfig::load("ws1-sheet-sync.toml".as_ref())?;
//! let http = config.http.build_client()?;
//! let mut sheet = GoogleSheet::new(http.clone(), &config.sheet)?;
//! let report = run_sync(&config, http, &mut sheet, chrono::Utc::now()).await?;
//! ```

#![warn(missing_docs)]

pub mod auth;
pub mod client;
pub mod config;
pub mod devices;
pub mod error;
pub mod filter;
pub mod google_sheets;
pub mod pipeline;
pub mod row;
pub mod sheet;
