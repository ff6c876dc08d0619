//! CLI entry point for ws1-sheet-sync.
//!
//! Loads the TOML configuration, merges secrets from the environment, and
//! runs one sync. Meant to be fired by a scheduler.
//!
//! Exit codes:
//! - 0: success
//! - 1: runtime error (config, auth, API, or sheet failure)
//! - 2: argument validation error (clap handles this automatically)

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ws1_sync::config::SyncConfig;
use ws1_sync::error::Result;
use ws1_sync::google_sheets::GoogleSheet;
use ws1_sync::pipeline::{SyncReport, run_sync};
use ws1_sync::sheet::MemorySheet;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "ws1-sheet-sync.toml")]
    config: PathBuf,

    /// OAuth client secret. Overrides `mdm.client_secret` from the file.
    #[arg(long, env = "WS1_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Tenant API key (aw-tenant-code). Overrides `mdm.api_key`.
    #[arg(long, env = "WS1_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Google Sheets access token. Overrides `sheet.access_token`.
    #[arg(long, env = "GOOGLE_SHEETS_TOKEN", hide_env_values = true)]
    sheets_token: Option<String>,

    /// Fetch and format, print the resulting rows, leave the sheet alone.
    #[arg(long)]
    dry_run: bool,

    /// Evaluate the recency window against this instant (RFC 3339)
    /// instead of the current time.
    #[arg(long)]
    now: Option<DateTime<Utc>>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Cli) -> Result<SyncReport> {
    let config = SyncConfig::load(&args.config)?.with_secrets(
        args.client_secret,
        args.api_key,
        args.sheets_token,
    );
    config.validate()?;

    let http = config.http.build_client()?;
    let now = args.now.unwrap_or_else(Utc::now);

    if args.dry_run {
        let mut sheet = MemorySheet::with_header();
        let report = run_sync(&config, http, &mut sheet, now).await?;
        for row in sheet.grid() {
            println!("{}", row.join("\t"));
        }
        return Ok(report);
    }

    let mut sheet = GoogleSheet::new(http.clone(), &config.sheet)?;
    run_sync(&config, http, &mut sheet, now).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    let args = Cli::parse();

    match run(args).await {
        Ok(report) => {
            info!(
                fetched = report.fetched,
                retained = report.retained,
                unparseable = report.unparseable,
                written = report.replace.written,
                "sync complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "sync failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_without_arguments() {
        let cli = Cli::try_parse_from(["ws1-sheet-sync"]).expect("no arguments are required");
        assert_eq!(cli.config, PathBuf::from("ws1-sheet-sync.toml"));
        assert!(!cli.dry_run);
        assert!(cli.now.is_none());
    }

    #[test]
    fn config_and_dry_run_flags_parse() {
        let cli = Cli::try_parse_from([
            "ws1-sheet-sync",
            "--config",
            "/etc/ws1/sync.toml",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/ws1/sync.toml"));
        assert!(cli.dry_run);
    }

    #[test]
    fn now_parses_rfc3339() {
        let cli =
            Cli::try_parse_from(["ws1-sheet-sync", "--now", "2024-01-20T00:00:00Z"]).unwrap();
        assert_eq!(
            cli.now.unwrap().to_rfc3339(),
            "2024-01-20T00:00:00+00:00"
        );
    }

    #[test]
    fn invalid_now_is_rejected() {
        let result = Cli::try_parse_from(["ws1-sheet-sync", "--now", "last tuesday"]);
        assert!(result.is_err(), "--now must be RFC 3339");
    }

    #[test]
    fn secrets_can_be_passed_as_flags() {
        let cli = Cli::try_parse_from([
            "ws1-sheet-sync",
            "--client-secret",
            "s3cret",
            "--api-key",
            "tenant",
            "--sheets-token",
            "ya29",
        ])
        .unwrap();
        assert_eq!(cli.client_secret.as_deref(), Some("s3cret"));
        assert_eq!(cli.api_key.as_deref(), Some("tenant"));
        assert_eq!(cli.sheets_token.as_deref(), Some("ya29"));
    }
}
