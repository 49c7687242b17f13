//! Command line front-end for the bin collection calendar.

mod cli;
mod report;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use reqwest::Client;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use bincal_core::ports::{CalendarError, ScheduleStore};
use bincal_core::service::CalendarService;
use bincal_core::source::SourceOrigin;
use bincal_source_http::HttpCsvOrigin;
use bincal_source_local::LocalCsvOrigin;
use bincal_store_json::JsonFileStore;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let service = build_service(&cli)?;
    let mut stdout = io::stdout().lock();

    match cli.command.clone().unwrap_or_default() {
        Command::Next { date } => {
            let reference_date = date.unwrap_or_else(|| Local::now().date_naive());
            debug!(%reference_date, "looking up next collection");
            match service.next_collection(reference_date).await {
                Ok(next) => writeln!(stdout, "{}", report::announce(&next.info))?,
                Err(CalendarError::NotFound { week }) => {
                    writeln!(stdout, "{}", report::nothing_scheduled(week))?;
                    return Ok(ExitCode::FAILURE);
                }
                Err(err) => return Err(err).context("failed to look up the next collection"),
            }
        }
        Command::Sync => {
            let result = service
                .sync_from_origin()
                .await
                .context("failed to sync the schedule")?;
            writeln!(stdout, "{}", report::synced(result))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}

fn build_service(cli: &Cli) -> Result<CalendarService> {
    let store = JsonFileStore::new(&cli.store);
    debug!(path = %store.path().display(), "using schedule store");
    let service = CalendarService::new(Arc::new(store) as Arc<dyn ScheduleStore>);

    let origin: Option<Arc<dyn SourceOrigin>> = if let Some(path) = &cli.source {
        let mut local = LocalCsvOrigin::new(path);
        if let Some(dir) = &cli.archive_dir {
            local = local.archive_to(dir);
        }
        debug!(path = %local.path().display(), "using local schedule source");
        Some(Arc::new(local))
    } else if let Some(url) = &cli.source_url {
        let client = Client::builder()
            .user_agent(concat!("bincal/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Some(Arc::new(HttpCsvOrigin::new(client, url)))
    } else {
        None
    };

    Ok(match origin {
        Some(origin) => service.with_origin(origin),
        None => service,
    })
}
