use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bincal", version, about = "Which bin is collected next, and when?")]
pub(crate) struct Cli {
    /// JSON document holding the stored schedule
    #[arg(long, env = "BINCAL_STORE", default_value = "bincal-store.json")]
    pub store: PathBuf,
    /// local CSV file to ingest before answering
    #[arg(long, env = "BINCAL_SOURCE", conflicts_with = "source_url")]
    pub source: Option<PathBuf>,
    /// URL of a CSV file to ingest before answering
    #[arg(long, env = "BINCAL_SOURCE_URL")]
    pub source_url: Option<String>,
    /// move the local CSV here once it has been loaded
    #[arg(long, env = "BINCAL_ARCHIVE_DIR", requires = "source")]
    pub archive_dir: Option<PathBuf>,
    /// log lookups and ingestion at debug level
    #[arg(short, long)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub(crate) enum Command {
    /// Show the next collection (the default)
    Next {
        /// reference date, defaults to today
        #[arg(long, value_name = "YYYY-MM-DD")]
        date: Option<NaiveDate>,
    },
    /// Load the source schedule into the store without a lookup
    Sync,
}

impl Default for Command {
    fn default() -> Self {
        Command::Next { date: None }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn arguments_are_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_next_collection() {
        let cli = Cli::try_parse_from(["bincal"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.store, PathBuf::from("bincal-store.json"));
        assert!(matches!(
            cli.command.unwrap_or_default(),
            Command::Next { date: None }
        ));
    }

    #[test]
    fn parses_reference_date() {
        let cli = Cli::try_parse_from(["bincal", "next", "--date", "2023-01-27"]).expect("parse");
        let Some(Command::Next { date }) = cli.command else {
            panic!("expected next");
        };
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 1, 27));
    }

    #[test]
    fn rejects_both_sources() {
        let parsed = Cli::try_parse_from([
            "bincal",
            "--source",
            "main.csv",
            "--source-url",
            "https://example.org/main.csv",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn archive_requires_local_source() {
        assert!(Cli::try_parse_from(["bincal", "--archive-dir", "done"]).is_err());
        assert!(
            Cli::try_parse_from(["bincal", "--source", "main.csv", "--archive-dir", "done", "sync"])
                .is_ok()
        );
    }
}
