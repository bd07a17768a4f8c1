use crate::config::{DEFAULT_FETCH_TIMEOUT, DEFAULT_MAX_CONCURRENCY, StoreConfig};
use crate::error::{Error, Result};
use crate::metrics::Period;
use crate::ranking::{ClassSortKey, DEFAULT_LEADERBOARD_LIMIT};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Leaderboards and learning analytics for a classroom
#[derive(Parser, Debug, Clone)]
#[command(name = "classroom-insights")]
#[command(about = "Rank students and summarise their learning progress", long_about = None)]
#[command(version)]
pub struct Args {
    /// Use in-memory database for testing
    #[arg(long, global = true, help = "Use in-memory database for testing")]
    pub test: bool,

    /// Custom database file path
    #[arg(long, global = true, value_name = "PATH", help = "Use custom database file path")]
    pub db_path: Option<PathBuf>,

    /// Override current date for testing (YYYY-MM-DD format)
    #[arg(
        long,
        global = true,
        value_name = "DATE",
        help = "Override current date (YYYY-MM-DD format)"
    )]
    pub override_date: Option<String>,

    /// Maximum number of students fetched concurrently
    #[arg(long, global = true, value_name = "N", default_value_t = DEFAULT_MAX_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-fetch timeout in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Student leaderboard by total challenge points
    Leaderboard {
        #[arg(long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: usize,
    },
    /// Best correct answers to one challenge
    Challenge {
        challenge_id: String,
        #[arg(long, default_value_t = DEFAULT_LEADERBOARD_LIMIT)]
        limit: usize,
    },
    /// Learning dashboard of one student
    Analytics {
        user_id: String,
        #[arg(long, default_value = "week")]
        period: Period,
    },
    /// Text progress summary of one student
    Summary {
        user_id: String,
        #[arg(long, default_value = "all")]
        period: Period,
    },
    /// Progress of every student in the class
    Class {
        #[arg(long, default_value = "all")]
        period: Period,
        #[arg(long, default_value = "streak")]
        sort_by: ClassSortKey,
    },
}

impl Args {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Args::parse()
    }

    /// Validate the override_date argument if provided
    pub fn validate_override_date(&self) -> std::result::Result<Option<NaiveDate>, String> {
        match &self.override_date {
            Some(date_str) => NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| {
                    format!(
                        "Invalid date format for --override-date: '{}'. Expected YYYY-MM-DD",
                        date_str
                    )
                }),
            None => Ok(None),
        }
    }

    /// Store configuration described by the global flags
    pub fn store_config(&self) -> Result<StoreConfig> {
        let override_date = self.validate_override_date().map_err(Error::Config)?;

        let mut builder = StoreConfig::builder()
            .fetch_timeout(Duration::from_secs(self.timeout_secs))
            .max_concurrency(self.concurrency)
            .override_date(override_date);
        if self.test {
            builder = builder.test_mode();
        }
        if let Some(path) = &self.db_path {
            builder = builder.path(path.to_string_lossy());
        }
        builder.build()
    }
}
