use crate::date_provider::{DateProvider, OverrideDateProvider, SystemDateProvider};
use crate::error::{Error, Result};
use crate::store::SqliteEventStore;
use crate::store::connection::MAX_FETCH_TIMEOUT;
use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_DB_PATH: &str = "classroom_insights.db";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Store and aggregation configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Whether to use an in-memory database
    pub is_test_mode: bool,
    /// Custom database file path (ignored in test mode)
    pub custom_path: Option<String>,
    /// Busy timeout applied to every fetch
    pub fetch_timeout: Duration,
    /// Upper bound on concurrent per-user fetches
    pub max_concurrency: usize,
    /// Pinned "today" instead of the system clock
    pub override_date: Option<NaiveDate>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            is_test_mode: false,
            custom_path: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            override_date: None,
        }
    }
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Gets the effective database path
    pub fn get_path(&self) -> &str {
        if self.is_test_mode {
            ":memory:"
        } else {
            self.custom_path.as_deref().unwrap_or(DEFAULT_DB_PATH)
        }
    }
}

#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
    date_ymd: Option<(i32, u32, u32)>,
}

impl StoreConfigBuilder {
    pub fn test_mode(mut self) -> Self {
        self.config.is_test_mode = true;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.custom_path = Some(path.into());
        self
    }

    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.config.fetch_timeout = timeout;
        self
    }

    pub fn max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.config.max_concurrency = max_concurrency;
        self
    }

    pub fn override_date(mut self, date: Option<NaiveDate>) -> Self {
        self.config.override_date = date;
        self
    }

    /// Pin "today"; validated in [`build`](Self::build)
    pub fn date_ymd(mut self, year: i32, month: u32, day: u32) -> Self {
        self.date_ymd = Some((year, month, day));
        self
    }

    pub fn build(self) -> Result<StoreConfig> {
        let mut config = self.config;

        if let Some((year, month, day)) = self.date_ymd {
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .ok_or_else(|| Error::Config(format!("invalid date {year:04}-{month:02}-{day:02}")))?;
            config.override_date = Some(date);
        }
        if config.max_concurrency == 0 {
            return Err(Error::Config("max concurrency must be at least 1".to_string()));
        }
        if config.fetch_timeout.is_zero() {
            return Err(Error::Config("fetch timeout must be greater than zero".to_string()));
        }
        if config.fetch_timeout > MAX_FETCH_TIMEOUT {
            return Err(Error::Config(format!(
                "fetch timeout must be at most {} seconds",
                MAX_FETCH_TIMEOUT.as_secs()
            )));
        }

        Ok(config)
    }
}

/// Factory for creating stores from a [`StoreConfig`]
pub struct StoreFactory;

impl StoreFactory {
    /// Opens a migrated SQLite store with the configured timeout and clock
    pub fn create(config: &StoreConfig) -> Result<SqliteEventStore> {
        let path = config.get_path();
        debug!(
            "Opening store at {path} (timeout {:?}, concurrency {})",
            config.fetch_timeout, config.max_concurrency
        );
        SqliteEventStore::with_options(path, config.fetch_timeout, Self::date_provider(config))
    }

    pub fn date_provider(config: &StoreConfig) -> Arc<dyn DateProvider> {
        match config.override_date {
            Some(date) => Arc::new(OverrideDateProvider::new(date)),
            None => Arc::new(SystemDateProvider),
        }
    }
}
