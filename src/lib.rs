pub mod cli;
pub mod config;
pub mod date_provider;
pub mod error;
pub mod metrics;
pub mod model;
pub mod ranking;
pub mod report;
pub mod session;
pub mod store;
