//! Application configuration from command line flags and environment.

use crate::stats::DEFAULT_TOP_N;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_LOG_FILTER: &str = "ecommerce_dashboard=info";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("--top-n must be at least 1")]
    InvalidTopN,
}

/// E-Commerce Dashboard: monthly trends, top products and payment methods.
#[derive(Parser, Debug, Clone)]
#[command(name = "ecommerce_dashboard", version, about)]
pub struct AppConfig {
    /// Directory containing the cleaned CSV files
    #[arg(long, env = "DASHBOARD_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Number of products in the top-product trend
    #[arg(long, env = "DASHBOARD_TOP_N", default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// tracing filter directive, e.g. "ecommerce_dashboard=debug"
    #[arg(long, env = "DASHBOARD_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

impl AppConfig {
    /// Load `.env` (if present), then parse flags with env fallbacks.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::parse().validated()
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::InvalidTopN);
        }
        Ok(self)
    }
}
