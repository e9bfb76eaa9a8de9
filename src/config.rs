//! Configuration for the portal binaries.
//!
//! Loaded from environment variables with defaults; CLI flags may
//! override individual fields afterwards.

use crate::form::SubmitFlow;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default catalog location, relative to the working directory
pub const DEFAULT_CATALOG_PATH: &str = "data/events.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog file (.json or .csv)
    pub catalog_path: PathBuf,
    /// Artificial delay of the simulated fetch, in milliseconds
    pub fetch_delay_ms: u64,
    /// Which submit flow the form uses
    pub submit_flow: SubmitFlow,
    /// Probability that the simulated backend accepts a submission
    pub backend_success_rate: f64,
    /// Artificial latency of the simulated backend, in milliseconds
    pub backend_delay_ms: u64,
    /// Fixed reference date (`YYYY-MM-DD`); today when unset
    pub today: Option<NaiveDate>,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Log filter (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            catalog_path: env::var("PORTAL_CATALOG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH)),
            fetch_delay_ms: env::var("PORTAL_FETCH_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1500),
            submit_flow: env::var("PORTAL_SUBMIT_FLOW")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            backend_success_rate: env::var("PORTAL_BACKEND_SUCCESS_RATE")
                .ok()
                .and_then(|s| s.parse::<f64>().ok())
                .map(|rate| rate.clamp(0.0, 1.0))
                .unwrap_or(0.8),
            backend_delay_ms: env::var("PORTAL_BACKEND_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1500),
            today: env::var("PORTAL_TODAY")
                .ok()
                .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
                log_level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            },
        }
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }

    pub fn backend_delay(&self) -> Duration {
        Duration::from_millis(self.backend_delay_ms)
    }

    /// Reference date for validity checks
    pub fn reference_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            fetch_delay_ms: 1500,
            submit_flow: SubmitFlow::Direct,
            backend_success_rate: 0.8,
            backend_delay_ms: 1500,
            today: None,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                log_level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.catalog_path, PathBuf::from("data/events.json"));
        assert_eq!(config.fetch_delay(), Duration::from_millis(1500));
        assert_eq!(config.submit_flow, SubmitFlow::Direct);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_fixed_reference_date() {
        let config = Config {
            today: NaiveDate::from_ymd_opt(2025, 7, 1),
            ..Config::default()
        };
        assert_eq!(config.reference_date(), NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }
}
