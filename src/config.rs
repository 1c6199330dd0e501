//! Application configuration.
//!
//! Loaded from a TOML file; every field has a default so a missing file or a
//! partial one both work. Semantic checks run after deserialization.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{GateError, Result};

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub guards: GuardConfig,
    pub momo: MomoConfig,
    pub mock: MockConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    pub submit_interval_ms: u64,
    pub rate_limit_max_attempts: usize,
    pub rate_limit_window_ms: u64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            submit_interval_ms: 1000,
            rate_limit_max_attempts: 3,
            rate_limit_window_ms: 60_000,
        }
    }
}

impl GuardConfig {
    pub fn submit_interval(&self) -> Duration {
        Duration::from_millis(self.submit_interval_ms)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MomoConfig {
    /// Delay between a successful initiation and the prompt step.
    pub prompt_delay_ms: u64,
    /// Currency symbol shown next to amounts.
    pub currency: String,
}

impl Default for MomoConfig {
    fn default() -> Self {
        Self {
            prompt_delay_ms: 2000,
            currency: "GH₵".to_string(),
        }
    }
}

impl MomoConfig {
    pub fn prompt_delay(&self) -> Duration {
        Duration::from_millis(self.prompt_delay_ms)
    }
}

/// Artificial latencies of the simulated backend, in milliseconds.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct MockConfig {
    pub exam_pricing_ms: u64,
    pub bulk_pricing_ms: u64,
    pub process_payment_ms: u64,
    pub momo_initiate_ms: u64,
    pub send_code_ms: u64,
    pub verify_code_ms: u64,
    pub fetch_results_ms: u64,
    pub user_orders_ms: u64,
    pub dashboard_stats_ms: u64,
    pub bulk_order_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            exam_pricing_ms: 100,
            bulk_pricing_ms: 100,
            process_payment_ms: 2000,
            momo_initiate_ms: 0,
            send_code_ms: 1000,
            verify_code_ms: 500,
            fetch_results_ms: 1500,
            user_orders_ms: 300,
            dashboard_stats_ms: 100,
            bulk_order_ms: 2000,
        }
    }
}

impl MockConfig {
    /// All latencies set to zero.
    pub fn instant() -> Self {
        Self {
            exam_pricing_ms: 0,
            bulk_pricing_ms: 0,
            process_payment_ms: 0,
            momo_initiate_ms: 0,
            send_code_ms: 0,
            verify_code_ms: 0,
            fetch_results_ms: 0,
            user_orders_ms: 0,
            dashboard_stats_ms: 0,
            bulk_order_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Base URL of the admin API, including the `/api` prefix.
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();
        if self.admin.base_url.trim().is_empty() {
            problems.push("admin.base_url must not be empty");
        }
        if self.guards.submit_interval_ms == 0 {
            problems.push("guards.submit_interval_ms must be positive");
        }
        if self.guards.rate_limit_max_attempts == 0 {
            problems.push("guards.rate_limit_max_attempts must be positive");
        }
        if self.guards.rate_limit_window_ms == 0 {
            problems.push("guards.rate_limit_window_ms must be positive");
        }
        if self.admin.request_timeout_secs == 0 {
            problems.push("admin.request_timeout_secs must be positive");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(GateError::ConfigError(problems.join(", ")))
        }
    }
}

/// Loads and validates configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig =
        toml::from_str(&content).map_err(|e| GateError::ConfigError(e.to_string()))?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}
