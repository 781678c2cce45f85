//! Application configuration loaded from environment variables.

use std::collections::BTreeSet;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::arbitrage::EngineConfig;
use crate::crafting::CraftingConfig;
use crate::error::ConfigError;

/// Store listing endpoint exposed by the EcoPriceCalculator server plugin.
pub const STORES_PATH: &str = "/api/v1/plugins/EcoPriceCalculator/stores";

/// Recipe endpoint exposed by the same plugin.
pub const RECIPES_PATH: &str = "/api/v1/plugins/EcoPriceCalculator/recipes";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Market Server ===
    /// Base URL of the Eco server web API.
    #[serde(default = "default_server_url")]
    pub eco_server_url: String,

    /// Request timeout for the store fetch.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    // === Engine ===
    /// Minimum per-unit profit for an opportunity to be reported.
    #[serde(default = "default_min_profit")]
    pub min_profit: Decimal,

    /// Comma-separated currency allow-list, empty for all currencies.
    #[serde(default)]
    pub currency_filter: String,

    /// Remaining source-store balance below which a deal is flagged.
    #[serde(default = "default_liquidity_margin")]
    pub liquidity_margin: Decimal,

    // === Reports ===
    /// Maximum opportunities shown per report.
    #[serde(default = "default_report_limit")]
    pub report_limit: usize,

    /// Minutes between scheduled Discord reports.
    #[serde(default = "default_report_interval")]
    pub report_interval_minutes: u32,

    // === Deal Monitor ===
    /// Minimum total profit (per-unit profit times tradeable quantity) for
    /// the deal monitor.
    #[serde(default = "default_monitor_threshold")]
    pub monitor_threshold: Decimal,

    /// Seconds between deal monitor checks.
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_secs: u64,

    // === Crafting ===
    /// Comma-separated stores whose buy orders profession analysis ignores.
    #[serde(default = "default_excluded_buyer_stores")]
    pub excluded_buyer_stores: String,

    // === Discord ===
    /// Bot token.
    #[serde(default)]
    pub discord_token: Option<String>,

    /// Channel that receives scheduled reports.
    #[serde(default)]
    pub discord_channel_id: Option<u64>,

    // === Observability ===
    /// Port for the Prometheus exporter, disabled when unset.
    #[serde(default)]
    pub metrics_port: Option<u16>,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Log output format: pretty or json.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_server_url() -> String {
    "http://144.217.255.182:3001".to_string()
}

fn default_http_timeout() -> u64 {
    10
}

fn default_min_profit() -> Decimal {
    Decimal::new(10, 0)
}

fn default_liquidity_margin() -> Decimal {
    Decimal::new(50, 0)
}

fn default_report_limit() -> usize {
    10
}

fn default_report_interval() -> u32 {
    30
}

fn default_monitor_threshold() -> Decimal {
    Decimal::new(50, 0)
}

fn default_monitor_interval() -> u64 {
    300
}

fn default_excluded_buyer_stores() -> String {
    "Low Hanging Fruit".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            eco_server_url: default_server_url(),
            http_timeout_secs: default_http_timeout(),
            min_profit: default_min_profit(),
            currency_filter: String::new(),
            liquidity_margin: default_liquidity_margin(),
            report_limit: default_report_limit(),
            report_interval_minutes: default_report_interval(),
            monitor_threshold: default_monitor_threshold(),
            monitor_interval_secs: default_monitor_interval(),
            excluded_buyer_stores: default_excluded_buyer_stores(),
            discord_token: None,
            discord_channel_id: None,
            metrics_port: None,
            rust_log: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.eco_server_url)
            .map_err(|e| ConfigError::InvalidServerUrl(e.to_string()))?;

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::NotPositive("HTTP_TIMEOUT_SECS"));
        }

        if self.report_limit == 0 {
            return Err(ConfigError::NotPositive("REPORT_LIMIT"));
        }

        if self.monitor_interval_secs == 0 {
            return Err(ConfigError::NotPositive("MONITOR_INTERVAL_SECS"));
        }

        let interval = self.report_interval_minutes;
        if interval == 0 {
            return Err(ConfigError::NotPositive("REPORT_INTERVAL_MINUTES"));
        }
        if 60 % interval != 0 && interval % 60 != 0 {
            return Err(ConfigError::UnalignedInterval(interval));
        }

        Ok(())
    }

    /// Check the settings the Discord bot needs on top of [`validate`](Self::validate).
    pub fn validate_discord(&self) -> Result<(), ConfigError> {
        match self.discord_token.as_deref() {
            Some(token) if !token.trim().is_empty() => {}
            _ => return Err(ConfigError::Missing("DISCORD_TOKEN")),
        }
        match self.discord_channel_id {
            Some(id) if id != 0 => Ok(()),
            _ => Err(ConfigError::Missing("DISCORD_CHANNEL_ID")),
        }
    }

    /// Full URL of the store listing endpoint.
    pub fn stores_url(&self) -> Result<url::Url, ConfigError> {
        let base = url::Url::parse(&self.eco_server_url)
            .map_err(|e| ConfigError::InvalidServerUrl(e.to_string()))?;
        base.join(STORES_PATH)
            .map_err(|e| ConfigError::InvalidServerUrl(e.to_string()))
    }

    /// Full URL of the recipe endpoint.
    pub fn recipes_url(&self) -> Result<url::Url, ConfigError> {
        let base = url::Url::parse(&self.eco_server_url)
            .map_err(|e| ConfigError::InvalidServerUrl(e.to_string()))?;
        base.join(RECIPES_PATH)
            .map_err(|e| ConfigError::InvalidServerUrl(e.to_string()))
    }

    /// HTTP timeout as a duration.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Parsed currency allow-list.
    pub fn currencies(&self) -> BTreeSet<String> {
        parse_currency_list(&self.currency_filter)
    }

    /// Engine parameters for scheduled and on-demand reports.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            min_profit: self.min_profit,
            currencies: self.currencies(),
            liquidity_margin: self.liquidity_margin,
        }
    }

    /// Engine parameters for the deal monitor.
    ///
    /// Any positive per-unit profit passes the engine. The monitor then keeps
    /// deals whose total profit reaches `monitor_threshold`.
    pub fn monitor_engine_config(&self) -> EngineConfig {
        EngineConfig {
            min_profit: Decimal::ZERO,
            ..self.engine_config()
        }
    }

    /// Crafting and profession analysis parameters.
    pub fn crafting_config(&self) -> CraftingConfig {
        CraftingConfig {
            currencies: self.currencies(),
            excluded_buyers: parse_currency_list(&self.excluded_buyer_stores),
            ..CraftingConfig::default()
        }
    }
}

/// Split a comma-separated currency list, dropping blanks.
pub fn parse_currency_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}
