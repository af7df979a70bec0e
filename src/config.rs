//! Configuration management for the `PvCast` gateway
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PvcastError;
use crate::enrich::{PANEL_EFFICIENCY, PANEL_POWER_KW, RAIN_CODE_THRESHOLD, RAINY_DAYS_PER_WEEK};
use crate::enrich::{PanelSpec, SummaryRules};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `PvCast` gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PvcastConfig {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Forecast provider configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Photovoltaic panel parameters
    #[serde(default)]
    pub panel: PanelConfig,
    /// Weekly summary thresholds
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Single allowed CORS origin; any origin when unset
    #[serde(default)]
    pub cors_origin: Option<String>,
    /// PEM certificate chain, enables TLS together with `tls_key_path`
    #[serde(default)]
    pub tls_cert_path: Option<PathBuf>,
    /// PEM private key
    #[serde(default)]
    pub tls_key_path: Option<PathBuf>,
}

/// Forecast provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL for the forecast API
    #[serde(default = "default_upstream_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_seconds: u64,
}

/// Photovoltaic panel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Nominal power in kW
    #[serde(default = "default_panel_power")]
    pub power_kw: f64,
    /// Efficiency factor in (0, 1]
    #[serde(default = "default_panel_efficiency")]
    pub efficiency: f64,
}

/// Summary classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Weather codes at or above this value count as precipitation
    #[serde(default = "default_rain_code_threshold")]
    pub rain_code_threshold: u8,
    /// Precipitation days per 7-day window needed for a rainy week
    #[serde(default = "default_rainy_days_per_week")]
    pub rainy_days_per_week: usize,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// OTLP/HTTP collector endpoint for trace export
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

// Default value functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_upstream_base_url() -> String {
    crate::weather::open_meteo::DEFAULT_BASE_URL.to_string()
}

fn default_upstream_timeout() -> u64 {
    crate::weather::open_meteo::DEFAULT_TIMEOUT.as_secs()
}

fn default_panel_power() -> f64 {
    PANEL_POWER_KW
}

fn default_panel_efficiency() -> f64 {
    PANEL_EFFICIENCY
}

fn default_rain_code_threshold() -> u8 {
    RAIN_CODE_THRESHOLD
}

fn default_rainy_days_per_week() -> usize {
    RAINY_DAYS_PER_WEEK
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cors_origin: None,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_base_url(),
            timeout_seconds: default_upstream_timeout(),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            power_kw: default_panel_power(),
            efficiency: default_panel_efficiency(),
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            rain_code_threshold: default_rain_code_threshold(),
            rainy_days_per_week: default_rainy_days_per_week(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            otlp_endpoint: None,
        }
    }
}

impl PanelConfig {
    #[must_use]
    pub fn spec(&self) -> PanelSpec {
        PanelSpec {
            power_kw: self.power_kw,
            efficiency: self.efficiency,
        }
    }
}

impl SummaryConfig {
    #[must_use]
    pub fn rules(&self) -> SummaryRules {
        SummaryRules {
            rain_code_threshold: self.rain_code_threshold,
            rainy_days_per_week: self.rainy_days_per_week,
        }
    }
}

impl PvcastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. PVCAST_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("PVCAST")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PvcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pvcast").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.upstream.base_url.is_empty() {
            self.upstream.base_url = default_upstream_base_url();
        }
        if self.upstream.timeout_seconds == 0 {
            self.upstream.timeout_seconds = default_upstream_timeout();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.cors_origin.as_deref() == Some("") {
            self.server.cors_origin = None;
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_tls()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.upstream.timeout_seconds == 0 || self.upstream.timeout_seconds > 300 {
            return Err(PvcastError::config(
                "Upstream timeout must be between 1 and 300 seconds",
            )
            .into());
        }

        if !(self.panel.power_kw.is_finite() && self.panel.power_kw > 0.0) {
            return Err(PvcastError::config("Panel power must be a positive number of kW").into());
        }

        if !(self.panel.efficiency > 0.0 && self.panel.efficiency <= 1.0) {
            return Err(PvcastError::config("Panel efficiency must be in (0, 1]").into());
        }

        if self.summary.rainy_days_per_week == 0
            || self.summary.rainy_days_per_week > crate::enrich::WEEK_DAYS
        {
            return Err(PvcastError::config(format!(
                "Rainy days per week must be between 1 and {}",
                crate::enrich::WEEK_DAYS
            ))
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PvcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PvcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(PvcastError::config(
                "Upstream base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    fn validate_tls(&self) -> Result<()> {
        match (&self.server.tls_cert_path, &self.server.tls_key_path) {
            (Some(_), None) | (None, Some(_)) => Err(PvcastError::config(
                "TLS requires both tls_cert_path and tls_key_path",
            )
            .into()),
            _ => Ok(()),
        }
    }
}
