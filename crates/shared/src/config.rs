//! Application configuration management.
//!
//! Sources are layered: `config/default`, then `config/{RUN_MODE}`, then
//! `LEAVEDESK__*` environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Email configuration for leave notifications.
    #[serde(default)]
    pub email: EmailConfig,
    /// Thresholds used by the leave decision engine.
    #[serde(default)]
    pub policy: LeavePolicy,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// SMTP configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// SMTP relay host.
    pub smtp_host: String,
    /// SMTP relay port.
    pub smtp_port: u16,
    /// SMTP username.
    pub smtp_username: String,
    /// SMTP password.
    pub smtp_password: String,
    /// Sender address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
    /// Domain appended to usernames that have no explicit email address.
    pub default_domain: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_email: "leave-desk@company.com".to_string(),
            from_name: "Leave Management System".to_string(),
            default_domain: "company.com".to_string(),
        }
    }
}

/// Leave policy thresholds.
///
/// Percentages are expressed in percent points (`7` means 7%).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeavePolicy {
    /// Auto-approvals allowed per user per calendar month (FCFS quota).
    pub monthly_auto_approval_cap: u32,
    /// Longest CL span in days; longer CL requests are treated as AL.
    pub casual_leave_max_days: i64,
    /// Longest optional-leave span on ordinary days before outright rejection.
    pub optional_leave_max_days: i64,
    /// Daily planned shrinkage must stay strictly below this for auto-approval.
    pub daily_planned_limit: Decimal,
    /// Daily total shrinkage must stay strictly below this unless the team overrides it.
    pub daily_total_limit: Decimal,
    /// Weekly aggregate shrinkage ceiling (inclusive).
    pub weekly_limit: Decimal,
    /// Monthly aggregate shrinkage ceiling (inclusive).
    pub monthly_limit: Decimal,
    /// Daily sick shrinkage must stay strictly below this for sick auto-approval.
    pub sick_limit: Decimal,
    /// Weekly target used by the carry-forward report.
    pub weekly_target: Decimal,
    /// Number of calendar days covered by the forecast.
    pub forecast_days: u32,
    /// Forecast days strictly below this are `Safe`.
    pub forecast_safe_below: Decimal,
    /// Forecast days at or below this (and not safe) are `Tight`.
    pub forecast_tight_at_most: Decimal,
    /// Pending requests starting within this many days are urgent.
    pub urgent_within_days: i64,
    /// Upper bound for a single notification dispatch.
    pub notification_timeout_secs: u64,
}

impl Default for LeavePolicy {
    fn default() -> Self {
        Self {
            monthly_auto_approval_cap: 5,
            casual_leave_max_days: 2,
            optional_leave_max_days: 2,
            daily_planned_limit: Decimal::from(7),
            daily_total_limit: Decimal::from(10),
            weekly_limit: Decimal::from(10),
            monthly_limit: Decimal::from(10),
            sick_limit: Decimal::from(3),
            weekly_target: Decimal::from(15),
            forecast_days: 30,
            forecast_safe_below: Decimal::from(6),
            forecast_tight_at_most: Decimal::from(10),
            urgent_within_days: 7,
            notification_timeout_secs: 10,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LEAVEDESK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
