//! Configuration management for Tavola server

use chrono::FixedOffset;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::{
    availability::{
        AvailabilitySettings, CapacityPolicy, LeadTimeRule, DEFAULT_HORIZON_DAYS, MAX_HORIZON_DAYS,
    },
    error::{AppError, AppResult},
};

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Verification of tokens issued by the external auth service
#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    /// Expected `aud` claim, if the issuer sets one
    pub jwt_audience: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub enabled: bool,
    pub url: String,
    /// Lifetime of a cached availability window
    pub window_ttl_seconds: u64,
}

/// Booking rules fed to the availability engine
#[derive(Debug, Deserialize, Clone)]
pub struct ReservationsConfig {
    /// Days, starting today, that are phone-only. Required, 0 disables.
    pub lead_days: u32,
    #[serde(default = "default_max_per_day")]
    pub max_per_day: i64,
    #[serde(default = "default_horizon_days")]
    pub horizon_days: u32,
    /// Restaurant's offset from UTC; the process local zone is used when unset
    pub utc_offset_minutes: Option<i32>,
}

fn default_max_per_day() -> i64 {
    i64::from(CapacityPolicy::DEFAULT_MAX_PER_DAY)
}

fn default_horizon_days() -> u32 {
    DEFAULT_HORIZON_DAYS
}

impl ReservationsConfig {
    /// Validated engine settings; a negative capacity or an oversized
    /// horizon is rejected here.
    pub fn availability_settings(&self) -> AppResult<AvailabilitySettings> {
        if self.horizon_days > MAX_HORIZON_DAYS {
            return Err(AppError::Validation(format!(
                "horizon_days must be at most {}, got {}",
                MAX_HORIZON_DAYS, self.horizon_days
            )));
        }
        Ok(AvailabilitySettings {
            lead_time: LeadTimeRule::new(self.lead_days),
            policy: CapacityPolicy::new(self.max_per_day)?,
            horizon_days: self.horizon_days,
        })
    }

    pub fn business_offset(&self) -> AppResult<Option<FixedOffset>> {
        self.utc_offset_minutes
            .map(|minutes| {
                FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
                    AppError::Validation(format!("Invalid utc_offset_minutes: {}", minutes))
                })
            })
            .transpose()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    pub reservations: ReservationsConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables, e.g. TAVOLA_RESERVATIONS__LEAD_DAYS=3
            .add_source(
                Environment::with_prefix("TAVOLA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .set_override_option("auth.jwt_secret", env::var("JWT_SECRET").ok())?
            .set_override_option("redis.url", env::var("REDIS_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "redis://127.0.0.1:6379".to_string(),
            window_ttl_seconds: 60,
        }
    }
}
