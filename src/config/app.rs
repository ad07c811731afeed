//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! ranked-arena engine, including environment variable loading, TOML file
//! loading, and validation.

use crate::config::rating::RatingSettings;
use crate::types::{ChannelId, GuildId, RoleId};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub pings: PingSettings,
    pub ranked: RankedSettings,
    pub rating: RatingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Ping registry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingSettings {
    /// How long a ping stays visible, in minutes
    pub visibility_minutes: u64,
    /// Interval between expiry sweeps of stale pings, in seconds
    pub sweep_interval_seconds: u64,
    /// Cooldown for opening a ranked ping, in seconds
    pub ranked_cooldown_seconds: u64,
}

/// Ranked ladder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSettings {
    /// Channels (and thread parents) where ranked commands are accepted
    pub arena_channels: Vec<ChannelId>,
    /// The community where force reports and the stats opt-in prompt work
    pub home_guild: GuildId,
    /// Role ids for the six tiers, ascending by Elo band
    pub tier_roles: Vec<RoleId>,
    /// How long the named opponent has to acknowledge a report, in seconds
    pub ack_timeout_seconds: u64,
    /// How long the stats opt-in reaction prompt stays open, in seconds
    pub opt_in_timeout_seconds: u64,
    /// Cooldown for report and force-report commands, in seconds
    pub report_cooldown_seconds: u64,
    /// Games required before automatic tier reconciliation applies
    pub auto_role_threshold: u32,
    /// Games required for the explicit stats opt-in path
    pub opt_in_role_threshold: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "ranked-arena".to_string(),
            log_level: "info".to_string(),
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for PingSettings {
    fn default() -> Self {
        Self {
            visibility_minutes: 30,
            sweep_interval_seconds: 60,
            ranked_cooldown_seconds: 120,
        }
    }
}

impl Default for RankedSettings {
    fn default() -> Self {
        Self {
            arena_channels: vec![1],
            home_guild: 1,
            tier_roles: vec![1, 2, 3, 4, 5, 6],
            ack_timeout_seconds: 40,
            opt_in_timeout_seconds: 120,
            report_cooldown_seconds: 41,
            auto_role_threshold: 5,
            opt_in_role_threshold: 1,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Ping settings
        if let Ok(minutes) = env::var("PING_VISIBILITY_MINUTES") {
            config.pings.visibility_minutes = minutes
                .parse()
                .map_err(|_| anyhow!("Invalid PING_VISIBILITY_MINUTES value: {}", minutes))?;
        }
        if let Ok(interval) = env::var("PING_SWEEP_INTERVAL_SECONDS") {
            config.pings.sweep_interval_seconds = interval
                .parse()
                .map_err(|_| anyhow!("Invalid PING_SWEEP_INTERVAL_SECONDS value: {}", interval))?;
        }
        if let Ok(cooldown) = env::var("RANKED_PING_COOLDOWN_SECONDS") {
            config.pings.ranked_cooldown_seconds = cooldown
                .parse()
                .map_err(|_| anyhow!("Invalid RANKED_PING_COOLDOWN_SECONDS value: {}", cooldown))?;
        }

        // Ranked ladder settings
        if let Ok(channels) = env::var("RANKED_ARENA_CHANNELS") {
            config.ranked.arena_channels = parse_id_list(&channels)
                .map_err(|_| anyhow!("Invalid RANKED_ARENA_CHANNELS value: {}", channels))?;
        }
        if let Ok(guild) = env::var("HOME_GUILD") {
            config.ranked.home_guild = guild
                .parse()
                .map_err(|_| anyhow!("Invalid HOME_GUILD value: {}", guild))?;
        }
        if let Ok(roles) = env::var("TIER_ROLES") {
            config.ranked.tier_roles = parse_id_list(&roles)
                .map_err(|_| anyhow!("Invalid TIER_ROLES value: {}", roles))?;
        }
        if let Ok(timeout) = env::var("ACK_TIMEOUT_SECONDS") {
            config.ranked.ack_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid ACK_TIMEOUT_SECONDS value: {}", timeout))?;
        }
        if let Ok(timeout) = env::var("OPT_IN_TIMEOUT_SECONDS") {
            config.ranked.opt_in_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid OPT_IN_TIMEOUT_SECONDS value: {}", timeout))?;
        }
        if let Ok(cooldown) = env::var("REPORT_COOLDOWN_SECONDS") {
            config.ranked.report_cooldown_seconds = cooldown
                .parse()
                .map_err(|_| anyhow!("Invalid REPORT_COOLDOWN_SECONDS value: {}", cooldown))?;
        }
        if let Ok(threshold) = env::var("AUTO_ROLE_THRESHOLD") {
            config.ranked.auto_role_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("Invalid AUTO_ROLE_THRESHOLD value: {}", threshold))?;
        }

        // Rating settings
        if let Ok(k) = env::var("ELO_K_FACTOR") {
            config.rating.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_K_FACTOR value: {}", k))?;
        }
        if let Ok(elo) = env::var("DEFAULT_ELO") {
            config.rating.default_elo = elo
                .parse()
                .map_err(|_| anyhow!("Invalid DEFAULT_ELO value: {}", elo))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Get ping visibility window as Duration
    pub fn ping_visibility(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.pings.visibility_minutes as i64)
    }

    /// Get expiry sweep interval as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.pings.sweep_interval_seconds)
    }

    /// Get acknowledgement timeout as Duration
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_secs(self.ranked.ack_timeout_seconds)
    }

    /// Get stats opt-in timeout as Duration
    pub fn opt_in_timeout(&self) -> Duration {
        Duration::from_secs(self.ranked.opt_in_timeout_seconds)
    }

    /// Get graceful shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }
}

fn parse_id_list(raw: &str) -> std::result::Result<Vec<u64>, std::num::ParseIntError> {
    raw.split(',')
        .map(|part| part.trim().parse())
        .collect()
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate timeouts
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.ranked.ack_timeout_seconds == 0 {
        return Err(anyhow!("Acknowledgement timeout must be greater than 0"));
    }
    if config.ranked.opt_in_timeout_seconds == 0 {
        return Err(anyhow!("Opt-in timeout must be greater than 0"));
    }

    // Validate ping settings
    if config.pings.visibility_minutes == 0 {
        return Err(anyhow!("Ping visibility window must be greater than 0"));
    }
    if config.pings.sweep_interval_seconds == 0 {
        return Err(anyhow!("Ping sweep interval must be greater than 0"));
    }

    // Validate ranked settings
    if config.ranked.arena_channels.is_empty() {
        return Err(anyhow!("At least one ranked arena channel is required"));
    }
    if config.ranked.tier_roles.len() != 6 {
        return Err(anyhow!(
            "Exactly 6 tier roles are required, got {}",
            config.ranked.tier_roles.len()
        ));
    }
    let mut roles = config.ranked.tier_roles.clone();
    roles.sort_unstable();
    roles.dedup();
    if roles.len() != config.ranked.tier_roles.len() {
        return Err(anyhow!("Tier roles must be distinct"));
    }

    // Validate rating settings
    if config.rating.k_factor == 0 {
        return Err(anyhow!("Elo K-factor must be greater than 0"));
    }

    Ok(())
}
