//! Configuration management for the ranked-arena engine
//!
//! This module handles all configuration loading from environment variables
//! or a TOML file, validation, and default values for the matchmaking and
//! ranking engine.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, PingSettings, RankedSettings, ServiceSettings};
pub use rating::RatingSettings;
