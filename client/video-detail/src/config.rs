/// Configuration management for the video detail client
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use recipe_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ClientError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    /// Hosted backend connection
    pub gateway: GatewayConfig,
    pub ui: UiConfig,
    /// What the headless binary opens and who it signs in as
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ClientError::Config(format!("unknown LOG_FORMAT: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Lifetime of the floating heart after a like
    #[serde(default = "default_heart_animation_ms")]
    pub heart_animation_ms: u64,
}

impl UiConfig {
    pub fn heart_animation(&self) -> Duration {
        Duration::from_millis(self.heart_animation_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoConfig {
    pub video_id: Option<String>,
    pub login_email: Option<String>,
    pub login_password: Option<String>,
}

fn default_heart_animation_ms() -> u64 {
    800
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(raw) => raw.parse::<LogFormat>().context("invalid LOG_FORMAT")?,
            Err(_) => LogFormat::default(),
        };

        let app = AppConfig {
            env: std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            log_format,
        };

        let gateway = GatewayConfig::from_env()?;

        let ui = UiConfig {
            heart_animation_ms: std::env::var("HEART_ANIMATION_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_heart_animation_ms),
        };

        let demo = DemoConfig {
            video_id: std::env::var("VIDEO_ID").ok(),
            login_email: std::env::var("LOGIN_EMAIL").ok(),
            login_password: std::env::var("LOGIN_PASSWORD").ok(),
        };

        Ok(Config {
            app,
            gateway,
            ui,
            demo,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        std::env::set_var("SUPABASE_URL", "https://abc.supabase.co");
        std::env::set_var("SUPABASE_ANON_KEY", "anon");
        std::env::remove_var("LOG_FORMAT");
        std::env::remove_var("HEART_ANIMATION_MS");

        let config = Config::from_env().unwrap();

        assert_eq!(config.app.log_format, LogFormat::Pretty);
        assert_eq!(config.gateway.url, "https://abc.supabase.co");
        assert_eq!(config.ui.heart_animation(), Duration::from_millis(800));
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
