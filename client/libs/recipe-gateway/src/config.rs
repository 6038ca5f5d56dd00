/// Backend connection settings
///
/// Loads configuration from environment variables.
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Backend base URL, e.g. `https://abc.supabase.co`
    pub url: String,
    /// Public (anon) API key sent as `apikey`
    pub anon_key: String,
}

impl GatewayConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("SUPABASE_URL")
            .context("SUPABASE_URL environment variable not set")?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .context("SUPABASE_ANON_KEY environment variable not set")?;

        Ok(Self::new(url, anon_key))
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    pub fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.url, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_strip_trailing_slash() {
        let config = GatewayConfig::new("https://abc.supabase.co/", "anon");
        assert_eq!(config.rest_url("videos"), "https://abc.supabase.co/rest/v1/videos");
        assert_eq!(
            config.auth_url("token"),
            "https://abc.supabase.co/auth/v1/token"
        );
    }
}
