use anyhow::{Context, Result};
use tracing::warn;

/// Default Airtable REST endpoint
pub const DEFAULT_AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

/// Environment variables read by [`Config::from_env`], in display order.
pub const ENV_VARS: &[&str] = &[
    "AIRTABLE_PERSONAL_ACCESS_TOKEN",
    "AIRTABLE_PLATFORM_CONFIG_BASE_ID",
    "AIRTABLE_TEMPLE_CONTENT_BASE_ID",
    "AIRTABLE_TEMPLE_USERS_BASE_ID",
    "TEMPLE_SITE_ID",
    "AIRTABLE_API_URL",
    "PUBLIC_DEFAULT_LOCALE",
    "API_KEY",
    "PORT",
];

#[derive(Debug, Clone)]
pub struct Config {
    // Airtable
    pub airtable_token: String,
    pub airtable_api_url: String,
    pub platform_config_base_id: String,
    pub content_base_id: String,
    pub users_base_id: String,

    // Site
    pub site_id: String,
    pub default_locale: String,

    // Server
    pub api_key: Option<String>,
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment.
    ///
    /// Airtable credentials and identifiers are not required here. A missing
    /// value becomes an empty string and the first remote call fails.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Airtable
            airtable_token: lazy_var("AIRTABLE_PERSONAL_ACCESS_TOKEN"),
            airtable_api_url: std::env::var("AIRTABLE_API_URL")
                .unwrap_or_else(|_| DEFAULT_AIRTABLE_API_URL.to_string()),
            platform_config_base_id: lazy_var("AIRTABLE_PLATFORM_CONFIG_BASE_ID"),
            content_base_id: lazy_var("AIRTABLE_TEMPLE_CONTENT_BASE_ID"),
            users_base_id: lazy_var("AIRTABLE_TEMPLE_USERS_BASE_ID"),

            // Site
            site_id: lazy_var("TEMPLE_SITE_ID"),
            default_locale: std::env::var("PUBLIC_DEFAULT_LOCALE")
                .unwrap_or_else(|_| "en".to_string()),

            // Server
            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
            port: match std::env::var("PORT") {
                Ok(port) => port.parse().context("PORT must be a valid port number")?,
                Err(_) => 8080,
            },
        })
    }
}

fn lazy_var(name: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| {
        warn!("{} not set, Airtable calls will fail", name);
        String::new()
    })
}

#[cfg(test)]
pub(crate) fn test_config(airtable_api_url: &str) -> Config {
    Config {
        airtable_token: "test-token".to_string(),
        airtable_api_url: airtable_api_url.to_string(),
        platform_config_base_id: "appConfig".to_string(),
        content_base_id: "appContent".to_string(),
        users_base_id: "appUsers".to_string(),
        site_id: "recSite1".to_string(),
        default_locale: "en".to_string(),
        api_key: None,
        port: 8080,
    }
}
