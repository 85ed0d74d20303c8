use std::env;

use tracing::info;

use crate::error::ConfigError;

const DEFAULT_BASE_URL: &str = "https://api.notion.com";

/// Notion caps `page_size` at 100.
const MAX_PAGE_SIZE: u32 = 100;

/// Names of the database properties the sequencer reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyNames {
    pub date: String,
    pub title: String,
    pub participants: String,
    pub previous: String,
    pub next: String,
}

impl Default for PropertyNames {
    fn default() -> Self {
        Self {
            date: "Date".to_string(),
            title: "Name".to_string(),
            participants: "Participants".to_string(),
            previous: "Previous".to_string(),
            next: "Next".to_string(),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Notion
    pub notion_token: String,
    pub notion_database_id: String,
    pub notion_base_url: String,
    pub page_size: u32,

    // Database schema
    pub properties: PropertyNames,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Logging
    pub json_logs: bool,
}

impl Config {
    /// Load configuration from the process environment, honouring a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));
        let defaults = PropertyNames::default();

        let page_size = match var("NOTION_PAGE_SIZE") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if (1..=MAX_PAGE_SIZE).contains(&n) => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "NOTION_PAGE_SIZE",
                        expected: "an integer between 1 and 100",
                        value: raw,
                    })
                }
            },
            None => MAX_PAGE_SIZE,
        };

        let web_port = match var("WEB_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "WEB_PORT",
                expected: "a port number",
                value: raw.clone(),
            })?,
            None => 3000,
        };

        Ok(Self {
            notion_token: required("NOTION_TOKEN")?,
            notion_database_id: required("NOTION_DATABASE_ID")?,
            notion_base_url: var("NOTION_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            page_size,
            properties: PropertyNames {
                date: var("MEETING_DATE_PROPERTY").unwrap_or(defaults.date),
                title: var("MEETING_TITLE_PROPERTY").unwrap_or(defaults.title),
                participants: var("MEETING_PARTICIPANTS_PROPERTY")
                    .unwrap_or(defaults.participants),
                previous: var("MEETING_PREVIOUS_PROPERTY").unwrap_or(defaults.previous),
                next: var("MEETING_NEXT_PROPERTY").unwrap_or(defaults.next),
            },
            web_host: var("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port,
            json_logs: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }

    /// Log the effective configuration with the token reduced to a prefix.
    pub fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(5).collect();
            format!("{head}...")
        }

        info!(
            notion_token = %preview(&self.notion_token),
            database_id = %self.notion_database_id,
            base_url = %self.notion_base_url,
            page_size = self.page_size,
            date_property = %self.properties.date,
            title_property = %self.properties.title,
            participants_property = %self.properties.participants,
            previous_property = %self.properties.previous,
            next_property = %self.properties.next,
            "Loaded config"
        );
    }
}
