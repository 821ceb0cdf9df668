use std::time::Duration;

use crate::error::{BotError, Result};

pub const DEFAULT_FOOTBALL_API_URL: &str = "https://api.football-data.org/v4";
pub const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 60;

/// Runtime settings read from the environment (after `.env` is loaded)
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    pub football_api_key: Option<String>,
    pub football_api_url: String,
    pub data_path: String,
    pub welcome_channel_id: Option<u64>,
    pub role_channel_id: Option<u64>,
    pub reminder_interval: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let discord_token = non_empty("DISCORD_TOKEN")
            .or_else(|| non_empty("DISCORD_BOT_TOKEN"))
            .ok_or_else(|| BotError::MissingEnv {
                name: "DISCORD_TOKEN".to_string(),
            })?;

        let reminder_secs = match non_empty("REMINDER_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(BotError::InvalidEnv {
                        name: "REMINDER_INTERVAL_SECS".to_string(),
                        value: raw,
                    })
                }
            },
            None => DEFAULT_REMINDER_INTERVAL_SECS,
        };

        Ok(Self {
            discord_token,
            football_api_key: non_empty("FOOTBALL_API_KEY"),
            football_api_url: non_empty("FOOTBALL_API_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_FOOTBALL_API_URL.to_string()),
            data_path: non_empty("DATA_PATH").unwrap_or_else(|| "data".to_string()),
            welcome_channel_id: parse_snowflake("WELCOME_CHANNEL_ID", non_empty("WELCOME_CHANNEL_ID"))?,
            role_channel_id: parse_snowflake("ROLE_CHANNEL_ID", non_empty("ROLE_CHANNEL_ID"))?,
            reminder_interval: Duration::from_secs(reminder_secs),
        })
    }

    /// Default location of the catalog file
    pub fn catalog_path(&self) -> String {
        format!("{}/leagues.json", self.data_path)
    }
}

fn parse_snowflake(name: &str, value: Option<String>) -> Result<Option<u64>> {
    match value {
        Some(raw) => match raw.trim().parse::<u64>() {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(BotError::InvalidEnv {
                name: name.to_string(),
                value: raw,
            }),
        },
        None => Ok(None),
    }
}
