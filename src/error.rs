use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    // Lookup errors
    #[error("Team not found: '{name}'")]
    TeamNotFound { name: String },

    #[error("League not found: '{key}'")]
    LeagueNotFound { key: String },

    #[error("Player not found: '{name}'")]
    PlayerNotFound { name: String },

    // Reminder errors
    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    // Catalog errors
    #[error("Failed to load catalog file '{path}': {source}")]
    CatalogLoad {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog file '{path}': {source}")]
    CatalogParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid catalog: {message}")]
    CatalogValidation { message: String },

    // Configuration errors
    #[error("Missing environment variable: {name}")]
    MissingEnv { name: String },

    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnv { name: String, value: String },

    // Football API errors
    #[error("Football API is not configured (set FOOTBALL_API_KEY)")]
    ApiNotConfigured,

    #[error("Football API returned status {status} for '{endpoint}'")]
    ApiStatus { endpoint: String, status: u16 },

    #[error("Football API request failed: {source}")]
    ApiRequest {
        #[source]
        source: reqwest::Error,
    },

    // Discord errors
    #[error("Discord API error: {message}")]
    Discord { message: String },

    // Generic errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BotError {
    /// Lookup and input errors are expected outcomes that get a plain reply
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            BotError::TeamNotFound { .. }
                | BotError::LeagueNotFound { .. }
                | BotError::PlayerNotFound { .. }
                | BotError::InvalidDuration { .. }
                | BotError::ApiNotConfigured
        )
    }
}

impl From<serenity::Error> for BotError {
    fn from(err: serenity::Error) -> Self {
        BotError::Discord {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        BotError::ApiRequest { source: err }
    }
}

impl From<std::io::Error> for BotError {
    fn from(err: std::io::Error) -> Self {
        BotError::Internal {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

use poise::serenity_prelude as serenity;
