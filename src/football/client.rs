use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{PlayerSearchResponse, PlayerSummary, TeamInfo};
use crate::config::BotConfig;
use crate::error::{BotError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the football data REST API
#[derive(Clone)]
pub struct FootballClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl FootballClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("starbot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &BotConfig) -> Result<Self> {
        Self::new(&config.football_api_url, config.football_api_key.clone())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<T> {
        let api_key = self.api_key.as_deref().ok_or(BotError::ApiNotConfigured)?;
        let url = self.endpoint_url(endpoint);
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("X-Auth-Token", api_key)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Football API returned {} for {}", status, endpoint);
            return Err(BotError::ApiStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json::<T>().await?)
    }

    /// Team details by external id
    pub async fn team(&self, external_id: u32) -> Result<TeamInfo> {
        self.get_json(&format!("teams/{}", external_id), &[]).await
    }

    /// First player matching `name`
    pub async fn search_player(&self, name: &str) -> Result<PlayerSummary> {
        let response: PlayerSearchResponse = self.get_json("players", &[("name", name)]).await?;
        response.first().ok_or_else(|| BotError::PlayerNotFound {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let client = FootballClient::new("https://api.football-data.org/v4/", None).unwrap();
        assert_eq!(
            client.endpoint_url("teams/42"),
            "https://api.football-data.org/v4/teams/42"
        );
        assert_eq!(
            client.endpoint_url("/players"),
            "https://api.football-data.org/v4/players"
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_makes_no_request() {
        let client = FootballClient::new("http://127.0.0.1:9", None).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(client.team(42).await, Err(BotError::ApiNotConfigured)));
        assert!(matches!(
            client.search_player("saka").await,
            Err(BotError::ApiNotConfigured)
        ));
    }
}
