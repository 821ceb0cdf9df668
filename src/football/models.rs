use serde::Deserialize;

/// `GET /teams/{id}` response (fields the bot shows)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInfo {
    pub name: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub founded: Option<u32>,
    #[serde(default)]
    pub club_colors: Option<String>,
    #[serde(default)]
    pub crest: Option<String>,
}

/// `GET /players?name=` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerSearchResponse {
    #[serde(default)]
    pub response: Vec<PlayerEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerEntry {
    pub player: PlayerProfile,
    #[serde(default)]
    pub statistics: Vec<PlayerStatistics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerStatistics {
    pub team: StatisticsTeam,
    #[serde(default)]
    pub goals: Option<Goals>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatisticsTeam {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Goals {
    #[serde(default)]
    pub total: Option<u32>,
}

/// Flattened first search hit
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub name: String,
    pub position: Option<String>,
    pub photo: Option<String>,
    pub team_name: Option<String>,
    pub goals: Option<u32>,
}

impl PlayerSearchResponse {
    /// The first player in the response, if any
    pub fn first(self) -> Option<PlayerSummary> {
        let entry = self.response.into_iter().next()?;
        let stats = entry.statistics.into_iter().next();
        Some(PlayerSummary {
            name: entry.player.name,
            position: entry.player.position,
            photo: entry.player.photo,
            team_name: stats.as_ref().map(|s| s.team.name.clone()),
            goals: stats.and_then(|s| s.goals).and_then(|g| g.total),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_team_info() {
        let json = r#"{
            "id": 57,
            "name": "Arsenal FC",
            "shortName": "Arsenal",
            "tla": "ARS",
            "venue": "Emirates Stadium",
            "founded": 1886,
            "clubColors": "Red / White",
            "crest": "https://crests.football-data.org/57.png"
        }"#;

        let team: TeamInfo = serde_json::from_str(json).unwrap();
        assert_eq!(team.name, "Arsenal FC");
        assert_eq!(team.venue.as_deref(), Some("Emirates Stadium"));
        assert_eq!(team.founded, Some(1886));
        assert_eq!(team.club_colors.as_deref(), Some("Red / White"));
    }

    #[test]
    fn test_parse_team_info_sparse() {
        let team: TeamInfo = serde_json::from_str(r#"{"name": "Luton Town"}"#).unwrap();
        assert!(team.venue.is_none());
        assert!(team.founded.is_none());
    }

    #[test]
    fn test_first_player() {
        let json = r#"{
            "response": [
                {
                    "player": {"name": "Vinicius Junior", "position": "Attacker", "photo": "https://img/vini.png"},
                    "statistics": [
                        {"team": {"name": "Real Madrid"}, "goals": {"total": 15}}
                    ]
                }
            ]
        }"#;

        let response: PlayerSearchResponse = serde_json::from_str(json).unwrap();
        let player = response.first().unwrap();
        assert_eq!(player.name, "Vinicius Junior");
        assert_eq!(player.team_name.as_deref(), Some("Real Madrid"));
        assert_eq!(player.goals, Some(15));
    }

    #[test]
    fn test_empty_player_response() {
        let response: PlayerSearchResponse = serde_json::from_str(r#"{"response": []}"#).unwrap();
        assert!(response.first().is_none());
        let missing: PlayerSearchResponse = serde_json::from_str("{}").unwrap();
        assert!(missing.first().is_none());
    }
}
