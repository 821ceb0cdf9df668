use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::CatalogConfig;
use crate::error::{BotError, Result};

/// A team inside a league
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRecord {
    /// Lowercased, whitespace-free lookup key
    pub key: String,
    /// Identifier in the football data API (not guaranteed unique)
    pub external_id: u32,
    /// 24-bit RGB
    pub color: u32,
    pub crest_url: Option<String>,
}

/// A league owning its teams, in declaration order
#[derive(Debug, Clone)]
pub struct League {
    pub key: String,
    pub display_name: String,
    teams: Vec<TeamRecord>,
    index: HashMap<String, usize>,
}

impl League {
    pub fn teams(&self) -> &[TeamRecord] {
        &self.teams
    }

    pub fn get(&self, normalized_key: &str) -> Option<&TeamRecord> {
        self.index.get(normalized_key).map(|&i| &self.teams[i])
    }
}

/// Result of a successful team lookup
#[derive(Debug, Clone, Copy)]
pub struct TeamMatch<'a> {
    pub league: &'a League,
    pub team: &'a TeamRecord,
}

/// League key and name, for listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueSummary {
    pub key: String,
    pub display_name: String,
}

/// Read-only catalog of leagues and teams
#[derive(Debug, Clone)]
pub struct TeamDirectory {
    leagues: Vec<League>,
}

pub type SharedTeamDirectory = Arc<TeamDirectory>;

impl TeamDirectory {
    /// Build the directory from a catalog.
    ///
    /// Duplicate team keys inside one league are rejected. Duplicate
    /// external ids anywhere in the catalog are only reported.
    pub fn from_catalog(catalog: CatalogConfig) -> Result<Self> {
        let mut leagues = Vec::with_capacity(catalog.leagues.len());
        let mut league_keys = HashSet::new();

        for league_config in catalog.leagues {
            let league_key = league_config.key.trim().to_lowercase();
            if league_key.is_empty() {
                return Err(BotError::CatalogValidation {
                    message: format!("league '{}' has an empty key", league_config.name),
                });
            }
            if !league_keys.insert(league_key.clone()) {
                return Err(BotError::CatalogValidation {
                    message: format!("league key '{}' is declared twice", league_key),
                });
            }

            let mut teams = Vec::with_capacity(league_config.teams.len());
            let mut index = HashMap::with_capacity(league_config.teams.len());
            for team in league_config.teams {
                let key = normalize_team_name(&team.key);
                if key.is_empty() {
                    return Err(BotError::CatalogValidation {
                        message: format!("league '{}' has a team with an empty key", league_key),
                    });
                }
                if index.insert(key.clone(), teams.len()).is_some() {
                    return Err(BotError::CatalogValidation {
                        message: format!("team '{}' appears twice in league '{}'", key, league_key),
                    });
                }
                teams.push(TeamRecord {
                    key,
                    external_id: team.id,
                    color: team.color,
                    crest_url: team.crest,
                });
            }

            leagues.push(League {
                key: league_key,
                display_name: league_config.name,
                teams,
                index,
            });
        }

        let directory = Self { leagues };
        for (external_id, holders) in directory.duplicate_external_ids() {
            warn!(
                "Catalog data issue: external id {} is shared by {}",
                external_id,
                holders.join(", ")
            );
        }
        info!(
            "Team directory ready: {} leagues, {} teams",
            directory.leagues.len(),
            directory.leagues.iter().map(|l| l.teams.len()).sum::<usize>()
        );

        Ok(directory)
    }

    /// Resolve a free-text team name. First declared league wins.
    pub fn find_team(&self, raw_name: &str) -> Result<TeamMatch<'_>> {
        let key = normalize_team_name(raw_name);
        self.leagues
            .iter()
            .find_map(|league| league.get(&key).map(|team| TeamMatch { league, team }))
            .ok_or_else(|| BotError::TeamNotFound {
                name: raw_name.trim().to_string(),
            })
    }

    /// Display names of the teams in one league, or in all leagues when `league_key` is None
    pub fn list_teams(&self, league_key: Option<&str>) -> Result<Vec<String>> {
        let leagues: Vec<&League> = match league_key {
            Some(key) => vec![self.league(key)?],
            None => self.leagues.iter().collect(),
        };

        Ok(leagues
            .into_iter()
            .flat_map(|league| league.teams.iter())
            .map(|team| display_team_name(&team.key))
            .collect())
    }

    pub fn list_leagues(&self) -> Vec<LeagueSummary> {
        self.leagues
            .iter()
            .map(|league| LeagueSummary {
                key: league.key.clone(),
                display_name: league.display_name.clone(),
            })
            .collect()
    }

    pub fn league(&self, key: &str) -> Result<&League> {
        let wanted = key.trim().to_lowercase();
        self.leagues
            .iter()
            .find(|league| league.key == wanted)
            .ok_or(BotError::LeagueNotFound { key: wanted })
    }

    /// Color for any team by name, black when unknown
    pub fn team_color(&self, raw_name: &str) -> u32 {
        self.find_team(raw_name).map(|m| m.team.color).unwrap_or(0x000000)
    }

    /// External ids used by more than one team, with "league/team" holders
    pub fn duplicate_external_ids(&self) -> Vec<(u32, Vec<String>)> {
        let mut holders: HashMap<u32, Vec<String>> = HashMap::new();
        let mut order = Vec::new();
        for league in &self.leagues {
            for team in &league.teams {
                let entry = holders.entry(team.external_id).or_default();
                if entry.is_empty() {
                    order.push(team.external_id);
                }
                entry.push(format!("{}/{}", league.key, team.key));
            }
        }

        order
            .into_iter()
            .filter_map(|id| {
                let names = holders.remove(&id)?;
                (names.len() > 1).then_some((id, names))
            })
            .collect()
    }
}

pub fn create_shared_team_directory(directory: TeamDirectory) -> SharedTeamDirectory {
    Arc::new(directory)
}

/// Lowercase and strip all whitespace
pub fn normalize_team_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// "las_palmas" -> "Las Palmas"
pub fn display_team_name(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
