use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{BotError, Result};

/// League and team catalog as stored on disk (`data/leagues.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub leagues: Vec<LeagueConfig>,
}

/// A league entry in the catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Lookup key used by `!teams <key>` (e.g. "premier_league")
    pub key: String,

    /// Human-readable name (e.g. "Premier League")
    pub name: String,

    pub teams: Vec<TeamConfig>,
}

/// A team entry in the catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    /// Team name; normalized (lowercased, whitespace removed) on load
    pub key: String,

    /// Identifier in the football data API
    pub id: u32,

    /// 24-bit RGB display color, either an integer or a hex string
    #[serde(deserialize_with = "deserialize_color")]
    pub color: u32,

    /// Crest image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crest: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Int(u32),
    Hex(String),
}

fn deserialize_color<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match ColorValue::deserialize(deserializer)? {
        ColorValue::Int(v) => v,
        ColorValue::Hex(s) => parse_hex_color(&s).map_err(serde::de::Error::custom)?,
    };
    if value > 0xFF_FFFF {
        return Err(serde::de::Error::custom(format!(
            "color {:#X} is outside the 24-bit RGB range",
            value
        )));
    }
    Ok(value)
}

/// Parse "#EF0107", "0xEF0107" or "EF0107"
pub fn parse_hex_color(raw: &str) -> std::result::Result<u32, String> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u32::from_str_radix(digits, 16).map_err(|_| format!("invalid hex color '{}'", raw))
}

impl CatalogConfig {
    /// Load a catalog from a JSON file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BotError::CatalogLoad {
            path: path.to_string(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| BotError::CatalogParse {
            path: path.to_string(),
            source: e,
        })
    }

    /// The catalog the bot ships with
    pub fn builtin() -> Self {
        Self {
            leagues: vec![
                league("premier_league", "Premier League", PREMIER_LEAGUE),
                league("la_liga", "La Liga", LA_LIGA),
            ],
        }
    }

    pub fn team_count(&self) -> usize {
        self.leagues.iter().map(|l| l.teams.len()).sum()
    }
}

fn league(key: &str, name: &str, teams: &[(&str, u32, u32, &str)]) -> LeagueConfig {
    LeagueConfig {
        key: key.to_string(),
        name: name.to_string(),
        teams: teams
            .iter()
            .map(|(key, id, color, crest)| TeamConfig {
                key: key.to_string(),
                id: *id,
                color: *color,
                crest: (!crest.is_empty()).then(|| crest.to_string()),
            })
            .collect(),
    }
}

// (key, api id, color, crest)
const PREMIER_LEAGUE: &[(&str, u32, u32, &str)] = &[
    ("arsenal", 42, 0xEF0107, "https://crests.football-data.org/57.png"),
    ("astonvilla", 66, 0x670E36, "https://crests.football-data.org/58.png"),
    ("bournemouth", 35, 0xDA291C, "https://crests.football-data.org/bournemouth.png"),
    ("brentford", 55, 0xE30613, "https://crests.football-data.org/402.png"),
    ("brighton", 51, 0x0057B8, "https://crests.football-data.org/397.png"),
    ("chelsea", 49, 0x034694, "https://crests.football-data.org/61.png"),
    ("crystalpalace", 52, 0x1B458F, "https://crests.football-data.org/354.png"),
    ("everton", 45, 0x003399, "https://crests.football-data.org/62.png"),
    ("fulham", 36, 0x000000, "https://crests.football-data.org/63.png"),
    ("liverpool", 40, 0xC8102E, "https://crests.football-data.org/64.png"),
    ("luton", 1359, 0xFF5000, ""),
    ("mancity", 50, 0x6CABDD, "https://crests.football-data.org/65.png"),
    ("manutd", 33, 0xDA291C, "https://crests.football-data.org/66.png"),
    ("newcastle", 34, 0x241F20, "https://crests.football-data.org/67.png"),
    ("nottingham", 65, 0xE53233, "https://crests.football-data.org/351.png"),
    ("sheffield", 62, 0xEE2737, ""),
    ("tottenham", 47, 0x132257, "https://crests.football-data.org/73.png"),
    ("westham", 48, 0x7A263A, "https://crests.football-data.org/563.png"),
    ("wolverhampton", 39, 0xFDB913, "https://crests.football-data.org/76.png"),
];

// Mallorca and Sevilla share id 536 upstream; reported at load, left as-is.
const LA_LIGA: &[(&str, u32, u32, &str)] = &[
    ("alaves", 542, 0x0055A4, "https://crests.football-data.org/263.png"),
    ("almeria", 723, 0xEE2A24, ""),
    ("athletic", 531, 0xEE2523, "https://crests.football-data.org/77.png"),
    ("atletico", 530, 0xCB3524, "https://crests.football-data.org/78.png"),
    ("barcelona", 529, 0xA50044, "https://crests.football-data.org/81.png"),
    ("betis", 543, 0x1C9E4A, "https://crests.football-data.org/90.png"),
    ("cadiz", 724, 0xFEF200, ""),
    ("celta", 538, 0x67B2E8, "https://crests.football-data.org/558.png"),
    ("getafe", 546, 0x0B5EA6, "https://crests.football-data.org/82.png"),
    ("girona", 547, 0xFFD100, "https://crests.football-data.org/298.png"),
    ("granada", 715, 0xEE2033, ""),
    ("laspalmas", 534, 0x007D4D, "https://crests.football-data.org/275.png"),
    ("mallorca", 536, 0xE6003A, "https://crests.football-data.org/89.png"),
    ("osasuna", 727, 0x092C5C, "https://crests.football-data.org/79.png"),
    ("rayo", 728, 0xDF0029, "https://crests.football-data.org/87.png"),
    ("realmadrid", 541, 0xFEBE10, "https://crests.football-data.org/86.png"),
    ("realsociedad", 548, 0x0067B1, "https://crests.football-data.org/92.png"),
    ("sevilla", 536, 0xD4002A, "https://crests.football-data.org/559.png"),
    ("valencia", 532, 0xF7A600, "https://crests.football-data.org/95.png"),
    ("villarreal", 533, 0xF3C100, "https://crests.football-data.org/94.png"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_file_format() {
        let json = r##"{
            "leagues": [
                {
                    "key": "premier_league",
                    "name": "Premier League",
                    "teams": [
                        {"key": "arsenal", "id": 42, "color": "#EF0107", "crest": "https://crests.football-data.org/57.png"},
                        {"key": "Aston Villa", "id": 66, "color": 6753846}
                    ]
                }
            ]
        }"##;

        let catalog: CatalogConfig = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.leagues.len(), 1);
        let teams = &catalog.leagues[0].teams;
        assert_eq!(teams[0].color, 0xEF0107);
        assert_eq!(teams[1].color, 0x670E36);
        assert!(teams[1].crest.is_none());
    }

    #[test]
    fn test_color_out_of_range_rejected() {
        let json = r#"{"key": "x", "id": 1, "color": "1FFFFFF"}"#;
        assert!(serde_json::from_str::<TeamConfig>(json).is_err());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("EF0107"), Ok(0xEF0107));
        assert_eq!(parse_hex_color("0x670e36"), Ok(0x670E36));
        assert!(parse_hex_color("red").is_err());
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = CatalogConfig::builtin();
        assert_eq!(catalog.leagues.len(), 2);
        assert_eq!(catalog.leagues[0].key, "premier_league");
        assert_eq!(catalog.leagues[1].key, "la_liga");
        assert_eq!(catalog.team_count(), 39);

        let luton = catalog.leagues[0].teams.iter().find(|t| t.key == "luton").unwrap();
        assert!(luton.crest.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let err = CatalogConfig::load_from_file("/nonexistent/leagues.json").unwrap_err();
        assert!(matches!(err, BotError::CatalogLoad { .. }));
    }
}
