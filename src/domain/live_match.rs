// Live match domain model
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{DashboardError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScoreWire")]
pub struct Scoreline {
    pub team: u32,
    pub opponent: u32,
}

/// The feed sends "2-1" inside the snapshot widget and an object on /live-tracking
#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreWire {
    Text(String),
    Split {
        #[serde(alias = "chelsea", alias = "home")]
        team: u32,
        opponent: u32,
    },
}

impl TryFrom<ScoreWire> for Scoreline {
    type Error = String;

    fn try_from(wire: ScoreWire) -> std::result::Result<Self, Self::Error> {
        match wire {
            ScoreWire::Split { team, opponent } => Ok(Self { team, opponent }),
            ScoreWire::Text(text) => {
                let (team, opponent) = text
                    .split_once('-')
                    .ok_or_else(|| format!("score '{}' is not in 'x-y' form", text))?;
                Ok(Self {
                    team: team.trim().parse().map_err(|_| format!("bad score '{}'", text))?,
                    opponent: opponent
                        .trim()
                        .parse()
                        .map_err(|_| format!("bad score '{}'", text))?,
                })
            }
        }
    }
}

impl std::fmt::Display for Scoreline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.team, self.opponent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    #[serde(default)]
    pub minute: u32,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub player_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMatch {
    #[serde(default)]
    pub match_id: Option<String>,
    pub opponent: String,
    #[serde(default, alias = "match_time")]
    pub minute: u32,
    #[serde(default)]
    pub score: Option<Scoreline>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default, deserialize_with = "formation_name")]
    pub formation: Option<String>,
    #[serde(default)]
    pub recent_events: Vec<MatchEvent>,
}

/// Accepts either a bare formation name or `{ "formation_name": ... }`
fn formation_name<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(name)) => Some(name),
        Some(Value::Object(map)) => map
            .get("formation_name")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    })
}

impl LiveMatch {
    /// Text for the persistent live banner
    pub fn banner_text(&self) -> String {
        match self.score {
            Some(score) => format!("LIVE {}' vs {} ({})", self.minute, self.opponent, score),
            None => format!("LIVE {}' vs {}", self.minute, self.opponent),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingMatch {
    pub opponent: String,
    #[serde(default)]
    pub datetime: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub is_home: bool,
    #[serde(default)]
    pub match_type: Option<String>,
    #[serde(default)]
    pub hours_until_kickoff: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum LiveMatchStatus {
    #[serde(rename = "no_matches")]
    NoMatch {
        #[serde(default)]
        message: Option<String>,
    },
    #[serde(rename = "upcoming")]
    Upcoming {
        #[serde(rename = "match")]
        fixture: UpcomingMatch,
    },
    #[serde(rename = "live")]
    Live {
        #[serde(rename = "match")]
        details: LiveMatch,
    },
}

impl LiveMatchStatus {
    pub fn is_live(&self) -> bool {
        matches!(self, LiveMatchStatus::Live { .. })
    }

    pub fn live(&self) -> Option<&LiveMatch> {
        match self {
            LiveMatchStatus::Live { details } => Some(details),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LiveTrackingWire {
    Wrapped {
        #[serde(default)]
        matches: Vec<LiveMatch>,
    },
    Bare(Vec<LiveMatch>),
}

/// Parse a /live-tracking payload; only the first record is considered
pub fn parse_live_tracking(payload: Value) -> Result<LiveMatchStatus> {
    let matches = match serde_json::from_value::<LiveTrackingWire>(payload) {
        Ok(LiveTrackingWire::Wrapped { matches }) | Ok(LiveTrackingWire::Bare(matches)) => matches,
        Err(e) => {
            return Err(DashboardError::MalformedData(format!(
                "live-tracking payload: {}",
                e
            )));
        }
    };

    if matches.len() > 1 {
        tracing::debug!("live-tracking returned {} matches, using the first", matches.len());
    }

    Ok(match matches.into_iter().next() {
        Some(details) => LiveMatchStatus::Live { details },
        None => LiveMatchStatus::NoMatch { message: None },
    })
}
