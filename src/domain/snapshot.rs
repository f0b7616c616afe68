// Dashboard snapshot domain model
//
// Each widget section is parsed on its own so one bad section never takes
// the rest of the snapshot down with it.
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{DashboardError, Result};
use super::live_match::LiveMatchStatus;

/// Keys of the `widgets` object, in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    OverviewStats,
    LiveMatchStatus,
    RecentMatches,
    TopPerformers,
    FormationSummary,
    FitnessOverview,
    UpcomingFixtures,
    PerformanceAlerts,
    TacticalInsights,
    SquadAvailability,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 10] = [
        WidgetKind::OverviewStats,
        WidgetKind::LiveMatchStatus,
        WidgetKind::RecentMatches,
        WidgetKind::TopPerformers,
        WidgetKind::FormationSummary,
        WidgetKind::FitnessOverview,
        WidgetKind::UpcomingFixtures,
        WidgetKind::PerformanceAlerts,
        WidgetKind::TacticalInsights,
        WidgetKind::SquadAvailability,
    ];

    pub fn key(self) -> &'static str {
        match self {
            WidgetKind::OverviewStats => "overview_stats",
            WidgetKind::LiveMatchStatus => "live_match_status",
            WidgetKind::RecentMatches => "recent_matches",
            WidgetKind::TopPerformers => "top_performers",
            WidgetKind::FormationSummary => "formation_summary",
            WidgetKind::FitnessOverview => "fitness_overview",
            WidgetKind::UpcomingFixtures => "upcoming_fixtures",
            WidgetKind::PerformanceAlerts => "performance_alerts",
            WidgetKind::TacticalInsights => "tactical_insights",
            WidgetKind::SquadAvailability => "squad_availability",
        }
    }
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Outcome of parsing one section of the snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Present(T),
    Missing,
    Malformed(String),
}

impl<T> Section<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Section::Present(value) => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeasonStats {
    pub matches_played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub goals_scored: u32,
    pub goals_conceded: u32,
    pub goal_difference: i32,
    pub points: u32,
    pub goals_per_match: f64,
    pub clean_sheets: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormTrends {
    pub form_last_5: String,
    pub form_last_10: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverviewStats {
    pub title: Option<String>,
    pub stats: SeasonStats,
    pub trends: FormTrends,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecentMatch {
    pub id: Option<String>,
    pub date: String,
    pub opponent: String,
    pub is_home: bool,
    pub score: String,
    pub result: String,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecentMatches {
    pub title: Option<String>,
    pub matches: Vec<RecentMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Performer {
    pub name: String,
    pub position: String,
    pub squad_number: Option<u32>,
    pub average_rating: f64,
    pub goals: u32,
    pub assists: u32,
    pub matches_played: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TopPerformers {
    pub title: Option<String>,
    pub performers: Vec<Performer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormationUsage {
    pub total_formations_used: u32,
    pub most_used_formation: String,
    pub most_used_count: u32,
    pub most_effective_formation: String,
    pub most_effective_win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormationRecord {
    pub usage_count: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub win_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormationSummary {
    pub title: Option<String>,
    pub summary: FormationUsage,
    pub formations: BTreeMap<String, FormationRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SquadSummary {
    pub total_players: u32,
    pub available_players: u32,
    pub injured_players: u32,
    pub availability_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FitnessDistribution {
    pub excellent: u32,
    pub good: u32,
    pub average: u32,
    pub poor: u32,
    pub critical: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerFlag {
    pub name: String,
    pub position: Option<String>,
    pub fitness_level: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FitnessAlerts {
    pub injured_players: Vec<PlayerFlag>,
    pub low_fitness_players: Vec<PlayerFlag>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FitnessOverview {
    pub title: Option<String>,
    pub summary: SquadSummary,
    pub fitness_distribution: FitnessDistribution,
    pub alerts: FitnessAlerts,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub opponent: String,
    pub date: String,
    pub time: Option<String>,
    pub is_home: bool,
    pub days_until: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpcomingFixtures {
    pub title: Option<String>,
    pub fixtures: Vec<Fixture>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PerformanceAlerts {
    pub title: Option<String>,
    pub alerts: Vec<Alert>,
    pub total_alerts: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Insight {
    pub category: String,
    pub insight: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TacticalInsights {
    pub title: Option<String>,
    pub insights: Vec<Insight>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PositionConcern {
    pub position: String,
    pub concern_level: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SquadAvailability {
    pub title: Option<String>,
    pub concerns: Vec<PositionConcern>,
    pub overall_availability: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub overview_stats: Section<OverviewStats>,
    pub live_match_status: Section<LiveMatchStatus>,
    pub recent_matches: Section<RecentMatches>,
    pub top_performers: Section<TopPerformers>,
    pub formation_summary: Section<FormationSummary>,
    pub fitness_overview: Section<FitnessOverview>,
    pub upcoming_fixtures: Section<UpcomingFixtures>,
    pub performance_alerts: Section<PerformanceAlerts>,
    pub tactical_insights: Section<TacticalInsights>,
    pub squad_availability: Section<SquadAvailability>,
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}

impl DashboardSnapshot {
    /// Parse a /dashboard/widgets payload.
    ///
    /// Only a missing or non-object `widgets` key fails the whole snapshot;
    /// anything wrong inside a section is confined to that section.
    pub fn from_json(payload: Value) -> Result<Self> {
        let Value::Object(mut root) = payload else {
            return Err(DashboardError::MalformedData(
                "snapshot payload is not a JSON object".to_string(),
            ));
        };

        let widgets = match root.remove("widgets") {
            Some(Value::Object(widgets)) => widgets,
            Some(_) => {
                return Err(DashboardError::MalformedData(
                    "'widgets' is not an object".to_string(),
                ));
            }
            None => {
                return Err(DashboardError::MalformedData(
                    "snapshot has no 'widgets' section".to_string(),
                ));
            }
        };

        let last_updated = root
            .get("last_updated")
            .and_then(Value::as_str)
            .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&chrono::Utc));

        Ok(Self {
            overview_stats: section(&widgets, WidgetKind::OverviewStats),
            live_match_status: section(&widgets, WidgetKind::LiveMatchStatus),
            recent_matches: section(&widgets, WidgetKind::RecentMatches),
            top_performers: section(&widgets, WidgetKind::TopPerformers),
            formation_summary: section(&widgets, WidgetKind::FormationSummary),
            fitness_overview: section(&widgets, WidgetKind::FitnessOverview),
            upcoming_fixtures: section(&widgets, WidgetKind::UpcomingFixtures),
            performance_alerts: section(&widgets, WidgetKind::PerformanceAlerts),
            tactical_insights: section(&widgets, WidgetKind::TacticalInsights),
            squad_availability: section(&widgets, WidgetKind::SquadAvailability),
            last_updated,
        })
    }
}

fn section<T: DeserializeOwned>(widgets: &Map<String, Value>, kind: WidgetKind) -> Section<T> {
    match widgets.get(kind.key()) {
        None | Some(Value::Null) => Section::Missing,
        Some(value) => match T::deserialize(value) {
            Ok(parsed) => Section::Present(parsed),
            Err(e) => {
                tracing::warn!(widget = %kind, error = %e, "Malformed widget section");
                Section::Malformed(e.to_string())
            }
        },
    }
}
