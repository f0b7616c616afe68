// Widget renderers - turn parsed snapshot sections into widget views
use crate::application::dashboard_view::{Tone, WidgetView};
use crate::domain::live_match::LiveMatchStatus;
use crate::domain::snapshot::{
    DashboardSnapshot, FitnessOverview, FormationSummary, OverviewStats, PerformanceAlerts,
    RecentMatches, Section, SquadAvailability, TacticalInsights, TopPerformers, UpcomingFixtures,
    WidgetKind,
};

const NO_DATA: &str = "No data available";
const UNREADABLE: &str = "Data could not be read";
const MAX_LIST_ROWS: usize = 5;

/// Build the view for one widget from the snapshot
pub fn build_widget(kind: WidgetKind, snapshot: &DashboardSnapshot) -> WidgetView {
    match kind {
        WidgetKind::OverviewStats => {
            with_section(&snapshot.overview_stats, "Season Overview", overview)
        }
        WidgetKind::LiveMatchStatus => {
            with_section(&snapshot.live_match_status, "Match Status", live_status)
        }
        WidgetKind::RecentMatches => {
            with_section(&snapshot.recent_matches, "Recent Matches", recent_matches)
        }
        WidgetKind::TopPerformers => {
            with_section(&snapshot.top_performers, "Top Performers", top_performers)
        }
        WidgetKind::FormationSummary => {
            with_section(&snapshot.formation_summary, "Formation Analysis", formations)
        }
        WidgetKind::FitnessOverview => {
            with_section(&snapshot.fitness_overview, "Squad Fitness Overview", fitness)
        }
        WidgetKind::UpcomingFixtures => {
            with_section(&snapshot.upcoming_fixtures, "Upcoming Fixtures", fixtures)
        }
        WidgetKind::PerformanceAlerts => {
            with_section(&snapshot.performance_alerts, "Performance Alerts", alerts)
        }
        WidgetKind::TacticalInsights => {
            with_section(&snapshot.tactical_insights, "Tactical Insights", insights)
        }
        WidgetKind::SquadAvailability => with_section(
            &snapshot.squad_availability,
            "Squad Availability by Position",
            availability,
        ),
    }
}

fn with_section<T>(
    section: &Section<T>,
    default_title: &str,
    render: impl FnOnce(&T, &str) -> WidgetView,
) -> WidgetView {
    match section {
        Section::Present(data) => render(data, default_title),
        Section::Missing => WidgetView::empty(default_title, NO_DATA),
        Section::Malformed(_) => WidgetView::empty(default_title, UNREADABLE),
    }
}

fn title_or(title: &Option<String>, default_title: &str) -> String {
    title.clone().unwrap_or_else(|| default_title.to_string())
}

pub fn win_rate_tone(win_rate: f64) -> Tone {
    if win_rate >= 60.0 {
        Tone::Good
    } else if win_rate >= 40.0 {
        Tone::Neutral
    } else {
        Tone::Warning
    }
}

pub fn rating_tone(rating: f64) -> Tone {
    if rating >= 7.5 {
        Tone::Good
    } else if rating >= 6.5 {
        Tone::Neutral
    } else if rating >= 6.0 {
        Tone::Warning
    } else {
        Tone::Critical
    }
}

pub fn availability_tone(percentage: f64) -> Tone {
    if percentage >= 90.0 {
        Tone::Good
    } else if percentage >= 70.0 {
        Tone::Warning
    } else {
        Tone::Critical
    }
}

fn signed(value: i32) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

fn overview(data: &OverviewStats, default_title: &str) -> WidgetView {
    let s = &data.stats;
    let mut lines = vec![
        format!("Played {}  W{} D{} L{}", s.matches_played, s.wins, s.draws, s.losses),
        format!("Win rate {:.1}%  Points {}", s.win_rate, s.points),
        format!(
            "Goals {}-{} ({})  {:.2} per match",
            s.goals_scored,
            s.goals_conceded,
            signed(s.goal_difference),
            s.goals_per_match
        ),
        format!("Clean sheets {}", s.clean_sheets),
    ];
    if !data.trends.form_last_5.is_empty() {
        lines.push(format!("Form {}", data.trends.form_last_5));
    }

    WidgetView::Content {
        title: title_or(&data.title, default_title),
        tone: win_rate_tone(s.win_rate),
        lines,
    }
}

fn live_status(status: &LiveMatchStatus, default_title: &str) -> WidgetView {
    match status {
        LiveMatchStatus::NoMatch { message } => WidgetView::empty(
            default_title,
            message.clone().unwrap_or_else(|| "No upcoming matches scheduled".to_string()),
        ),
        LiveMatchStatus::Upcoming { fixture } => {
            let mut lines = vec![format!(
                "{} {}",
                if fixture.is_home { "vs" } else { "at" },
                fixture.opponent
            )];
            if let Some(kickoff) = fixture.datetime {
                lines.push(format!("Kick-off {}", kickoff.format("%d/%m/%Y %H:%M")));
            }
            if let Some(hours) = fixture.hours_until_kickoff {
                lines.push(format!("In {:.1} hours", hours));
            }
            WidgetView::Content {
                title: "Next Match".to_string(),
                tone: Tone::Neutral,
                lines,
            }
        }
        LiveMatchStatus::Live { details } => {
            let mut lines = vec![details.banner_text()];
            if let Some(formation) = &details.formation {
                lines.push(format!("Formation {}", formation));
            }
            for event in details.recent_events.iter().take(3) {
                lines.push(format!(
                    "{}' {} {}",
                    event.minute,
                    event.event_type,
                    event.player_name.as_deref().unwrap_or("")
                ));
            }
            WidgetView::Content {
                title: "Live Match".to_string(),
                tone: Tone::Critical,
                lines,
            }
        }
    }
}

fn recent_matches(data: &RecentMatches, default_title: &str) -> WidgetView {
    if data.matches.is_empty() {
        return WidgetView::empty(title_or(&data.title, default_title), "No completed matches");
    }

    let lines = data
        .matches
        .iter()
        .take(MAX_LIST_ROWS)
        .map(|m| {
            let result = m.result.chars().next().unwrap_or('?');
            format!(
                "{} {} {} {} [{}]",
                m.date,
                if m.is_home { "vs" } else { "at" },
                m.opponent,
                m.score,
                result
            )
        })
        .collect();

    let losses = data.matches.iter().filter(|m| m.result == "LOSS").count();
    WidgetView::Content {
        title: title_or(&data.title, default_title),
        tone: if losses * 2 > data.matches.len() {
            Tone::Warning
        } else {
            Tone::Neutral
        },
        lines,
    }
}

fn top_performers(data: &TopPerformers, default_title: &str) -> WidgetView {
    if data.performers.is_empty() {
        return WidgetView::empty(title_or(&data.title, default_title), NO_DATA);
    }

    let lines = data
        .performers
        .iter()
        .take(MAX_LIST_ROWS)
        .map(|p| {
            format!(
                "{} ({}) {:.2}  {}G {}A in {}",
                p.name, p.position, p.average_rating, p.goals, p.assists, p.matches_played
            )
        })
        .collect();

    let best = data
        .performers
        .iter()
        .map(|p| p.average_rating)
        .fold(f64::MIN, f64::max);

    WidgetView::Content {
        title: title_or(&data.title, default_title),
        tone: rating_tone(best),
        lines,
    }
}

fn formations(data: &FormationSummary, default_title: &str) -> WidgetView {
    let summary = &data.summary;
    if summary.total_formations_used == 0 && data.formations.is_empty() {
        return WidgetView::empty(title_or(&data.title, default_title), "No formations used yet");
    }

    let mut lines = vec![
        format!(
            "Most used {} ({} matches)",
            summary.most_used_formation, summary.most_used_count
        ),
        format!(
            "Most effective {} ({:.1}% wins)",
            summary.most_effective_formation, summary.most_effective_win_rate
        ),
    ];
    for (name, record) in &data.formations {
        lines.push(format!(
            "{}: {} used, W{} D{} L{}",
            name, record.usage_count, record.wins, record.draws, record.losses
        ));
    }

    WidgetView::Content {
        title: title_or(&data.title, default_title),
        tone: win_rate_tone(summary.most_effective_win_rate),
        lines,
    }
}

fn fitness(data: &FitnessOverview, default_title: &str) -> WidgetView {
    let summary = &data.summary;
    let dist = &data.fitness_distribution;
    let mut lines = vec![
        format!(
            "{}/{} available ({:.1}%)",
            summary.available_players, summary.total_players, summary.availability_percentage
        ),
        format!(
            "Excellent {}  Good {}  Average {}  Poor {}  Critical {}",
            dist.excellent, dist.good, dist.average, dist.poor, dist.critical
        ),
    ];
    for player in &data.alerts.injured_players {
        lines.push(format!("Injured: {}", player.name));
    }
    for player in data.alerts.low_fitness_players.iter().take(MAX_LIST_ROWS) {
        match player.fitness_level {
            Some(level) => lines.push(format!("Low fitness: {} ({:.0}%)", player.name, level)),
            None => lines.push(format!("Low fitness: {}", player.name)),
        }
    }

    WidgetView::Content {
        title: title_or(&data.title, default_title),
        tone: availability_tone(summary.availability_percentage),
        lines,
    }
}

fn fixtures(data: &UpcomingFixtures, default_title: &str) -> WidgetView {
    if data.fixtures.is_empty() {
        return WidgetView::empty(title_or(&data.title, default_title), "No fixtures scheduled");
    }

    let lines = data
        .fixtures
        .iter()
        .take(MAX_LIST_ROWS)
        .map(|f| {
            let when = match (&f.time, f.days_until) {
                (Some(time), Some(days)) => format!("{} {} (in {}d)", f.date, time, days),
                (Some(time), None) => format!("{} {}", f.date, time),
                _ => f.date.clone(),
            };
            format!("{} {} {}", when, if f.is_home { "vs" } else { "at" }, f.opponent)
        })
        .collect();

    WidgetView::Content {
        title: title_or(&data.title, default_title),
        tone: Tone::Neutral,
        lines,
    }
}

fn alerts(data: &PerformanceAlerts, default_title: &str) -> WidgetView {
    if data.alerts.is_empty() {
        return WidgetView::empty(title_or(&data.title, default_title), "No active alerts");
    }

    let tone = if data.alerts.iter().any(|a| a.priority == "high") {
        Tone::Critical
    } else {
        Tone::Warning
    };
    let mut lines: Vec<String> = data
        .alerts
        .iter()
        .map(|a| format!("[{}] {}", a.priority, a.message))
        .collect();
    let total = data.total_alerts as usize;
    if total > data.alerts.len() {
        lines.push(format!("+{} more", total - data.alerts.len()));
    }

    WidgetView::Content {
        title: title_or(&data.title, default_title),
        tone,
        lines,
    }
}

fn insights(data: &TacticalInsights, default_title: &str) -> WidgetView {
    if data.insights.is_empty() {
        return WidgetView::empty(title_or(&data.title, default_title), "No insights yet");
    }

    let tone = if data.insights.iter().any(|i| i.kind == "performance_concern") {
        Tone::Warning
    } else {
        Tone::Neutral
    };

    WidgetView::Content {
        title: title_or(&data.title, default_title),
        tone,
        lines: data
            .insights
            .iter()
            .map(|i| format!("{}: {}", i.category, i.insight))
            .collect(),
    }
}

fn availability(data: &SquadAvailability, default_title: &str) -> WidgetView {
    let mut lines = vec![format!("Overall {:.1}%", data.overall_availability)];
    lines.extend(
        data.concerns
            .iter()
            .map(|c| format!("{} ({}): {}", c.position, c.concern_level, c.message)),
    );

    WidgetView::Content {
        title: title_or(&data.title, default_title),
        tone: availability_tone(data.overall_availability),
        lines,
    }
}
