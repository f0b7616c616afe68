// In-memory rendered page - the view the coordinator draws into
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::application::dashboard_view::{ChartHandle, DashboardView, Notice, WidgetView};
use crate::domain::chart::ChartSet;
use crate::domain::error::Result;
use crate::domain::snapshot::WidgetKind;

const MAX_NOTIFICATIONS: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct RenderedWidget {
    #[serde(flatten)]
    pub view: WidgetView,
    pub rendered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedCharts {
    pub handle: ChartHandle,
    #[serde(flatten)]
    pub charts: ChartSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimedNotice {
    #[serde(flatten)]
    pub notice: Notice,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PageState {
    pub widgets: BTreeMap<WidgetKind, RenderedWidget>,
    pub live_banner: Option<String>,
    pub charts: Option<RenderedCharts>,
    pub notifications: VecDeque<TimedNotice>,
    #[serde(skip)]
    next_chart: u64,
}

#[derive(Debug, Default)]
pub struct PageView {
    state: Mutex<PageState>,
}

impl PageView {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> PageState {
        self.lock().clone()
    }
}

impl DashboardView for PageView {
    fn render_widget(&self, kind: WidgetKind, widget: &WidgetView) -> Result<()> {
        self.lock().widgets.insert(
            kind,
            RenderedWidget {
                view: widget.clone(),
                rendered_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn notify(&self, notice: &Notice) {
        tracing::info!(task = %notice.task, "{}", notice.message);
        let mut state = self.lock();
        if state.notifications.len() == MAX_NOTIFICATIONS {
            state.notifications.pop_front();
        }
        state.notifications.push_back(TimedNotice {
            notice: notice.clone(),
            at: Utc::now(),
        });
    }

    fn show_live_banner(&self, text: &str) {
        self.lock().live_banner = Some(text.to_string());
    }

    fn hide_live_banner(&self) {
        self.lock().live_banner = None;
    }

    fn draw_charts(&self, charts: &ChartSet) -> Result<ChartHandle> {
        let mut state = self.lock();
        state.next_chart += 1;
        let handle = ChartHandle(state.next_chart);
        state.charts = Some(RenderedCharts {
            handle,
            charts: charts.clone(),
        });
        Ok(handle)
    }

    fn release_charts(&self, handle: ChartHandle) {
        let mut state = self.lock();
        if state.charts.as_ref().map(|c| c.handle) == Some(handle) {
            state.charts = None;
        } else {
            tracing::debug!(handle = handle.0, "Release of unknown chart handle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_view::Tone;
    use std::collections::BTreeMap;

    #[test]
    fn test_notifications_are_bounded() {
        let page = PageView::new();
        for i in 0..25 {
            page.notify(&Notice {
                task: "widgets".to_string(),
                message: format!("failure {}", i),
                detail: String::new(),
            });
        }
        let state = page.snapshot();
        assert_eq!(state.notifications.len(), MAX_NOTIFICATIONS);
        assert_eq!(state.notifications[0].notice.message, "failure 5");
    }

    #[test]
    fn test_chart_release_clears_only_matching_handle() {
        let page = PageView::new();
        let charts = ChartSet {
            period_days: 30,
            charts: BTreeMap::new(),
        };
        let first = page.draw_charts(&charts).unwrap();
        page.release_charts(first);
        let second = page.draw_charts(&charts).unwrap();
        page.release_charts(first);

        assert_ne!(first, second);
        assert_eq!(page.snapshot().charts.unwrap().handle, second);
    }

    #[test]
    fn test_view_serializes_widget_state() {
        let page = PageView::new();
        page.render_widget(
            WidgetKind::FormationSummary,
            &WidgetView::empty("Formation Analysis", "No data available"),
        )
        .unwrap();
        page.render_widget(
            WidgetKind::OverviewStats,
            &WidgetView::Content {
                title: "Season Overview".to_string(),
                tone: Tone::Good,
                lines: vec!["Played 3".to_string()],
            },
        )
        .unwrap();
        page.show_live_banner("LIVE 10' vs Arsenal");

        let json = serde_json::to_value(page.snapshot()).unwrap();
        assert_eq!(json["widgets"]["formation_summary"]["state"], "empty");
        assert_eq!(json["widgets"]["overview_stats"]["tone"], "good");
        assert_eq!(json["live_banner"], "LIVE 10' vs Arsenal");
    }
}
