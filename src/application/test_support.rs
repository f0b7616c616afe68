// In-memory API and view doubles for coordinator tests
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::oneshot;

use crate::application::dashboard_api::DashboardApi;
use crate::application::dashboard_view::{ChartHandle, DashboardView, Notice, WidgetView};
use crate::application::refresh_coordinator::TaskClass;
use crate::domain::chart::ChartSet;
use crate::domain::error::{DashboardError, Result};
use crate::domain::snapshot::WidgetKind;

/// Let every runnable task make progress
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Move the paused clock forward and let timers fire
pub async fn step(duration: Duration) {
    tokio::time::advance(duration).await;
    settle().await;
}

pub fn snapshot_payload(wins: u32) -> Value {
    json!({
        "widgets": {
            "overview_stats": { "stats": { "wins": wins, "matches_played": 10 } },
            "formation_summary": { "summary": { "total_formations_used": 1, "most_used_formation": "4-3-3" } }
        },
        "cache_status": "live"
    })
}

pub fn live_payload(opponent: &str, minute: u32) -> Value {
    json!({
        "matches": [{
            "match_id": "m-1",
            "opponent": opponent,
            "status": "LIVE",
            "score": { "team": 1, "opponent": 0 },
            "match_time": minute,
            "recent_events": []
        }],
        "total_live_matches": 1
    })
}

struct Step {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<Value>,
}

struct Script {
    queue: VecDeque<Step>,
    fallback: Result<Value>,
}

#[derive(Default)]
struct Counters {
    calls: usize,
    in_flight: usize,
    max_in_flight: usize,
}

pub struct ScriptedApi {
    scripts: Mutex<BTreeMap<&'static str, Script>>,
    counters: Mutex<BTreeMap<&'static str, Counters>>,
    periods: Mutex<Vec<u32>>,
}

/// Decrements the in-flight count even when the fetch future is dropped
struct InFlight<'a> {
    api: &'a ScriptedApi,
    class: TaskClass,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut counters = self.api.counters.lock().unwrap();
        counters.entry(self.class.name()).or_default().in_flight -= 1;
    }
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        let mut scripts = BTreeMap::new();
        scripts.insert(
            TaskClass::Widgets.name(),
            Script {
                queue: VecDeque::new(),
                fallback: Ok(snapshot_payload(1)),
            },
        );
        scripts.insert(
            TaskClass::Charts.name(),
            Script {
                queue: VecDeque::new(),
                fallback: Ok(json!({ "charts": {} })),
            },
        );
        scripts.insert(
            TaskClass::LiveMatch.name(),
            Script {
                queue: VecDeque::new(),
                fallback: Ok(json!({ "matches": [] })),
            },
        );
        Arc::new(Self {
            scripts: Mutex::new(scripts),
            counters: Mutex::new(BTreeMap::new()),
            periods: Mutex::new(Vec::new()),
        })
    }

    pub fn set_fallback(&self, class: TaskClass, result: Result<Value>) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts.get_mut(class.name()).unwrap().fallback = result;
    }

    pub fn push(&self, class: TaskClass, result: Result<Value>) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .get_mut(class.name())
            .unwrap()
            .queue
            .push_back(Step { gate: None, result });
    }

    /// Queue a response that is held back until the returned sender fires
    pub fn push_gated(&self, class: TaskClass, result: Result<Value>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        let mut scripts = self.scripts.lock().unwrap();
        scripts.get_mut(class.name()).unwrap().queue.push_back(Step {
            gate: Some(rx),
            result,
        });
        tx
    }

    pub fn calls(&self, class: TaskClass) -> usize {
        let counters = self.counters.lock().unwrap();
        counters.get(class.name()).map(|c| c.calls).unwrap_or(0)
    }

    pub fn max_in_flight(&self, class: TaskClass) -> usize {
        let counters = self.counters.lock().unwrap();
        counters.get(class.name()).map(|c| c.max_in_flight).unwrap_or(0)
    }

    pub fn periods(&self) -> Vec<u32> {
        self.periods.lock().unwrap().clone()
    }

    async fn serve(&self, class: TaskClass) -> Result<Value> {
        let step = {
            let mut scripts = self.scripts.lock().unwrap();
            let script = scripts.get_mut(class.name()).unwrap();
            script.queue.pop_front().unwrap_or_else(|| Step {
                gate: None,
                result: script.fallback.clone(),
            })
        };
        {
            let mut counters = self.counters.lock().unwrap();
            let counter = counters.entry(class.name()).or_default();
            counter.calls += 1;
            counter.in_flight += 1;
            counter.max_in_flight = counter.max_in_flight.max(counter.in_flight);
        }
        let _guard = InFlight { api: self, class };

        if let Some(gate) = step.gate {
            let _ = gate.await;
        }
        step.result
    }
}

#[async_trait]
impl DashboardApi for ScriptedApi {
    async fn fetch_widgets(&self) -> Result<Value> {
        self.serve(TaskClass::Widgets).await
    }

    async fn fetch_charts(&self, period_days: u32) -> Result<Value> {
        self.periods.lock().unwrap().push(period_days);
        self.serve(TaskClass::Charts).await
    }

    async fn fetch_live_tracking(&self) -> Result<Value> {
        self.serve(TaskClass::LiveMatch).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Render(WidgetKind),
    Notice(String),
    Banner(String),
    BannerHidden,
    Draw(u64),
    Release(u64),
}

#[derive(Default)]
struct Recorded {
    events: Vec<ViewEvent>,
    widgets: BTreeMap<WidgetKind, WidgetView>,
    notices: Vec<Notice>,
    banner: Option<String>,
    next_chart: u64,
}

#[derive(Default)]
pub struct RecordingView {
    fail_on: Option<WidgetKind>,
    recorded: Mutex<Recorded>,
}

impl RecordingView {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_on(kind: WidgetKind) -> Arc<Self> {
        Arc::new(Self {
            fail_on: Some(kind),
            recorded: Mutex::default(),
        })
    }

    pub fn latest(&self, kind: WidgetKind) -> Option<WidgetView> {
        self.recorded.lock().unwrap().widgets.get(&kind).cloned()
    }

    pub fn render_count(&self) -> usize {
        self.recorded
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| matches!(e, ViewEvent::Render(_)))
            .count()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.recorded.lock().unwrap().notices.clone()
    }

    pub fn banner(&self) -> Option<String> {
        self.recorded.lock().unwrap().banner.clone()
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.recorded.lock().unwrap().events.clone()
    }
}

impl DashboardView for RecordingView {
    fn render_widget(&self, kind: WidgetKind, widget: &WidgetView) -> Result<()> {
        if self.fail_on == Some(kind) {
            return Err(DashboardError::Render {
                target: kind.to_string(),
                message: "template missing".to_string(),
            });
        }
        let mut recorded = self.recorded.lock().unwrap();
        recorded.events.push(ViewEvent::Render(kind));
        recorded.widgets.insert(kind, widget.clone());
        Ok(())
    }

    fn notify(&self, notice: &Notice) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.events.push(ViewEvent::Notice(notice.message.clone()));
        recorded.notices.push(notice.clone());
    }

    fn show_live_banner(&self, text: &str) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.events.push(ViewEvent::Banner(text.to_string()));
        recorded.banner = Some(text.to_string());
    }

    fn hide_live_banner(&self) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.events.push(ViewEvent::BannerHidden);
        recorded.banner = None;
    }

    fn draw_charts(&self, _charts: &ChartSet) -> Result<ChartHandle> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.next_chart += 1;
        let id = recorded.next_chart;
        recorded.events.push(ViewEvent::Draw(id));
        Ok(ChartHandle(id))
    }

    fn release_charts(&self, handle: ChartHandle) {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.events.push(ViewEvent::Release(handle.0));
    }
}
