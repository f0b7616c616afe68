// Refresh coordinator - schedules widget, chart and live-match refresh tasks
//
// Each task class runs as its own timer loop. A fetch is tagged with the
// class's next sequence number and the coordinator generation; its result is
// applied only if both are still current when it completes. The current
// check and the render it guards run under the same lock, so a pause can
// never slip in between them.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::application::dashboard_api::DashboardApi;
use crate::application::dashboard_view::{ChartHandle, DashboardView, Notice};
use crate::application::widgets::build_widget;
use crate::domain::chart::ChartSet;
use crate::domain::error::DashboardError;
use crate::domain::live_match::{parse_live_tracking, LiveMatchStatus};
use crate::domain::snapshot::{DashboardSnapshot, WidgetKind};

pub const DEFAULT_WIDGETS_INTERVAL: Duration = Duration::from_secs(300);
pub const DEFAULT_CHARTS_INTERVAL: Duration = Duration::from_secs(600);
pub const DEFAULT_LIVE_MATCH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_CHART_PERIOD_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskClass {
    Widgets,
    Charts,
    LiveMatch,
}

impl TaskClass {
    pub const ALL: [TaskClass; 3] = [TaskClass::Widgets, TaskClass::Charts, TaskClass::LiveMatch];

    fn index(self) -> usize {
        match self {
            TaskClass::Widgets => 0,
            TaskClass::Charts => 1,
            TaskClass::LiveMatch => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TaskClass::Widgets => "widgets",
            TaskClass::Charts => "charts",
            TaskClass::LiveMatch => "live-match",
        }
    }
}

impl std::fmt::Display for TaskClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Stopped,
    Scheduled,
    Running,
}

/// What happened to a single refresh attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Fetched and rendered
    Applied,
    /// Fetch failed; the user was notified
    Failed,
    /// Another fetch of the same class was in flight, or the coordinator is stopped
    Skipped,
    /// Completed after a pause or after a newer fetch; nothing was touched
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshIntervals {
    pub widgets: Duration,
    pub charts: Duration,
    pub live_match: Duration,
    pub chart_period_days: u32,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            widgets: DEFAULT_WIDGETS_INTERVAL,
            charts: DEFAULT_CHARTS_INTERVAL,
            live_match: DEFAULT_LIVE_MATCH_INTERVAL,
            chart_period_days: DEFAULT_CHART_PERIOD_DAYS,
        }
    }
}

struct RefreshTask {
    interval: Duration,
    state: TaskState,
    last_run: Option<Instant>,
    latest_seq: u64,
    in_flight: Option<u64>,
    consecutive_failures: u32,
    timer: Option<JoinHandle<()>>,
}

impl RefreshTask {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: TaskState::Stopped,
            last_run: None,
            latest_seq: 0,
            in_flight: None,
            consecutive_failures: 0,
            timer: None,
        }
    }

    fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Abort the timer and abandon any outstanding fetch
    fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.in_flight = None;
        self.state = TaskState::Stopped;
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStatus {
    pub class: TaskClass,
    pub state: TaskState,
    pub active: bool,
    pub interval_secs: u64,
    pub latest_seq: u64,
    pub in_flight: bool,
    pub consecutive_failures: u32,
    pub last_run_secs_ago: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Idle,
    Active,
    Paused,
    Destroyed,
}

impl Lifecycle {
    fn accepts_results(self) -> bool {
        matches!(self, Lifecycle::Idle | Lifecycle::Active)
    }
}

struct CoordinatorState {
    lifecycle: Lifecycle,
    generation: u64,
    tasks: [RefreshTask; 3],
    chart_period_days: u32,
    chart: Option<ChartHandle>,
    page_visible: bool,
    window_focused: bool,
}

impl CoordinatorState {
    fn task(&self, class: TaskClass) -> &RefreshTask {
        &self.tasks[class.index()]
    }

    fn task_mut(&mut self, class: TaskClass) -> &mut RefreshTask {
        &mut self.tasks[class.index()]
    }
}

#[derive(Debug, Clone, Copy)]
struct FetchTicket {
    class: TaskClass,
    seq: u64,
    generation: u64,
}

struct Shared {
    api: Arc<dyn DashboardApi>,
    view: Arc<dyn DashboardView>,
    state: Mutex<CoordinatorState>,
}

#[derive(Clone)]
pub struct RefreshCoordinator {
    shared: Arc<Shared>,
}

impl RefreshCoordinator {
    pub fn new(
        api: Arc<dyn DashboardApi>,
        view: Arc<dyn DashboardView>,
        intervals: RefreshIntervals,
    ) -> Self {
        let tasks = [
            RefreshTask::new(intervals.widgets),
            RefreshTask::new(intervals.charts),
            RefreshTask::new(intervals.live_match),
        ];

        let state = CoordinatorState {
            lifecycle: Lifecycle::Idle,
            generation: 0,
            tasks,
            chart_period_days: intervals.chart_period_days.max(1),
            chart: None,
            page_visible: true,
            window_focused: true,
        };

        Self {
            shared: Arc::new(Shared {
                api,
                view,
                state: Mutex::new(state),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CoordinatorState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin the widgets, charts and live-match cycles, each with an
    /// immediate first run.
    pub fn start(&self) {
        let mut state = self.lock();
        if state.lifecycle != Lifecycle::Idle {
            tracing::debug!("Coordinator already started");
            return;
        }
        if !(state.page_visible && state.window_focused) {
            // Resumed by sync_activity once the page is visible and focused
            state.lifecycle = Lifecycle::Paused;
            tracing::info!("Dashboard refresh started paused, page not active");
            return;
        }
        state.lifecycle = Lifecycle::Active;
        self.schedule(&mut state, TaskClass::Widgets, true);
        self.schedule(&mut state, TaskClass::Charts, true);
        self.schedule(&mut state, TaskClass::LiveMatch, true);
        tracing::info!("Dashboard refresh started");
    }

    pub fn pause(&self) {
        let mut state = self.lock();
        self.pause_locked(&mut state);
    }

    pub fn resume(&self) {
        let mut state = self.lock();
        self.resume_locked(&mut state);
    }

    /// Pause and release every chart. Safe to call more than once.
    pub fn destroy(&self) {
        let mut state = self.lock();
        if state.lifecycle == Lifecycle::Destroyed {
            return;
        }
        self.pause_locked(&mut state);
        for task in state.tasks.iter_mut() {
            task.cancel();
        }
        state.generation += 1;
        state.lifecycle = Lifecycle::Destroyed;
        if let Some(handle) = state.chart.take() {
            self.shared.view.release_charts(handle);
        }
        tracing::info!("Dashboard refresh destroyed");
    }

    /// Page visibility changed. Refreshing runs only while the page is
    /// visible and the window focused.
    pub fn set_visibility(&self, visible: bool) {
        let mut state = self.lock();
        state.page_visible = visible;
        self.sync_activity(&mut state);
    }

    pub fn set_focus(&self, focused: bool) {
        let mut state = self.lock();
        state.window_focused = focused;
        self.sync_activity(&mut state);
    }

    fn sync_activity(&self, state: &mut CoordinatorState) {
        if state.page_visible && state.window_focused {
            self.resume_locked(state);
        } else {
            self.pause_locked(state);
        }
    }

    fn pause_locked(&self, state: &mut CoordinatorState) {
        if state.lifecycle != Lifecycle::Active {
            return;
        }
        state.lifecycle = Lifecycle::Paused;
        state.generation += 1;
        for task in state.tasks.iter_mut() {
            task.cancel();
        }
        tracing::info!(generation = state.generation, "Dashboard refresh paused");
    }

    /// Rebuild every timer; catch up with one widgets fetch and one live check.
    fn resume_locked(&self, state: &mut CoordinatorState) {
        if state.lifecycle != Lifecycle::Paused {
            return;
        }
        if !(state.page_visible && state.window_focused) {
            tracing::debug!("Page hidden or unfocused, staying paused");
            return;
        }
        state.lifecycle = Lifecycle::Active;
        self.schedule(state, TaskClass::Widgets, true);
        self.schedule(state, TaskClass::Charts, false);
        self.schedule(state, TaskClass::LiveMatch, true);
        tracing::info!(generation = state.generation, "Dashboard refresh resumed");
    }

    fn schedule(&self, state: &mut CoordinatorState, class: TaskClass, immediate: bool) {
        let task = state.task_mut(class);
        if let Some(previous) = task.timer.take() {
            previous.abort();
        }
        let interval = task.interval;
        let coordinator = self.clone();
        task.timer = Some(tokio::spawn(async move {
            coordinator.run_cycle(class, interval, immediate).await;
        }));
        if task.in_flight.is_none() {
            task.state = TaskState::Scheduled;
        }
        tracing::debug!(
            task = %class,
            interval_secs = interval.as_secs(),
            immediate,
            "Task scheduled"
        );
    }

    async fn run_cycle(self, class: TaskClass, interval: Duration, immediate: bool) {
        if !immediate {
            tokio::time::sleep(interval).await;
        }
        loop {
            self.run_task(class).await;
            tokio::time::sleep(interval).await;
        }
    }

    async fn run_task(&self, class: TaskClass) -> RefreshOutcome {
        match class {
            TaskClass::Widgets => self.refresh_widgets().await,
            TaskClass::Charts => {
                let period = self.lock().chart_period_days;
                self.refresh_charts(period).await
            }
            TaskClass::LiveMatch => self.check_live_match().await,
        }
    }

    fn begin(&self, class: TaskClass) -> Option<FetchTicket> {
        let mut state = self.lock();
        if !state.lifecycle.accepts_results() {
            tracing::debug!(task = %class, "Coordinator stopped, not fetching");
            return None;
        }
        let generation = state.generation;
        let task = state.task_mut(class);
        if let Some(seq) = task.in_flight {
            tracing::debug!(task = %class, seq, "Fetch still in flight, skipping tick");
            return None;
        }
        task.latest_seq += 1;
        task.in_flight = Some(task.latest_seq);
        task.state = TaskState::Running;
        task.last_run = Some(Instant::now());
        Some(FetchTicket {
            class,
            seq: task.latest_seq,
            generation,
        })
    }

    /// Settle a fetch and, if it is still current, apply it under the lock.
    /// Returns false when the result was discarded.
    fn finish(&self, ticket: FetchTicket, apply: impl FnOnce(&mut CoordinatorState)) -> bool {
        let mut state = self.lock();
        let generation = state.generation;
        let accepts = state.lifecycle.accepts_results();
        let task = state.task_mut(ticket.class);
        if task.in_flight == Some(ticket.seq) {
            task.in_flight = None;
            task.state = if task.is_active() {
                TaskState::Scheduled
            } else {
                TaskState::Stopped
            };
        }

        if !accepts || ticket.generation != generation || ticket.seq != task.latest_seq {
            tracing::debug!(
                task = %ticket.class,
                seq = ticket.seq,
                latest = task.latest_seq,
                "Discarding stale response"
            );
            return false;
        }

        apply(&mut *state);
        true
    }

    fn fail(&self, ticket: FetchTicket, err: DashboardError) -> RefreshOutcome {
        let applied = self.finish(ticket, |state| {
            let task = state.task_mut(ticket.class);
            task.consecutive_failures += 1;
            tracing::warn!(
                task = %ticket.class,
                failures = task.consecutive_failures,
                error = %err,
                "Refresh failed"
            );
            self.shared.view.notify(&Notice {
                task: ticket.class.name().to_string(),
                message: err.user_message().to_string(),
                detail: err.to_string(),
            });
        });
        if applied {
            RefreshOutcome::Failed
        } else {
            RefreshOutcome::Discarded
        }
    }

    /// Fetch a snapshot and hand every section to its renderer.
    pub async fn refresh_widgets(&self) -> RefreshOutcome {
        let Some(ticket) = self.begin(TaskClass::Widgets) else {
            return RefreshOutcome::Skipped;
        };

        let result = self
            .shared
            .api
            .fetch_widgets()
            .await
            .and_then(DashboardSnapshot::from_json);

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => return self.fail(ticket, err),
        };

        let applied = self.finish(ticket, |state| {
            state.task_mut(TaskClass::Widgets).consecutive_failures = 0;
            self.render_snapshot(&snapshot);

            let live_reported = snapshot
                .live_match_status
                .present()
                .is_some_and(LiveMatchStatus::is_live);
            if live_reported && !state.task(TaskClass::LiveMatch).is_active() {
                tracing::info!("Snapshot reports a live match, starting live polling");
                self.schedule(state, TaskClass::LiveMatch, true);
            }
        });

        if applied {
            RefreshOutcome::Applied
        } else {
            RefreshOutcome::Discarded
        }
    }

    fn render_snapshot(&self, snapshot: &DashboardSnapshot) {
        let mut rendered = 0;
        let mut empty = 0;
        for kind in WidgetKind::ALL {
            let widget = build_widget(kind, snapshot);
            if widget.is_empty() {
                empty += 1;
            }
            match self.shared.view.render_widget(kind, &widget) {
                Ok(()) => rendered += 1,
                Err(e) => tracing::warn!(widget = %kind, error = %e, "Widget render failed"),
            }
        }
        tracing::debug!(
            rendered,
            empty,
            last_updated = ?snapshot.last_updated,
            "Snapshot rendered"
        );
    }

    /// Fetch chart series for the last `period_days` days and replace the
    /// current chart instance. The period is kept for later chart ticks.
    pub async fn refresh_charts(&self, period_days: u32) -> RefreshOutcome {
        let period_days = period_days.max(1);
        let Some(ticket) = self.begin(TaskClass::Charts) else {
            return RefreshOutcome::Skipped;
        };
        self.lock().chart_period_days = period_days;

        let result = self
            .shared
            .api
            .fetch_charts(period_days)
            .await
            .and_then(|payload| ChartSet::from_json(payload, period_days));

        let charts = match result {
            Ok(charts) => charts,
            Err(err) => return self.fail(ticket, err),
        };

        let applied = self.finish(ticket, |state| {
            state.task_mut(TaskClass::Charts).consecutive_failures = 0;
            if let Some(previous) = state.chart.take() {
                self.shared.view.release_charts(previous);
            }
            match self.shared.view.draw_charts(&charts) {
                Ok(handle) => state.chart = Some(handle),
                Err(err) => {
                    tracing::warn!(error = %err, "Chart draw failed");
                    self.shared.view.notify(&Notice {
                        task: TaskClass::Charts.name().to_string(),
                        message: err.user_message().to_string(),
                        detail: err.to_string(),
                    });
                }
            }
        });

        if applied {
            RefreshOutcome::Applied
        } else {
            RefreshOutcome::Discarded
        }
    }

    /// Poll live-match status; start or stop the live cycle to match.
    pub async fn check_live_match(&self) -> RefreshOutcome {
        let Some(ticket) = self.begin(TaskClass::LiveMatch) else {
            return RefreshOutcome::Skipped;
        };

        let result = self
            .shared
            .api
            .fetch_live_tracking()
            .await
            .and_then(parse_live_tracking);

        let status = match result {
            Ok(status) => status,
            Err(err) => return self.fail(ticket, err),
        };

        let applied = self.finish(ticket, |state| self.apply_live_status(state, &status));

        if applied {
            RefreshOutcome::Applied
        } else {
            RefreshOutcome::Discarded
        }
    }

    fn apply_live_status(&self, state: &mut CoordinatorState, status: &LiveMatchStatus) {
        state.task_mut(TaskClass::LiveMatch).consecutive_failures = 0;
        match status.live() {
            Some(details) => {
                self.shared.view.show_live_banner(&details.banner_text());
                if !state.task(TaskClass::LiveMatch).is_active() {
                    tracing::info!(opponent = %details.opponent, "Match is live, polling");
                    self.schedule(state, TaskClass::LiveMatch, false);
                }
            }
            None => {
                self.shared.view.hide_live_banner();
                let task = state.task_mut(TaskClass::LiveMatch);
                if task.is_active() {
                    tracing::info!("No live match, live polling stopped");
                    // May abort the cycle we are running on; it stops at its next await
                    task.cancel();
                }
            }
        }
    }

    pub fn status(&self) -> Vec<TaskStatus> {
        let state = self.lock();
        TaskClass::ALL
            .iter()
            .map(|&class| {
                let task = state.task(class);
                TaskStatus {
                    class,
                    state: task.state,
                    active: task.is_active(),
                    interval_secs: task.interval.as_secs(),
                    latest_seq: task.latest_seq,
                    in_flight: task.in_flight.is_some(),
                    consecutive_failures: task.consecutive_failures,
                    last_run_secs_ago: task.last_run.map(|t| t.elapsed().as_secs()),
                }
            })
            .collect()
    }

    /// Period (days) used by chart ticks and period-less chart requests
    pub fn chart_period_days(&self) -> u32 {
        self.lock().chart_period_days
    }

    pub fn is_running(&self) -> bool {
        self.lock().lifecycle == Lifecycle::Active
    }
}
