// View trait - the render sink the coordinator writes into
use serde::Serialize;

use crate::domain::chart::ChartSet;
use crate::domain::error::Result;
use crate::domain::snapshot::WidgetKind;

/// Colour band a widget or line is drawn in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Good,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WidgetView {
    Content {
        title: String,
        tone: Tone,
        lines: Vec<String>,
    },
    Empty {
        title: String,
        message: String,
    },
}

impl WidgetView {
    pub fn empty(title: impl Into<String>, message: impl Into<String>) -> Self {
        WidgetView::Empty {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, WidgetView::Empty { .. })
    }
}

/// A transient, user-visible notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub task: String,
    pub message: String,
    pub detail: String,
}

/// Opaque handle to a drawn chart instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChartHandle(pub u64);

/// Everything the coordinator may touch on the page.
///
/// Calls are made while the coordinator holds its state lock, so
/// implementations must not call back into the coordinator.
pub trait DashboardView: Send + Sync {
    fn render_widget(&self, kind: WidgetKind, widget: &WidgetView) -> Result<()>;

    fn notify(&self, notice: &Notice);

    fn show_live_banner(&self, text: &str);

    fn hide_live_banner(&self);

    fn draw_charts(&self, charts: &ChartSet) -> Result<ChartHandle>;

    fn release_charts(&self, handle: ChartHandle);
}
