// Dashboard API trait for the analytics backend
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::Result;

/// The three HTTP contracts the coordinator consumes.
///
/// Payloads are returned undecoded; parsing into sections happens in the
/// coordinator so a malformed section only affects its own widget.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// GET /dashboard/widgets
    async fn fetch_widgets(&self) -> Result<Value>;

    /// GET /dashboard/charts?period=<days>
    async fn fetch_charts(&self, period_days: u32) -> Result<Value>;

    /// GET /live-tracking
    async fn fetch_live_tracking(&self) -> Result<Value>;
}
