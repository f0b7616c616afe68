// Application state for HTTP handlers
use std::sync::Arc;

use crate::application::refresh_coordinator::RefreshCoordinator;
use crate::presentation::page_view::PageView;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: RefreshCoordinator,
    pub page: Arc<PageView>,
}
