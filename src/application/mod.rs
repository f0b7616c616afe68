// Application layer - Refresh coordination and widget rendering
pub mod dashboard_api;
pub mod dashboard_view;
pub mod refresh_coordinator;
pub mod widgets;

#[cfg(test)]
pub mod test_support;
