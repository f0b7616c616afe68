// Presentation layer - Rendered page and the HTTP surface of the host
pub mod app_state;
pub mod handlers;
pub mod page_view;
