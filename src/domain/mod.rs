// Domain layer - Payload models and error taxonomy
pub mod chart;
pub mod error;
pub mod live_match;
pub mod snapshot;
