// Error taxonomy for dashboard refresh tasks
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// The request never produced a response (connect, timeout, reset)
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// The body could not be decoded or lacks a required section
    #[error("malformed data: {0}")]
    MalformedData(String),

    /// A view refused to render a widget or chart
    #[error("render failed for {target}: {message}")]
    Render { target: String, message: String },
}

impl DashboardError {
    /// Short text suitable for a transient user-facing notification
    pub fn user_message(&self) -> &'static str {
        match self {
            DashboardError::Network(_) => "Connection problem, showing last known data",
            DashboardError::Server { .. } => "The analytics server reported an error",
            DashboardError::MalformedData(_) => "Received unexpected data from the server",
            DashboardError::Render { .. } => "Part of the dashboard could not be displayed",
        }
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::MalformedData(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::Server {
            status: 503,
            body: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "server returned 503: maintenance");
    }

    #[test]
    fn test_json_error_is_malformed() {
        let json_err = serde_json::from_str::<i32>("nope").unwrap_err();
        let err: DashboardError = json_err.into();
        assert!(matches!(err, DashboardError::MalformedData(_)));
    }
}
