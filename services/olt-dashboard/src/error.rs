//! Error types for the OLT dashboard service

/// Errors that can occur in the dashboard service
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected response: {0}")]
    Malformed(String),

    #[error("Backend rejected the request: {0}")]
    Rejected(String),

    #[error("Unknown view: {0}")]
    UnknownView(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    /// Message suitable for showing next to a table that failed to refresh
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::Http(_) | DashboardError::Io(_) => {
                "Could not reach the OLT backend".to_string()
            }
            DashboardError::Status { status, body } if body.trim().is_empty() => {
                format!("HTTP {}", status)
            }
            DashboardError::Status { body, .. } => body.trim().to_string(),
            DashboardError::Malformed(_) | DashboardError::Json(_) => {
                "The OLT backend sent an unreadable response".to_string()
            }
            DashboardError::Rejected(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
