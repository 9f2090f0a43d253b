//! Error types for the audit service.
//!
//! - `AuditError`: failures inside one audit, classified into a user-visible message
//! - `ApiError`: request-level failures returned by the HTTP surface
//! - `Result<T>`: alias using `AuditError`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// AUDIT ERROR
// ============================================================================

#[derive(Debug, Error)]
pub enum AuditError {
    /// Browser could not be started
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("browser launch timed out")]
    LaunchTimeout,

    /// Navigation rejected by the browser (DNS, refused connection, ...)
    #[error("{0}")]
    NavigationFailed(String),

    #[error("navigation timeout")]
    NavigationTimeout,

    /// Lighthouse or another external scorer failed
    #[error("external analyzer failed: {0}")]
    ExternalAnalyzer(String),

    /// Whole-audit ceiling reached
    #[error("audit deadline exceeded")]
    DeadlineExceeded,
}

impl AuditError {
    pub fn launch(err: impl std::fmt::Display) -> Self {
        Self::LaunchFailed(err.to_string())
    }

    /// Navigation error. Messages reporting a timeout become `NavigationTimeout`.
    pub fn navigation(err: impl std::fmt::Display) -> Self {
        let message = format!("{err:#}");
        if mentions_timeout(&message) {
            Self::NavigationTimeout
        } else {
            Self::NavigationFailed(message)
        }
    }

    /// Human-readable message placed in error reports.
    pub fn classify(&self) -> String {
        match self {
            Self::LaunchTimeout => "Timeout: unable to launch the browser".to_string(),
            Self::NavigationTimeout | Self::DeadlineExceeded => {
                "Timeout: analysis took too long".to_string()
            }
            other => classify_message(&other.to_string()),
        }
    }
}

/// Driver-side timeouts: "Navigation timeout ..." or the CDP "Request timed out.".
/// Chrome's `net::ERR_*TIMED_OUT` codes are network failures and do not match.
fn mentions_timeout(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("timeout") || lower.contains("timed out")
}

/// Match known network-failure signatures in a raw error message.
pub fn classify_message(message: &str) -> String {
    if mentions_timeout(message) {
        return "Timeout: analysis took too long".to_string();
    }
    if message.contains("net::ERR_NAME_NOT_RESOLVED") {
        return "Site inaccessible: domain not found".to_string();
    }
    if message.contains("net::ERR_CONNECTION_REFUSED") {
        return "Site inaccessible: connection refused".to_string();
    }
    if message.contains("net::ERR_TIMED_OUT")
        || message.contains("net::ERR_CONNECTION_TIMED_OUT")
    {
        return "Site inaccessible: connection timed out".to_string();
    }
    format!("Error: {message}")
}

pub type Result<T> = std::result::Result<T, AuditError>;

// ============================================================================
// API ERROR (FOR HTTP HANDLERS)
// ============================================================================

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    MethodNotAllowed(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        };
        (status, Json(json!({ "status": "error", "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_network_signatures() {
        let dns = AuditError::navigation("net::ERR_NAME_NOT_RESOLVED at https://nope.invalid");
        assert_eq!(dns.classify(), "Site inaccessible: domain not found");

        let refused = AuditError::navigation("net::ERR_CONNECTION_REFUSED");
        assert_eq!(refused.classify(), "Site inaccessible: connection refused");

        let timed_out = AuditError::navigation("net::ERR_CONNECTION_TIMED_OUT");
        assert_eq!(timed_out.classify(), "Site inaccessible: connection timed out");
    }

    #[test]
    fn classifies_timeouts() {
        assert_eq!(AuditError::NavigationTimeout.classify(), "Timeout: analysis took too long");
        assert_eq!(AuditError::DeadlineExceeded.classify(), "Timeout: analysis took too long");
        assert_eq!(AuditError::LaunchTimeout.classify(), "Timeout: unable to launch the browser");
        assert!(matches!(
            AuditError::navigation("Navigation Timeout Exceeded: 30000ms"),
            AuditError::NavigationTimeout
        ));
    }

    #[test]
    fn cdp_request_timeout_is_a_navigation_timeout() {
        let err = AuditError::navigation("Request timed out.");
        assert!(matches!(err, AuditError::NavigationTimeout));
        assert_eq!(err.classify(), "Timeout: analysis took too long");
        assert_eq!(classify_message("Request timed out."), "Timeout: analysis took too long");
    }

    #[test]
    fn wraps_anything_else() {
        let err = AuditError::navigation("net::ERR_CERT_AUTHORITY_INVALID");
        assert_eq!(err.classify(), "Error: net::ERR_CERT_AUTHORITY_INVALID");

        let err = AuditError::launch("no chrome binary");
        assert_eq!(err.classify(), "Error: browser launch failed: no chrome binary");
    }
}
