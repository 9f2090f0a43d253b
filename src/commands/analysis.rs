use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use url::Url;

use super::AppState;
use crate::domain::{AuditOptions, AuditReport};
use crate::error::ApiError;
use crate::service::normalize_url;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub options: AuditOptions,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    #[serde(default)]
    pub sites: Vec<AnalyzeRequest>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub reports: Vec<AuditReport>,
}

/// Normalize and check a caller-supplied URL.
pub fn validate_url(raw: &str) -> Result<String, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::bad_request("URL is required"));
    }
    let normalized = normalize_url(raw);
    match Url::parse(&normalized) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(normalized),
        _ => Err(ApiError::bad_request(format!("Invalid URL: {}", raw.trim()))),
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
        })
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AuditReport>, ApiError> {
    let request = body(payload)?;
    let url = validate_url(&request.url)?;
    tracing::info!(url = %url, "Audit requested");

    let report = state.auditor.audit(&url, &request.options).await;
    Ok(Json(report))
}

pub async fn analyze_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> Result<Json<BatchResponse>, ApiError> {
    let request = body(payload)?;
    if request.sites.is_empty() {
        return Err(ApiError::bad_request("At least one site is required"));
    }

    let sites = request
        .sites
        .into_iter()
        .map(|site| Ok((validate_url(&site.url)?, site.options)))
        .collect::<Result<Vec<_>, ApiError>>()?;
    tracing::info!(count = sites.len(), "Batch audit requested");

    let reports = state.auditor.audit_batch(&sites).await;
    Ok(Json(BatchResponse { reports }))
}

pub async fn get_not_supported() -> ApiError {
    ApiError::MethodNotAllowed("GET is not supported, use POST".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_and_normalizes() {
        assert_eq!(validate_url("example.com").unwrap(), "https://example.com");
        assert_eq!(validate_url("http://example.com/a?b=1").unwrap(), "http://example.com/a?b=1");
        assert!(matches!(validate_url("   "), Err(ApiError::BadRequest(_))));
        assert!(matches!(validate_url("exa mple.com"), Err(ApiError::BadRequest(_))));
        assert!(matches!(validate_url("https://"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn options_accept_both_external_flag_names() {
        let raw = r#"{"url":"a.com","options":{"runExternalAnalyzer":false,"rowId":"7"}}"#;
        let req: AnalyzeRequest = serde_json::from_str(raw).unwrap();
        assert!(!req.options.run_external_analyzer);
        assert_eq!(req.options.row_id.as_deref(), Some("7"));

        let req: AnalyzeRequest = serde_json::from_str(r#"{"url":"a.com"}"#).unwrap();
        assert!(req.options.run_external_analyzer);
    }
}
