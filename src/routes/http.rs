// GET handlers: api/nmt, version

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use thiserror::Error;

use super::AppState;
use crate::models::ReportsResponse;
use crate::version::{NAME, VERSION};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("begin and end are required")]
    MissingRange,
    #[error("invalid begin timestamp: {0}")]
    InvalidBegin(std::num::ParseIntError),
    #[error("invalid end timestamp: {0}")]
    InvalidEnd(std::num::ParseIntError),
    #[error("begin must be less than end")]
    InvertedRange,
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            tracing::warn!(error = %e, operation = "list_reports", "NMT report listing failed");
        }
        (self.status(), self.to_string()).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RangeQuery {
    begin: Option<String>,
    end: Option<String>,
}

impl RangeQuery {
    fn parse(&self) -> Result<(i64, i64), ApiError> {
        let (Some(begin), Some(end)) = (non_empty(&self.begin), non_empty(&self.end)) else {
            return Err(ApiError::MissingRange);
        };
        let begin: i64 = begin.parse().map_err(ApiError::InvalidBegin)?;
        let end: i64 = end.parse().map_err(ApiError::InvalidEnd)?;
        if begin >= end {
            return Err(ApiError::InvertedRange);
        }
        Ok((begin, end))
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

/// GET /api/nmt?begin=<secs>&end=<secs>: reports created in `[begin, end]`, `data` null when none.
pub(super) async fn nmt_handler(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<axum::Json<ReportsResponse>, ApiError> {
    let (begin, end) = query.parse()?;
    let reports = state.report_repo.list_reports(begin, end).await?;
    Ok(axum::Json(ReportsResponse::from_reports(reports)))
}

/// GET /version: package name and version.
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}
