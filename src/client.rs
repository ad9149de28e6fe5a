// HTTP client for GET /api/nmt.

use crate::dashboard::{Applied, DashboardState, FetchRequest, TimeRange};
use crate::models::{Report, ReportsResponse};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Clone)]
pub struct NmtClient {
    http: reqwest::Client,
    base_url: String,
}

impl NmtClient {
    /// `base_url` like `http://127.0.0.1:8088`; a trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .user_agent(crate::version::user_agent())
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn reports_url(&self, range: TimeRange) -> String {
        format!(
            "{}/api/nmt?begin={}&end={}",
            self.base_url, range.start, range.end
        )
    }

    /// Reports in `range`, in server order. Absent or `null` data is an empty list.
    #[instrument(skip(self), fields(operation = "fetch_reports"))]
    pub async fn fetch_reports(&self, range: TimeRange) -> Result<Vec<Report>, FetchError> {
        let response = self.http.get(self.reports_url(range)).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let body: ReportsResponse = response.json().await?;
        Ok(body.into_reports())
    }

    /// Performs `request` and feeds the result back into `state`. A failure is logged and
    /// clears the displayed data, as the dashboard does.
    pub async fn fulfil(&self, state: &mut DashboardState, request: FetchRequest) -> Applied {
        let result = self.fetch_reports(request.range).await;
        state.apply_fetch(request.ticket, result)
    }

    /// Like [`fulfil`](Self::fulfil), but a failed fetch is returned and `state` is left as is.
    pub async fn try_fulfil(
        &self,
        state: &mut DashboardState,
        request: FetchRequest,
    ) -> Result<Applied, FetchError> {
        let reports = self.fetch_reports(request.range).await?;
        Ok(state.apply_fetch(request.ticket, Ok(reports)))
    }
}
