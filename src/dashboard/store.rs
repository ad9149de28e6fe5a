// Report Store: the fetched report sequence and the category set derived from it.
// Every fetch gets a generation ticket; only the result for the latest ticket is applied,
// so an older response arriving late cannot overwrite newer state.

use crate::client::FetchError;
use crate::models::Report;
use tracing::{debug, warn};

/// Identifies one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Non-empty result stored.
    Reports(usize),
    /// Empty result or failure; store cleared.
    Cleared,
    /// Superseded by a newer fetch; ignored.
    Stale,
}

#[derive(Debug, Default)]
pub struct ReportStore {
    reports: Vec<Report>,
    categories: Vec<String>,
    generation: u64,
}

impl ReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorted ascending by `created`.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket(self.generation)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation
    }

    pub fn apply(&mut self, ticket: FetchTicket, result: Result<Vec<Report>, FetchError>) -> Applied {
        if !self.is_current(ticket) {
            debug!(
                ticket = ticket.0,
                latest = self.generation,
                "discarding stale NMT fetch result"
            );
            return Applied::Stale;
        }
        match result {
            Ok(reports) if !reports.is_empty() => {
                self.replace(reports);
                Applied::Reports(self.reports.len())
            }
            Ok(_) => {
                self.clear();
                Applied::Cleared
            }
            Err(e) => {
                warn!(error = %e, operation = "fetch_reports", "Error fetching NMT data");
                self.clear();
                Applied::Cleared
            }
        }
    }

    /// Categories come from the earliest report in the window; a category that only
    /// appears in later reports is not offered.
    fn replace(&mut self, mut reports: Vec<Report>) {
        reports.sort_by_key(|r| r.created);
        self.categories = reports
            .first()
            .map(Report::category_names)
            .unwrap_or_default();
        self.reports = reports;
    }

    fn clear(&mut self) {
        self.reports.clear();
        self.categories.clear();
    }
}
