// NMT report models (wire format of /api/nmt)

use serde::{Deserialize, Serialize};

/// Name jcmd gives the summary line (`Total: reserved=..KB, committed=..KB`).
pub const TOTAL_CATEGORY: &str = "Total";

/// One category line of an NMT summary. Values are in KB, as jcmd prints them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySample {
    pub name: String,
    pub reserved: u64,
    pub committed: u64,
}

/// One NMT summary taken at `created` (epoch seconds) for process `pid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub pid: u32,
    pub created: i64,
    #[serde(default)]
    pub nmt_entries: Vec<CategorySample>,
}

impl Report {
    pub fn sample(&self, name: &str) -> Option<&CategorySample> {
        self.nmt_entries.iter().find(|e| e.name == name)
    }

    /// Committed KB for `name`; a category missing from this report counts as 0.
    pub fn committed_kb(&self, name: &str) -> u64 {
        self.sample(name).map(|s| s.committed).unwrap_or(0)
    }

    pub fn category_names(&self) -> Vec<String> {
        self.nmt_entries.iter().map(|e| e.name.clone()).collect()
    }
}

/// Body of GET /api/nmt. `data` is `null` when the window holds no reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsResponse {
    #[serde(default)]
    pub data: Option<Vec<Report>>,
}

impl ReportsResponse {
    pub fn from_reports(reports: Vec<Report>) -> Self {
        Self {
            data: if reports.is_empty() {
                None
            } else {
                Some(reports)
            },
        }
    }

    /// Absent, `null` and `[]` all mean "no reports".
    pub fn into_reports(self) -> Vec<Report> {
        self.data.unwrap_or_default()
    }
}

/// KB → MB, the unit used for chart values and deltas.
pub fn kb_to_mb(kb: u64) -> f64 {
    kb as f64 / 1024.0
}
