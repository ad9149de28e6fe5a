// Domain models

mod report;

pub use report::{CategorySample, Report, ReportsResponse, TOTAL_CATEGORY, kb_to_mb};
