// Report file naming: nmt_<pid>_<unix-seconds>.txt

use thiserror::Error;

pub(crate) const REPORT_EXTENSION: &str = "txt";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReportNameError {
    #[error("invalid file name format: {0}")]
    Format(String),
    #[error("invalid pid: {0}")]
    Pid(String),
    #[error("invalid ts: {0}")]
    Timestamp(String),
}

pub fn report_file_name(pid: u32, created: i64) -> String {
    format!("nmt_{}_{}.{}", pid, created, REPORT_EXTENSION)
}

/// Name a report is written under until jcmd finishes. Listing only picks up `.txt` files,
/// so a report in progress is never served.
pub fn partial_report_file_name(pid: u32, created: i64) -> String {
    format!("{}.part", report_file_name(pid, created))
}

/// Parses `nmt_53732_1764484822.txt` into `(53732, 1764484822)`. The `.txt` suffix is optional.
pub fn parse_report_file_name(file_name: &str) -> Result<(u32, i64), ReportNameError> {
    let trimmed = file_name.trim();
    let stem = trimmed.strip_suffix(".txt").unwrap_or(trimmed);

    let parts: Vec<&str> = stem.split('_').collect();
    let [prefix, pid, ts] = parts.as_slice() else {
        return Err(ReportNameError::Format(stem.to_string()));
    };
    if *prefix != "nmt" {
        return Err(ReportNameError::Format(stem.to_string()));
    }

    let pid = pid
        .parse::<u32>()
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| ReportNameError::Pid(pid.to_string()))?;
    let ts = ts
        .parse::<i64>()
        .ok()
        .filter(|t| *t > 0)
        .ok_or_else(|| ReportNameError::Timestamp(ts.to_string()))?;

    Ok((pid, ts))
}
