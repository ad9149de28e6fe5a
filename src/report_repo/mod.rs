// NMT report directory: one jcmd summary per file, named nmt_<pid>_<ts>.txt.
// Listing walks the directory, drops expired files and parses the rest on demand.

mod file_name;
mod parser;

pub use file_name::{
    ReportNameError, parse_report_file_name, partial_report_file_name, report_file_name,
};
pub use parser::parse_summary;

use crate::models::Report;
use std::path::{Path, PathBuf};
use tracing::{instrument, warn};

pub struct ReportRepo {
    dir: PathBuf,
    retention_secs: i64,
}

impl ReportRepo {
    pub fn new(dir: impl Into<PathBuf>, retention_minutes: u64) -> Self {
        Self {
            dir: dir.into(),
            retention_secs: (retention_minutes as i64).saturating_mul(60),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reports with `begin <= created <= end`, in directory order.
    pub async fn list_reports(&self, begin: i64, end: i64) -> anyhow::Result<Vec<Report>> {
        self.list_reports_at(begin, end, now_secs()).await
    }

    /// Same as [`list_reports`](Self::list_reports) with an explicit "now" for the retention cutoff.
    #[instrument(skip(self), fields(repo = "report", operation = "list_reports"))]
    pub async fn list_reports_at(
        &self,
        begin: i64,
        end: i64,
        now: i64,
    ) -> anyhow::Result<Vec<Report>> {
        let dir = self.dir.clone();
        let cutoff = now - self.retention_secs;
        tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<Report>> {
            let mut reports = Vec::new();
            for path in report_files(&dir)? {
                let Some((pid, created)) = report_meta(&path) else {
                    continue;
                };
                if created < cutoff {
                    remove_expired(&path);
                    continue;
                }
                if created < begin || created > end {
                    continue;
                }
                let text = std::fs::read_to_string(&path)?;
                reports.push(Report {
                    pid,
                    created,
                    nmt_entries: parse_summary(&text),
                });
            }
            Ok(reports)
        })
        .await?
    }

    /// Deletes report files older than the retention window. Returns how many were removed.
    pub async fn prune_expired(&self) -> anyhow::Result<usize> {
        self.prune_expired_at(now_secs()).await
    }

    #[instrument(skip(self), fields(repo = "report", operation = "prune_expired"))]
    pub async fn prune_expired_at(&self, now: i64) -> anyhow::Result<usize> {
        let dir = self.dir.clone();
        let cutoff = now - self.retention_secs;
        tokio::task::spawn_blocking(move || -> anyhow::Result<usize> {
            let mut removed = 0;
            for path in report_files(&dir)? {
                if let Some((_, created)) = report_meta(&path)
                    && created < cutoff
                    && remove_expired(&path)
                {
                    removed += 1;
                }
            }
            Ok(removed)
        })
        .await?
    }
}

pub(crate) fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Recursively collects `*.txt` files. A missing directory yields nothing (collector has not run yet).
fn report_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    if !dir.exists() {
        return Ok(out);
    }
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in std::fs::read_dir(&current)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|e| e == file_name::REPORT_EXTENSION) {
                out.push(path);
            }
        }
    }
    Ok(out)
}

fn report_meta(path: &Path) -> Option<(u32, i64)> {
    let name = path.file_name()?.to_string_lossy();
    match parse_report_file_name(&name) {
        Ok(meta) => Some(meta),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unrecognised report file");
            None
        }
    }
}

fn remove_expired(path: &Path) -> bool {
    match std::fs::remove_file(path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to delete expired report");
            false
        }
    }
}
