// Background NMT collector.
// Each trigger runs `jcmd <pid> VM.native_memory summary` into nmt_<pid>_<ts>.txt.
// Triggers come from a cron schedule (local time) or a fixed interval; pruning and stats logging
// run on their own real-time intervals.

use crate::report_repo::{ReportRepo, now_secs, partial_report_file_name, report_file_name};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::str::FromStr;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Duration, interval};
use tracing::{Instrument, info, warn};

/// Repo and shutdown for the collector.
pub struct CollectorDeps {
    pub repo: Arc<ReportRepo>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// What to run and how often.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub jcmd: String,
    pub pid: u32,
    /// Seconds between collections when `schedule` is not set; 0 disables collection.
    pub interval_secs: u64,
    /// Cron expression with seconds; wins over `interval_secs`.
    pub schedule: Option<String>,
    pub prune_interval_secs: u64,
    pub stats_log_interval_secs: u64,
}

/// Runs jcmd once and writes its stdout to a new report file in `report_dir`.
/// Output goes to a `.part` file that is renamed into place once jcmd succeeds; on failure
/// the partial file is removed.
pub async fn collect_once(jcmd: &str, pid: u32, report_dir: &Path) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(report_dir).await?;

    let created = now_secs();
    let path = report_dir.join(report_file_name(pid, created));
    let partial = report_dir.join(partial_report_file_name(pid, created));
    let file = tokio::fs::File::create(&partial).await?.into_std().await;

    let status = Command::new(jcmd)
        .arg(pid.to_string())
        .arg("VM.native_memory")
        .arg("summary")
        .stdout(Stdio::from(file))
        .stderr(Stdio::inherit())
        .status()
        .await;

    let result = match status {
        Ok(s) if s.success() => tokio::fs::rename(&partial, &path)
            .await
            .map(|()| path.clone())
            .map_err(|e| anyhow::anyhow!("failed to move report into place: {}", e)),
        Ok(s) => Err(anyhow::anyhow!("{} exited with {}", jcmd, s)),
        Err(e) => Err(anyhow::anyhow!("failed to run {}: {}", jcmd, e)),
    };
    if result.is_err()
        && let Err(e) = tokio::fs::remove_file(&partial).await
    {
        warn!(path = %partial.display(), error = %e, "failed to remove incomplete report");
    }
    result
}

pub fn spawn(deps: CollectorDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let CollectorDeps {
        repo,
        mut shutdown_rx,
    } = deps;

    let collector_span = tracing::span!(tracing::Level::DEBUG, "collector", pid = config.pid);
    tokio::spawn(
        async move {
            let (trigger_tx, mut trigger_rx) = mpsc::channel::<()>(1);
            let scheduler = tokio::spawn(collect_scheduler(
                config.interval_secs,
                config.schedule.clone(),
                trigger_tx,
            ));

            let mut prune_tick = interval(Duration::from_secs(config.prune_interval_secs));
            prune_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            let mut stats_log_tick = interval(Duration::from_secs(config.stats_log_interval_secs));
            stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            let mut reports_written_total: u64 = 0;
            let mut collect_failures_total: u64 = 0;
            let mut reports_pruned_total: u64 = 0;

            loop {
                tokio::select! {
                    Some(()) = trigger_rx.recv() => {
                        tracing::debug!(pid = config.pid, "Collecting NMT report");
                        match collect_once(&config.jcmd, config.pid, repo.dir()).await {
                            Ok(path) => {
                                reports_written_total += 1;
                                tracing::debug!(path = %path.display(), "NMT report written");
                            }
                            Err(e) => {
                                collect_failures_total += 1;
                                warn!(error = %e, operation = "collect_once", "NMT collection failed");
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Collector shutting down");
                        break;
                    }
                    _ = prune_tick.tick() => {
                        match repo.prune_expired().await {
                            Ok(n) => reports_pruned_total += n as u64,
                            Err(e) => warn!(
                                error = %e,
                                operation = "prune_expired",
                                "Failed to prune expired reports"
                            ),
                        }
                    }
                    _ = stats_log_tick.tick() => {
                        info!(
                            reports_written_total,
                            collect_failures_total,
                            reports_pruned_total,
                            "collector stats"
                        );
                    }
                }
            }
            scheduler.abort();
        }
        .instrument(collector_span),
    )
}

/// Sends on `tx` at each collection time (cron or fixed interval). Returns without sending
/// when collection is disabled or the schedule is invalid.
async fn collect_scheduler(interval_secs: u64, schedule: Option<String>, tx: mpsc::Sender<()>) {
    if let Some(ref cron_str) = schedule {
        let Ok(schedule) = cron::Schedule::from_str(cron_str) else {
            warn!(cron = %cron_str, "invalid collector schedule; collection will not run");
            return;
        };
        loop {
            let now = chrono::Local::now();
            if let Some(next) = schedule.after(&now).next() {
                let delay = (next - now).to_std().unwrap_or(Duration::from_secs(1));
                tokio::time::sleep(delay).await;
                if tx.send(()).await.is_err() {
                    break;
                }
            } else {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        }
    } else if interval_secs > 0 {
        let mut tick = interval(Duration::from_secs(interval_secs));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tick.tick().await;
            if tx.send(()).await.is_err() {
                break;
            }
        }
    } else {
        info!("collector.interval_secs is 0 and no schedule set; collection disabled");
    }
}
