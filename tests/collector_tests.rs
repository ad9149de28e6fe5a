// Collector tests: one-shot collection with a stand-in jcmd, and the spawned loop's shutdown

mod common;

use nmtscope::collector::{CollectorDeps, WorkerConfig, collect_once, spawn};
use nmtscope::report_repo::{ReportRepo, parse_report_file_name};
use std::sync::Arc;
use tempfile::TempDir;

/// Shell script that ignores its arguments and prints the fixture, like `jcmd <pid> VM.native_memory summary`.
#[cfg(unix)]
fn fake_jcmd(dir: &std::path::Path) -> std::path::PathBuf {
    fake_jcmd_with_delay(dir, 0)
}

/// Like [`fake_jcmd`], but prints the fixture only after sleeping `delay_secs`.
#[cfg(unix)]
fn fake_jcmd_with_delay(dir: &std::path::Path, delay_secs: u32) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("jcmd");
    let body = format!(
        "#!/bin/sh\nsleep {}\ncat '{}'\n",
        delay_secs,
        common::fixture_path().display()
    );
    std::fs::write(&script, body).unwrap();
    let mut perms = std::fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&script, perms).unwrap();
    script
}

#[cfg(unix)]
#[tokio::test]
async fn collect_once_writes_named_report() {
    let bin_dir = TempDir::new().unwrap();
    let jcmd = fake_jcmd(bin_dir.path());
    let reports_dir = TempDir::new().unwrap();
    let report_dir = reports_dir.path().join("nmt");

    let path = collect_once(jcmd.to_str().unwrap(), 53732, &report_dir)
        .await
        .expect("collect_once");

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    let (pid, created) = parse_report_file_name(&name).unwrap();
    assert_eq!(pid, 53732);
    assert!(created > 0);

    let repo = ReportRepo::new(&report_dir, 60);
    let reports = repo.list_reports(created - 1, created + 1).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].nmt_entries.len(), 22);
    assert_eq!(reports[0].committed_kb("Total"), 382817);
}

#[cfg(unix)]
#[tokio::test]
async fn report_in_progress_is_not_listed() {
    let bin_dir = TempDir::new().unwrap();
    let jcmd = fake_jcmd_with_delay(bin_dir.path(), 2);
    let reports_dir = TempDir::new().unwrap();
    let report_dir = reports_dir.path().to_path_buf();
    let repo = ReportRepo::new(&report_dir, 60);

    let collect = tokio::spawn({
        let jcmd = jcmd.to_string_lossy().into_owned();
        let report_dir = report_dir.clone();
        async move { collect_once(&jcmd, 53732, &report_dir).await }
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
    assert!(repo.list_reports(0, i64::MAX).await.unwrap().is_empty());
    let in_progress: Vec<String> = std::fs::read_dir(&report_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(in_progress.len(), 1);
    assert!(in_progress[0].ends_with(".txt.part"));

    let path = collect.await.unwrap().expect("collect_once");
    assert!(path.to_string_lossy().ends_with(".txt"));
    let reports = repo.list_reports(0, i64::MAX).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].nmt_entries.len(), 22);
    assert_eq!(std::fs::read_dir(&report_dir).unwrap().count(), 1);
}

#[tokio::test]
async fn collect_once_failure_leaves_no_file() {
    let reports_dir = TempDir::new().unwrap();
    let err = collect_once("/nonexistent/bin/jcmd", 1, reports_dir.path())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("/nonexistent/bin/jcmd"));
    assert_eq!(std::fs::read_dir(reports_dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn collect_once_nonzero_exit_is_an_error() {
    let reports_dir = TempDir::new().unwrap();
    let err = collect_once("false", 1, reports_dir.path()).await.unwrap_err();
    assert!(err.to_string().contains("exited"));
    assert_eq!(std::fs::read_dir(reports_dir.path()).unwrap().count(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn collector_spawn_collects_and_stops_on_shutdown() {
    let bin_dir = TempDir::new().unwrap();
    let jcmd = fake_jcmd(bin_dir.path());
    let reports_dir = TempDir::new().unwrap();
    let repo = Arc::new(ReportRepo::new(reports_dir.path(), 60));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = spawn(
        CollectorDeps {
            repo: repo.clone(),
            shutdown_rx,
        },
        WorkerConfig {
            jcmd: jcmd.to_string_lossy().into_owned(),
            pid: 53732,
            interval_secs: 1,
            schedule: None,
            prune_interval_secs: 3600,
            stats_log_interval_secs: 3600,
        },
    );

    // The first interval tick fires immediately.
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(5);
    loop {
        let reports = repo.list_reports(0, i64::MAX).await.unwrap();
        if !reports.is_empty() {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "collector did not write a report"
        );
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }

    let _ = shutdown_tx.send(());
    tokio::time::timeout(tokio::time::Duration::from_secs(5), handle)
        .await
        .expect("collector stops after shutdown")
        .unwrap();
}

#[tokio::test]
async fn collector_with_collection_disabled_still_shuts_down() {
    let reports_dir = TempDir::new().unwrap();
    let repo = Arc::new(ReportRepo::new(reports_dir.path(), 60));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let handle = spawn(
        CollectorDeps { repo, shutdown_rx },
        WorkerConfig {
            jcmd: "jcmd".into(),
            pid: 1,
            interval_secs: 0,
            schedule: None,
            prune_interval_secs: 3600,
            stats_log_interval_secs: 3600,
        },
    );
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    let _ = shutdown_tx.send(());
    tokio::time::timeout(tokio::time::Duration::from_secs(5), handle)
        .await
        .expect("collector stops after shutdown")
        .unwrap();
    assert_eq!(std::fs::read_dir(reports_dir.path()).unwrap().count(), 0);
}
