use anyhow::Result;
use nmtscope::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    tracing::info!(
        pid = app_config.collector.pid,
        report_dir = %app_config.collector.report_dir,
        interval_secs = app_config.collector.interval_secs,
        retention_minutes = app_config.retention.minutes,
        "{} {} starting",
        version::NAME,
        version::VERSION
    );

    let report_repo = Arc::new(report_repo::ReportRepo::new(
        &app_config.collector.report_dir,
        app_config.retention.minutes,
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let collector_handle = collector::spawn(
        collector::CollectorDeps {
            repo: report_repo.clone(),
            shutdown_rx,
        },
        collector::WorkerConfig {
            jcmd: app_config.collector.jcmd.clone(),
            pid: app_config.collector.pid,
            interval_secs: app_config.collector.interval_secs,
            schedule: app_config.collector.schedule.clone(),
            prune_interval_secs: app_config.retention.prune_interval_secs,
            stats_log_interval_secs: app_config.monitoring.stats_log_interval_secs,
        },
    );

    let app = routes::app(report_repo, &app_config);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
        }
    }

    let _ = shutdown_tx.send(());
    let _ = collector_handle.await;
    tracing::info!("Server exiting gracefully");
    Ok(())
}

/// Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
