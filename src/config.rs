use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collector: CollectorConfig,
    #[serde(default)]
    pub retention: RetentionConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Built front-end to serve at `/` (SPA: unknown paths fall back to index.html).
    #[serde(default)]
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    #[serde(default = "default_jcmd")]
    pub jcmd: String,
    /// PID of the JVM to monitor (started with -XX:NativeMemoryTracking=summary).
    pub pid: u32,
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
    /// Seconds between collections; 0 disables collection unless `schedule` is set.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Optional cron expression with seconds (e.g. "*/10 * * * * *"). Uses local time. Wins over interval_secs.
    #[serde(default)]
    pub schedule: Option<String>,
}

fn default_jcmd() -> String {
    "jcmd".into()
}

fn default_report_dir() -> String {
    "/tmp/nmt".into()
}

fn default_interval_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Reports older than this are deleted.
    #[serde(default = "default_retention_minutes")]
    pub minutes: u64,
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            minutes: default_retention_minutes(),
            prune_interval_secs: default_prune_interval_secs(),
        }
    }
}

fn default_retention_minutes() -> u64 {
    60
}

fn default_prune_interval_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log collector stats (reports written, failures, pruned) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.collector.pid > 0,
            "collector.pid must be > 0, got {}",
            self.collector.pid
        );
        anyhow::ensure!(
            !self.collector.jcmd.is_empty(),
            "collector.jcmd must be non-empty"
        );
        anyhow::ensure!(
            !self.collector.report_dir.is_empty(),
            "collector.report_dir must be non-empty"
        );
        if let Some(ref schedule) = self.collector.schedule {
            cron::Schedule::from_str(schedule).map_err(|e| {
                anyhow::anyhow!("collector.schedule is not a valid cron expression: {}", e)
            })?;
        }
        anyhow::ensure!(
            self.retention.minutes > 0,
            "retention.minutes must be > 0, got {}",
            self.retention.minutes
        );
        anyhow::ensure!(
            self.retention.prune_interval_secs > 0,
            "retention.prune_interval_secs must be > 0, got {}",
            self.retention.prune_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
