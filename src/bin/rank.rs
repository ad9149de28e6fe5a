// Rank NMT categories by recent committed-memory change, as the dashboard would.
//
// Usage: nmtscope-rank [BASE_URL] [RANGE] [INTERVAL] [SORT]
//   BASE_URL  default: http://127.0.0.1:8088
//   RANGE     10m | 30m | 1h (default 1h)
//   INTERVAL  10s | 30s | 1m | 5m | 15m | 30m | 60m (default 5m)
//   SORT      delta | rate (default delta)

use anyhow::Context;
use nmtscope::client::NmtClient;
use nmtscope::dashboard::{
    Action, Applied, DashboardState, LookbackInterval, QuickRange, SortCriteria, SortType,
    format_value, to_datetime_local,
};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let base_url = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("http://127.0.0.1:8088");
    let range = args
        .get(2)
        .map(|s| s.parse::<QuickRange>())
        .transpose()?
        .unwrap_or(QuickRange::OneHour);
    let interval = args
        .get(3)
        .map(|s| s.parse::<LookbackInterval>())
        .transpose()?
        .unwrap_or(LookbackInterval::Min5);
    let sort_type = args
        .get(4)
        .map(|s| s.parse::<SortType>())
        .transpose()?
        .unwrap_or_default();

    let client = NmtClient::new(base_url)?;
    let now = chrono::Utc::now().timestamp();
    let mut state = DashboardState::new(now);
    state.dispatch(Action::SetSortType(sort_type));
    state.dispatch(Action::SetSortCriteria(SortCriteria::Interval(interval)));

    let Some(request) = state.dispatch(Action::QuickRange { range, now }) else {
        anyhow::bail!("quick range did not request a fetch");
    };
    let applied = client
        .try_fulfil(&mut state, request)
        .await
        .with_context(|| format!("fetching {}", client.reports_url(request.range)))?;
    if applied == Applied::Cleared {
        println!(
            "No NMT reports between {} and {}.",
            to_datetime_local(request.range.start),
            to_datetime_local(request.range.end)
        );
        return Ok(());
    }

    let reports = state.reports();
    if let (Some(first), Some(last)) = (reports.first(), reports.last()) {
        println!(
            "{} reports, {} .. {}",
            reports.len(),
            to_datetime_local(first.created),
            to_datetime_local(last.created)
        );
    }
    if let Some(status) = state.status_message() {
        println!("{}", status);
    }

    let ranking = state.ranking();
    let width = ranking
        .items
        .iter()
        .map(|i| i.name.len())
        .max()
        .unwrap_or(8)
        .max(8);
    println!("{:<width$}  {}", "Category", sort_type.as_str(), width = width);
    for item in &ranking.items {
        println!(
            "{:<width$}  {}",
            item.name,
            format_value(item, sort_type),
            width = width
        );
    }
    Ok(())
}
