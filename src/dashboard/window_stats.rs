// Lookback statistics: committed-memory change per category between the latest report
// and the report nearest to `latest.created - interval`.

use crate::models::{Report, kb_to_mb};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How far the nearest past report may fall short of the requested interval.
pub const INTERVAL_TOLERANCE_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookbackInterval {
    Sec10,
    Sec30,
    Min1,
    Min5,
    Min15,
    Min30,
    Min60,
}

impl LookbackInterval {
    pub const ALL: [LookbackInterval; 7] = [
        LookbackInterval::Sec10,
        LookbackInterval::Sec30,
        LookbackInterval::Min1,
        LookbackInterval::Min5,
        LookbackInterval::Min15,
        LookbackInterval::Min30,
        LookbackInterval::Min60,
    ];

    pub fn secs(self) -> i64 {
        match self {
            LookbackInterval::Sec10 => 10,
            LookbackInterval::Sec30 => 30,
            LookbackInterval::Min1 => 60,
            LookbackInterval::Min5 => 300,
            LookbackInterval::Min15 => 900,
            LookbackInterval::Min30 => 1800,
            LookbackInterval::Min60 => 3600,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LookbackInterval::Sec10 => "10s",
            LookbackInterval::Sec30 => "30s",
            LookbackInterval::Min1 => "1m",
            LookbackInterval::Min5 => "5m",
            LookbackInterval::Min15 => "15m",
            LookbackInterval::Min30 => "30m",
            LookbackInterval::Min60 => "60m",
        }
    }
}

impl fmt::Display for LookbackInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SortParseError {
    #[error("unknown interval {0:?}, expected one of 10s, 30s, 1m, 5m, 15m, 30m, 60m")]
    Interval(String),
    #[error("unknown sort type {0:?}, expected delta or rate")]
    SortType(String),
}

impl FromStr for LookbackInterval {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|i| i.label() == s)
            .ok_or_else(|| SortParseError::Interval(s.to_string()))
    }
}

/// `None` keeps category-set order (shown as "alphabetical").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortCriteria {
    #[default]
    None,
    Interval(LookbackInterval),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortType {
    #[default]
    Delta,
    Rate,
}

impl SortType {
    pub fn as_str(self) -> &'static str {
        match self {
            SortType::Delta => "delta",
            SortType::Rate => "rate",
        }
    }
}

impl FromStr for SortType {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "delta" => Ok(SortType::Delta),
            "rate" => Ok(SortType::Rate),
            other => Err(SortParseError::SortType(other.to_string())),
        }
    }
}

/// One row of the category list. `delta` is MB, `rate` is MB/s; both `None` when unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDelta {
    pub name: String,
    pub delta: Option<f64>,
    pub rate: Option<f64>,
}

impl CategoryDelta {
    fn unavailable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            delta: None,
            rate: None,
        }
    }
}

/// The latest report and the past report picked for a lookback interval.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    pub latest: &'a Report,
    pub past: &'a Report,
    /// `latest.created - past.created`, seconds.
    pub actual_interval: i64,
}

impl Window<'_> {
    pub fn is_sufficient(&self, interval_secs: i64) -> bool {
        self.actual_interval >= interval_secs - INTERVAL_TOLERANCE_SECS
    }
}

/// Report whose `created` is closest to `target`. On equal distance the earlier position wins.
pub fn nearest_report(reports: &[Report], target: i64) -> Option<&Report> {
    let mut iter = reports.iter();
    let mut best = iter.next()?;
    for report in iter {
        if report.created.abs_diff(target) < best.created.abs_diff(target) {
            best = report;
        }
    }
    Some(best)
}

/// Window for `interval_secs` over `reports` (sorted ascending). `None` with fewer than 2 reports.
pub fn lookback_window(reports: &[Report], interval_secs: i64) -> Option<Window<'_>> {
    if reports.len() < 2 {
        return None;
    }
    let latest = reports.last()?;
    let past = nearest_report(reports, latest.created - interval_secs)?;
    Some(Window {
        latest,
        past,
        actual_interval: latest.created - past.created,
    })
}

pub fn is_sufficient(reports: &[Report], interval_secs: i64) -> bool {
    lookback_window(reports, interval_secs).is_some_and(|w| w.is_sufficient(interval_secs))
}

/// Per-category delta and rate between the window's past and latest reports.
pub fn window_deltas(window: &Window<'_>, categories: &[String]) -> Vec<CategoryDelta> {
    categories
        .iter()
        .map(|name| {
            let latest = window.latest.committed_kb(name);
            let past = window.past.committed_kb(name);
            let delta = kb_to_mb(latest) - kb_to_mb(past);
            let rate = if window.actual_interval > 0 {
                delta / window.actual_interval as f64
            } else {
                0.0
            };
            CategoryDelta {
                name: name.clone(),
                delta: Some(delta),
                rate: Some(rate),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankStatus {
    /// No interval chosen; list is in category-set order.
    Unsorted,
    Sorted,
    /// Interval chosen but the data does not cover it; list is in category-set order.
    Insufficient(LookbackInterval),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub status: RankStatus,
    pub items: Vec<CategoryDelta>,
}

impl Ranking {
    /// Inline status text shown under the sort controls. `None` when no interval is chosen.
    pub fn status_message(&self, sort_type: SortType) -> Option<String> {
        match self.status {
            RankStatus::Unsorted => None,
            RankStatus::Sorted => Some(match sort_type {
                SortType::Delta => "Categories sorted by absolute memory change.".to_string(),
                SortType::Rate => "Categories sorted by change rate (MB/s).".to_string(),
            }),
            RankStatus::Insufficient(interval) => Some(format!(
                "Data insufficient for {} interval. Displaying alphabetical order.",
                interval
            )),
        }
    }
}

/// Category list for the current sort settings. Sorting is stable and descending by the
/// chosen key, with no secondary key.
pub fn rank_categories(
    reports: &[Report],
    categories: &[String],
    criteria: SortCriteria,
    sort_type: SortType,
) -> Ranking {
    let unordered = || -> Vec<CategoryDelta> {
        categories
            .iter()
            .map(|c| CategoryDelta::unavailable(c))
            .collect()
    };

    let SortCriteria::Interval(interval) = criteria else {
        return Ranking {
            status: RankStatus::Unsorted,
            items: unordered(),
        };
    };

    let secs = interval.secs();
    let Some(window) = lookback_window(reports, secs).filter(|w| w.is_sufficient(secs)) else {
        return Ranking {
            status: RankStatus::Insufficient(interval),
            items: unordered(),
        };
    };

    let mut items = window_deltas(&window, categories);
    let key = |d: &CategoryDelta| match sort_type {
        SortType::Delta => d.delta.unwrap_or(0.0),
        SortType::Rate => d.rate.unwrap_or(0.0),
    };
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
    Ranking {
        status: RankStatus::Sorted,
        items,
    }
}

/// One entry of the interval selector, disabled when the data cannot cover it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalOption {
    pub interval: LookbackInterval,
    pub enabled: bool,
    pub label: String,
    pub title: String,
}

pub fn interval_options(reports: &[Report], sort_type: SortType) -> Vec<IntervalOption> {
    let noun = match sort_type {
        SortType::Delta => "Delta",
        SortType::Rate => "Rate",
    };
    LookbackInterval::ALL
        .into_iter()
        .map(|interval| {
            let enabled = is_sufficient(reports, interval.secs());
            let title = if enabled {
                format!("Sort by {} over the last {}.", sort_type.as_str(), interval)
            } else {
                format!("Data interval is less than {}.", interval)
            };
            IntervalOption {
                interval,
                enabled,
                label: format!("{} {} (Largest First)", interval, noun),
                title,
            }
        })
        .collect()
}

/// `+1.50 MB`, `-0.0123 MB/s`; empty when statistics are unavailable.
pub fn format_value(item: &CategoryDelta, sort_type: SortType) -> String {
    let (Some(delta), Some(rate)) = (item.delta, item.rate) else {
        return String::new();
    };
    let (value, unit) = match sort_type {
        SortType::Delta => (delta, " MB"),
        SortType::Rate => (rate, " MB/s"),
    };
    let sign = if value >= 0.0 { "+" } else { "" };
    let precision = if sort_type == SortType::Rate && value.abs() < 1.0 {
        4
    } else {
        2
    };
    format!("{}{:.*}{}", sign, precision, value, unit)
}
