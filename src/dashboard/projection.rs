// Chart projection: flat per-report records of committed/reserved MB, plus series descriptors.

use super::selection::{ColorMap, Selection};
use crate::models::{Report, kb_to_mb};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// One x-axis point. Serializes as `{"created": .., "Total_committed": .., "Total_reserved": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub created: i64,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ChartPoint {
    pub fn committed(&self, category: &str) -> Option<f64> {
        self.values.get(&committed_key(category)).copied()
    }

    pub fn reserved(&self, category: &str) -> Option<f64> {
        self.values.get(&reserved_key(category)).copied()
    }
}

pub fn committed_key(category: &str) -> String {
    format!("{}_committed", category)
}

pub fn reserved_key(category: &str) -> String {
    format!("{}_reserved", category)
}

/// Projects every report; only samples whose category is in `categories` are kept.
pub fn project(reports: &[Report], categories: &[String]) -> Vec<ChartPoint> {
    let known: HashSet<&str> = categories.iter().map(String::as_str).collect();
    reports
        .iter()
        .map(|report| {
            let mut values = BTreeMap::new();
            for entry in &report.nmt_entries {
                if known.contains(entry.name.as_str()) {
                    values.insert(committed_key(&entry.name), kb_to_mb(entry.committed));
                    values.insert(reserved_key(&entry.name), kb_to_mb(entry.reserved));
                }
            }
            ChartPoint {
                created: report.created,
                values,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Committed,
    Reserved,
}

/// A line to draw: `data_key` indexes [`ChartPoint::values`]; reserved lines are dashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesSpec {
    pub data_key: String,
    pub name: String,
    pub category: String,
    pub kind: SeriesKind,
    pub color: &'static str,
    pub dashed: bool,
}

/// One committed series per selected category, plus a reserved series each when `show_reserved`.
pub fn series(selection: &Selection, colors: &ColorMap, show_reserved: bool) -> Vec<SeriesSpec> {
    let mut out = Vec::with_capacity(selection.len() * 2);
    for category in selection.names() {
        let color = colors.color_or_default(category);
        out.push(SeriesSpec {
            data_key: committed_key(category),
            name: format!("{} (Committed)", category),
            category: category.clone(),
            kind: SeriesKind::Committed,
            color,
            dashed: false,
        });
        if show_reserved {
            out.push(SeriesSpec {
                data_key: reserved_key(category),
                name: format!("{} (Reserved)", category),
                category: category.clone(),
                kind: SeriesKind::Reserved,
                color,
                dashed: true,
            });
        }
    }
    out
}
