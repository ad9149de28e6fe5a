// Selected categories and per-category colors.

use crate::models::TOTAL_CATEGORY;
use std::collections::HashMap;

/// Fallback stroke for a selected category that is not in the category set.
pub const FALLBACK_COLOR: &str = "#000";

pub const PALETTE: [&str; 15] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf", "#393b79", "#637939", "#8c6d31", "#843c39", "#7b4173",
];

/// Ordered, never-empty set of selected category names. Starts as `Total`, and resets to it
/// after a refresh that offers it again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(Vec<String>);

impl Default for Selection {
    fn default() -> Self {
        Self(vec![TOTAL_CATEGORY.to_string()])
    }
}

impl Selection {
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds `name` if absent, removes it if present. Removing the last selected name is
    /// rejected. Returns whether the selection changed.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(pos) = self.0.iter().position(|c| c == name) {
            if self.0.len() == 1 {
                return false;
            }
            self.0.remove(pos);
        } else {
            self.0.push(name.to_string());
        }
        true
    }

    /// After a category refresh: if the default category is offered but not selected,
    /// the selection becomes just the default. Returns whether it was reset.
    pub fn reconcile(&mut self, categories: &[String]) -> bool {
        if !self.contains(TOTAL_CATEGORY) && categories.iter().any(|c| c == TOTAL_CATEGORY) {
            *self = Self::default();
            return true;
        }
        false
    }
}

/// Category → palette color, by position in the category set.
#[derive(Debug, Clone, Default)]
pub struct ColorMap(HashMap<String, &'static str>);

impl ColorMap {
    pub fn new(categories: &[String]) -> Self {
        Self(
            categories
                .iter()
                .enumerate()
                .map(|(i, c)| (c.clone(), PALETTE[i % PALETTE.len()]))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.0.get(name).copied()
    }

    pub fn color_or_default(&self, name: &str) -> &'static str {
        self.get(name).unwrap_or(FALLBACK_COLOR)
    }
}
