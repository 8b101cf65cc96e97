use crate::record::Column;
use crate::store::DatasetStore;
use crate::view::FilteredView;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEntry {
    pub value: String,
    pub count: u64,
    pub percentage: f64, // of all non-null values counted
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyResult {
    pub column: Option<Column>,
    pub top_values: Vec<FrequencyEntry>,
    pub total_count: u64, // non-null values seen
}

impl FrequencyResult {
    pub fn pairs(&self) -> Vec<(&str, u64)> {
        self.top_values.iter().map(|e| (e.value.as_str(), e.count)).collect()
    }

    /// Each entry's share of the listed entries, for proportion charts.
    pub fn proportions(&self) -> Vec<(&str, f64)> {
        let listed: u64 = self.top_values.iter().map(|e| e.count).sum();
        self.top_values
            .iter()
            .map(|e| {
                let share = if listed > 0 { e.count as f64 / listed as f64 } else { 0.0 };
                (e.value.as_str(), share)
            })
            .collect()
    }
}

/// Counts values, remembering first-seen order for tie-breaking.
pub struct FrequencyCounter {
    map: HashMap<String, (u64, usize)>,
    total: u64,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            total: 0,
        }
    }
    pub fn add(&mut self, val: &str) {
        let next = self.map.len();
        match self.map.get_mut(val) {
            Some((count, _)) => *count += 1,
            None => {
                self.map.insert(val.to_string(), (1, next));
            }
        }
        self.total += 1;
    }
    pub fn top_n(self, n: usize) -> FrequencyResult {
        let total = self.total;
        let mut entries: Vec<(String, (u64, usize))> = self.map.into_iter().collect();
        entries.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        let top_values = entries
            .into_iter()
            .take(n)
            .map(|(v, (c, _))| FrequencyEntry {
                percentage: if total > 0 {
                    c as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
                value: v,
                count: c,
            })
            .collect();
        FrequencyResult {
            column: None,
            top_values,
            total_count: total,
        }
    }
}

impl Default for FrequencyCounter {
    fn default() -> Self { Self::new() }
}

pub fn count(view: &FilteredView) -> usize {
    view.len()
}

/// Most frequent non-null values of `column` in the view, at most `n` of them.
pub fn top_n(store: &DatasetStore, view: &FilteredView, column: Column, n: usize) -> FrequencyResult {
    let mut counter = FrequencyCounter::new();
    for r in view.records(store) {
        if let Some(v) = column.text(r) {
            counter.add(&v);
        }
    }
    FrequencyResult { column: Some(column), ..counter.top_n(n) }
}

/// The figures shown on the overview tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub row_count: usize,
    pub top_resource_types: FrequencyResult,
    pub top_regions: FrequencyResult,
}

impl Overview {
    pub fn compute(store: &DatasetStore, view: &FilteredView, n: usize) -> Self {
        Self {
            row_count: count(view),
            top_resource_types: top_n(store, view, Column::ResourceType, n),
            top_regions: top_n(store, view, Column::GeographicRegion, n),
        }
    }
}
