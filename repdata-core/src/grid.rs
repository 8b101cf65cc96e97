//! The resource grid: which columns are displayed and the grid's own
//! per-column filters, applied on top of the filtered view.

use crate::record::{Column, RecordId, RecordSummary};
use crate::store::DatasetStore;
use crate::view::FilteredView;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridState {
    columns: Vec<Column>,
    column_filters: BTreeMap<Column, String>,
}

impl Default for GridState {
    fn default() -> Self {
        Self::new(Column::GRID.to_vec())
    }
}

impl GridState {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns, column_filters: BTreeMap::new() }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_filter(&self, column: Column) -> Option<&str> {
        self.column_filters.get(&column).map(String::as_str)
    }

    pub fn has_filters(&self) -> bool {
        !self.column_filters.is_empty()
    }

    /// Sets the grid filter for a displayed column; blank text removes it.
    /// Returns whether anything changed.
    pub fn set_column_filter(&mut self, column: Column, text: &str) -> bool {
        if !self.columns.contains(&column) {
            return false;
        }
        let text = text.trim();
        if text.is_empty() {
            return self.column_filters.remove(&column).is_some();
        }
        let lowered = text.to_lowercase();
        if self.column_filters.get(&column) == Some(&lowered) {
            return false;
        }
        self.column_filters.insert(column, lowered);
        true
    }

    pub fn clear_filters(&mut self) -> bool {
        let had = self.has_filters();
        self.column_filters.clear();
        had
    }

    /// Ids of the view rows that pass every grid filter (case-insensitive substring).
    pub fn visible_ids(&self, store: &DatasetStore, view: &FilteredView) -> Vec<RecordId> {
        if self.column_filters.is_empty() {
            return view.ids().to_vec();
        }
        view.records(store)
            .filter(|r| {
                self.column_filters.iter().all(|(col, needle)| {
                    col.text(r)
                        .map(|v| v.to_lowercase().contains(needle.as_str()))
                        .unwrap_or(false)
                })
            })
            .map(|r| r.id)
            .collect()
    }
}

pub fn summaries(store: &DatasetStore, ids: &[RecordId]) -> Vec<RecordSummary> {
    ids.iter().filter_map(|&id| store.get(id)).map(RecordSummary::from).collect()
}
