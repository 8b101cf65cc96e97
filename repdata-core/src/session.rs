//! One user's explorer state: criteria, the memoized view and overview, grid
//! state and the current selection. The store is shared; everything else is
//! private to the session.

use crate::aggregate::{FrequencyResult, Overview};
use crate::criteria::FilterCriteria;
use crate::detail::{DetailResolver, RecordDetail};
use crate::export::export_csv;
use crate::grid::{summaries, GridState};
use crate::predicate::RowPredicate;
use crate::record::{Column, RecordId, RecordSummary};
use crate::store::DatasetStore;
use crate::view::{FilteredView, ViewCache};
use repdata_common::{FilterConfig, Result};
use std::sync::Arc;
use tracing::debug;

pub struct ExplorerSession {
    store: Arc<DatasetStore>,
    criteria: FilterCriteria,
    views: ViewCache,
    overview: Option<(Arc<FilteredView>, Arc<Overview>)>,
    grid: GridState,
    visible: Option<(Arc<FilteredView>, GridState, Arc<Vec<RecordId>>)>,
    detail: DetailResolver,
    placeholder: String,
    top_n: usize,
}

impl ExplorerSession {
    pub fn new(store: Arc<DatasetStore>, cfg: &FilterConfig) -> Self {
        let criteria = FilterCriteria::for_store(&store);
        Self {
            store,
            criteria,
            views: ViewCache::new(cfg.parallel_threshold),
            overview: None,
            grid: GridState::default(),
            visible: None,
            detail: DetailResolver::default(),
            placeholder: cfg.text_placeholder.clone(),
            top_n: cfg.top_n,
        }
    }

    pub fn store(&self) -> &Arc<DatasetStore> {
        &self.store
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> bool {
        if self.criteria == criteria {
            return false;
        }
        self.criteria = criteria;
        true
    }

    pub fn set_resource_type(&mut self, input: &str) -> bool {
        self.criteria.set_resource_type(input)
    }

    pub fn set_theme(&mut self, input: &str) -> bool {
        self.criteria.set_theme(input)
    }

    pub fn set_regions<I, S>(&mut self, inputs: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.set_regions(inputs)
    }

    pub fn set_languages<I, S>(&mut self, inputs: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.set_languages(inputs)
    }

    pub fn set_pub_years(&mut self, min: i32, max: i32) -> bool {
        self.criteria.set_pub_years(min, max)
    }

    pub fn set_free_text(&mut self, input: &str) -> bool {
        self.criteria.set_free_text(input, &self.placeholder)
    }

    /// Back to the session defaults; grid filters and selection are kept.
    pub fn reset_criteria(&mut self) -> bool {
        let defaults = FilterCriteria::for_store(&self.store);
        self.set_criteria(defaults)
    }

    pub fn view(&mut self) -> Arc<FilteredView> {
        self.views.get(&self.store, &self.criteria)
    }

    pub fn predicate(&self) -> RowPredicate {
        RowPredicate::for_store(&self.store, &self.criteria)
    }

    pub fn row_count(&mut self) -> usize {
        self.view().len()
    }

    /// Count and top-N breakdowns, recomputed only when the view changes.
    pub fn overview(&mut self) -> Arc<Overview> {
        let view = self.view();
        if let Some((seen, overview)) = &self.overview {
            if Arc::ptr_eq(seen, &view) {
                return Arc::clone(overview);
            }
        }
        let overview = Arc::new(Overview::compute(&self.store, &view, self.top_n));
        debug!(rows = overview.row_count, "overview recomputed");
        self.overview = Some((view, Arc::clone(&overview)));
        overview
    }

    pub fn top_resource_types(&mut self) -> FrequencyResult {
        self.overview().top_resource_types.clone()
    }

    pub fn top_regions(&mut self) -> FrequencyResult {
        self.overview().top_regions.clone()
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn set_grid_filter(&mut self, column: Column, text: &str) -> bool {
        self.grid.set_column_filter(column, text)
    }

    pub fn clear_grid_filters(&mut self) -> bool {
        self.grid.clear_filters()
    }

    /// Ids shown in the grid: the view narrowed by the grid's column filters.
    pub fn visible_ids(&mut self) -> Arc<Vec<RecordId>> {
        let view = self.view();
        if let Some((seen, grid, ids)) = &self.visible {
            if Arc::ptr_eq(seen, &view) && *grid == self.grid {
                return Arc::clone(ids);
            }
        }
        let ids = Arc::new(self.grid.visible_ids(&self.store, &view));
        self.visible = Some((view, self.grid.clone(), Arc::clone(&ids)));
        ids
    }

    pub fn grid_rows(&mut self) -> Vec<RecordSummary> {
        let ids = self.visible_ids();
        summaries(&self.store, &ids)
    }

    /// Selects the record at a 1-based grid position.
    pub fn select_row(&mut self, row: usize) -> Option<RecordId> {
        let ids = self.visible_ids();
        self.detail.select_display_row(&ids, row)
    }

    pub fn select_id(&mut self, id: RecordId) {
        self.detail.select_id(id);
    }

    pub fn selected(&self) -> Option<RecordId> {
        self.detail.selected()
    }

    pub fn clear_selection(&mut self) {
        self.detail.clear();
    }

    pub fn detail(&mut self) -> Option<RecordDetail> {
        let view = self.view();
        self.detail.resolve(&self.store, &view)
    }

    /// CSV of the grid-visible rows over the displayed columns.
    pub fn export_bytes(&mut self) -> Result<Vec<u8>> {
        let ids = self.visible_ids();
        export_csv(&self.store, &ids, self.grid.columns())
    }
}
