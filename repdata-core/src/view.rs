use crate::criteria::FilterCriteria;
use crate::predicate::RowPredicate;
use crate::record::{RecordId, Resource};
use crate::store::DatasetStore;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Ids of the rows that satisfy one criteria snapshot, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredView {
    ids: Vec<RecordId>,
}

impl FilteredView {
    pub fn compute(store: &DatasetStore, criteria: &FilterCriteria) -> Self {
        Self::compute_with(store, criteria, usize::MAX)
    }

    /// Like [`FilteredView::compute`], scanning on the rayon pool once the store
    /// reaches `parallel_threshold` rows. Order is preserved either way.
    pub fn compute_with(
        store: &DatasetStore,
        criteria: &FilterCriteria,
        parallel_threshold: usize,
    ) -> Self {
        let predicate = RowPredicate::for_store(store, criteria);
        let rows = store.records();
        let ids: Vec<RecordId> = if predicate.is_trivial() {
            rows.iter().map(|r| r.id).collect()
        } else if rows.len() >= parallel_threshold {
            rows.par_iter()
                .filter(|r| predicate.matches(r))
                .map(|r| r.id)
                .collect()
        } else {
            rows.iter()
                .filter(|r| predicate.matches(r))
                .map(|r| r.id)
                .collect()
        };
        debug!(matched = ids.len(), total = rows.len(), %predicate, "filtered view computed");
        Self { ids }
    }

    /// View over an explicit id list; ids must be ascending.
    pub fn from_ids(ids: Vec<RecordId>) -> Self {
        debug_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        Self { ids }
    }

    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        // ids follow store order, which is ascending
        self.ids.binary_search(&id).is_ok()
    }

    pub fn records<'a>(&'a self, store: &'a DatasetStore) -> impl Iterator<Item = &'a Resource> + 'a {
        self.ids.iter().filter_map(move |&id| store.get(id))
    }
}

/// Memoizes the filtered view on the last criteria snapshot.
#[derive(Debug, Default)]
pub struct ViewCache {
    snapshot: Option<FilterCriteria>,
    view: Arc<FilteredView>,
    parallel_threshold: Option<usize>,
    recomputations: u64,
}

impl ViewCache {
    pub fn new(parallel_threshold: usize) -> Self {
        Self { parallel_threshold: Some(parallel_threshold), ..Self::default() }
    }

    /// Returns the view for `criteria`, recomputing only when the snapshot differs
    /// from the previous call.
    pub fn get(&mut self, store: &DatasetStore, criteria: &FilterCriteria) -> Arc<FilteredView> {
        if self.snapshot.as_ref() == Some(criteria) {
            debug!("filtered view memo hit");
            return Arc::clone(&self.view);
        }
        let threshold = self.parallel_threshold.unwrap_or(usize::MAX);
        self.view = Arc::new(FilteredView::compute_with(store, criteria, threshold));
        self.snapshot = Some(criteria.clone());
        self.recomputations += 1;
        Arc::clone(&self.view)
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
