//! Selection of one grid row and its grouped detail fields.

use crate::record::{Column, RecordId, Resource};
use crate::store::DatasetStore;
use crate::view::FilteredView;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailField {
    pub column: Column,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldGroup {
    pub label: String,
    pub fields: Vec<DetailField>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDetail {
    pub id: RecordId,
    pub title: Option<String>,
    pub groups: Vec<FieldGroup>,
}

const GROUPS: [(&str, &[Column]); 7] = [
    ("Link", &[Column::Url]),
    ("Description", &[Column::Description]),
    ("Methods", &[Column::DataMethodType, Column::UnitAnalysis]),
    ("Geography", &[Column::Country, Column::GeographicRegion, Column::AdminLevel]),
    (
        "Time",
        &[Column::CollectDateStart, Column::CollectDateEnd, Column::TimeSpan, Column::Longitudinal],
    ),
    ("Topics", &[Column::Themes, Column::Subjects]),
    (
        "Provenance",
        &[Column::Producer, Column::Distributor, Column::Restrictions, Column::Notes],
    ),
];

impl RecordDetail {
    pub fn from_record(r: &Resource) -> Self {
        let groups = GROUPS
            .iter()
            .map(|(label, cols)| FieldGroup {
                label: label.to_string(),
                fields: cols
                    .iter()
                    .map(|&column| DetailField {
                        column,
                        value: column.text(r).map(|v| v.into_owned()),
                    })
                    .collect(),
            })
            .collect();
        Self { id: r.id, title: r.title.clone(), groups }
    }

    pub fn group(&self, label: &str) -> Option<&FieldGroup> {
        self.groups.iter().find(|g| g.label == label)
    }
}

/// Remembers the selected record id; never a display position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailResolver {
    selected: Option<RecordId>,
}

impl DetailResolver {
    pub fn selected(&self) -> Option<RecordId> {
        self.selected
    }

    /// Selects by 1-based position in the displayed rows. Out-of-range positions
    /// clear the selection.
    pub fn select_display_row(&mut self, displayed: &[RecordId], row: usize) -> Option<RecordId> {
        self.selected = row.checked_sub(1).and_then(|i| displayed.get(i).copied());
        self.selected
    }

    pub fn select_id(&mut self, id: RecordId) {
        self.selected = Some(id);
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Resolves the selection against the current view. A selection whose row
    /// left the view is dropped and reported as no selection.
    pub fn resolve(&mut self, store: &DatasetStore, view: &FilteredView) -> Option<RecordDetail> {
        let id = self.selected?;
        match store.get(id) {
            Some(r) if view.contains(id) => Some(RecordDetail::from_record(r)),
            _ => {
                debug!(id, "selection no longer in view, cleared");
                self.selected = None;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::FilterCriteria;

    fn store() -> DatasetStore {
        DatasetStore::new(
            (1..=6)
                .map(|i| Resource {
                    title: Some(format!("Resource {i}")),
                    resource_type: Some(if i == 5 { "Archive" } else { "Survey" }.into()),
                    url: Some(format!("https://example.org/{i}")),
                    country: Some("Canada".into()),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn nothing_selected_resolves_to_none() {
        let s = store();
        let v = FilteredView::compute(&s, &FilterCriteria::for_store(&s));
        assert_eq!(DetailResolver::default().resolve(&s, &v), None);
    }

    #[test]
    fn display_rows_are_one_based() {
        let mut d = DetailResolver::default();
        assert_eq!(d.select_display_row(&[3, 5, 9], 2), Some(5));
        assert_eq!(d.select_display_row(&[3, 5, 9], 0), None);
        assert_eq!(d.select_display_row(&[3, 5, 9], 4), None);
    }

    #[test]
    fn stale_selection_becomes_no_selection() {
        let s = store();
        let mut c = FilterCriteria::for_store(&s);
        let v = FilteredView::compute(&s, &c);
        let mut d = DetailResolver::default();
        d.select_display_row(v.ids(), 5);
        let detail = d.resolve(&s, &v).unwrap();
        assert_eq!(detail.id, 5);
        assert_eq!(detail.title.as_deref(), Some("Resource 5"));

        c.set_resource_type("Survey");
        let narrowed = FilteredView::compute(&s, &c);
        assert!(!narrowed.contains(5));
        assert_eq!(d.resolve(&s, &narrowed), None);
        assert_eq!(d.selected(), None);
        // widening again does not bring the old selection back
        assert_eq!(d.resolve(&s, &v), None);
    }

    #[test]
    fn unknown_id_is_no_selection() {
        let s = store();
        let mut d = DetailResolver::default();
        d.select_id(99);
        assert_eq!(d.resolve(&s, &FilteredView::from_ids(vec![99])), None);
    }

    #[test]
    fn detail_groups_follow_layout() {
        let s = store();
        let detail = RecordDetail::from_record(s.get(2).unwrap());
        let labels: Vec<&str> = detail.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Link", "Description", "Methods", "Geography", "Time", "Topics", "Provenance"]);
        let link = detail.group("Link").unwrap();
        assert_eq!(link.fields[0].value.as_deref(), Some("https://example.org/2"));
        let geo = detail.group("Geography").unwrap();
        assert_eq!(geo.fields[0].column, Column::Country);
        assert_eq!(geo.fields[1].value, None);
    }
}
