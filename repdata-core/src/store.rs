use crate::criteria::{YearRange, ALL};
use crate::record::{Column, RecordId, Resource};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Immutable in-memory resource table. Shared between sessions as `Arc<DatasetStore>`.
#[derive(Debug, Default)]
pub struct DatasetStore {
    records: Vec<Resource>,
    year_bounds: Option<YearRange>,
}

impl DatasetStore {
    /// Takes ownership of the rows and assigns ids 1..=n in load order.
    pub fn new(mut records: Vec<Resource>) -> Self {
        for (i, r) in records.iter_mut().enumerate() {
            r.id = i as RecordId + 1;
        }
        let year_bounds = records
            .iter()
            .filter_map(|r| r.pub_date)
            .fold(None, |acc: Option<YearRange>, y| match acc {
                None => Some(YearRange::new(y, y)),
                Some(r) => Some(YearRange::new(r.min.min(y), r.max.max(y))),
            });
        Self { records, year_bounds }
    }

    pub fn shared(records: Vec<Resource>) -> Arc<Self> {
        Arc::new(Self::new(records))
    }

    pub fn records(&self) -> &[Resource] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Resource> {
        // ids are dense and 1-based
        let idx = (id as usize).checked_sub(1)?;
        self.records.get(idx)
    }

    /// True when `range` keeps every dated row; vacuously true with no dates.
    pub fn year_range_covers(&self, range: &YearRange) -> bool {
        match self.year_bounds {
            Some(b) => range.min <= b.min && range.max >= b.max,
            None => true,
        }
    }

    /// Observed publication-year range, `None` when no row carries a year.
    pub fn year_bounds(&self) -> Option<YearRange> {
        self.year_bounds
    }
}

/// Controlled vocabularies keyed by column, as stored in a vocabulary TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    #[serde(default)]
    pub resource_type: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub region: Vec<String>,
    #[serde(default)]
    pub language: Vec<String>,
    #[serde(default)]
    pub producer: Vec<String>,
    #[serde(default)]
    pub country: Vec<String>,
    #[serde(default)]
    pub admin_level: Vec<String>,
    #[serde(default)]
    pub unit_analysis: Vec<String>,
    #[serde(default)]
    pub longitudinal: Vec<String>,
    #[serde(default)]
    pub restrictions: Vec<String>,
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl Vocabulary {
    pub const COLUMNS: [Column; 11] = [
        Column::ResourceType,
        Column::Themes,
        Column::GeographicRegion,
        Column::Language,
        Column::Producer,
        Column::Country,
        Column::AdminLevel,
        Column::UnitAnalysis,
        Column::Longitudinal,
        Column::Restrictions,
        Column::Subjects,
    ];

    pub fn values(&self, column: Column) -> &[String] {
        match column {
            Column::ResourceType => &self.resource_type,
            Column::Themes => &self.themes,
            Column::GeographicRegion => &self.region,
            Column::Language => &self.language,
            Column::Producer => &self.producer,
            Column::Country => &self.country,
            Column::AdminLevel => &self.admin_level,
            Column::UnitAnalysis => &self.unit_analysis,
            Column::Longitudinal => &self.longitudinal,
            Column::Restrictions => &self.restrictions,
            Column::Subjects => &self.subjects,
            _ => &[],
        }
    }

    fn values_mut(&mut self, column: Column) -> Option<&mut Vec<String>> {
        Some(match column {
            Column::ResourceType => &mut self.resource_type,
            Column::Themes => &mut self.themes,
            Column::GeographicRegion => &mut self.region,
            Column::Language => &mut self.language,
            Column::Producer => &mut self.producer,
            Column::Country => &mut self.country,
            Column::AdminLevel => &mut self.admin_level,
            Column::UnitAnalysis => &mut self.unit_analysis,
            Column::Longitudinal => &mut self.longitudinal,
            Column::Restrictions => &mut self.restrictions,
            Column::Subjects => &mut self.subjects,
            _ => return None,
        })
    }

    /// Filter choices for a column, always led by the `"All"` sentinel.
    pub fn choices(&self, column: Column) -> Vec<String> {
        std::iter::once(ALL.to_string())
            .chain(self.values(column).iter().filter(|v| *v != ALL).cloned())
            .collect()
    }

    /// All choice lists keyed by column header name.
    pub fn choice_lists(&self) -> BTreeMap<&'static str, Vec<String>> {
        Self::COLUMNS
            .into_iter()
            .map(|c| (c.label(), self.choices(c)))
            .collect()
    }

    /// Builds vocabularies from the distinct non-null values in the store, sorted.
    /// Theme values are split on `theme_delimiter` since one cell may hold several tags.
    pub fn derive(store: &DatasetStore, theme_delimiter: &str) -> Self {
        let mut vocab = Self::default();
        for column in Self::COLUMNS {
            let mut seen: BTreeSet<String> = BTreeSet::new();
            for r in store.records() {
                let Some(v) = column.text(r) else { continue };
                if column == Column::Themes && !theme_delimiter.is_empty() {
                    seen.extend(
                        v.split(theme_delimiter)
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .map(str::to_string),
                    );
                } else if !v.trim().is_empty() {
                    seen.insert(v.into_owned());
                }
            }
            if let Some(slot) = vocab.values_mut(column) {
                *slot = seen.into_iter().collect();
            }
        }
        vocab
    }

    /// Fills empty lists from `fallback`, leaving curated lists untouched.
    pub fn or_derived(mut self, fallback: Vocabulary) -> Self {
        for column in Self::COLUMNS {
            if self.values(column).is_empty() {
                if let Some(slot) = self.values_mut(column) {
                    *slot = fallback.values(column).to_vec();
                }
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn res(ty: Option<&str>, year: Option<i32>, themes: Option<&str>) -> Resource {
        Resource {
            resource_type: ty.map(String::from),
            pub_date: year,
            themes: themes.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn ids_are_one_based_in_load_order() {
        let store = DatasetStore::new(vec![res(None, None, None), res(None, None, None)]);
        assert_eq!(store.records()[0].id, 1);
        assert_eq!(store.records()[1].id, 2);
        assert_eq!(store.get(2).map(|r| r.id), Some(2));
        assert!(store.get(0).is_none());
        assert!(store.get(3).is_none());
    }

    #[test]
    fn year_bounds_skip_nulls() {
        let store = DatasetStore::new(vec![
            res(None, Some(2010), None),
            res(None, None, None),
            res(None, Some(1995), None),
        ]);
        assert_eq!(store.year_bounds(), Some(YearRange::new(1995, 2010)));
        assert_eq!(DatasetStore::new(vec![]).year_bounds(), None);
        assert!(store.year_range_covers(&YearRange::new(1995, 2010)));
        assert!(!store.year_range_covers(&YearRange::new(1996, 2010)));
        assert!(DatasetStore::new(vec![]).year_range_covers(&YearRange::new(2000, 2001)));
    }

    #[test]
    fn derived_vocabulary_splits_themes_and_sorts() {
        let store = DatasetStore::new(vec![
            res(Some("Survey"), None, Some("Health; Gender")),
            res(Some("Archive"), None, Some("Health")),
            res(None, None, None),
        ]);
        let vocab = Vocabulary::derive(&store, ";");
        assert_eq!(vocab.resource_type, vec!["Archive", "Survey"]);
        assert_eq!(vocab.themes, vec!["Gender", "Health"]);
        assert_eq!(vocab.choices(Column::ResourceType), vec!["All", "Archive", "Survey"]);
    }

    #[test]
    fn choices_never_duplicate_the_sentinel() {
        let vocab = Vocabulary { region: vec!["All".into(), "Europe".into()], ..Default::default() };
        assert_eq!(vocab.choices(Column::GeographicRegion), vec!["All", "Europe"]);
        assert_eq!(vocab.choices(Column::Title), vec!["All"]);
    }

    #[test]
    fn curated_lists_win_over_derived() {
        let curated = Vocabulary { region: vec!["Oceania".into()], ..Default::default() };
        let derived = Vocabulary {
            region: vec!["Europe".into()],
            language: vec!["English".into()],
            ..Default::default()
        };
        let merged = curated.or_derived(derived);
        assert_eq!(merged.region, vec!["Oceania"]);
        assert_eq!(merged.language, vec!["English"]);
    }
}
