use crate::criteria::{Choice, FilterCriteria, MultiChoice, TextQuery, YearRange};
use crate::record::{Column, Resource};
use crate::store::DatasetStore;
use std::collections::BTreeSet;
use std::fmt;

// --- clauses ---

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// non-null and contains `needle` (single-select; composite cells hold several tags)
    Contains { col: Column, needle: String },
    /// non-null and exactly one of `vals` (multi-select)
    OneOf { col: Column, vals: BTreeSet<String> },
    /// null or inside the inclusive range
    YearWithin(YearRange),
    /// some field of the row contains `needle`, case-sensitive, literal
    AnyField(String),
}

impl Clause {
    pub fn matches(&self, row: &Resource) -> bool {
        match self {
            Clause::Contains { col, needle } => col
                .text(row)
                .map(|v| v.contains(needle.as_str()))
                .unwrap_or(false),
            Clause::OneOf { col, vals } => col
                .text(row)
                .map(|v| vals.contains(v.as_ref()))
                .unwrap_or(false),
            Clause::YearWithin(range) => row.pub_date.map_or(true, |y| range.contains(y)),
            Clause::AnyField(needle) => searchable()
                .filter_map(|c| c.text(row))
                .any(|v| v.contains(needle.as_str())),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Contains { col, needle } => write!(f, "{col} LIKE '%{needle}%'"),
            Clause::OneOf { col, vals } => {
                let list: Vec<String> = vals.iter().map(|v| format!("'{v}'")).collect();
                write!(f, "{col} IN ({})", list.join(", "))
            }
            Clause::YearWithin(r) => write!(f, "PubDate IN {r} OR PubDate IS NULL"),
            Clause::AnyField(needle) => write!(f, "ANY FIELD LIKE '%{needle}%'"),
        }
    }
}

/// Fields scanned by free-text search: every data column, not the load-assigned id.
fn searchable() -> impl Iterator<Item = Column> {
    Column::ALL.into_iter().filter(|c| *c != Column::Id)
}

// --- compiled conjunction ---

/// Conjunction of clauses compiled from one criteria snapshot.
/// Unrestricted criteria contribute no clause; free text always sorts last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowPredicate {
    clauses: Vec<Clause>,
}

impl RowPredicate {
    pub fn compile(criteria: &FilterCriteria) -> Self {
        let mut clauses = Vec::new();
        if let Choice::Only(needle) = &criteria.resource_type {
            clauses.push(Clause::Contains { col: Column::ResourceType, needle: needle.clone() });
        }
        if let Choice::Only(needle) = &criteria.theme {
            clauses.push(Clause::Contains { col: Column::Themes, needle: needle.clone() });
        }
        if let MultiChoice::AnyOf(vals) = &criteria.regions {
            clauses.push(Clause::OneOf { col: Column::GeographicRegion, vals: vals.clone() });
        }
        if let MultiChoice::AnyOf(vals) = &criteria.languages {
            clauses.push(Clause::OneOf { col: Column::Language, vals: vals.clone() });
        }
        if !criteria.pub_years.is_unbounded() {
            clauses.push(Clause::YearWithin(criteria.pub_years));
        }
        // full-row scan, keep it behind the cheap clauses for short-circuiting
        if let TextQuery::Contains(q) = &criteria.free_text {
            clauses.push(Clause::AnyField(q.clone()));
        }
        Self { clauses }
    }

    /// Compiles against a concrete store, dropping a year clause that cannot
    /// exclude any of its rows.
    pub fn for_store(store: &DatasetStore, criteria: &FilterCriteria) -> Self {
        let mut compiled = Self::compile(criteria);
        compiled.clauses.retain(|c| !matches!(c, Clause::YearWithin(r) if store.year_range_covers(r)));
        compiled
    }

    pub fn matches(&self, row: &Resource) -> bool {
        self.clauses.iter().all(|c| c.matches(row))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_trivial(&self) -> bool {
        self.clauses.is_empty()
    }
}

impl fmt::Display for RowPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("TRUE");
        }
        for (i, c) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "({c})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Resource {
        Resource {
            id: 1,
            title: Some("National LGBT Survey (2017)".into()),
            resource_type: Some("Survey; Dataset".into()),
            pub_date: Some(2017),
            geographic_region: Some("Europe".into()),
            language: None,
            themes: Some("Health;Identity".into()),
            ..Default::default()
        }
    }

    fn criteria() -> FilterCriteria {
        FilterCriteria::default()
    }

    #[test]
    fn default_criteria_compile_to_nothing() {
        let p = RowPredicate::compile(&criteria());
        assert!(p.is_trivial());
        assert!(p.matches(&Resource::default()));
        assert_eq!(p.to_string(), "TRUE");
    }

    #[test]
    fn single_select_is_substring_and_rejects_null() {
        let mut c = criteria();
        c.set_resource_type("Dataset");
        let p = RowPredicate::compile(&c);
        assert!(p.matches(&row()));
        assert!(!p.matches(&Resource::default()));
        c.set_resource_type("Archive");
        assert!(!RowPredicate::compile(&c).matches(&row()));
        c.set_resource_type("All");
        c.set_theme("Identity");
        assert!(RowPredicate::compile(&c).matches(&row()));
    }

    #[test]
    fn multi_select_is_exact_membership() {
        let mut c = criteria();
        c.set_regions(["Eur"]);
        assert!(!RowPredicate::compile(&c).matches(&row()));
        c.set_regions(["Europe", "Asia"]);
        assert!(RowPredicate::compile(&c).matches(&row()));
        c.set_languages(["English"]);
        // null language with a restricted language filter
        assert!(!RowPredicate::compile(&c).matches(&row()));
    }

    #[test]
    fn null_year_passes_any_range() {
        let mut c = criteria();
        c.set_pub_years(2000, 2010);
        let p = RowPredicate::compile(&c);
        assert!(!p.matches(&row()));
        assert!(p.matches(&Resource { pub_date: None, ..row() }));
        assert!(p.matches(&Resource { pub_date: Some(2010), ..row() }));
        assert!(p.matches(&Resource { pub_date: Some(2000), ..row() }));
    }

    #[test]
    fn free_text_is_literal_and_case_sensitive() {
        let mut c = criteria();
        c.set_free_text("(2017)", "Enter text...");
        assert!(RowPredicate::compile(&c).matches(&row()));
        c.set_free_text(".*", "Enter text...");
        assert!(!RowPredicate::compile(&c).matches(&row()));
        c.set_free_text("national", "Enter text...");
        assert!(!RowPredicate::compile(&c).matches(&row()));
        c.set_free_text("2017", "Enter text...");
        assert!(RowPredicate::compile(&c).matches(&Resource { title: None, ..row() }));
    }

    #[test]
    fn free_text_ignores_the_row_id() {
        let mut c = criteria();
        c.set_free_text("42", "Enter text...");
        assert!(!RowPredicate::compile(&c).matches(&Resource { id: 42, ..Default::default() }));
    }

    #[test]
    fn free_text_clause_is_last() {
        let mut c = criteria();
        c.set_free_text("x", "Enter text...");
        c.set_regions(["Europe"]);
        c.set_resource_type("Survey");
        let p = RowPredicate::compile(&c);
        assert_eq!(p.clauses().len(), 3);
        assert!(matches!(p.clauses().last(), Some(Clause::AnyField(_))));
        assert_eq!(
            p.to_string(),
            "(ResourceType LIKE '%Survey%') AND (GeographicRegion IN ('Europe')) AND (ANY FIELD LIKE '%x%')"
        );
    }

    #[test]
    fn full_observed_range_is_dropped_for_store() {
        let store = DatasetStore::new(vec![
            Resource { pub_date: Some(1990), ..Default::default() },
            Resource { pub_date: Some(2020), ..Default::default() },
        ]);
        let mut c = FilterCriteria::for_store(&store);
        assert_eq!(RowPredicate::compile(&c).clauses().len(), 1);
        assert!(RowPredicate::for_store(&store, &c).is_trivial());
        c.set_pub_years(1991, 2020);
        assert_eq!(
            RowPredicate::for_store(&store, &c).clauses(),
            &[Clause::YearWithin(YearRange::new(1991, 2020))]
        );
    }

    #[test]
    fn searchable_columns_exclude_only_id() {
        let cols: Vec<Column> = searchable().collect();
        assert_eq!(cols.len(), Column::ALL.len() - 1);
        assert!(!cols.contains(&Column::Id));
        assert!(cols.contains(&Column::PubDate));
    }
}
