use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub type RecordId = u32;

/// One row of the resource dataset. Every attribute except `id` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: RecordId,
    pub title: Option<String>,
    pub resource_type: Option<String>,
    pub pub_date: Option<i32>,
    pub geographic_region: Option<String>,
    pub language: Option<String>,
    pub themes: Option<String>,
    pub subjects: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub collect_date_start: Option<String>,
    pub collect_date_end: Option<String>,
    pub time_span: Option<String>,
    pub longitudinal: Option<String>,
    pub country: Option<String>,
    pub admin_level: Option<String>,
    pub data_method_type: Option<String>,
    pub unit_analysis: Option<String>,
    pub producer: Option<String>,
    pub distributor: Option<String>,
    pub restrictions: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Id,
    Title,
    ResourceType,
    PubDate,
    GeographicRegion,
    Language,
    Themes,
    Subjects,
    Description,
    Url,
    CollectDateStart,
    CollectDateEnd,
    TimeSpan,
    Longitudinal,
    Country,
    AdminLevel,
    DataMethodType,
    UnitAnalysis,
    Producer,
    Distributor,
    Restrictions,
    Notes,
}

impl Column {
    pub const ALL: [Column; 22] = [
        Column::Id,
        Column::Title,
        Column::ResourceType,
        Column::PubDate,
        Column::GeographicRegion,
        Column::Language,
        Column::Themes,
        Column::Subjects,
        Column::Description,
        Column::Url,
        Column::CollectDateStart,
        Column::CollectDateEnd,
        Column::TimeSpan,
        Column::Longitudinal,
        Column::Country,
        Column::AdminLevel,
        Column::DataMethodType,
        Column::UnitAnalysis,
        Column::Producer,
        Column::Distributor,
        Column::Restrictions,
        Column::Notes,
    ];

    /// Columns shown in the resource grid and written by the CSV export.
    pub const GRID: [Column; 8] = [
        Column::Id,
        Column::Title,
        Column::ResourceType,
        Column::PubDate,
        Column::GeographicRegion,
        Column::Language,
        Column::Themes,
        Column::Subjects,
    ];

    /// Dataset header name.
    pub fn label(self) -> &'static str {
        match self {
            Column::Id => "Id",
            Column::Title => "Title",
            Column::ResourceType => "ResourceType",
            Column::PubDate => "PubDate",
            Column::GeographicRegion => "GeographicRegion",
            Column::Language => "Language",
            Column::Themes => "Themes",
            Column::Subjects => "Subjects",
            Column::Description => "Description",
            Column::Url => "URL",
            Column::CollectDateStart => "CollectDateStart",
            Column::CollectDateEnd => "CollectDateEnd",
            Column::TimeSpan => "TimeSpan",
            Column::Longitudinal => "Longitudinal",
            Column::Country => "Country",
            Column::AdminLevel => "AdminLevel",
            Column::DataMethodType => "DataMethodType",
            Column::UnitAnalysis => "UnitAnalysis",
            Column::Producer => "Producer",
            Column::Distributor => "Distributor",
            Column::Restrictions => "Restrictions",
            Column::Notes => "Notes",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Column::ResourceType => "Resource Type",
            Column::PubDate => "Publication Year",
            Column::GeographicRegion => "Region",
            Column::CollectDateStart => "Collection Start",
            Column::CollectDateEnd => "Collection End",
            Column::TimeSpan => "Time Span",
            Column::AdminLevel => "Admin Level",
            Column::DataMethodType => "Methods",
            Column::UnitAnalysis => "Unit of Analysis",
            other => other.label(),
        }
    }

    /// Case-insensitive lookup by header name; underscores and spaces are ignored.
    pub fn from_label(name: &str) -> Option<Column> {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '_' && *c != ' ')
            .collect::<String>()
            .to_ascii_lowercase();
        Column::ALL
            .into_iter()
            .find(|c| c.label().to_ascii_lowercase() == wanted)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Column::Id | Column::PubDate)
    }

    /// The row's value for this column rendered as text, `None` when null.
    pub fn text(self, r: &Resource) -> Option<Cow<'_, str>> {
        let s = match self {
            Column::Id => return Some(Cow::Owned(r.id.to_string())),
            Column::PubDate => return r.pub_date.map(|y| Cow::Owned(y.to_string())),
            Column::Title => &r.title,
            Column::ResourceType => &r.resource_type,
            Column::GeographicRegion => &r.geographic_region,
            Column::Language => &r.language,
            Column::Themes => &r.themes,
            Column::Subjects => &r.subjects,
            Column::Description => &r.description,
            Column::Url => &r.url,
            Column::CollectDateStart => &r.collect_date_start,
            Column::CollectDateEnd => &r.collect_date_end,
            Column::TimeSpan => &r.time_span,
            Column::Longitudinal => &r.longitudinal,
            Column::Country => &r.country,
            Column::AdminLevel => &r.admin_level,
            Column::DataMethodType => &r.data_method_type,
            Column::UnitAnalysis => &r.unit_analysis,
            Column::Producer => &r.producer,
            Column::Distributor => &r.distributor,
            Column::Restrictions => &r.restrictions,
            Column::Notes => &r.notes,
        };
        s.as_deref().map(Cow::Borrowed)
    }

    pub(crate) fn slot(self, r: &mut Resource) -> Option<&mut Option<String>> {
        Some(match self {
            Column::Id | Column::PubDate => return None,
            Column::Title => &mut r.title,
            Column::ResourceType => &mut r.resource_type,
            Column::GeographicRegion => &mut r.geographic_region,
            Column::Language => &mut r.language,
            Column::Themes => &mut r.themes,
            Column::Subjects => &mut r.subjects,
            Column::Description => &mut r.description,
            Column::Url => &mut r.url,
            Column::CollectDateStart => &mut r.collect_date_start,
            Column::CollectDateEnd => &mut r.collect_date_end,
            Column::TimeSpan => &mut r.time_span,
            Column::Longitudinal => &mut r.longitudinal,
            Column::Country => &mut r.country,
            Column::AdminLevel => &mut r.admin_level,
            Column::DataMethodType => &mut r.data_method_type,
            Column::UnitAnalysis => &mut r.unit_analysis,
            Column::Producer => &mut r.producer,
            Column::Distributor => &mut r.distributor,
            Column::Restrictions => &mut r.restrictions,
            Column::Notes => &mut r.notes,
        })
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The grid-facing projection of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub id: RecordId,
    pub title: Option<String>,
    pub resource_type: Option<String>,
    pub pub_date: Option<i32>,
    pub geographic_region: Option<String>,
    pub language: Option<String>,
    pub themes: Option<String>,
    pub subjects: Option<String>,
}

impl From<&Resource> for RecordSummary {
    fn from(r: &Resource) -> Self {
        Self {
            id: r.id,
            title: r.title.clone(),
            resource_type: r.resource_type.clone(),
            pub_date: r.pub_date,
            geographic_region: r.geographic_region.clone(),
            language: r.language.clone(),
            themes: r.themes.clone(),
            subjects: r.subjects.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_label_is_forgiving() {
        assert_eq!(Column::from_label("ResourceType"), Some(Column::ResourceType));
        assert_eq!(Column::from_label("resource_type"), Some(Column::ResourceType));
        assert_eq!(Column::from_label("url"), Some(Column::Url));
        assert_eq!(Column::from_label("Geographic Region"), Some(Column::GeographicRegion));
        assert_eq!(Column::from_label("bogus"), None);
    }

    #[test]
    fn text_renders_nulls_as_none() {
        let r = Resource { id: 7, pub_date: Some(2004), ..Default::default() };
        assert_eq!(Column::Id.text(&r).as_deref(), Some("7"));
        assert_eq!(Column::PubDate.text(&r).as_deref(), Some("2004"));
        assert_eq!(Column::Title.text(&r), None);
    }

    #[test]
    fn every_text_column_has_a_slot() {
        let mut r = Resource::default();
        for c in Column::ALL.into_iter().filter(|c| !c.is_numeric()) {
            *c.slot(&mut r).unwrap() = Some(c.label().to_string());
        }
        for c in Column::ALL.into_iter().filter(|c| !c.is_numeric()) {
            assert_eq!(c.text(&r).as_deref(), Some(c.label()));
        }
    }
}
