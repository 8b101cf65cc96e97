use crate::tui::theme::Theme;
use repdata_common::Config;
use repdata_core::{
    write_export, Column, Dataset, ExplorerSession, MultiChoice, Overview, RecordDetail,
    RecordSummary, Vocabulary, ALL,
};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Explore,
    About,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Explore, Tab::About];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Explore => "Explore Resources",
            Tab::About => "About",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Overview => Tab::Explore,
            Tab::Explore => Tab::About,
            Tab::About => Tab::Overview,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    Sidebar,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    ResourceType,
    Theme,
    Regions,
    Languages,
    YearFrom,
    YearTo,
    FreeText,
}

impl FilterField {
    pub const ALL: [FilterField; 7] = [
        FilterField::ResourceType,
        FilterField::Theme,
        FilterField::Regions,
        FilterField::Languages,
        FilterField::YearFrom,
        FilterField::YearTo,
        FilterField::FreeText,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::ResourceType => "Resource type",
            FilterField::Theme => "Theme",
            FilterField::Regions => "Regions",
            FilterField::Languages => "Languages",
            FilterField::YearFrom => "Published from",
            FilterField::YearTo => "Published to",
            FilterField::FreeText => "Search",
        }
    }

    /// Vocabulary column behind a picker field.
    pub fn column(self) -> Option<Column> {
        match self {
            FilterField::ResourceType => Some(Column::ResourceType),
            FilterField::Theme => Some(Column::Themes),
            FilterField::Regions => Some(Column::GeographicRegion),
            FilterField::Languages => Some(Column::Language),
            _ => None,
        }
    }

    pub fn is_multi(self) -> bool {
        matches!(self, FilterField::Regions | FilterField::Languages)
    }
}

pub struct Picker {
    pub field: FilterField,
    pub options: Vec<String>,
    pub cursor: usize,
    pub selection: MultiChoice, // multi-select fields only
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditTarget {
    Field(FilterField),
    GridColumn(Column),
}

pub struct Editor {
    pub target: EditTarget,
    pub buffer: String,
}

/// Colours the status message in the bottom bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
}

pub enum Overlay {
    None,
    Help,
    Detail,
    Picker(Picker),
    Editor(Editor),
}

pub struct App {
    pub input_path: String,
    pub session: ExplorerSession,
    pub vocabulary: Arc<Vocabulary>,
    pub config: Config,
    pub theme: Theme,
    pub tab: Tab,
    pub focus: Focus,
    pub overlay: Overlay,
    pub sidebar_selected: usize,
    pub sidebar_width: u16, // runtime-adjustable, clamped 24..=60
    pub sidebar_visible: bool,
    pub grid_cursor: usize,
    pub grid_column: usize, // column targeted by grid filter edits
    pub help_scroll: usize,
    pub status_msg: String,
    pub status_level: StatusLevel,
    pub should_quit: bool,
    // refreshed from the session after every change
    pub overview: Arc<Overview>,
    pub rows: Vec<RecordSummary>,
    pub predicate_text: String,
    pub detail: Option<RecordDetail>,
    dirty: bool,
}

impl App {
    pub fn new(input_path: String, dataset: Dataset, config: Config) -> Self {
        let sidebar_width = config.display.sidebar_width.unwrap_or(34);
        let session = ExplorerSession::new(Arc::clone(&dataset.store), &config.filter);
        let mut app = Self {
            input_path,
            session,
            vocabulary: dataset.vocabulary,
            theme: Theme::from_name(&config.display.theme),
            config,
            tab: Tab::Overview,
            focus: Focus::Sidebar,
            overlay: Overlay::None,
            sidebar_selected: 0,
            sidebar_width,
            sidebar_visible: true,
            grid_cursor: 0,
            grid_column: 0,
            help_scroll: 0,
            status_msg: String::from("Ready | q:quit ?:help"),
            status_level: StatusLevel::Info,
            should_quit: false,
            overview: Arc::new(Overview::default()),
            rows: Vec::new(),
            predicate_text: String::new(),
            detail: None,
            dirty: true,
        };
        app.refresh();
        app
    }

    pub fn mark_changed(&mut self) {
        self.dirty = true;
    }

    /// Pulls the derived outputs from the session; a no-op unless something changed.
    pub fn refresh(&mut self) {
        if !self.dirty {
            return;
        }
        self.overview = self.session.overview();
        self.rows = self.session.grid_rows();
        self.predicate_text = self.session.predicate().to_string();
        self.grid_cursor = self.grid_cursor.min(self.rows.len().saturating_sub(1));
        self.detail = self.session.detail();
        if self.detail.is_none() && matches!(self.overlay, Overlay::Detail) {
            self.overlay = Overlay::None;
        }
        self.dirty = false;
    }

    pub fn total_rows(&self) -> usize {
        self.session.store().len()
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Main,
            Focus::Main => Focus::Sidebar,
        };
    }

    pub fn sidebar_down(&mut self) {
        if self.sidebar_selected + 1 < FilterField::ALL.len() {
            self.sidebar_selected += 1;
        }
    }

    pub fn sidebar_up(&mut self) {
        self.sidebar_selected = self.sidebar_selected.saturating_sub(1);
    }

    pub fn selected_field(&self) -> FilterField {
        FilterField::ALL[self.sidebar_selected.min(FilterField::ALL.len() - 1)]
    }

    /// Current value of a sidebar field as shown to the user.
    pub fn field_value(&self, field: FilterField) -> String {
        let c = self.session.criteria();
        let year = |y: i32| {
            if y == i32::MIN || y == i32::MAX {
                "-".to_string()
            } else {
                y.to_string()
            }
        };
        match field {
            FilterField::ResourceType => c.resource_type.as_input().to_string(),
            FilterField::Theme => c.theme.as_input().to_string(),
            FilterField::Regions => c.regions.values().join(", "),
            FilterField::Languages => c.languages.values().join(", "),
            FilterField::YearFrom => year(c.pub_years.min),
            FilterField::YearTo => year(c.pub_years.max),
            FilterField::FreeText => match c.free_text.as_str() {
                "" => self.session.placeholder().to_string(),
                q => q.to_string(),
            },
        }
    }

    /// Opens the picker or text editor for the highlighted sidebar field.
    pub fn activate_field(&mut self) {
        let field = self.selected_field();
        let Some(column) = field.column() else {
            let years = self.session.criteria().pub_years;
            let bound = |y: i32| if y == i32::MIN || y == i32::MAX { String::new() } else { y.to_string() };
            let buffer = match field {
                FilterField::FreeText => self.session.criteria().free_text.as_str().to_string(),
                FilterField::YearFrom => bound(years.min),
                _ => bound(years.max),
            };
            self.overlay = Overlay::Editor(Editor { target: EditTarget::Field(field), buffer });
            return;
        };
        let options = self.vocabulary.choices(column);
        let criteria = self.session.criteria();
        let selection = match field {
            FilterField::Regions => criteria.regions.clone(),
            FilterField::Languages => criteria.languages.clone(),
            _ => MultiChoice::All,
        };
        let current = self.field_value(field);
        let cursor = if field.is_multi() {
            0
        } else {
            options.iter().position(|o| *o == current).unwrap_or(0)
        };
        self.overlay = Overlay::Picker(Picker { field, options, cursor, selection });
    }

    pub fn picker_move(&mut self, delta: isize) {
        if let Overlay::Picker(p) = &mut self.overlay {
            let last = p.options.len().saturating_sub(1);
            p.cursor = p.cursor.saturating_add_signed(delta).min(last);
        }
    }

    pub fn picker_toggle(&mut self) {
        if let Overlay::Picker(p) = &mut self.overlay {
            if let (true, Some(opt)) = (p.field.is_multi(), p.options.get(p.cursor)) {
                p.selection = p.selection.toggled(opt);
            }
        }
    }

    /// Applies the picker: the highlighted option for single-select fields, the
    /// toggled set for multi-select ones.
    pub fn picker_confirm(&mut self) {
        let Overlay::Picker(p) = std::mem::replace(&mut self.overlay, Overlay::None) else {
            return;
        };
        let changed = match p.field {
            FilterField::ResourceType | FilterField::Theme => {
                let value = p.options.get(p.cursor).map(String::as_str).unwrap_or(ALL);
                if p.field == FilterField::ResourceType {
                    self.session.set_resource_type(value)
                } else {
                    self.session.set_theme(value)
                }
            }
            FilterField::Regions => self.session.set_regions(p.selection.values()),
            FilterField::Languages => self.session.set_languages(p.selection.values()),
            _ => false,
        };
        if changed {
            self.after_filter_change();
        }
    }

    /// Opens the grid filter editor for the targeted grid column.
    pub fn edit_grid_filter(&mut self) {
        let columns = self.session.grid().columns();
        let Some(&column) = columns.get(self.grid_column % columns.len().max(1)) else {
            return;
        };
        let buffer = self.session.grid().column_filter(column).unwrap_or_default().to_string();
        self.overlay = Overlay::Editor(Editor { target: EditTarget::GridColumn(column), buffer });
    }

    pub fn cycle_grid_column(&mut self, forward: bool) {
        let n = self.session.grid().columns().len().max(1);
        self.grid_column = if forward { (self.grid_column + 1) % n } else { (self.grid_column + n - 1) % n };
    }

    pub fn editor_confirm(&mut self) {
        let Overlay::Editor(ed) = std::mem::replace(&mut self.overlay, Overlay::None) else {
            return;
        };
        // the search is a literal substring, so only the other targets are trimmed
        let text = ed.buffer.trim();
        let changed = match ed.target {
            EditTarget::Field(FilterField::FreeText) => self.session.set_free_text(&ed.buffer),
            EditTarget::Field(field @ (FilterField::YearFrom | FilterField::YearTo)) => {
                match self.parse_year_input(field, text) {
                    Ok(changed) => changed,
                    Err(msg) => {
                        self.set_status(StatusLevel::Warning, msg);
                        return;
                    }
                }
            }
            EditTarget::Field(_) => false,
            EditTarget::GridColumn(column) => self.session.set_grid_filter(column, text),
        };
        if changed {
            self.after_filter_change();
        }
    }

    fn parse_year_input(&mut self, field: FilterField, text: &str) -> Result<bool, String> {
        let current = self.session.criteria().pub_years;
        let bounds = self.session.store().year_bounds().unwrap_or_default();
        let year = if text.is_empty() {
            None
        } else {
            Some(text.parse::<i32>().map_err(|_| format!("Not a year: '{text}'"))?)
        };
        let (min, max) = match field {
            FilterField::YearFrom => (year.unwrap_or(bounds.min), current.max),
            _ => (current.min, year.unwrap_or(bounds.max)),
        };
        if min > max {
            return Err(format!("Published from {min} is after {max}"));
        }
        Ok(self.session.set_pub_years(min, max))
    }

    pub fn reset_filters(&mut self) {
        let a = self.session.reset_criteria();
        let b = self.session.clear_grid_filters();
        if a || b {
            self.after_filter_change();
        }
        self.set_status(StatusLevel::Info, "Filters reset");
    }

    pub fn set_status(&mut self, level: StatusLevel, msg: impl Into<String>) {
        self.status_level = level;
        self.status_msg = msg.into();
    }

    fn after_filter_change(&mut self) {
        self.mark_changed();
        self.refresh();
        let msg = format!("{} of {} resources", self.rows.len(), self.total_rows());
        self.set_status(StatusLevel::Info, msg);
    }

    pub fn grid_down(&mut self, n: usize) {
        self.grid_cursor = (self.grid_cursor + n).min(self.rows.len().saturating_sub(1));
    }

    pub fn grid_up(&mut self, n: usize) {
        self.grid_cursor = self.grid_cursor.saturating_sub(n);
    }

    /// Selects the highlighted grid row and shows its detail card.
    pub fn open_detail(&mut self) {
        if self.session.select_row(self.grid_cursor + 1).is_none() {
            return;
        }
        self.detail = self.session.detail();
        if self.detail.is_some() {
            self.overlay = Overlay::Detail;
        }
    }

    pub fn close_overlay(&mut self) {
        if matches!(self.overlay, Overlay::Detail) {
            self.session.clear_selection();
            self.detail = None;
        }
        self.overlay = Overlay::None;
        self.help_scroll = 0;
    }

    /// Switches to the next palette and persists the choice in the config file.
    pub fn cycle_theme(&mut self) {
        let name = Theme::next_name(&self.config.display.theme);
        self.config.display.theme = name.to_string();
        self.theme = Theme::from_name(name);
        match self.config.save() {
            Ok(()) => self.set_status(StatusLevel::Success, format!("Theme: {name}")),
            Err(e) => {
                warn!("theme not saved: {e}");
                self.set_status(StatusLevel::Warning, format!("Theme: {name} (not saved: {e})"));
            }
        }
    }

    pub fn export_visible(&mut self) {
        let path = self.config.export_path();
        let result = self
            .session
            .export_bytes()
            .and_then(|bytes| write_export(&path, &bytes).map(|_| bytes.len()));
        match result {
            Ok(bytes) => {
                info!(path = %path.display(), rows = self.rows.len(), bytes, "grid exported");
                let msg = format!("Exported {} rows to {}", self.rows.len(), path.display());
                self.set_status(StatusLevel::Success, msg);
            }
            Err(e) => {
                warn!(path = %path.display(), "export failed: {e}");
                self.set_status(StatusLevel::Warning, format!("Export failed: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repdata_core::{DatasetStore, Resource};

    fn app() -> App {
        let rows = vec![
            Resource {
                title: Some("Census".into()),
                resource_type: Some("Survey".into()),
                geographic_region: Some("Europe".into()),
                language: Some("English".into()),
                pub_date: Some(2004),
                ..Default::default()
            },
            Resource {
                title: Some("Atlas".into()),
                resource_type: Some("Dataset".into()),
                geographic_region: Some("Asia".into()),
                language: Some("Hindi".into()),
                pub_date: Some(2012),
                ..Default::default()
            },
        ];
        let store = DatasetStore::new(rows);
        let vocab = Vocabulary::derive(&store, ";");
        App::new("fixture.csv".into(), Dataset::new(store, vocab), Config::default())
    }

    #[test]
    fn single_select_picker_applies_highlighted_option() {
        let mut app = app();
        app.sidebar_selected = 0;
        app.activate_field();
        // options: All, Dataset, Survey
        app.picker_move(2);
        app.picker_confirm();
        assert_eq!(app.field_value(FilterField::ResourceType), "Survey");
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.overview.row_count, 1);
    }

    #[test]
    fn multi_select_picker_toggles() {
        let mut app = app();
        app.sidebar_selected = 2;
        app.activate_field();
        app.picker_move(1); // Asia
        app.picker_toggle();
        app.picker_confirm();
        assert_eq!(app.field_value(FilterField::Regions), "Asia");
        assert_eq!(app.rows[0].title.as_deref(), Some("Atlas"));
    }

    #[test]
    fn year_editor_rejects_garbage_and_applies_years() {
        let mut app = app();
        app.sidebar_selected = 4;
        app.activate_field();
        if let Overlay::Editor(ed) = &mut app.overlay {
            ed.buffer = "20x".into();
        }
        app.editor_confirm();
        assert!(app.status_msg.starts_with("Not a year"));
        assert_eq!(app.rows.len(), 2);

        app.activate_field();
        if let Overlay::Editor(ed) = &mut app.overlay {
            ed.buffer = "2010".into();
        }
        app.editor_confirm();
        assert_eq!(app.field_value(FilterField::YearFrom), "2010");
        assert_eq!(app.rows.len(), 1);
    }

    #[test]
    fn detail_closes_when_row_leaves_the_view() {
        let mut app = app();
        app.open_detail();
        assert!(matches!(app.overlay, Overlay::Detail));
        assert_eq!(app.detail.as_ref().map(|d| d.id), Some(1));
        app.session.set_resource_type("Dataset");
        app.mark_changed();
        app.refresh();
        assert!(app.detail.is_none());
        assert!(matches!(app.overlay, Overlay::None));
    }

    #[test]
    fn placeholder_is_shown_for_empty_search() {
        let app = app();
        assert_eq!(app.field_value(FilterField::FreeText), "Enter text...");
        assert_eq!(app.field_value(FilterField::YearTo), "2012");
    }

    fn confirm_edit(app: &mut App, field: usize, text: &str) {
        app.sidebar_selected = field;
        app.activate_field();
        if let Overlay::Editor(ed) = &mut app.overlay {
            ed.buffer = text.into();
        }
        app.editor_confirm();
    }

    #[test]
    fn search_text_keeps_surrounding_spaces() {
        let rows = vec![
            Resource { title: Some("Transgender".into()), ..Default::default() },
            Resource { title: Some("Trans Survey".into()), ..Default::default() },
        ];
        let store = DatasetStore::new(rows);
        let vocab = Vocabulary::derive(&store, ";");
        let mut app = App::new("fixture.csv".into(), Dataset::new(store, vocab), Config::default());
        confirm_edit(&mut app, 6, "Trans ");
        assert_eq!(app.session.criteria().free_text.as_str(), "Trans ");
        assert_eq!(app.rows.len(), 1);
        assert_eq!(app.rows[0].title.as_deref(), Some("Trans Survey"));
    }

    #[test]
    fn inverted_year_bounds_are_rejected() {
        let mut app = app();
        confirm_edit(&mut app, 5, "2010");
        assert_eq!(app.rows.len(), 1);
        confirm_edit(&mut app, 4, "2030");
        assert!(app.status_msg.starts_with("Published from 2030"));
        assert_eq!(app.status_level, StatusLevel::Warning);
        assert_eq!(app.field_value(FilterField::YearFrom), "2004");
        assert_eq!(app.field_value(FilterField::YearTo), "2010");
    }

    #[test]
    fn negative_year_survives_reopening_the_editor() {
        let mut app = app();
        confirm_edit(&mut app, 4, "-50");
        assert_eq!(app.field_value(FilterField::YearFrom), "-50");
        app.sidebar_selected = 4;
        app.activate_field();
        let Overlay::Editor(ed) = &app.overlay else { panic!("editor not open") };
        assert_eq!(ed.buffer, "-50");
    }
}
