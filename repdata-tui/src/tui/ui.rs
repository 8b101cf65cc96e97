use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph,
        Row, Table, TableState, Tabs, Wrap,
    },
};
use crate::tui::app::{App, EditTarget, Editor, FilterField, Focus, Overlay, Picker, StatusLevel, Tab};
use crate::tui::theme::Theme;
use repdata_core::{Column, FrequencyResult, RecordDetail, RecordSummary};

pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    render_topbar(frame, app, chunks[0], theme);
    let sidebar_width = if app.sidebar_visible && area.width >= 80 { app.sidebar_width } else { 0 };
    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
        .split(chunks[1]);
    if sidebar_width > 0 {
        render_sidebar(frame, app, mid[0], theme);
    }
    render_main(frame, app, mid[1], theme);
    render_bottombar(frame, app, chunks[2], theme);
    match &app.overlay {
        Overlay::None => {}
        Overlay::Help => render_help(frame, app, area),
        Overlay::Detail => {
            if let Some(detail) = &app.detail {
                render_detail(frame, detail, area, theme);
            }
        }
        Overlay::Picker(p) => render_picker(frame, p, area, theme),
        Overlay::Editor(ed) => render_editor(frame, ed, area),
    }
}

fn render_topbar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let line = Line::from(vec![
        Span::styled(" Representation in Data ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("| {} | {} of {} resources", app.input_path, app.overview.row_count, app.total_rows())),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let focused = app.focus == Focus::Sidebar;
    let block = Block::default().borders(Borders::ALL).title("Filters")
        .border_style(if focused { Style::default().fg(theme.highlight) } else { Style::default() });
    let value_width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = FilterField::ALL.iter().map(|&field| {
        let value = app.field_value(field);
        let value_style = if value == repdata_core::ALL || value == app.session.placeholder() || value == "-" {
            Style::default().fg(theme.muted)
        } else {
            Style::default().fg(theme.accent)
        };
        ListItem::new(vec![
            Line::from(Span::styled(field.label(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(format!("  {}", truncate(&value, value_width)), value_style)),
        ])
    }).collect();
    let mut state = ListState::default();
    state.select(Some(app.sidebar_selected));
    let list = List::new(items).block(block).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_main(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    let selected = Tab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);
    let tabs = Tabs::new(Tab::ALL.iter().enumerate().map(|(i, t)| format!("{} {}", i + 1, t.title())))
        .select(selected)
        .highlight_style(Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
    frame.render_widget(tabs, chunks[0]);
    match app.tab {
        Tab::Overview => render_overview(frame, app, chunks[1], theme),
        Tab::Explore => render_explore(frame, app, chunks[1], theme),
        Tab::About => render_about(frame, app, chunks[1], theme),
    }
}

fn render_overview(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);
    let count = vec![
        Line::from(Span::styled(
            app.overview.row_count.to_string(),
            Style::default().fg(theme.highlight).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("resources match the current filters ({} total)", app.total_rows())),
    ];
    frame.render_widget(Paragraph::new(count).block(Block::default().borders(Borders::ALL).title("Number of resources")), rows[0]);
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);
    render_frequency_table(frame, &app.overview.top_resource_types, panes[0], "Top resource types", theme);
    render_region_chart(frame, &app.overview.top_regions, panes[1], theme);
}

fn render_frequency_table(frame: &mut Frame, freq: &FrequencyResult, area: Rect, title: &str, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    if freq.top_values.is_empty() {
        frame.render_widget(Paragraph::new("No resources match.").block(block), area);
        return;
    }
    let header = Row::new(["Value", "Count", "%"].map(|h| Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))));
    let rows: Vec<Row> = freq.top_values.iter().map(|e| {
        Row::new([
            Cell::from(e.value.clone()),
            Cell::from(e.count.to_string()).style(Style::default().fg(theme.accent)),
            Cell::from(format!("{:.1}", e.percentage)),
        ])
    }).collect();
    let table = Table::new(rows, [Constraint::Min(20), Constraint::Length(8), Constraint::Length(6)])
        .header(header).block(block);
    frame.render_widget(table, area);
}

fn render_region_chart(frame: &mut Frame, freq: &FrequencyResult, area: Rect, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title("Regional distribution (top 10)");
    if freq.top_values.is_empty() {
        frame.render_widget(Paragraph::new("No regional data.").block(block), area);
        return;
    }
    let label_width = area.width.saturating_sub(4) as usize / 3;
    let bars: Vec<Bar> = freq.proportions().into_iter().enumerate().map(|(i, (region, share))| {
        let pct = (share * 100.0).round() as u64;
        Bar::default()
            .value(pct)
            .text_value(format!("{pct}%"))
            .label(Line::from(truncate(region, label_width)))
            .style(Style::default().fg(theme.bar_color(i)))
    }).collect();
    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(100)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn render_explore(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let focused = app.focus == Focus::Main;
    let grid = app.session.grid();
    let columns = grid.columns();
    let target = columns.get(app.grid_column % columns.len().max(1)).copied();
    let active: Vec<String> = columns.iter()
        .filter_map(|&c| grid.column_filter(c).map(|f| format!("{}~{f}", c.display_name())))
        .collect();
    let title = if active.is_empty() {
        format!("Resources ({})", app.rows.len())
    } else {
        format!("Resources ({}) [{}]", app.rows.len(), active.join(" "))
    };
    let block = Block::default().borders(Borders::ALL).title(title)
        .border_style(if focused { Style::default().fg(theme.highlight) } else { Style::default() });
    let header = Row::new(columns.iter().map(|&c| {
        let style = if Some(c) == target && focused {
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED).fg(theme.highlight)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        Cell::from(c.display_name()).style(style)
    }));
    let rows: Vec<Row> = app.rows.iter().map(|r| {
        Row::new(columns.iter().map(|&c| Cell::from(truncate(&summary_cell(r, c), 40))))
    }).collect();
    let widths: Vec<Constraint> = columns.iter().map(|&c| match c {
        Column::Id | Column::PubDate => Constraint::Length(6),
        Column::Title => Constraint::Min(24),
        _ => Constraint::Min(12),
    }).collect();
    let mut state = TableState::default();
    if !app.rows.is_empty() {
        state.select(Some(app.grid_cursor));
    }
    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_about(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let store = app.session.store();
    let years = store.year_bounds().map(|b| b.to_string()).unwrap_or_else(|| "none".into());
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled("Representation in Data", bold.fg(theme.highlight))),
        Line::from("A catalogue of data resources (surveys, datasets, archives) describing"),
        Line::from("who is represented in data. Filter from the sidebar, browse and export"),
        Line::from("matching resources from the Explore tab."),
        Line::from(""),
        Line::from(vec![Span::styled("Dataset:     ", bold), Span::raw(app.input_path.clone())]),
        Line::from(format!("Resources:   {}", store.len())),
        Line::from(format!("Published:   {years}")),
        Line::from(format!("Export path: {}", app.config.export_path().display())),
        Line::from(""),
        Line::from(Span::styled("Vocabularies:", bold)),
    ];
    for (label, choices) in app.vocabulary.choice_lists() {
        // the leading entry is the "All" sentinel
        lines.push(Line::from(format!("  {:<18} {} values", label, choices.len().saturating_sub(1))));
    }
    frame.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("About")).wrap(Wrap { trim: false }), area);
}

fn render_detail(frame: &mut Frame, detail: &RecordDetail, area: Rect, theme: &Theme) {
    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(detail.title.clone().unwrap_or_else(|| "(untitled)".into()), bold.fg(theme.highlight))),
    ];
    for group in &detail.groups {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(group.label.clone(), bold)));
        for field in &group.fields {
            let value = field.value.clone().unwrap_or_else(|| "-".into());
            let style = if field.column == Column::Url { Style::default().fg(theme.link).add_modifier(Modifier::UNDERLINED) } else { Style::default() };
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<20}", field.column.display_name()), Style::default().fg(theme.muted)),
                Span::styled(value, style),
            ]));
        }
    }
    let title = format!("Resource #{} (Esc close, j/k next)", detail.id);
    frame.render_widget(Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title)).wrap(Wrap { trim: false }), popup);
}

fn render_picker(frame: &mut Frame, p: &Picker, area: Rect, theme: &Theme) {
    let popup = centered_rect(40, 60, area);
    frame.render_widget(Clear, popup);
    let items: Vec<ListItem> = p.options.iter().map(|o| {
        if p.field.is_multi() {
            let mark = if p.selection.is_selected(o) { "[x]" } else { "[ ]" };
            ListItem::new(format!("{mark} {o}"))
        } else {
            ListItem::new(o.clone())
        }
    }).collect();
    let hint = if p.field.is_multi() { "Space toggle, Enter apply" } else { "Enter apply" };
    let mut state = ListState::default();
    state.select(Some(p.cursor));
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("{} ({hint})", p.field.label())).border_style(Style::default().fg(theme.highlight)))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, popup, &mut state);
}

fn render_editor(frame: &mut Frame, ed: &Editor, area: Rect) {
    let popup = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup);
    let (title, hint) = match ed.target {
        EditTarget::Field(FilterField::FreeText) => ("Search all fields".to_string(), "Case-sensitive substring; empty clears"),
        EditTarget::Field(f) => (f.label().to_string(), "Year; empty resets to the data's bound"),
        EditTarget::GridColumn(c) => (format!("Grid filter: {}", c.display_name()), "Case-insensitive substring; empty clears"),
    };
    let content = format!("> {}_\n\n{hint}\nEnter apply, Esc cancel", ed.buffer);
    frame.render_widget(
        Paragraph::new(content)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false }),
        popup,
    );
}

fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let text = vec![
        Line::from(Span::styled("Keybindings", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  q        Quit"),
        Line::from("  ?        Toggle help"),
        Line::from("  Tab      Cycle focus (filters / main)"),
        Line::from("  t, 1-3   Switch tab"),
        Line::from("  T        Next colour theme (saved to config)"),
        Line::from("  `        Toggle sidebar"),
        Line::from("  [ ]      Resize sidebar"),
        Line::from("  j/k      Navigate"),
        Line::from("  Enter    Edit filter / open resource"),
        Line::from("  Space    Toggle option in multi-select"),
        Line::from("  h/l      Pick grid column"),
        Line::from("  /        Filter grid column"),
        Line::from("  r        Reset all filters"),
        Line::from("  e        Export grid to CSV"),
        Line::from("  Esc      Close popup"),
    ];
    let popup = centered_rect(50, 70, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(text)
            .block(Block::default().borders(Borders::ALL).title("Help (?)"))
            .scroll((app.help_scroll as u16, 0)),
        popup,
    );
}

fn render_bottombar(frame: &mut Frame, app: &App, area: Rect, theme: &Theme) {
    let status_color = match app.status_level {
        StatusLevel::Info => theme.fg,
        StatusLevel::Success => theme.success,
        StatusLevel::Warning => theme.warning,
    };
    let line = Line::from(vec![
        Span::styled(format!(" {}", app.status_msg), Style::default().fg(status_color)),
        Span::raw(format!(" | where {} | q:quit ?:help Tab:focus t:tab e:export r:reset", app.predicate_text)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg).fg(theme.fg)), area);
}

fn summary_cell(r: &RecordSummary, col: Column) -> String {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    match col {
        Column::Id => r.id.to_string(),
        Column::Title => text(&r.title),
        Column::ResourceType => text(&r.resource_type),
        Column::PubDate => r.pub_date.map(|y| y.to_string()).unwrap_or_default(),
        Column::GeographicRegion => text(&r.geographic_region),
        Column::Language => text(&r.language),
        Column::Themes => text(&r.themes),
        Column::Subjects => text(&r.subjects),
        _ => String::new(),
    }
}

fn centered_rect(px: u16, py: u16, r: Rect) -> Rect {
    let v = Layout::default().direction(Direction::Vertical).constraints([Constraint::Percentage((100-py)/2), Constraint::Percentage(py), Constraint::Percentage((100-py)/2)]).split(r);
    Layout::default().direction(Direction::Horizontal).constraints([Constraint::Percentage((100-px)/2), Constraint::Percentage(px), Constraint::Percentage((100-px)/2)]).split(v[1])[1]
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max { s.to_owned() } else { format!("{}\u{2026}", s.chars().take(max.saturating_sub(1)).collect::<String>()) }
}
