use crate::tui::app::{App, Focus, Overlay, Tab};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }
    match app.overlay {
        Overlay::Editor(_) => return handle_editor(app, key),
        Overlay::Picker(_) => return handle_picker(app, key),
        Overlay::Help => return handle_help(app, key),
        Overlay::Detail => return handle_detail(app, key),
        Overlay::None => {}
    }
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab => {
            app.cycle_focus();
            return;
        }
        KeyCode::Char('?') => {
            app.overlay = Overlay::Help;
            return;
        }
        KeyCode::Char('t') => {
            app.tab = app.tab.next();
            return;
        }
        KeyCode::Char('T') => {
            app.cycle_theme();
            return;
        }
        KeyCode::Char('1') => app.tab = Tab::Overview,
        KeyCode::Char('2') => app.tab = Tab::Explore,
        KeyCode::Char('3') => app.tab = Tab::About,
        KeyCode::Char('`') => {
            app.sidebar_visible = !app.sidebar_visible;
            return;
        }
        KeyCode::Char('r') => {
            app.reset_filters();
            return;
        }
        KeyCode::Char('e') => {
            app.export_visible();
            return;
        }
        _ => {}
    }
    match app.focus {
        Focus::Sidebar => handle_sidebar(app, key),
        Focus::Main => handle_main(app, key),
    }
}

fn handle_sidebar(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('[') => {
            app.sidebar_width = app.sidebar_width.saturating_sub(1).max(24);
        }
        KeyCode::Char(']') => {
            app.sidebar_width = (app.sidebar_width + 1).min(60);
        }
        KeyCode::Char('j') | KeyCode::Down => app.sidebar_down(),
        KeyCode::Char('k') | KeyCode::Up => app.sidebar_up(),
        KeyCode::Enter | KeyCode::Char(' ') => app.activate_field(),
        _ => {}
    }
}

fn handle_main(app: &mut App, key: KeyEvent) {
    if app.tab != Tab::Explore {
        return;
    }
    let page = app.config.display.grid_page_size.max(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.grid_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.grid_up(1),
        KeyCode::PageDown => app.grid_down(page),
        KeyCode::PageUp => app.grid_up(page),
        KeyCode::Home | KeyCode::Char('g') => app.grid_cursor = 0,
        KeyCode::End | KeyCode::Char('G') => app.grid_down(usize::MAX / 2),
        KeyCode::Char('h') | KeyCode::Left => app.cycle_grid_column(false),
        KeyCode::Char('l') | KeyCode::Right => app.cycle_grid_column(true),
        KeyCode::Char('/') => app.edit_grid_filter(),
        KeyCode::Enter => app.open_detail(),
        _ => {}
    }
}

fn handle_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.overlay = Overlay::None,
        KeyCode::Char('j') | KeyCode::Down => app.picker_move(1),
        KeyCode::Char('k') | KeyCode::Up => app.picker_move(-1),
        KeyCode::PageDown => app.picker_move(10),
        KeyCode::PageUp => app.picker_move(-10),
        KeyCode::Char(' ') => app.picker_toggle(),
        KeyCode::Enter => app.picker_confirm(),
        _ => {}
    }
}

fn handle_editor(app: &mut App, key: KeyEvent) {
    let Overlay::Editor(ed) = &mut app.overlay else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.overlay = Overlay::None,
        KeyCode::Enter => app.editor_confirm(),
        KeyCode::Backspace => {
            ed.buffer.pop();
        }
        KeyCode::Char(c) => ed.buffer.push(c),
        _ => {}
    }
}

fn handle_help(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.help_scroll += 1,
        KeyCode::Char('k') | KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
        KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Esc => app.close_overlay(),
        _ => {}
    }
}

fn handle_detail(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => app.close_overlay(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.grid_down(1);
            app.open_detail();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.grid_up(1);
            app.open_detail();
        }
        _ => {}
    }
}
