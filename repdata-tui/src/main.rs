mod tui;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use repdata_common::Config;
use repdata_core::{
    export_csv, export_summary_json, print_summary, summary_json, write_export, Column, Dataset,
    ExplorerSession, YearRange,
};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::{io, time::Duration};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tui::app::{App, Focus};
use tui::events::handle_key;
use tui::ui::render;

#[derive(Parser)]
#[command(name = "repdata", version, about = "Representation-in-Data resource explorer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Criteria flags shared by the headless commands.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Resource type (substring match)
    #[arg(long)]
    resource_type: Option<String>,
    /// Theme tag (substring match)
    #[arg(long)]
    theme: Option<String>,
    /// Geographic region; repeat for several
    #[arg(long = "region")]
    regions: Vec<String>,
    /// Language; repeat for several
    #[arg(long = "language")]
    languages: Vec<String>,
    /// Publication years, MIN..MAX (either side may be empty)
    #[arg(long, value_parser = YearRange::parse)]
    years: Option<YearRange>,
    /// Case-sensitive text searched in every field
    #[arg(long)]
    text: Option<String>,
}

impl FilterArgs {
    fn apply(&self, session: &mut ExplorerSession) {
        if let Some(t) = &self.resource_type {
            session.set_resource_type(t);
        }
        if let Some(t) = &self.theme {
            session.set_theme(t);
        }
        if !self.regions.is_empty() {
            session.set_regions(self.regions.iter().map(String::as_str));
        }
        if !self.languages.is_empty() {
            session.set_languages(self.languages.iter().map(String::as_str));
        }
        if let Some(r) = self.years {
            session.set_pub_years(r.min, r.max);
        }
        if let Some(q) = &self.text {
            session.set_free_text(q);
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive dashboard
    Browse {
        dataset: Option<String>,
        #[arg(long)] vocab: Option<String>,
    },
    /// Count and top-N breakdowns for the filtered resources
    Summary {
        dataset: Option<String>,
        #[arg(long)] vocab: Option<String>,
        #[command(flatten)] filters: FilterArgs,
        #[arg(long)] json: bool,
        #[arg(long)] save: bool,
    },
    /// Write the filtered resources as CSV
    Export {
        dataset: Option<String>,
        #[command(flatten)] filters: FilterArgs,
        #[arg(long, value_delimiter = ',')] columns: Option<Vec<String>>,
        /// Output file, `-` for stdout
        #[arg(long)] output: Option<String>,
    },
    /// Print the filter choice lists
    Vocab {
        dataset: Option<String>,
        #[arg(long)] vocab: Option<String>,
        #[arg(long)] json: bool,
    },
    /// Shell completion script
    Completions { shell: Shell },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(matches!(cli.command, Commands::Browse { .. }));
    let config = Config::load().unwrap_or_else(|e| {
        warn!("config ignored: {e}");
        Config::default()
    });
    match cli.command {
        Commands::Browse { dataset, vocab } => run_tui(dataset, vocab, config)?,
        Commands::Summary { dataset, vocab, filters, json, save } => run_summary(dataset, vocab, filters, json, save, &config)?,
        Commands::Export { dataset, filters, columns, output } => run_export(dataset, filters, columns, output, &config)?,
        Commands::Vocab { dataset, vocab, json } => run_vocab(dataset, vocab, json, &config)?,
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "repdata", &mut io::stdout());
        }
    }
    Ok(())
}

/// Headless commands log to stderr; the dashboard logs to a file so the
/// terminal is left alone.
fn init_logging(to_file: bool) {
    let filter = || EnvFilter::try_from_env("REPDATA_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    if !to_file {
        tracing_subscriber::fmt().with_env_filter(filter()).with_writer(io::stderr).init();
        return;
    }
    let dir = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".")).join("repdata");
    let file = std::fs::create_dir_all(&dir).and_then(|_| {
        std::fs::OpenOptions::new().create(true).append(true).open(dir.join("repdata.log"))
    });
    if let Ok(file) = file {
        tracing_subscriber::fmt()
            .with_env_filter(filter())
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
}

fn open_dataset(dataset: Option<String>, vocab: Option<String>, config: &Config) -> anyhow::Result<(String, Dataset)> {
    let Some(path) = dataset.or_else(|| config.data.dataset_path.clone()) else {
        anyhow::bail!("No dataset given and [data].dataset_path is unset in {}", Config::config_path().display());
    };
    if !Path::new(&path).exists() { anyhow::bail!("Dataset not found: {path}"); }
    let vocab = vocab.or_else(|| config.data.vocabulary_path.clone());
    let data = Dataset::open(Path::new(&path), vocab.as_deref().map(Path::new), &config.data)
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok((path, data))
}

fn filtered_session(data: &Dataset, filters: &FilterArgs, config: &Config) -> ExplorerSession {
    let mut session = ExplorerSession::new(std::sync::Arc::clone(&data.store), &config.filter);
    filters.apply(&mut session);
    session
}

fn run_tui(dataset: Option<String>, vocab: Option<String>, config: Config) -> anyhow::Result<()> {
    let (path, data) = open_dataset(dataset, vocab, &config)?;
    let mut app = App::new(path, data, config);
    info!(rows = app.total_rows(), "dashboard started");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> anyhow::Result<()> {
    let tick = Duration::from_millis(66); // 15Hz
    loop {
        app.refresh();
        terminal.draw(|f| render(f, app))?;
        if event::poll(tick)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollDown => {
                        if app.focus == Focus::Sidebar { app.sidebar_down(); } else { app.grid_down(1); }
                    }
                    MouseEventKind::ScrollUp => {
                        if app.focus == Focus::Sidebar { app.sidebar_up(); } else { app.grid_up(1); }
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        if app.should_quit { return Ok(()); }
    }
}

fn run_summary(dataset: Option<String>, vocab: Option<String>, filters: FilterArgs, json: bool, save: bool, config: &Config) -> anyhow::Result<()> {
    let (_, data) = open_dataset(dataset, vocab, config)?;
    let mut session = filtered_session(&data, &filters, config);
    let overview = session.overview();
    let predicate = session.predicate();
    if json {
        let doc = summary_json(&overview, session.criteria(), &predicate);
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        print_summary(&overview, &predicate, data.store.len());
    }
    if save {
        let out_dir = Path::new(&config.export.output_dir);
        std::fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join("summary.json");
        export_summary_json(&out_path, &overview, session.criteria(), &predicate).map_err(|e| anyhow::anyhow!("{e}"))?;
        println!("Summary saved to {}", out_path.display());
    }
    Ok(())
}

fn run_export(dataset: Option<String>, filters: FilterArgs, columns: Option<Vec<String>>, output: Option<String>, config: &Config) -> anyhow::Result<()> {
    let (_, data) = open_dataset(dataset, None, config)?;
    let mut session = filtered_session(&data, &filters, config);
    let bytes = match columns {
        Some(names) => {
            let cols = parse_columns(&names)?;
            let ids = session.visible_ids();
            export_csv(&data.store, &ids, &cols)
        }
        None => session.export_bytes(),
    }
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    let rows = session.row_count();
    match output.as_deref() {
        Some("-") => {
            use std::io::Write;
            io::stdout().write_all(&bytes)?;
        }
        other => {
            let out_path = other.map(PathBuf::from).unwrap_or_else(|| config.export_path());
            write_export(&out_path, &bytes).map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("Exported {rows} resources to {}", out_path.display());
        }
    }
    Ok(())
}

fn parse_columns(names: &[String]) -> anyhow::Result<Vec<Column>> {
    names
        .iter()
        .map(|n| Column::from_label(n).ok_or_else(|| anyhow::anyhow!("Unknown column: {n}")))
        .collect()
}

fn run_vocab(dataset: Option<String>, vocab: Option<String>, json: bool, config: &Config) -> anyhow::Result<()> {
    let (_, data) = open_dataset(dataset, vocab, config)?;
    let lists = data.vocabulary.choice_lists();
    if json {
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }
    for (label, choices) in &lists {
        println!("{label}");
        for c in choices {
            println!("  {c}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use repdata_common::FilterConfig;
    use repdata_core::{DatasetStore, Resource};

    fn session() -> ExplorerSession {
        let rows = vec![
            Resource { resource_type: Some("Survey".into()), language: Some("English".into()), pub_date: Some(2001), ..Default::default() },
            Resource { resource_type: Some("Survey".into()), language: Some("French".into()), pub_date: Some(2015), ..Default::default() },
            Resource { resource_type: Some("Dataset".into()), language: Some("English".into()), ..Default::default() },
        ];
        ExplorerSession::new(DatasetStore::shared(rows), &FilterConfig::default())
    }

    #[test]
    fn filter_flags_reach_the_session() {
        let cli = Cli::try_parse_from([
            "repdata", "summary", "data.csv", "--resource-type", "Survey",
            "--language", "English", "--language", "French", "--years", "2000..2010",
        ])
        .unwrap();
        let Commands::Summary { filters, .. } = cli.command else { panic!("expected summary") };
        assert_eq!(filters.languages, vec!["English", "French"]);
        let mut s = session();
        filters.apply(&mut s);
        assert_eq!(s.view().ids(), &[1]);
    }

    #[test]
    fn bad_year_range_is_rejected_at_parse_time() {
        assert!(Cli::try_parse_from(["repdata", "summary", "--years", "soon"]).is_err());
    }

    #[test]
    fn export_columns_are_validated() {
        let cols = parse_columns(&["title".into(), "PubDate".into()]).unwrap();
        assert_eq!(cols, vec![Column::Title, Column::PubDate]);
        assert!(parse_columns(&["nope".into()]).is_err());
    }
}
