use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::info;

use slawatch::data::datetime::{hours_ago, now, parse_timestamp};
use slawatch::data::duration::parse_resolution;
use slawatch::logging::{self, LogTarget};
use slawatch::ui::{self, Theme};
use slawatch::{events, export, App, Fetcher, Settings};
use slawatch_types::{DateRange, Resolution, Timestamp};

#[derive(Parser, Debug)]
#[command(name = "slawatch")]
#[command(about = "Terminal dashboard for New Relic Apdex, response time and alert SLA reporting")]
struct Args {
    /// New Relic REST API key (overrides config and SLAWATCH_API_KEY)
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Application ID to report on
    #[arg(short, long)]
    app_id: Option<String>,

    /// Display name for the application
    #[arg(long)]
    app_name: Option<String>,

    /// Path to a TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Range start, e.g. "2021-04-17" or "2021-04-17 09:00" (local) or RFC 3339
    #[arg(long, value_parser = parse_time_arg)]
    from: Option<Timestamp>,

    /// Range end, same formats as --from (defaults to now)
    #[arg(long, value_parser = parse_time_arg)]
    to: Option<Timestamp>,

    /// Sample resolution (e.g., "5m", "1h", "1d")
    #[arg(short, long, value_parser = parse_resolution)]
    resolution: Option<u64>,

    /// Export Apdex and response-time series to this directory and exit
    #[arg(short, long, conflicts_with = "export_violations")]
    export: Option<PathBuf>,

    /// Export alert violations to this directory and exit
    #[arg(long)]
    export_violations: Option<PathBuf>,

    /// Number of violation pages to fetch with --export-violations
    #[arg(long, default_value = "1", requires = "export_violations")]
    pages: u32,

    /// Write logs to this file while the dashboard is running
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level for slawatch crates (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_time_arg(s: &str) -> Result<Timestamp, String> {
    parse_timestamp(s).ok_or_else(|| {
        format!(
            "invalid time {:?}, expected YYYY-MM-DD, YYYY-MM-DD HH:MM or RFC 3339",
            s
        )
    })
}

impl Args {
    fn headless(&self) -> bool {
        self.export.is_some() || self.export_violations.is_some()
    }

    fn apply(&self, settings: &mut Settings) {
        if let Some(key) = &self.api_key {
            settings.api_key = Some(key.clone());
        }
        if let Some(id) = &self.app_id {
            settings.app_id = Some(id.clone());
        }
        if let Some(name) = &self.app_name {
            settings.app_title = name.clone();
        }
    }

    /// The explicit range, if either end was given.
    fn custom_range(&self) -> Option<(Timestamp, Timestamp)> {
        if self.from.is_none() && self.to.is_none() {
            return None;
        }
        let to = self.to.unwrap_or_else(now);
        let from = self.from.unwrap_or_else(|| to - chrono::Duration::hours(1));
        Some((from, to))
    }

    fn resolution_seconds(&self) -> u64 {
        self.resolution
            .unwrap_or_else(|| Resolution::default().seconds())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);

    let target = if args.headless() {
        LogTarget::Stderr
    } else {
        match &args.log_file {
            Some(path) => LogTarget::File(path.clone()),
            None => LogTarget::Off,
        }
    };
    logging::init(&target, &args.log_level)?;

    // Fetches run on the runtime's worker threads; the TUI keeps the main thread
    let runtime = Runtime::new().context("failed to start async runtime")?;
    let client = settings.client()?;

    if let Some(dir) = &args.export {
        return export_series(&runtime, &args, &settings, client, dir);
    }
    if let Some(dir) = &args.export_violations {
        let credentials = settings.session().credentials();
        let written = runtime.block_on(export::export_violations(
            &client,
            &credentials,
            args.pages,
            dir,
        ))?;
        print_written(&written);
        return Ok(());
    }

    let description = client.endpoint().to_string();
    let fetcher = Fetcher::new(Arc::new(client), runtime.handle().clone(), &description);
    let mut app = App::new(fetcher, &settings)?;
    app.theme = Theme::auto_detect();
    app.resolution_seconds = args.resolution_seconds();
    app.custom_range = args.custom_range();

    info!(endpoint = %description, "starting dashboard");
    run_tui(&mut app)
}

/// Headless export of both series over the requested range.
fn export_series(
    runtime: &Runtime,
    args: &Args,
    settings: &Settings,
    client: slawatch_client::NewRelicClient,
    dir: &std::path::Path,
) -> Result<()> {
    let (from, to) = args
        .custom_range()
        .unwrap_or_else(|| (hours_ago(1), now()));
    let range = DateRange::new(from, to, args.resolution_seconds())
        .map_err(|e| anyhow!("invalid range: {}", e))?;
    let classifier = settings.classifier()?;
    let credentials = settings.session().credentials();

    let written = runtime.block_on(export::export_series(
        &client,
        &credentials,
        &classifier,
        &range,
        dir,
    ))?;
    print_written(&written);
    Ok(())
}

fn print_written(paths: &[PathBuf]) {
    for path in paths {
        println!("Exported {}", path.display());
    }
}

/// Run the dashboard until the user quits
fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    app.refresh_all();

    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 12;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let top = area.height.saturating_sub(5) / 2;
                let centered =
                    ratatui::layout::Rect::new(0, top, area.width, area.height.min(5));
                frame.render_widget(paragraph, centered);
                return;
            }

            ui::draw(frame, app);
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                // Redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        app.poll_fetches();
    }

    Ok(())
}
