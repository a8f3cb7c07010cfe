mod app;
mod config;
mod logging;
mod sentiment;
mod theme;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use app::{App, Focus, Popup};
use config::AppConfig;
use sentiment::Model;

#[derive(Parser, Debug)]
#[command(name = "moodring")]
#[command(author = "Sean Fournier")]
#[command(version = "0.1.0")]
#[command(about = "A terminal sentiment analyzer for a local model server")]
struct Args {
    /// Analyze endpoint URL (overrides config)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Model to start with (overrides config)
    #[arg(short, long, value_enum)]
    model: Option<Model>,

    /// Analyze this text once, print the result as JSON and exit
    #[arg(short, long)]
    text: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The TUI owns the terminal, so it logs to a file; one-shot runs keep stderr
    let log_target = if args.text.is_some() {
        logging::LogTarget::Stderr
    } else {
        logging::LogTarget::for_tui()
    };
    logging::init(&log_target);

    let config = AppConfig::load()
        .unwrap_or_default()
        .with_overrides(args.endpoint, args.model, args.timeout);

    let mut app = App::from_config(&config)?;

    // Handle CLI-only commands
    if let Some(text) = args.text {
        return analyze_once(&mut app, text).await;
    }

    ui::init_theme(theme::Theme::from_overrides(&config.theme));

    // Run TUI
    run_tui(&mut app).await
}

/// Headless run of the analyze action
async fn analyze_once(app: &mut App, text: String) -> Result<()> {
    app.set_text(text);
    app.start_analysis();
    app.settle().await;

    let body = app
        .result
        .as_ref()
        .map(|r| r.body().clone())
        .unwrap_or(serde_json::Value::Null);
    println!("{}", serde_json::to_string(&body)?);
    Ok(())
}

async fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, app).await;

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

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if app.popup == Popup::None && app.focus != Focus::Text => {
                            return Ok(())
                        }
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        // Let the spawned request make progress, then pick up its outcome
        tokio::task::yield_now().await;
        app.tick();
    }
}
