// Main entry point - Dependency injection and terminal setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{
    io,
    sync::{Arc, Mutex},
    time::Duration,
};

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::application::device_gateway::RequestSequence;
use crate::application::fetch_service::FetchService;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::device_client::HttpDeviceClient;
use crate::presentation::app_state::AppState;
use crate::presentation::{handlers, ui};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to a file; stdout belongs to the terminal UI.
    let log_file = std::fs::File::create("ambient-dashboard.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create the device client (infrastructure layer)
    let client = Arc::new(HttpDeviceClient::new());

    // Fetch tasks report back to the UI loop through a channel
    let (events_tx, mut events_rx) = mpsc::channel(64);
    let fetcher = FetchService::new(client, events_tx, RequestSequence::default());

    let mut app = AppState::new(
        config.device.address,
        config.chart.history_capacity,
        Duration::from_millis(config.device.poll_interval_ms),
        fetcher,
    );

    tracing::info!("Starting ambient dashboard for {}", app.endpoint.base());
    app.connect();

    // Restore the terminal on crash before the default hook prints
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = loop {
        while let Ok(fetch_event) = events_rx.try_recv() {
            app.apply_event(fetch_event);
        }

        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(Duration::from_millis(200))? {
            match event::read()? {
                Event::Key(key) => handlers::handle_key(&mut app, key),
                Event::Mouse(mouse) => handlers::handle_mouse(&mut app, mouse),
                _ => {}
            }
        }

        if app.should_quit {
            break Ok(());
        }

        tokio::time::sleep(Duration::from_millis(5)).await;
    };

    // Cleanup
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
