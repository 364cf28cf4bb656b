mod admin;
mod api;
mod app;
mod config;
mod login;
mod profile;
mod session;
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
use std::fs::{File, OpenOptions};
use std::io;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use app::{App, Popup};
use config::AppConfig;
use session::{Session, SessionStore};

#[derive(Parser, Debug)]
#[command(name = "admindash")]
#[command(version = "0.1.0")]
#[command(about = "A terminal dashboard for signing in and managing user accounts")]
struct Args {
    /// Output the saved session as JSON
    #[arg(short, long)]
    status: bool,

    /// Forget the saved session
    #[arg(long)]
    logout: bool,

    /// Account API base URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let tui = !args.status && !args.logout;

    // The TUI owns the terminal, so its logs go to a file
    init_logging(tui);

    let mut config = AppConfig::load()?;
    if let Some(url) = args.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }

    // Handle CLI-only commands
    if args.status {
        return print_status();
    }

    if args.logout {
        return logout(&config);
    }

    // Run TUI
    run_tui(&config).await
}

fn init_logging(to_file: bool) {
    let registry = tracing_subscriber::registry();

    if to_file {
        if let Some(file) = open_log_file() {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("admindash=info"));
            registry
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
            return;
        }
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    registry
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn open_log_file() -> Option<File> {
    let dir = dirs::cache_dir()?.join("admindash");
    std::fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("admindash.log"))
        .ok()
}

fn status_json(session: Option<&Session>) -> serde_json::Value {
    match session {
        Some(session) => serde_json::json!({
            "logged_in": true,
            "role": session.role,
            "full_name": session.full_name,
            "email": session.email,
        }),
        None => serde_json::json!({
            "logged_in": false,
            "role": null,
            "full_name": null,
            "email": null,
        }),
    }
}

fn print_status() -> Result<()> {
    let store = SessionStore::default_location()?;
    let session = store.load();

    println!("{}", serde_json::to_string(&status_json(session.as_ref()))?);
    Ok(())
}

fn logout(config: &AppConfig) -> Result<()> {
    let store = SessionStore::default_location()?;
    let had_session = store.load().is_some();
    store.clear()?;
    tracing::info!("Cleared session at {}", store.path().display());

    if config.notifications && had_session {
        notify("admindash", "Logged out")?;
    }
    Ok(())
}

async fn run_tui(config: &AppConfig) -> Result<()> {
    ui::init_theme(&config.theme);

    // Create app state before taking over the terminal so startup errors stay readable
    let mut app = App::new(config).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

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
                        KeyCode::Char('q') if app.popup == Popup::None && !app.accepts_text() => {
                            return Ok(())
                        }
                        KeyCode::Char('c') if key.modifiers.contains(event::KeyModifiers::CONTROL) => {
                            return Ok(())
                        }
                        _ => {
                            // Handle key and catch any errors to prevent crashes
                            if let Err(e) = app.handle_key(key).await {
                                tracing::error!("Key handling failed: {:#}", e);
                                app.status_message = Some(format!("Error: {}", e));
                                app.status_message_time = Some(std::time::Instant::now());
                            }
                        }
                    }
                }
            }
        }

        let _ = app.tick().await;
    }
}

fn notify(summary: &str, body: &str) -> Result<()> {
    notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .icon("system-users")
        .show()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{sample_session, Role};

    #[test]
    fn test_status_json_logged_in() {
        let session = sample_session(Role::Admin);
        let value = status_json(Some(&session));

        assert_eq!(value["logged_in"], true);
        assert_eq!(value["role"], "admin");
        assert_eq!(value["email"], "ada@example.com");
        // The token never leaves the session file
        assert!(value.get("token").is_none());
    }

    #[test]
    fn test_status_json_logged_out() {
        let value = status_json(None);
        assert_eq!(value["logged_in"], false);
        assert!(value["role"].is_null());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["admindash", "--api-url", "http://host/api/"]).unwrap();
        assert_eq!(args.api_url.as_deref(), Some("http://host/api/"));
        assert!(!args.status && !args.logout);
    }
}
