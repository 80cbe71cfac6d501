use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use baikal_core::{ApiClient, AuthStore, ChatStore, Config, SessionStorage};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod panel;
mod tui;
mod ui;

use app::App;

#[derive(Parser)]
#[command(name = "baikal")]
#[command(about = "Terminal client for the BAIKAL AI groupware")]
#[command(version)]
struct Cli {
    /// Backend API base URL (overrides BAIKAL_API_URL and the config file)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Write logs here instead of the default data directory
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the backend is reachable
    Health,
    /// Forget the stored session
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file {
        Some(path) => path,
        None => default_log_path()?,
    };
    init_logging(&log_path)?;

    let config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(%err, "unreadable config, using defaults");
        Config::new()
    });
    let api_url = config.resolve_api_url(cli.api_url.as_deref());
    tracing::info!(%api_url, "starting baikal");

    let storage = Arc::new(SessionStorage::open_default().context("failed to open session storage")?);
    let client = Arc::new(ApiClient::new(&api_url, storage.clone()));

    match cli.command {
        Some(Commands::Health) => {
            let status = client
                .health()
                .await
                .with_context(|| format!("backend at {api_url} is not reachable"))?;
            println!("{api_url}: {status}");
        }
        Some(Commands::Logout) => {
            AuthStore::restore(client.clone(), storage.clone()).logout();
            println!("Logged out.");
        }
        None => run_tui(client, storage, &config).await?,
    }

    Ok(())
}

async fn run_tui(client: Arc<ApiClient>, storage: Arc<SessionStorage>, config: &Config) -> Result<()> {
    let auth = Arc::new(AuthStore::restore(client.clone(), storage));
    let chat = Arc::new(ChatStore::new(client.clone()));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let mut app = App::new(auth, chat, client, events.sender(), config);
    app.start();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut tui::Tui, app: &mut App, events: &mut tui::EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event)?;
    }
    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    let dir = dirs::data_dir().context("no data directory on this platform")?;
    Ok(dir.join("baikal").join("baikal.log"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Logs go to a file because the terminal belongs to the TUI.
/// `BAIKAL_LOG` takes precedence over `RUST_LOG`.
fn init_logging(path: &Path) -> Result<()> {
    let file = open_log_file(path)?;
    let filter = std::env::var("BAIKAL_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("baikal_core=info,baikal=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("baikal.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["baikal", "--api-url", "http://example.test/api", "health"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://example.test/api"));
        assert!(matches!(cli.command, Some(Commands::Health)));

        let cli = Cli::parse_from(["baikal"]);
        assert!(cli.command.is_none());
    }
}
