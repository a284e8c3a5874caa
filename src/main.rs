use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::fmt::writer::{MakeWriter, OptionalWriter};

use stockroom::api::InventoryClient;
use stockroom::app::{App, AppEvent};
use stockroom::config::{Config, ENV_API_TOKEN, ENV_API_URL};
use stockroom::theme::ThemeVariant;
use stockroom::ui;

/// Get the config directory path (~/.config/stockroom/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("stockroom"))
}

/// Create the config directory with user-only permissions if it is missing.
fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    // SEC-007: Set directory permissions on Unix (user-only access)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(config_dir, perms) {
                    tracing::warn!(
                        path = %config_dir.display(),
                        error = %e,
                        "Failed to set config directory permissions to 0700"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    path = %config_dir.display(),
                    error = %e,
                    "Failed to read config directory metadata"
                );
            }
        }
    }
    Ok(())
}

/// Stderr log writer that goes quiet while the TUI owns the terminal.
///
/// Log lines written to the tty during raw mode would land on top of the
/// frame and stay there until the cells are redrawn.
#[derive(Clone, Default)]
struct StderrUntilTui {
    tui_active: Arc<AtomicBool>,
}

impl StderrUntilTui {
    fn suspend(&self) {
        self.tui_active.store(true, Ordering::Release);
    }

    fn resume(&self) {
        self.tui_active.store(false, Ordering::Release);
    }
}

impl<'a> MakeWriter<'a> for StderrUntilTui {
    type Writer = OptionalWriter<std::io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        if self.tui_active.load(Ordering::Acquire) {
            OptionalWriter::none()
        } else {
            OptionalWriter::from(Some(std::io::stderr()))
        }
    }
}

/// The TUI owns the terminal, so full logs only go to a file when asked for.
/// Without `--log`, warnings and errors reach stderr outside the TUI only.
fn init_tracing(log_file: Option<&Path>, stderr: StderrUntilTui) -> Result<()> {
    use tracing_subscriber::EnvFilter;

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("warn"))
                .with_writer(stderr)
                .init();
        }
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "stockroom", about = "Terminal inventory manager")]
struct Args {
    /// Base URL of the inventory API (overrides STOCKROOM_API_URL and config)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Config file path (default: ~/.config/stockroom/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Start on the account creation screen
    #[arg(long)]
    signup: bool,

    /// Write logs to ~/.config/stockroom/stockroom.log (RUST_LOG sets the level)
    #[arg(long)]
    log: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    ensure_config_dir(&config_dir)?;

    let log_path = config_dir.join("stockroom.log");
    let stderr_log = StderrUntilTui::default();
    init_tracing(args.log.then_some(log_path.as_path()), stderr_log.clone())?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from '{}'", config_path.display()))?;

    let api_url = config.resolve_api_url(args.api_url.as_deref(), std::env::var(ENV_API_URL).ok());
    let token = config.resolve_token(std::env::var(ENV_API_TOKEN).ok());

    let client = InventoryClient::new(&api_url, config.request_timeout_secs, token)
        .with_context(|| format!("Cannot use API URL '{}'", api_url))?;
    tracing::info!(api_url = %client.base_url(), authenticated = client.has_token(), "Client ready");

    let mut app = App::new(client);

    match ThemeVariant::from_str_name(&config.theme) {
        Some(variant) => app.set_theme(variant),
        None => {
            tracing::warn!(theme = %config.theme, "Unknown theme, using dark");
            eprintln!("Warning: unknown theme '{}', using dark", config.theme);
        }
    }

    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(%warning, "Keybinding override ignored");
        eprintln!("Warning: {}", warning);
    }

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);

    if args.signup {
        app.enter_signup();
    } else {
        ui::spawn_fetch(&mut app, &event_tx);
    }

    stderr_log.suspend();
    let result = ui::run(&mut app, event_tx, event_rx).await;
    stderr_log.resume();
    result?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::writer::EitherWriter;

    #[test]
    fn test_stderr_log_silent_while_tui_active() {
        let writer = StderrUntilTui::default();
        assert!(matches!(writer.make_writer(), EitherWriter::A(_)));

        writer.suspend();
        assert!(matches!(writer.make_writer(), EitherWriter::B(_)));
        // Clones share the switch with the installed subscriber
        assert!(matches!(writer.clone().make_writer(), EitherWriter::B(_)));

        writer.resume();
        assert!(matches!(writer.make_writer(), EitherWriter::A(_)));
    }
}
