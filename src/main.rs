// Entry point for the Minesweeper TUI application
// Loads configuration, starts file logging, and launches the main UI

use std::error::Error;
use std::fs::OpenOptions;
use std::sync::Mutex;

use rmswpr::rms_config::{Config, load_or_create_config, log_path};
use rmswpr::rms_ui::run as run_ui;

/// Log to a file next to the config; the terminal belongs to the UI
fn init_logging(cfg: &Config) {
    let Some(path) = log_path() else { return };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(cfg.level())
        .try_init();
}

fn main() -> Result<(), Box<dyn Error>> {
    // Load or create user configuration (size, theme, preferences)
    let mut cfg = load_or_create_config();

    init_logging(&cfg);
    tracing::info!("starting with {} board", cfg.size.name());

    // Launch the main UI loop
    run_ui(&mut cfg)
}
