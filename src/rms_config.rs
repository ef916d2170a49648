// User configuration persistence
// Board size, theme and display preferences stored as TOML

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::rms_game::BoardSize;
use crate::rms_theme::Theme;

/// User configuration
/// Persisted to disk as TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub size: BoardSize,        // Board size used for the first game
    pub theme: Theme,           // Colour theme index (0-7)
    pub ascii_icons: bool,      // Use ASCII fallback icons
    #[serde(with = "seed_bits", skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,      // Fixed seed for reproducible boards
    pub log_level: String,      // trace, debug, info, warn or error
}

/// TOML integers are signed 64-bit, so the seed is stored with its bits
/// reinterpreted as i64 (seeds above i64::MAX appear negative in the file)
mod seed_bits {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(seed: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match seed {
            Some(v) => serializer.serialize_i64(*v as i64),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<i64>::deserialize(deserializer)?.map(|v| v as u64))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            size: BoardSize::Small,
            theme: Theme::default(),
            ascii_icons: false,
            seed: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parsed log level, `info` when unrecognised
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }
}

/// Directory and file stem shared by the config and log files.
/// Uses the platform config directory (e.g. ~/.config/rmswpr/ on Linux),
/// falling back to the current directory.
fn base_path() -> Option<(PathBuf, String)> {
    let exe = env::current_exe().ok()?;
    let name = exe.file_stem()?.to_str()?.to_string();
    if let Some(proj) = ProjectDirs::from("com", "rmswpr", &name) {
        return Some((proj.config_dir().to_path_buf(), name));
    }
    let dir = env::current_dir().ok()?;
    Some((dir, name))
}

/// Get the configuration file path
pub fn config_path() -> Option<PathBuf> {
    base_path().map(|(dir, name)| dir.join(format!("{}.toml", name)))
}

/// Get the log file path, next to the configuration file
pub fn log_path() -> Option<PathBuf> {
    base_path().map(|(dir, name)| dir.join(format!("{}.log", name)))
}

/// Read a config file; `None` if missing or unparseable
pub fn load_from(path: &Path) -> Option<Config> {
    let s = fs::read_to_string(path).ok()?;
    let mut cfg = toml::from_str::<Config>(&s).ok()?;
    cfg.theme = Theme::new(cfg.theme.index());
    Some(cfg)
}

/// Write a config file, creating its directory
pub fn save_to(path: &Path, cfg: &Config) -> std::io::Result<()> {
    let s = toml::to_string(cfg).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, s)
}

/// Load configuration from disk, or create default if not found
pub fn load_or_create_config() -> Config {
    if let Some(path) = config_path() {
        if let Some(cfg) = load_from(&path) {
            return cfg;
        }
        let cfg = Config::default();
        let _ = save_to(&path, &cfg);
        return cfg;
    }
    Config::default()
}

/// Save configuration to disk as TOML
pub fn save_config(cfg: &Config) {
    if let Some(path) = config_path() {
        if let Err(e) = save_to(&path, cfg) {
            tracing::warn!("failed to save config to {}: {}", path.display(), e);
        }
    }
}
