//! Optional config file loading. Search order: ./livelib_rates.toml, then
//! $XDG_CONFIG_HOME/livelib_rates/config.toml (or ~/.config/livelib_rates/config.toml).

use serde::Deserialize;
use std::path::PathBuf;

/// Config file contents. All fields optional; only present keys override defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct Config {
    /// Reader whose "read" list is collected when no user id is given on the command line.
    pub user_id: Option<String>,
    /// Site root, e.g. "https://www.livelib.ru".
    pub base_url: Option<String>,
    /// Default output directory when -o is not set. Paths are relative to CWD.
    pub output_dir: Option<PathBuf>,
    /// HTTP User-Agent header.
    pub user_agent: Option<String>,
    /// Pause in seconds after each page before fetching the next.
    pub page_delay_secs: Option<u64>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Search order: (1) ./livelib_rates.toml, (2) $XDG_CONFIG_HOME/livelib_rates/config.toml.
/// Missing file returns Ok(None). Invalid TOML or I/O error reading a present file returns Err.
pub fn load_config() -> Result<Option<Config>, String> {
    let cwd = std::env::current_dir()
        .map_err(|e| format!("Cannot determine current directory: {}", e))?;
    let mut paths = vec![cwd.join("livelib_rates.toml")];
    if let Some(d) = dirs::config_dir() {
        paths.push(d.join("livelib_rates").join("config.toml"));
    }
    for path in &paths {
        if path.exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
            let config: Config = toml::from_str(&s)
                .map_err(|e| format!("Invalid config {}: {}", path.display(), e))?;
            tracing::debug!(path = %path.display(), "loaded config");
            return Ok(Some(config));
        }
    }
    Ok(None)
}
