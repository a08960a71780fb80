use crate::engine::ranking::NameMatch;
use crate::engine::schedule::DEFAULT_GAME_DURATION_MINS;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::{self, Write};
use std::path::Path;

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub odds_feed: OddsFeedConfig,
    #[serde(default)]
    pub board: BoardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OddsFeedConfig {
    pub base_url: String,
    #[serde(default = "default_regions")]
    pub regions: String,
    #[serde(default = "default_markets")]
    pub markets: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_s: u64,
    pub quota_warning_threshold: Option<u64>,
}

fn default_regions() -> String {
    "us".to_string()
}

fn default_markets() -> String {
    "h2h,spreads,totals".to_string()
}

fn default_poll_interval() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct BoardConfig {
    /// Assumed maximum match duration driving live/finished classification.
    #[serde(default = "default_game_duration_mins")]
    pub game_duration_mins: i64,
    /// Outcome-name-to-team matching strategy ("exact" or "contains").
    #[serde(default)]
    pub name_match: NameMatch,
}

fn default_game_duration_mins() -> i64 {
    DEFAULT_GAME_DURATION_MINS
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            game_duration_mins: DEFAULT_GAME_DURATION_MINS,
            name_match: NameMatch::Exact,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| "Failed to parse config TOML")?;
        Ok(config)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for line in content.lines() {
            let line = line.trim().trim_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.trim().trim_matches('"').trim_matches('\'');
                if std::env::var(key).is_err() {
                    std::env::set_var(key, value);
                }
            }
        }
    }

    /// API key comes from the environment, or is prompted at startup.
    /// A prompted value is saved to .env for future runs.
    pub fn odds_api_key() -> Result<String> {
        match std::env::var("ODDS_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => {
                let key = prompt("Odds API Key (the-odds-api.com)")?;
                save_env_var("ODDS_API_KEY", &key);
                Ok(key)
            }
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("  {} > ", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let value = input.trim().to_string();
    if value.is_empty() {
        anyhow::bail!("{} cannot be empty", label);
    }
    Ok(value)
}

/// Append a KEY=VALUE line to .env and set it in the current process.
fn save_env_var(key: &str, value: &str) {
    std::env::set_var(key, value);
    let path = Path::new(ENV_FILE);
    let mut contents = std::fs::read_to_string(path).unwrap_or_default();
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&format!("{}={}\n", key, value));
    let _ = std::fs::write(path, contents);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parses() {
        let config = Config::load(Path::new("config.toml")).unwrap();
        assert_eq!(config.odds_feed.base_url, "https://api.the-odds-api.com");
        assert_eq!(config.board.game_duration_mins, 180);
        assert_eq!(config.board.name_match, NameMatch::Exact);
        assert!(config.odds_feed.poll_interval_s > 0);
    }

    #[test]
    fn test_board_config_defaults() {
        let config: Config = toml::from_str(
            r#"
            [odds_feed]
            base_url = "https://api.the-odds-api.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.odds_feed.regions, "us");
        assert_eq!(config.odds_feed.markets, "h2h,spreads,totals");
        assert_eq!(config.board.game_duration_mins, 180);
    }
}
