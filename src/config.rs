//! Configuration loading for feedpager.
//!
//! Sources, lowest precedence first: built-in defaults, a TOML file, then
//! `FEEDPAGER_*` environment variables. The file is optional; a missing or
//! empty file yields `Config::default()`. Unknown keys are accepted but logged.
use crate::content::FailurePolicy;
use crate::theme::{parse_color, ColorParseError, StyleConfig, ThemeVariant};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix for environment overrides (`FEEDPAGER_ACCENT`, ...).
pub const ENV_PREFIX: &str = "FEEDPAGER_";

/// File name looked up in the working directory.
const LOCAL_FILE_NAME: &str = "feedpager.toml";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value '{value}' in environment variable {var}")]
    Env { var: String, value: String },
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Top-level application configuration.
///
/// Every field has a default so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Header background and scroll-percentage segment color.
    pub accent: String,

    /// Foreground color for header and footer text.
    pub text_color: String,

    /// Footer background color.
    pub background_color: String,

    /// Horizontal padding (cells) around header and footer segments.
    pub horz_padding: u16,

    /// Vertical padding (rows) above and below the header title.
    pub vert_padding: u16,

    /// Per-feed fetch timeout in seconds.
    pub fetch_timeout_secs: u64,

    /// Feeds to load at startup, in display order.
    pub feed_urls: Vec<String>,

    /// Markdown palette: "dark" or "light".
    pub theme: String,

    /// What happens when an entry fails to render.
    pub on_render_error: FailurePolicy,

    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            accent: "33".to_string(),
            text_color: "15".to_string(),
            background_color: "233".to_string(),
            horz_padding: 2,
            vert_padding: 0,
            fetch_timeout_secs: 15,
            feed_urls: vec!["https://github.com/homielabs.atom".to_string()],
            theme: "dark".to_string(),
            on_render_error: FailurePolicy::Abort,
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "accent",
        "text_color",
        "background_color",
        "horz_padding",
        "vert_padding",
        "fetch_timeout_secs",
        "feed_urls",
        "theme",
        "on_render_error",
        "keybindings",
    ];

    /// Candidate config files, in lookup order.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_FILE_NAME)];
        if let Ok(home) = std::env::var("HOME") {
            paths.push(
                PathBuf::from(home)
                    .join(".config")
                    .join("feedpager")
                    .join("config.toml"),
            );
        }
        paths.push(PathBuf::from("/etc/feedpager/config.toml"));
        paths
    }

    /// Resolve the configuration from file and process environment.
    ///
    /// An explicit path is loaded as-is (a missing explicit file is an error);
    /// otherwise the first existing file from [`Config::search_paths`] wins.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("{} does not exist", path.display()),
                    )));
                }
                Self::load(path)?
            }
            None => match Self::search_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => Self::load(&path)?,
                None => {
                    tracing::debug!("Found no config file on disk, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), feeds = config.feed_urls.len(), "Loaded configuration");
        Ok(config)
    }

    /// Apply `FEEDPAGER_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let full = format!("{ENV_PREFIX}{name}");
            lookup(&full).map(|value| (full, value))
        };

        if let Some((_, value)) = var("ACCENT") {
            self.accent = value;
        }
        if let Some((_, value)) = var("TEXT_COLOR") {
            self.text_color = value;
        }
        if let Some((_, value)) = var("BACKGROUND_COLOR") {
            self.background_color = value;
        }
        if let Some((name, value)) = var("HORZ_PADDING") {
            self.horz_padding = parse_env_number(name, value)?;
        }
        if let Some((name, value)) = var("VERT_PADDING") {
            self.vert_padding = parse_env_number(name, value)?;
        }
        Ok(())
    }

    /// Resolve the chrome styling handed to the session.
    pub fn style(&self) -> Result<StyleConfig, ColorParseError> {
        Ok(StyleConfig {
            accent: parse_color("accent", &self.accent)?,
            text: parse_color("text_color", &self.text_color)?,
            background: parse_color("background_color", &self.background_color)?,
            horz_padding: self.horz_padding,
            vert_padding: self.vert_padding,
        })
    }

    /// Markdown palette variant; unknown names fall back to dark.
    pub fn theme_variant(&self) -> ThemeVariant {
        ThemeVariant::from_str_name(&self.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %self.theme, "Unknown theme, using dark");
            ThemeVariant::Dark
        })
    }
}

fn parse_env_number(var: String, value: String) -> Result<u16, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn write_config(test_name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("feedpager_config_{test_name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.accent, "33");
        assert_eq!(config.text_color, "15");
        assert_eq!(config.background_color, "233");
        assert_eq!(config.horz_padding, 2);
        assert_eq!(config.vert_padding, 0);
        assert_eq!(config.fetch_timeout_secs, 15);
        assert_eq!(config.feed_urls, vec!["https://github.com/homielabs.atom"]);
        assert_eq!(config.on_render_error, FailurePolicy::Abort);
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/feedpager_test_nonexistent_config.toml");
        assert_eq!(Config::load(path).unwrap(), Config::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let path = Path::new("/tmp/feedpager_test_missing_explicit.toml");
        assert!(matches!(
            Config::discover(Some(path)),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "accent = \"#ff8800\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.accent, "#ff8800");
        assert_eq!(config.text_color, "15");
        assert_eq!(config.horz_padding, 2);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r##"
accent = "99"
text_color = "#ffffff"
background_color = "0"
horz_padding = 1
vert_padding = 1
fetch_timeout_secs = 5
feed_urls = ["https://a.example.com/feed", "https://b.example.com/atom"]
theme = "light"
on_render_error = "fallback"

[keybindings]
quit = "Ctrl+q"
next_feed = "n"
"##;
        let (dir, path) = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.accent, "99");
        assert_eq!(config.vert_padding, 1);
        assert_eq!(config.fetch_timeout_secs, 5);
        assert_eq!(config.feed_urls.len(), 2);
        assert_eq!(config.theme_variant(), ThemeVariant::Light);
        assert_eq!(config.on_render_error, FailurePolicy::Fallback);
        assert_eq!(
            config.keybindings.get("quit").map(String::as_str),
            Some("Ctrl+q")
        );
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_policy_is_parse_error() {
        let (dir, path) = write_config("bad_policy", "on_render_error = \"retry\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "accent = \"12\"\nfetchTimeout = 3\n");
        assert_eq!(Config::load(&path).unwrap().accent, "12");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config::default();
        config
            .apply_env(|var| match var {
                "FEEDPAGER_ACCENT" => Some("200".to_string()),
                "FEEDPAGER_VERT_PADDING" => Some("1".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.accent, "200");
        assert_eq!(config.vert_padding, 1);
        assert_eq!(config.text_color, "15");
    }

    #[test]
    fn test_env_bad_number_is_error() {
        let mut config = Config::default();
        let err = config
            .apply_env(|var| (var == "FEEDPAGER_HORZ_PADDING").then(|| "wide".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { ref var, .. } if var == "FEEDPAGER_HORZ_PADDING"));
    }

    #[test]
    fn test_style_resolves_colors() {
        let config = Config {
            accent: "#102030".to_string(),
            ..Config::default()
        };
        let style = config.style().unwrap();
        assert_eq!(style.accent, Color::Rgb(0x10, 0x20, 0x30));
        assert_eq!(style.text, Color::Indexed(15));
        assert_eq!(style.horz_padding, 2);
    }

    #[test]
    fn test_style_rejects_bad_color() {
        let config = Config {
            background_color: "navy-ish".to_string(),
            ..Config::default()
        };
        assert!(config.style().is_err());
    }

    #[test]
    fn test_search_paths_start_local() {
        let paths = Config::search_paths();
        assert_eq!(paths[0], PathBuf::from("feedpager.toml"));
        assert_eq!(
            paths.last().unwrap(),
            &PathBuf::from("/etc/feedpager/config.toml")
        );
    }
}
