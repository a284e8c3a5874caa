//! Configuration file parser for ~/.config/stockroom/config.toml.
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`. Unknown keys are accepted but logged as likely typos.
use secrecy::SecretString;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const ENV_API_URL: &str = "STOCKROOM_API_URL";
pub const ENV_API_TOKEN: &str = "STOCKROOM_API_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
///
/// SEC: Debug is implemented by hand so `api_token` never reaches logs.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the inventory backend.
    pub api_url: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Theme variant name ("dark" or "light").
    pub theme: String,

    /// Bearer token sent with every request. `STOCKROOM_API_TOKEN` takes precedence.
    pub api_token: Option<String>,

    /// Keybinding overrides: action name → key string.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            theme: "dark".to_string(),
            api_token: None,
            keybindings: HashMap::new(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("theme", &self.theme)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("keybindings", &self.keybindings)
            .finish()
    }
}

const KNOWN_KEYS: [&str; 5] = [
    "api_url",
    "request_timeout_secs",
    "theme",
    "api_token",
    "keybindings",
];

impl Config {
    /// SEC: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line info
    /// - Unknown keys → accepted, logged as a warning
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

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            api_url = %config.api_url,
            theme = %config.theme,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Effective API base URL: CLI flag, then environment, then file.
    pub fn resolve_api_url(&self, cli: Option<&str>, env: Option<String>) -> String {
        cli.map(str::to_string)
            .or_else(|| env.filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| self.api_url.clone())
    }

    /// Effective bearer token: environment, then file. Blank values count as unset.
    pub fn resolve_token(&self, env: Option<String>) -> Option<SecretString> {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_token.clone().filter(|v| !v.trim().is_empty()))
            .map(SecretString::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn write_config(name: &str, content: &str) -> (std::path::PathBuf, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("stockroom_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.theme, "dark");
        assert!(config.api_token.is_none());
        assert!(config.keybindings.is_empty());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/stockroom_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.theme, "dark");
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "api_url = \"https://stock.example.com\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_url, "https://stock.example.com");
        assert_eq!(config.request_timeout_secs, 30);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_url = "https://stock.example.com/backend"
request_timeout_secs = 10
theme = "light"
api_token = "tok-123"

[keybindings]
add_item = "n"
refresh = "F5"
"#;
        let (dir, path) = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_url, "https://stock.example.com/backend");
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.theme, "light");
        assert_eq!(config.api_token.as_deref(), Some("tok-123"));
        assert_eq!(
            config.keybindings.get("refresh").map(String::as_str),
            Some("F5")
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
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "theme = \"dark\"\napi_uri = \"typo\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "request_timeout_secs = \"soon\"\n");
        assert!(Config::load(&path).is_err());
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
    fn test_debug_masks_api_token() {
        let config = Config {
            api_token: Some("super-secret-token".to_string()),
            ..Config::default()
        };
        let out = format!("{:?}", config);
        assert!(!out.contains("super-secret-token"));
        assert!(out.contains("[REDACTED]"));
    }

    #[test]
    fn test_api_url_precedence() {
        let config = Config {
            api_url: "https://file.example.com".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_api_url(Some("https://cli.example.com"), Some("https://env.example.com".into())),
            "https://cli.example.com"
        );
        assert_eq!(
            config.resolve_api_url(None, Some("https://env.example.com".into())),
            "https://env.example.com"
        );
        assert_eq!(
            config.resolve_api_url(None, Some("  ".into())),
            "https://file.example.com"
        );
        assert_eq!(config.resolve_api_url(None, None), "https://file.example.com");
    }

    #[test]
    fn test_token_precedence() {
        let config = Config {
            api_token: Some("from-file".to_string()),
            ..Config::default()
        };
        let token = config.resolve_token(Some("from-env".into())).unwrap();
        assert_eq!(token.expose_secret(), "from-env");
        let token = config.resolve_token(None).unwrap();
        assert_eq!(token.expose_secret(), "from-file");
        assert!(Config::default().resolve_token(Some(String::new())).is_none());
    }
}
