use diary_editor::{HighlightConfig, HistoryConfig, Language};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_NAME: &str = "diary.config.json";

/// Diary configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Diary service host, scheme included
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Minimum time the loading state of a view is shown
    #[serde(default = "default_loading_floor_ms")]
    pub loading_floor_ms: u64,

    /// Editor undo history
    #[serde(default)]
    pub history: HistoryConfig,

    /// Languages code blocks may be detected as
    #[serde(default = "default_highlight_languages")]
    pub highlight_languages: Vec<Language>,

    /// File holding the access token, relative to the working directory
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

fn default_host() -> String {
    "http://localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_loading_floor_ms() -> u64 {
    500
}

fn default_highlight_languages() -> Vec<Language> {
    HighlightConfig::default().languages
}

fn default_token_path() -> String {
    ".diary-token".to_string()
}

impl Config {
    /// Load config from a directory, then apply environment overrides
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("{}: {}", config_path.display(), e))?
        } else {
            // Return default config if none exists
            Config::default()
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// `DIARY_HOST` and `DIARY_PORT` win over the file.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(host) = lookup("DIARY_HOST").filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(port) = lookup("DIARY_PORT").filter(|p| !p.is_empty()) {
            self.port = port
                .parse()
                .map_err(|_| anyhow::anyhow!("DIARY_PORT is not a port number: {}", port))?;
        }
        Ok(())
    }

    pub fn loading_floor(&self) -> Duration {
        Duration::from_millis(self.loading_floor_ms)
    }

    pub fn highlight(&self) -> HighlightConfig {
        HighlightConfig {
            languages: self.highlight_languages.clone(),
        }
    }

    /// Get absolute path to the token file
    pub fn get_token_path(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.token_path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            loading_floor_ms: default_loading_floor_ms(),
            history: HistoryConfig::default(),
            highlight_languages: default_highlight_languages(),
            token_path: default_token_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "host": "https://diary.example.com",
            "port": 443,
            "history": { "maxStack": 20 },
            "highlightLanguages": ["python", "cpp"]
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.host, "https://diary.example.com");
        assert_eq!(config.port, 443);
        assert_eq!(config.history.max_stack, 20);
        assert_eq!(config.history.delay_ms, 500);
        assert!(config.history.user_only);
        assert_eq!(
            config.highlight_languages,
            vec![Language::Python, Language::Cpp]
        );
        assert_eq!(config.loading_floor_ms, 500);
        assert_eq!(config.token_path, ".diary-token");
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.port, 8080);
        assert_eq!(config.loading_floor(), Duration::from_millis(500));
        assert_eq!(config.highlight_languages.len(), 4);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config: Config = serde_json::from_str("{}").unwrap();
        config.apply_overrides(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(
            config.get_token_path(dir.path()),
            dir.path().join(".diary-token")
        );
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> =
            HashMap::from([("DIARY_HOST", "http://10.0.0.2"), ("DIARY_PORT", "9000")]);
        let mut config = Config::default();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.host, "http://10.0.0.2");
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = Config::default();
        assert!(config
            .apply_overrides(|name| (name == "DIARY_PORT").then(|| "http".to_string()))
            .is_err());
    }
}
