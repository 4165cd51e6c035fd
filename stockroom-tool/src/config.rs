use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use stockroom_http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use tracing::warn;

pub const REMOTE_URL_ENV: &str = "STOCKROOM_REMOTE_URL";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct RemoteConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

/// Effective settings after merging flags, environment, config file and defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    pub store_path: PathBuf,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stockroom").join("config.toml"))
}

pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stockroom")
        .join("store")
}

pub fn parse_config(content: &str) -> Config {
    toml::from_str(content).unwrap_or_else(|err| {
        warn!(%err, "ignoring malformed config file");
        Config::default()
    })
}

pub fn load_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };

    let Ok(content) = std::fs::read_to_string(path) else {
        return Config::default();
    };

    parse_config(&content)
}

/// Flag beats environment beats config file beats default.
pub fn resolve_settings(
    cli_remote: Option<String>,
    env_remote: Option<String>,
    cli_store: Option<PathBuf>,
    config: Config,
) -> Settings {
    let base_url = cli_remote
        .or(env_remote.filter(|url| !url.is_empty()))
        .or(config.remote.base_url)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let timeout = config
        .remote
        .timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let store_path = cli_store
        .or(config.store.path)
        .unwrap_or_else(default_store_path);

    Settings {
        base_url,
        timeout,
        store_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = parse_config(
            r#"
            [remote]
            base_url = "https://stock.example.com/api"
            timeout_secs = 5

            [store]
            path = "/var/lib/stockroom"
            "#,
        );

        assert_eq!(
            config.remote.base_url.as_deref(),
            Some("https://stock.example.com/api")
        );
        assert_eq!(config.remote.timeout_secs, Some(5));
        assert_eq!(config.store.path, Some(PathBuf::from("/var/lib/stockroom")));
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let config = parse_config("[remote\nbase_url = ");

        assert!(config.remote.base_url.is_none());
        assert!(config.store.path.is_none());
    }

    #[test]
    fn defaults_when_nothing_configured() {
        let settings = resolve_settings(None, None, None, Config::default());

        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout, DEFAULT_TIMEOUT);
        assert_eq!(settings.store_path, default_store_path());
    }

    #[test]
    fn flag_overrides_env_and_file() {
        let config = parse_config("[remote]\nbase_url = \"http://file\"\n");

        let settings = resolve_settings(
            Some("http://flag".to_string()),
            Some("http://env".to_string()),
            Some(PathBuf::from("/tmp/flag-store")),
            config,
        );

        assert_eq!(settings.base_url, "http://flag");
        assert_eq!(settings.store_path, PathBuf::from("/tmp/flag-store"));
    }

    #[test]
    fn env_overrides_file() {
        let config = parse_config("[remote]\nbase_url = \"http://file\"\ntimeout_secs = 3\n");

        let settings = resolve_settings(None, Some("http://env".to_string()), None, config);

        assert_eq!(settings.base_url, "http://env");
        assert_eq!(settings.timeout, Duration::from_secs(3));
    }

    #[test]
    fn empty_env_is_ignored() {
        let config = parse_config("[remote]\nbase_url = \"http://file\"\n");

        let settings = resolve_settings(None, Some(String::new()), None, config);

        assert_eq!(settings.base_url, "http://file");
    }
}
