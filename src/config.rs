use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

use crate::comment_text::{OverflowPolicy, DEFAULT_PREVIEW_LIMIT, GALLERY_COMMENT_LIMIT};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8787";
pub const DEFAULT_PORT: u16 = 8787;

/// On-disk configuration; every key is optional and falls through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MakotoConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict_comment: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub port: u16,
    pub preview_limit: usize,
    pub comment_limit: usize,
    pub overflow_policy: OverflowPolicy,
    pub data_dir: PathBuf,
}

impl Settings {
    /// Resolve every key with priority: ENV > local > global > default
    pub fn load() -> Result<Self> {
        Self::resolve(
            |key| std::env::var(key).ok(),
            load_local_config().ok(),
            load_global_config().ok(),
        )
    }

    pub fn resolve<F>(env: F, local: Option<MakotoConfig>, global: Option<MakotoConfig>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let layers: Vec<MakotoConfig> = local.into_iter().chain(global).collect();
        let from_files = |pick: &dyn Fn(&MakotoConfig) -> Option<String>| layers.iter().find_map(pick);

        let api_base_url = env("MAKOTO_API_BASE_URL")
            .or_else(|| from_files(&|c: &MakotoConfig| c.api_base_url.clone()))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let port = parsed_env(&env, "MAKOTO_PORT")
            .or_else(|| layers.iter().find_map(|c| c.port))
            .unwrap_or(DEFAULT_PORT);

        let preview_limit = parsed_env(&env, "MAKOTO_PREVIEW_LIMIT")
            .or_else(|| layers.iter().find_map(|c| c.preview_limit))
            .unwrap_or(DEFAULT_PREVIEW_LIMIT);

        let comment_limit = parsed_env(&env, "MAKOTO_COMMENT_LIMIT")
            .or_else(|| layers.iter().find_map(|c| c.comment_limit))
            .unwrap_or(GALLERY_COMMENT_LIMIT);

        let strict = parsed_env(&env, "MAKOTO_STRICT_COMMENT")
            .or_else(|| layers.iter().find_map(|c| c.strict_comment))
            .unwrap_or(false);

        let data_dir = match env("MAKOTO_DATA_DIR").or_else(|| from_files(&|c: &MakotoConfig| c.data_dir.clone())) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        Ok(Self {
            api_base_url,
            port,
            preview_limit,
            comment_limit,
            overflow_policy: OverflowPolicy::from_strict(strict),
            data_dir,
        })
    }
}

/// Parse an environment override, ignoring (with a warning) values that do not parse.
fn parsed_env<F, T>(env: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = env(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable environment override");
            None
        }
    }
}

fn default_data_dir() -> Result<PathBuf> {
    let data = dirs::data_dir().context("Failed to get data directory")?;
    Ok(data.join("makoto"))
}

fn local_config_path() -> PathBuf {
    PathBuf::from(".makoto").join("config.json")
}

fn global_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Failed to get config directory")?
        .join("makoto");
    Ok(config_dir.join("config.json"))
}

/// Load local config from .makoto/config.json
pub fn load_local_config() -> Result<MakotoConfig> {
    let contents = std::fs::read_to_string(local_config_path())
        .context("Failed to read local config")?;
    let config: MakotoConfig = serde_json::from_str(&contents)
        .context("Failed to parse local config")?;
    Ok(config)
}

/// Load global config from ~/.config/makoto/config.json
pub fn load_global_config() -> Result<MakotoConfig> {
    let contents = std::fs::read_to_string(global_config_path()?)
        .context("Failed to read global config")?;
    let config: MakotoConfig = serde_json::from_str(&contents)
        .context("Failed to parse global config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(env_from(&[("MAKOTO_DATA_DIR", "/tmp/m")]), None, None).unwrap();
        assert_eq!(settings.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.preview_limit, 120);
        assert_eq!(settings.comment_limit, 60);
        assert_eq!(settings.overflow_policy, OverflowPolicy::KeepFirst);
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/m"));
    }

    #[test]
    fn test_env_beats_local_beats_global() {
        let local = MakotoConfig {
            port: Some(9000),
            preview_limit: Some(80),
            ..Default::default()
        };
        let global = MakotoConfig {
            port: Some(9100),
            preview_limit: Some(90),
            comment_limit: Some(40),
            strict_comment: Some(true),
            data_dir: Some("/var/makoto".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(
            env_from(&[("MAKOTO_PORT", "9200")]),
            Some(local),
            Some(global),
        )
        .unwrap();
        assert_eq!(settings.port, 9200);
        assert_eq!(settings.preview_limit, 80);
        assert_eq!(settings.comment_limit, 40);
        assert_eq!(settings.overflow_policy, OverflowPolicy::Truncate);
        assert_eq!(settings.data_dir, PathBuf::from("/var/makoto"));
    }

    #[test]
    fn test_unparsable_env_falls_through() {
        let local = MakotoConfig {
            port: Some(9000),
            ..Default::default()
        };
        let settings = Settings::resolve(
            env_from(&[("MAKOTO_PORT", "eighty"), ("MAKOTO_DATA_DIR", "/tmp/m")]),
            Some(local),
            None,
        )
        .unwrap();
        assert_eq!(settings.port, 9000);
    }

    #[test]
    fn test_config_json_skips_unset_keys() {
        let config = MakotoConfig {
            port: Some(1234),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"port":1234}"#);
        let parsed: MakotoConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, MakotoConfig::default());
    }
}
