use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::transcript::{LanguagePlan, LanguagePreference};

/// Environment variable holding the summarization API key
pub const API_KEY_ENV: &str = "CO_API_KEY";

/// Older name for [`API_KEY_ENV`], still honored
pub const LEGACY_API_KEY_ENV: &str = "API_KEY";

pub const DEFAULT_API_BASE: &str = "https://api.cohere.ai";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub model: Option<String>,
    pub primary_lang: Option<String>,
    pub fallback_langs: Option<Vec<String>>,
    pub max_chars: Option<usize>,
    pub pacing_secs: Option<u64>,
    pub bind: Option<String>,
    pub summary_file: Option<PathBuf>,
    pub api_base: Option<String>,
}

/// Everything the summarization client needs, resolved once at startup
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn model(&self) -> String {
        self.model.clone().unwrap_or_else(|| "command".to_string())
    }

    pub fn language_plan(&self) -> LanguagePlan {
        let mut plan = LanguagePlan::default();
        if let Some(ref primary) = self.primary_lang {
            plan.primary = primary.clone();
        }
        if let Some(ref fallback) = self.fallback_langs {
            plan.fallback = fallback.iter().map(|l| LanguagePreference::parse(l)).collect();
        }
        plan
    }

    pub fn max_chars(&self) -> Result<NonZeroUsize> {
        match self.max_chars {
            None => Ok(crate::chunk::DEFAULT_MAX_CHARS),
            Some(n) => match NonZeroUsize::new(n) {
                Some(n) => Ok(n),
                None => bail!("max_chars must be a positive integer"),
            },
        }
    }

    pub fn pacing(&self) -> Duration {
        self.pacing_secs
            .map(Duration::from_secs)
            .unwrap_or(crate::summarize::DEFAULT_PACING)
    }

    pub fn bind(&self) -> Result<SocketAddr> {
        let addr = self.bind.as_deref().unwrap_or("127.0.0.1:5000");
        Ok(addr.parse()?)
    }

    pub fn summary_file(&self) -> PathBuf {
        self.summary_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("yt_summary.txt"))
    }

    /// Combine file settings with the API key from the environment
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            api_key: api_key_from_env(),
            model: self.model(),
            api_base: self.api_base.clone().unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        }
    }
}

/// First non-empty API key among [`API_KEY_ENV`] and [`LEGACY_API_KEY_ENV`]
pub fn api_key_from_env() -> Option<String> {
    api_key_from(|name| std::env::var(name).ok())
}

fn api_key_from<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    [API_KEY_ENV, LEGACY_API_KEY_ENV]
        .iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
model = "command-r-plus"
primary_lang = "es"
fallback_langs = ["es", "en", "auto"]
max_chars = 2000
pacing_secs = 3
bind = "0.0.0.0:8080"
summary_file = "out.txt"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model(), "command-r-plus");
        let plan = config.language_plan();
        assert_eq!(plan.primary, "es");
        assert_eq!(plan.fallback[2], LanguagePreference::AutoGenerated);
        assert_eq!(config.max_chars().unwrap().get(), 2000);
        assert_eq!(config.pacing(), Duration::from_secs(3));
        assert_eq!(config.bind().unwrap().port(), 8080);
        assert_eq!(config.summary_file(), PathBuf::from("out.txt"));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.model(), "command");
        assert_eq!(config.language_plan().primary, "en");
        assert_eq!(config.max_chars().unwrap().get(), 4000);
        assert_eq!(config.pacing(), Duration::from_secs(12));
        assert_eq!(config.bind().unwrap().port(), 5000);
        assert_eq!(config.summary_file(), PathBuf::from("yt_summary.txt"));
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(r#"primary_lang = "fr""#).unwrap();
        let plan = config.language_plan();
        assert_eq!(plan.primary, "fr");
        assert_eq!(plan.fallback.len(), 4);
        assert!(config.model.is_none());
    }

    #[test]
    fn test_zero_max_chars_rejected() {
        let config: Config = toml::from_str("max_chars = 0").unwrap();
        assert!(config.max_chars().is_err());
    }

    #[test]
    fn test_api_key_lookup_order() {
        let both = |name: &str| Some(format!("key-for-{name}"));
        assert_eq!(api_key_from(both).as_deref(), Some("key-for-CO_API_KEY"));

        let legacy_only = |name: &str| (name == LEGACY_API_KEY_ENV).then(|| " legacy ".to_string());
        assert_eq!(api_key_from(legacy_only).as_deref(), Some("legacy"));

        let blank_primary = |name: &str| match name {
            API_KEY_ENV => Some("  ".to_string()),
            _ => Some("fallback".to_string()),
        };
        assert_eq!(api_key_from(blank_primary).as_deref(), Some("fallback"));

        assert_eq!(api_key_from(|_: &str| None), None);
    }

    #[test]
    fn test_service_config_defaults() {
        let config = Config::default();
        let service = config.service_config();
        assert_eq!(service.model, "command");
        assert_eq!(service.api_base, DEFAULT_API_BASE);
    }
}
