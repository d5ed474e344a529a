//! User configuration from `config.toml`.
//!
//! Every key is optional. A missing file means defaults; a file that does not
//! parse is logged and also means defaults, so a typo never blocks a review.

use std::path::PathBuf;

use serde::Deserialize;
use texrev_core::provider::{select_provider, Provider, ProviderKind, ProviderSettings};
use texrev_core::types::Alignment;
use tracing::{debug, warn};

use crate::app::View;

pub const DEFAULT_THEME: &str = "catppuccin-mocha";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: Option<String>,
    pub view: Option<View>,
    pub alignment: Option<Alignment>,
    /// Preferred provider; falls back to priority order when unusable.
    pub provider: Option<ProviderKind>,
    pub providers: Vec<ProviderSettings>,
}

impl Config {
    pub fn theme_name(&self) -> &str {
        self.theme.as_deref().unwrap_or(DEFAULT_THEME)
    }

    pub fn provider(&self) -> Option<Provider> {
        select_provider(&self.providers, self.provider)
    }
}

/// Returns the path to the texrev config file.
///
/// Prefers `$XDG_CONFIG_HOME/texrev/config.toml`; falls back to
/// `~/.config/texrev/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("texrev").join("config.toml")
}

pub fn load_config() -> Config {
    let path = config_path();
    let raw = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(_) => {
            debug!(path = %path.display(), "no config file, using defaults");
            return Config::default();
        }
    };
    match toml::from_str(&raw) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config parse error, using defaults");
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_every_key() {
        let config: Config = toml::from_str(
            r#"
            theme = "dark"
            view = "unified"
            alignment = "lcs"
            provider = "openai"

            [[providers]]
            type = "openai"
            api_key = "sk"
            "#,
        )
        .unwrap();
        assert_eq!(config.theme_name(), "dark");
        assert_eq!(config.view, Some(View::Unified));
        assert_eq!(config.alignment, Some(Alignment::Lcs));
        assert_eq!(config.provider().map(|p| p.kind()), Some(ProviderKind::OpenAi));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.theme_name(), DEFAULT_THEME);
        assert!(config.view.is_none());
        assert!(config.provider().is_none());
    }
}
