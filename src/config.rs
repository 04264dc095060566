use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Environment variables checked, in order, for the bot token.
const TOKEN_ENV_VARS: [&str; 2] = ["TELEGRAM_BOT_TOKEN", "TELOXIDE_TOKEN"];

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub shortener: ShortenerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShortenerConfig {
    /// TinyURL-compatible endpoint taking the long link as `?url=`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://tinyurl.com/api-create.php".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load the config file if present, apply env overrides, then validate.
    ///
    /// A missing file is fine as long as the token comes from the environment.
    pub fn load(path: &Path) -> Result<Self> {
        let env_token = TOKEN_ENV_VARS.iter().find_map(|key| {
            std::env::var(key)
                .ok()
                .filter(|value| !value.trim().is_empty())
        });
        Self::load_with_token(path, env_token)
    }

    fn load_with_token(path: &Path, token_override: Option<String>) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            info!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        config.override_token(token_override);

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML")
    }

    fn override_token(&mut self, token: Option<String>) {
        if let Some(token) = token {
            self.telegram.bot_token = token;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!(
                "No Telegram bot token configured: set [telegram] bot_token or {}",
                TOKEN_ENV_VARS[0]
            );
        }
        if self.shortener.timeout_secs == 0 {
            anyhow::bail!("[shortener] timeout_secs must be greater than zero");
        }
        Ok(())
    }
}
