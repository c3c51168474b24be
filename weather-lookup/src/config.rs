use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::time::Duration;

/// Prefix shared by every environment variable this crate reads.
pub const ENV_PREFIX: &str = "OPENWEATHER_";

/// Process-wide provider settings, loaded once at startup.
///
/// Example environment:
/// OPENWEATHER_API_KEY=...
/// OPENWEATHER_LANG=tr
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_key: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Language of the provider's weather descriptions.
    #[serde(default = "default_lang")]
    pub lang: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://api.openweathermap.org".to_string()
}

fn default_lang() -> String {
    "tr".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Build a config around an explicit credential, with every other field defaulted.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            lang: default_lang(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Load from `OPENWEATHER_*` process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load from an explicit set of variables; same rules as [`Config::from_env`].
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let cfg: Config = envy::prefixed(ENV_PREFIX).from_iter(vars).with_context(|| {
            format!(
                "Failed to load {ENV_PREFIX}* configuration; {ENV_PREFIX}API_KEY is required.\n\
                 Hint: set it in the environment or in a `.env` file."
            )
        })?;

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow!("{ENV_PREFIX}API_KEY is set but empty."));
        }
        if self.timeout_secs == 0 {
            return Err(anyhow!("{ENV_PREFIX}TIMEOUT_SECS must be greater than zero."));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Endpoint for the current-weather call, without query parameters.
    pub fn current_weather_url(&self) -> String {
        format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'))
    }
}
