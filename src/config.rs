//! Runtime configuration read from the environment (and `.env` via `dotenv`).

use std::env;
use std::fmt;
use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::utils::fun_facts::DEFAULT_API_URL;

pub const DEFAULT_PREFIX: &str = "!";
pub const DEFAULT_NOTIFY_CHANNEL: &str = "general";
pub const DEFAULT_FUN_FACT_TIMEOUT_SECS: u64 = 5;

/// Errors that can occur while loading the configuration.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(&'static str),

    #[error("Invalid URL in {var}: {source}")]
    InvalidUrl {
        var: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid number in {var}: {source}")]
    InvalidNumber {
        var: &'static str,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Clone)]
pub struct BotConfig {
    /// Discord bot token.
    pub discord_token: String,
    /// Prefix for text commands, e.g. `!vote`.
    pub prefix: String,
    /// Name of the text channel receiving voice chat announcements.
    pub notify_channel: String,
    /// Fun fact endpoint; `None` serves bundled facts only.
    pub fun_fact_api: Option<Url>,
    pub fun_fact_timeout: Duration,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("discord_token", &"<redacted>")
            .field("prefix", &self.prefix)
            .field("notify_channel", &self.notify_channel)
            .field("fun_fact_api", &self.fun_fact_api.as_ref().map(Url::as_str))
            .field("fun_fact_timeout", &self.fun_fact_timeout)
            .finish()
    }
}

impl BotConfig {
    /// Loads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name
    /// to its value. Blank values count as unset, except for
    /// `FUN_FACT_API_URL` where a blank value disables the API.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let discord_token = non_blank("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let prefix = non_blank("COMMAND_PREFIX")
            .map(|prefix| prefix.trim().to_string())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let notify_channel = non_blank("NOTIFY_CHANNEL")
            .map(|channel| channel.trim().trim_start_matches('#').to_string())
            .unwrap_or_else(|| DEFAULT_NOTIFY_CHANNEL.to_string());

        let fun_fact_api = match lookup("FUN_FACT_API_URL") {
            Some(value) if value.trim().is_empty() => None,
            Some(value) => Some(parse_url("FUN_FACT_API_URL", value.trim())?),
            None => Some(parse_url("FUN_FACT_API_URL", DEFAULT_API_URL)?),
        };

        let timeout_secs = match non_blank("FUN_FACT_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|source| ConfigError::InvalidNumber {
                    var: "FUN_FACT_TIMEOUT_SECS",
                    source,
                })?,
            None => DEFAULT_FUN_FACT_TIMEOUT_SECS,
        };

        Ok(Self {
            discord_token,
            prefix,
            notify_channel,
            fun_fact_api,
            fun_fact_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl { var, source })
}
