//! Client configuration from the environment

use std::time::Duration;
use thiserror::Error;

const PROD_BASE_URL: &str = "https://agent-api.prd.getcometa.com";
const LOCAL_BASE_URL: &str = "http://localhost:8010";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ASKDB_API_KEY is not set")]
    MissingApiKey,
    #[error("Unknown environment '{0}', expected 'prod' or 'local'")]
    UnknownEnvironment(String),
    #[error("{var} must be {expected}, got '{value}'")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Deployment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Prod,
    Local,
}

impl Environment {
    /// Parse an environment name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownEnvironment`] for anything other than
    /// `prod`, `production` or `local`.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Ok(Environment::Prod),
            "local" => Ok(Environment::Local),
            _ => Err(ConfigError::UnknownEnvironment(value.to_string())),
        }
    }

    #[must_use]
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Prod => PROD_BASE_URL,
            Environment::Local => LOCAL_BASE_URL,
        }
    }
}

/// School identity passed through on every turn
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SchoolContext {
    pub school_id: String,
    pub school_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub environment: Environment,
    pub base_url: String,
    pub api_key: String,
    pub school: SchoolContext,
    pub http_timeout: Duration,
    /// Print the metadata summary after each assistant turn
    pub show_metadata: bool,
}

impl ClientConfig {
    /// Read the config from the process environment.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; blank values count as unset.
    ///
    /// # Errors
    ///
    /// Fails when `ASKDB_API_KEY` is missing, or when `ASKDB_ENV`,
    /// `ASKDB_HTTP_TIMEOUT_SECS` or `ASKDB_SHOW_METADATA` holds a value that
    /// does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = get("ASKDB_ENV")
            .map(|v| Environment::parse(&v))
            .transpose()?
            .unwrap_or_default();

        let base_url = get("ASKDB_BASE_URL")
            .unwrap_or_else(|| environment.base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        let api_key = get("ASKDB_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        let http_timeout = get("ASKDB_HTTP_TIMEOUT_SECS")
            .map(parse_timeout)
            .transpose()?
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let show_metadata = get("ASKDB_SHOW_METADATA")
            .map(|v| {
                parse_bool(&v).ok_or(ConfigError::InvalidValue {
                    var: "ASKDB_SHOW_METADATA",
                    expected: "true or false",
                    value: v,
                })
            })
            .transpose()?
            .unwrap_or(true);

        Ok(Self {
            environment,
            base_url,
            api_key,
            school: SchoolContext {
                school_id: get("ASKDB_SCHOOL_ID").unwrap_or_default(),
                school_name: get("ASKDB_SCHOOL_NAME").unwrap_or_default(),
            },
            http_timeout,
            show_metadata,
        })
    }
}

fn parse_timeout(value: String) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or(ConfigError::InvalidValue {
            var: "ASKDB_HTTP_TIMEOUT_SECS",
            expected: "a positive number of seconds",
            value,
        })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
