use std::env;
use std::path::PathBuf;

use crate::provider::{ModelSource, PretrainedModel};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_MAX_BODY: usize = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    InvalidValue {
        var: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("unknown model {0:?} (set EMBED_MODEL_PATH to serve a local model)")]
    UnknownModel(String),
}

/// Server settings, read once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub model: ModelSource,
    /// `None` keeps actix's default of one worker per physical core.
    pub workers: Option<usize>,
    pub max_body: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            model: ModelSource::Pretrained(PretrainedModel::AllMiniLmL6V2),
            workers: None,
            max_body: DEFAULT_MAX_BODY,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Builds the config from any variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(host) = get("EMBED_HOST") {
            config.host = host;
        }
        if let Some(port) = get("EMBED_PORT") {
            config.port = parse(&port, "EMBED_PORT", "a port number")?;
        }
        if let Some(workers) = get("EMBED_WORKERS") {
            let workers: usize = parse(&workers, "EMBED_WORKERS", "a positive integer")?;
            if workers == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "EMBED_WORKERS",
                    expected: "a positive integer",
                    value: "0".to_owned(),
                });
            }
            config.workers = Some(workers);
        }
        if let Some(max_body) = get("EMBED_MAX_BODY") {
            config.max_body = parse(&max_body, "EMBED_MAX_BODY", "a size in bytes")?;
        }

        config.model = match (get("EMBED_MODEL_PATH"), get("EMBED_MODEL")) {
            (Some(path), _) => ModelSource::Local(PathBuf::from(path)),
            (None, Some(name)) => ModelSource::Pretrained(
                name.parse().map_err(ConfigError::UnknownModel)?,
            ),
            (None, None) => config.model,
        };

        Ok(config)
    }

    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn parse<T: std::str::FromStr>(
    value: &str,
    var: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            var,
            expected,
            value: value.to_owned(),
        })
}
