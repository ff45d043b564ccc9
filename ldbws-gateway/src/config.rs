//! Process configuration.
//!
//! Everything is read from environment variables (optionally seeded from a
//! `.env` file by the binary). [`GatewayConfig::from_lookup`] takes the
//! lookup as a closure so the parsing rules can be tested without touching
//! the process environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::DEFAULT_TTL;

/// Default listen address.
const DEFAULT_BIND: &str = "127.0.0.1:5001";

/// Default station list location.
const DEFAULT_STATION_CODES: &str = "station_codes.json";

/// Name of the fallback credential file in the user's home directory.
pub const TOKEN_FILE_NAME: &str = ".ldbws-access-token";

/// Errors while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error(
        "no upstream configured: set LDBWS_REST_PROXY, LDBWS_MOCK_DATA, \
         LDBWS_ACCESS_TOKEN or ~/{TOKEN_FILE_NAME}"
    )]
    NoUpstream,
}

/// Where normalized documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamMode {
    /// Query LDBWS directly and project the records.
    Direct {
        access_token: String,
        base_url: Option<String>,
    },
    /// Forward to a REST proxy host and pass its bytes through.
    Proxy { host: String },
    /// Serve canned records from a directory.
    Mock { data_dir: PathBuf },
}

/// Which cache store backs the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
    /// In-process moka cache.
    Memory,
    /// Shared Redis server.
    Redis { url: String },
    /// No caching.
    Disabled,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Full gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub bind: SocketAddr,
    pub upstream: UpstreamMode,
    pub cache: CacheBackend,
    pub station_codes: PathBuf,
    pub cache_ttl: Duration,
    pub upstream_timeout: Duration,
    pub cache_timeout: Duration,
    pub log_format: LogFormat,
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        Self::from_lookup(|name| std::env::var(name).ok(), home.as_deref())
    }

    /// Read configuration through `lookup`, using `home` for the fallback token file.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
        home: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_value = var("LDBWS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_value.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name: "LDBWS_BIND",
            value: bind_value.clone(),
            reason: e.to_string(),
        })?;

        let upstream = if let Some(host) = var("LDBWS_REST_PROXY") {
            UpstreamMode::Proxy { host }
        } else if let Some(dir) = var("LDBWS_MOCK_DATA") {
            UpstreamMode::Mock {
                data_dir: PathBuf::from(dir),
            }
        } else {
            let access_token = var("LDBWS_ACCESS_TOKEN")
                .or_else(|| home.and_then(read_token_file))
                .ok_or(ConfigError::NoUpstream)?;
            UpstreamMode::Direct {
                access_token,
                base_url: var("LDBWS_BASE_URL"),
            }
        };

        let cache = match (var("REDIS_URL"), var("REDIS_HOST"), var("LDBWS_CACHE")) {
            (_, _, Some(mode)) if mode.eq_ignore_ascii_case("off") => CacheBackend::Disabled,
            (Some(url), _, _) => CacheBackend::Redis { url },
            (None, Some(host), _) => CacheBackend::Redis {
                url: format!("redis://{host}/0"),
            },
            (None, None, _) => CacheBackend::Memory,
        };

        let log_format = match var("LDBWS_LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            Some("text") | None => LogFormat::Text,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LDBWS_LOG_FORMAT",
                    value: other.to_string(),
                    reason: "expected \"text\" or \"json\"".to_string(),
                });
            }
        };

        Ok(Self {
            bind,
            upstream,
            cache,
            station_codes: var("LDBWS_STATION_CODES")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATION_CODES)),
            cache_ttl: seconds(&var, "LDBWS_CACHE_TTL_SECS")?.unwrap_or(DEFAULT_TTL),
            upstream_timeout: seconds(&var, "LDBWS_UPSTREAM_TIMEOUT_SECS")?
                .unwrap_or(Duration::from_secs(5)),
            cache_timeout: seconds(&var, "LDBWS_CACHE_TIMEOUT_SECS")?
                .unwrap_or(Duration::from_secs(2)),
            log_format,
        })
    }
}

/// Read the fallback access token from `{home}/.ldbws-access-token`.
fn read_token_file(home: &Path) -> Option<String> {
    let token = std::fs::read_to_string(home.join(TOKEN_FILE_NAME)).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Parse an optional positive number of seconds.
fn seconds(
    var: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = var(name) else {
        return Ok(None);
    };
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        Ok(_) => Err(ConfigError::Invalid {
            name,
            value,
            reason: "must be greater than zero".to_string(),
        }),
        Err(e) => Err(ConfigError::Invalid {
            name,
            value,
            reason: e.to_string(),
        }),
    }
}
