use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Pre-compiled regex for hostname validation (compiled once at first use)
static HOSTNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9][-a-zA-Z0-9\.]*[a-zA-Z0-9]$").unwrap());

/// Default publish endpoint of the queue provider.
pub const DEFAULT_PUBLISH_URL: &str = "https://qstash.upstash.io/v1/publish";
/// Path the provider calls back on when delivering a job.
pub const DEFAULT_CALLBACK_PATH: &str = "/api/job-runner";

/// Routes served by the backend that the callback path may not shadow.
pub const RESERVED_PATHS: [&str; 3] = ["/api/jobs", "/api/health", "/api/ready"];

#[derive(Debug, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub server: Option<ServerSection>,
    #[serde(default)]
    pub logging: Option<LoggingSection>,
    #[serde(default)]
    pub queue: Option<QueueSection>,
    #[serde(default)]
    pub signing: Option<SigningSection>,
    #[serde(default)]
    pub dispatch: Option<DispatchSection>,
    #[serde(default)]
    pub api: Option<ApiSection>,
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub json: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct QueueSection {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub publish_url: Option<String>,
    #[serde(default)]
    pub callback_base_url: Option<String>,
    #[serde(default)]
    pub callback_path: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SigningSection {
    #[serde(default)]
    pub current_key: Option<String>,
    #[serde(default)]
    pub next_key: Option<String>,
    #[serde(default)]
    pub max_age_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct DispatchSection {
    #[serde(default)]
    pub dedup_enabled: Option<bool>,
    #[serde(default)]
    pub dedup_ttl_secs: Option<u64>,
    #[serde(default)]
    pub dedup_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ApiSection {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Load a RawConfigFile from a path. The format is inferred from the extension: .toml, .yaml/.yml, .json
pub fn load_raw_from_file<P: AsRef<Path>>(path: P) -> Result<RawConfigFile, ConfigError> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    parse_config_str(&s, ext.as_deref())
}

/// Parse configuration from a string with optional format hint
#[inline]
fn parse_config_str(s: &str, ext: Option<&str>) -> Result<RawConfigFile, ConfigError> {
    match ext {
        #[cfg(feature = "toml")]
        Some("toml") => toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        #[cfg(feature = "yaml")]
        Some("yaml" | "yml") => {
            serde_yaml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        #[cfg(feature = "json")]
        Some("json") => serde_json::from_str(s).map_err(|e| ConfigError::Parse(e.to_string())),
        _ => parse_config_auto(s),
    }
}

/// Try to parse config by attempting each enabled format
#[inline]
fn parse_config_auto(s: &str) -> Result<RawConfigFile, ConfigError> {
    #[cfg(feature = "yaml")]
    if let Ok(cfg) = serde_yaml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "toml")]
    if let Ok(cfg) = toml::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(feature = "json")]
    if let Ok(cfg) = serde_json::from_str(s) {
        return Ok(cfg);
    }

    #[cfg(any(feature = "yaml", feature = "toml", feature = "json"))]
    {
        Err(ConfigError::Parse(
            "failed to parse config as any supported format".into(),
        ))
    }

    #[cfg(not(any(feature = "yaml", feature = "toml", feature = "json")))]
    {
        let _ = s; // suppress unused warning
        Err(ConfigError::Parse("no config format enabled".into()))
    }
}

/// Run mode of the process. Development relaxes enqueue and signature checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    #[default]
    Production,
}

impl Environment {
    #[inline]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    /// Anything other than `development`/`dev` counts as production.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Self::Development,
            _ => Self::Production,
        })
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
        })
    }
}

/// Concrete application configuration with defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub queue: QueueConfig,
    pub signing: SigningConfig,
    pub dispatch: DispatchConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueueConfig {
    /// Bearer token for the queue provider. Never serialized.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub publish_url: String,
    pub callback_base_url: Option<String>,
    pub callback_path: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SigningConfig {
    #[serde(skip_serializing)]
    pub current_key: Option<String>,
    #[serde(skip_serializing)]
    pub next_key: Option<String>,
    pub max_age_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchConfig {
    pub dedup_enabled: bool,
    pub dedup_ttl_secs: u64,
    pub dedup_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiConfig {
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            token: None,
            publish_url: DEFAULT_PUBLISH_URL.to_string(),
            callback_base_url: None,
            callback_path: DEFAULT_CALLBACK_PATH.to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            dedup_enabled: true,
            dedup_ttl_secs: 600,
            dedup_capacity: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
            queue: QueueConfig::default(),
            signing: SigningConfig {
                current_key: None,
                next_key: None,
                max_age_secs: None,
            },
            dispatch: DispatchConfig::default(),
            api: ApiConfig { token: None },
        }
    }
}

#[inline]
fn parse_bool(s: &str) -> Result<bool, ()> {
    let bytes = s.as_bytes();
    match bytes {
        b"1" | b"true" | b"TRUE" | b"True" | b"yes" | b"YES" | b"Yes" | b"y" | b"Y" => Ok(true),
        b"0" | b"false" | b"FALSE" | b"False" | b"no" | b"NO" | b"No" | b"n" | b"N" => Ok(false),
        _ => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Ok(true),
            "false" | "no" | "n" => Ok(false),
            _ => Err(()),
        },
    }
}

/// Treat blank strings as unset; secrets copied from dashboards often arrive empty.
#[inline]
fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

/// Helper macro to apply optional value if present
macro_rules! apply_opt {
    ($target:expr, $source:expr) => {
        if let Some(v) = $source {
            $target = v;
        }
    };
    ($target:expr, $source:expr, wrap) => {
        if let Some(v) = $source {
            $target = Some(v);
        }
    };
}

/// Load concrete `Config` from optional file and environment variables.
/// Environment variables take precedence over file values and defaults.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<Config, ConfigError> {
    let mut cfg = Config::default();

    if let Some(p) = path {
        let raw = load_raw_from_file(p)?;
        apply_raw(&mut cfg, raw);
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw(cfg: &mut Config, raw: RawConfigFile) {
    if let Some(env_name) = raw.environment {
        cfg.environment = env_name.parse().unwrap_or_default();
    }
    if let Some(server) = raw.server {
        apply_opt!(cfg.server.host, server.host);
        apply_opt!(cfg.server.port, server.port);
    }
    if let Some(logging) = raw.logging {
        apply_opt!(cfg.logging.level, logging.level);
        apply_opt!(cfg.logging.json, logging.json);
    }
    if let Some(queue) = raw.queue {
        apply_opt!(cfg.queue.token, non_empty(queue.token), wrap);
        apply_opt!(cfg.queue.publish_url, queue.publish_url);
        apply_opt!(cfg.queue.callback_base_url, non_empty(queue.callback_base_url), wrap);
        apply_opt!(cfg.queue.callback_path, queue.callback_path);
        apply_opt!(cfg.queue.timeout_secs, queue.timeout_secs);
    }
    if let Some(signing) = raw.signing {
        apply_opt!(cfg.signing.current_key, non_empty(signing.current_key), wrap);
        apply_opt!(cfg.signing.next_key, non_empty(signing.next_key), wrap);
        apply_opt!(cfg.signing.max_age_secs, signing.max_age_secs, wrap);
    }
    if let Some(dispatch) = raw.dispatch {
        apply_opt!(cfg.dispatch.dedup_enabled, dispatch.dedup_enabled);
        apply_opt!(cfg.dispatch.dedup_ttl_secs, dispatch.dedup_ttl_secs);
        apply_opt!(cfg.dispatch.dedup_capacity, dispatch.dedup_capacity);
    }
    if let Some(api) = raw.api {
        apply_opt!(cfg.api.token, non_empty(api.token), wrap);
    }
}

/// Helper to parse env var as a specific type
#[inline]
fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Parse(format!("invalid {}: {}", key, e))),
        Err(_) => Ok(None),
    }
}

/// Helper to parse env var as bool
#[inline]
fn env_bool(key: &str) -> Result<Option<bool>, ConfigError> {
    match env::var(key) {
        Ok(v) => parse_bool(&v)
            .map(Some)
            .map_err(|_| ConfigError::Parse(format!("invalid {}", key))),
        Err(_) => Ok(None),
    }
}

/// Helper to get a non-empty env var as string
#[inline]
fn env_str(key: &str) -> Option<String> {
    non_empty(env::var(key).ok())
}

/// Apply all environment variable overrides to config
fn apply_env_overrides(cfg: &mut Config) -> Result<(), ConfigError> {
    // Legacy names used by the serverless deployment; the namespaced
    // variables below win when both are set.
    if let Some(v) = env_str("NODE_ENV") {
        cfg.environment = v.parse().unwrap_or_default();
    }
    if let Some(v) = env_str("QSTASH_TOKEN") {
        cfg.queue.token = Some(v);
    }
    if let Some(v) = env_str("QSTASH_URL") {
        cfg.queue.publish_url = v;
    }
    if let Some(v) = env_str("QSTASH_CURRENT_SIGNING_KEY") {
        cfg.signing.current_key = Some(v);
    }
    if let Some(v) = env_str("QSTASH_NEXT_SIGNING_KEY") {
        cfg.signing.next_key = Some(v);
    }

    if let Some(v) = env_str("TALENTHUB_ENVIRONMENT") {
        cfg.environment = v.parse().unwrap_or_default();
    }

    // Server
    if let Some(v) = env_str("TALENTHUB_SERVER_HOST") {
        cfg.server.host = v;
    }
    if let Some(v) = env_parse::<u16>("TALENTHUB_SERVER_PORT")? {
        cfg.server.port = v;
    }

    // Logging
    if let Some(v) = env_str("TALENTHUB_LOG_LEVEL") {
        cfg.logging.level = v;
    }
    if let Some(v) = env_bool("TALENTHUB_LOG_JSON")? {
        cfg.logging.json = v;
    }

    // Queue provider
    if let Some(v) = env_str("TALENTHUB_QUEUE_TOKEN") {
        cfg.queue.token = Some(v);
    }
    if let Some(v) = env_str("TALENTHUB_QUEUE_PUBLISH_URL") {
        cfg.queue.publish_url = v;
    }
    if let Some(v) = env_str("TALENTHUB_CALLBACK_BASE_URL") {
        cfg.queue.callback_base_url = Some(v);
    }
    if let Some(v) = env_str("TALENTHUB_CALLBACK_PATH") {
        cfg.queue.callback_path = v;
    }
    if let Some(v) = env_parse::<u64>("TALENTHUB_QUEUE_TIMEOUT_SECS")? {
        cfg.queue.timeout_secs = v;
    }

    // Signing keys
    if let Some(v) = env_str("TALENTHUB_SIGNING_CURRENT_KEY") {
        cfg.signing.current_key = Some(v);
    }
    if let Some(v) = env_str("TALENTHUB_SIGNING_NEXT_KEY") {
        cfg.signing.next_key = Some(v);
    }
    if let Some(v) = env_parse::<u64>("TALENTHUB_SIGNING_MAX_AGE_SECS")? {
        cfg.signing.max_age_secs = Some(v);
    }

    // Dispatch
    if let Some(v) = env_bool("TALENTHUB_DEDUP_ENABLED")? {
        cfg.dispatch.dedup_enabled = v;
    }
    if let Some(v) = env_parse::<u64>("TALENTHUB_DEDUP_TTL_SECS")? {
        cfg.dispatch.dedup_ttl_secs = v;
    }
    if let Some(v) = env_parse::<usize>("TALENTHUB_DEDUP_CAPACITY")? {
        cfg.dispatch.dedup_capacity = v;
    }

    // Internal API
    if let Some(v) = env_str("TALENTHUB_API_TOKEN") {
        cfg.api.token = Some(v);
    }

    Ok(())
}

/// Validate higher-level constraints on the resolved configuration.
pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.server.port == 0 {
        return Err(ConfigError::Validation("server.port must be > 0".into()));
    }
    let host_ok = cfg.server.host.parse::<std::net::IpAddr>().is_ok()
        || HOSTNAME_REGEX.is_match(&cfg.server.host);
    if !host_ok {
        return Err(ConfigError::Validation(format!(
            "invalid server.host: {}",
            cfg.server.host
        )));
    }

    require_http_url("queue.publish_url", &cfg.queue.publish_url)?;
    if let Some(base) = &cfg.queue.callback_base_url {
        require_http_url("queue.callback_base_url", base)?;
    }
    if !cfg.queue.callback_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "queue.callback_path must start with '/': {}",
            cfg.queue.callback_path
        )));
    }
    if RESERVED_PATHS.contains(&cfg.queue.callback_path.as_str()) {
        return Err(ConfigError::Validation(format!(
            "queue.callback_path collides with a built-in route: {}",
            cfg.queue.callback_path
        )));
    }
    if cfg.queue.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "queue.timeout_secs must be > 0".into(),
        ));
    }

    if cfg.signing.current_key.is_none() && cfg.signing.next_key.is_some() {
        return Err(ConfigError::Validation(
            "signing.next_key is set without signing.current_key".into(),
        ));
    }

    if cfg.dispatch.dedup_enabled && cfg.dispatch.dedup_capacity == 0 {
        return Err(ConfigError::Validation(
            "dispatch.dedup_capacity must be > 0 when dedup is enabled".into(),
        ));
    }
    Ok(())
}

fn require_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    match url::Url::parse(value) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => Ok(()),
        Ok(_) => Err(ConfigError::Validation(format!(
            "{field} must be http or https: {value}"
        ))),
        Err(_) => Err(ConfigError::Validation(format!(
            "invalid {field}: {value}"
        ))),
    }
}
