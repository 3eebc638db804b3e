//! Shared configuration for streamchat front ends.
//!
//! TOML profiles, API key resolution (env + keyring + plaintext), and
//! translation into the settings the auth client and the screen
//! controllers are built from.

pub mod telemetry;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use streamchat_api::{AuthClient, TlsMode, TransportConfig};
use streamchat_core::ScreenSettings;

const KEYRING_SERVICE: &str = "streamchat";
const ENV_PREFIX: &str = "STREAMCHAT_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to initialise tracing: {0}")]
    Telemetry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|profile| (name, profile))
            .ok_or_else(|| ConfigError::UnknownProfile(name.into()))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_user_search_limit")]
    pub user_search_limit: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            search_debounce_ms: default_search_debounce_ms(),
            user_search_limit: default_user_search_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_search_debounce_ms() -> u64 {
    750
}
fn default_user_search_limit() -> u32 {
    10
}

/// A named backend profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Auth backend base URL (e.g., "https://auth.example.com/api/").
    pub auth_url: String,

    /// Chat SDK API key (plaintext, prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Extra CA certificate to trust for the auth backend.
    pub ca_cert: Option<PathBuf>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override search debounce.
    pub search_debounce_ms: Option<u64>,

    /// Override user search page size.
    pub user_search_limit: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,

    /// Write to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
            file: None,
        }
    }
}

fn default_log_filter() -> String {
    "streamchat_core=info,streamchat_api=info".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "bs23", "streamchat").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("streamchat");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
///
/// Environment keys use `__` for nesting, e.g.
/// `STREAMCHAT_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the chat SDK API key: env var named by the profile, then the
/// system keyring, then plaintext in the config.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(val) = profile
        .api_key_env
        .as_deref()
        .and_then(|name| std::env::var(name).ok())
    {
        return Ok(SecretString::from(val));
    }

    if let Some(secret) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/api-key"))
        .and_then(|entry| entry.get_password())
        .ok()
    {
        return Ok(SecretString::from(secret));
    }

    if let Some(key) = &profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Settings ────────────────────────────────────────────────────────

/// Everything needed to build an `AuthClient`.
#[derive(Debug, Clone)]
pub struct AuthClientConfig {
    pub base_url: Url,
    pub transport: TransportConfig,
}

impl AuthClientConfig {
    pub fn build(&self) -> Result<AuthClient, streamchat_api::Error> {
        AuthClient::new(self.base_url.clone(), &self.transport)
    }
}

/// Resolved settings for one profile.
#[derive(Debug)]
pub struct AppSettings {
    pub auth: AuthClientConfig,
    pub chat_api_key: SecretString,
    pub screens: ScreenSettings,
}

/// Build `AppSettings` from a profile, with `defaults` filling the gaps.
pub fn profile_to_settings(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<AppSettings, ConfigError> {
    let base_url: Url = profile
        .auth_url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "auth_url".into(),
            reason: format!("invalid URL: {}", profile.auth_url),
        })?;
    if base_url.cannot_be_a_base() {
        return Err(ConfigError::Validation {
            field: "auth_url".into(),
            reason: format!("not a base URL: {base_url}"),
        });
    }

    let chat_api_key = resolve_api_key(profile, profile_name)?;

    let tls = profile
        .ca_cert
        .clone()
        .map_or(TlsMode::System, TlsMode::CustomCa);
    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    let screens = ScreenSettings {
        search_debounce: Duration::from_millis(
            profile
                .search_debounce_ms
                .unwrap_or(defaults.search_debounce_ms),
        ),
        user_search_limit: profile
            .user_search_limit
            .unwrap_or(defaults.user_search_limit),
    };

    Ok(AppSettings {
        auth: AuthClientConfig {
            base_url,
            transport: TransportConfig { tls, timeout },
        },
        chat_api_key,
        screens,
    })
}

/// Load config and resolve settings for `profile` (or the default one).
pub fn load_app_settings(profile: Option<&str>) -> Result<AppSettings, ConfigError> {
    let config = load_config()?;
    let (name, profile) = config.profile(profile)?;
    profile_to_settings(profile, name, &config.defaults)
}
