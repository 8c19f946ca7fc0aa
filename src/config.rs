//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::HttpClientConfig;
use crate::notify::ToastConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Admin backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Unset means no client-side timeout
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Credentials used when the backend reports no session (CLI use)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthConfig {
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) if !u.is_empty() => Some((u.clone(), p.clone())),
            _ => None,
        }
    }
}

/// Dashboard behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_toast_duration")]
    pub toast_duration_ms: u64,

    #[serde(default = "default_max_visible_toasts")]
    pub max_visible_toasts: usize,

    #[serde(default = "default_broadcast_history_limit")]
    pub broadcast_history_limit: usize,

    #[serde(default = "default_growth_period")]
    pub default_growth_period: String,

    #[serde(default = "default_mail_domain")]
    pub mail_domain: String,
}

fn default_search_debounce() -> u64 {
    500
}

fn default_toast_duration() -> u64 {
    3000
}

fn default_max_visible_toasts() -> usize {
    5
}

fn default_broadcast_history_limit() -> usize {
    50
}

fn default_growth_period() -> String {
    "month".to_string()
}

fn default_mail_domain() -> String {
    "garajhub.uz".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_search_debounce(),
            toast_duration_ms: default_toast_duration(),
            max_visible_toasts: default_max_visible_toasts(),
            broadcast_history_limit: default_broadcast_history_limit(),
            default_growth_period: default_growth_period(),
            mail_domain: default_mail_domain(),
        }
    }
}

impl DashboardConfig {
    pub fn toast_config(&self) -> ToastConfig {
        ToastConfig {
            duration: Duration::from_millis(self.toast_duration_ms),
            max_visible: self.max_visible_toasts,
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

/// Session gate policy
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// Clear the local identity when the logout request itself fails
    #[serde(default)]
    pub clear_on_logout_failure: bool,
}

/// Where the theme preference lives
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeConfig {
    pub file: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("garaj-admin").join("config.toml")),
            Some(PathBuf::from("/etc/garaj-admin/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(url) = var("GARAJ_ADMIN_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = var("GARAJ_ADMIN_REQUEST_TIMEOUT_SECS") {
            if let Ok(t) = timeout.parse() {
                self.api.request_timeout_secs = Some(t);
            }
        }

        // Credentials
        if let Some(username) = var("GARAJ_ADMIN_USERNAME") {
            self.auth.username = Some(username);
        }
        if let Some(password) = var("GARAJ_ADMIN_PASSWORD") {
            self.auth.password = Some(password);
        }

        // Theme store
        if let Some(file) = var("GARAJ_ADMIN_THEME_FILE") {
            self.theme.file = Some(file);
        }

        // Logging overrides
        if let Some(level) = var("GARAJ_ADMIN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("GARAJ_ADMIN_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# garaj-admin Configuration
#
# Environment variables override these settings:
# - GARAJ_ADMIN_API_URL
# - GARAJ_ADMIN_REQUEST_TIMEOUT_SECS
# - GARAJ_ADMIN_USERNAME / GARAJ_ADMIN_PASSWORD
# - GARAJ_ADMIN_THEME_FILE
# - GARAJ_ADMIN_LOG_LEVEL
# - GARAJ_ADMIN_LOG_FORMAT

[api]
# Admin backend origin
base_url = "http://localhost:5000"

# Per-request timeout in seconds (unset: no timeout)
# request_timeout_secs = 30

[auth]
# Used only when the backend reports no active session
# username = "admin"
# password = ""

[dashboard]
# Delay before a search box change reloads the list (ms)
search_debounce_ms = 500

# How long a toast stays visible (ms)
toast_duration_ms = 3000

# Toasts shown at once
max_visible_toasts = 5

# Sent broadcasts kept in the local history
broadcast_history_limit = 50

# Initial user growth period: day, week, month, year
default_growth_period = "month"

# Domain appended to the admin handle in the header
mail_domain = "garajhub.uz"

[session]
# Clear the local session even when the logout request fails
clear_on_logout_failure = false

[theme]
# Preference file (default: <config dir>/garaj-admin/preferences.toml)
# file = "~/.config/garaj-admin/preferences.toml"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
