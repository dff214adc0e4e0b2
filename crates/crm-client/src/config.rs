//! Configuration types and loading
//!
//! Config precedence: env vars > config file > defaults.
//! `CRM_BASE_URL` lets each environment point the same build at its own API.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crm_auth::DEFAULT_REFRESH_PATH;

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// API client settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Refresh endpoint path, relative to `base_url`
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Log every outgoing request as an equivalent curl command
    #[serde(default)]
    pub dev_mode: bool,
    /// Share one in-flight refresh between concurrent 401s
    #[serde(default)]
    pub single_flight_refresh: bool,
}

/// Session storage settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("crm-session.json")
}

impl ApiConfig {
    /// Settings for `base_url` with every other field at its default.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout(),
            refresh_path: default_refresh_path(),
            dev_mode: false,
            single_flight_refresh: false,
        }
    }

    /// Base URL without trailing slashes, ready for path concatenation.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Absolute refresh endpoint URL.
    pub fn refresh_url(&self) -> String {
        format!("{}{}", self.base_url(), self.refresh_path)
    }

    pub fn validate(&self) -> common::Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        if self.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if !self.refresh_path.starts_with('/') {
            return Err(common::Error::Config(format!(
                "refresh_path must start with '/', got: {}",
                self.refresh_path
            )));
        }

        Ok(())
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    ///
    /// - `CRM_BASE_URL` replaces `api.base_url`
    /// - `CRM_DEV_MODE` (`1`/`true`/`0`/`false`) replaces `api.dev_mode`
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;

        if let Ok(base_url) = std::env::var("CRM_BASE_URL") {
            config.api.base_url = base_url;
        }

        if let Ok(flag) = std::env::var("CRM_DEV_MODE") {
            config.api.dev_mode = parse_flag(&flag).ok_or_else(|| {
                common::Error::Config(format!("CRM_DEV_MODE must be true/false/1/0, got: {flag}"))
            })?;
        }

        config.api.validate()?;
        Ok(config)
    }

    /// Resolve config file path from an explicit path or CRM_CONFIG_PATH env var.
    pub fn resolve_path(explicit: Option<&str>) -> PathBuf {
        if let Some(p) = explicit {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CRM_CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("crm-client.toml")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that mutate environment variables.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn write_config(name: &str, contents: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("crm-client-test-{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn valid_toml() -> &'static str {
        r#"
[api]
base_url = "https://api.yourcrm.com"

[storage]
path = "/var/lib/crm/session.json"
"#
    }

    #[test]
    fn test_load_valid_config_with_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CRM_BASE_URL") };
        unsafe { remove_env("CRM_DEV_MODE") };
        let (dir, path) = write_config("valid", valid_toml());

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.base_url, "https://api.yourcrm.com");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.refresh_path, "/api/auth/refresh");
        assert!(!config.api.dev_mode);
        assert!(!config.api.single_flight_refresh);
        assert_eq!(
            config.storage.path,
            PathBuf::from("/var/lib/crm/session.json")
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_storage_section_is_optional() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CRM_BASE_URL") };
        unsafe { remove_env("CRM_DEV_MODE") };
        let (dir, path) = write_config(
            "no-storage",
            "[api]\nbase_url = \"http://localhost:3000\"\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("crm-session.json"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let (dir, path) = write_config("invalid", "not valid {{{{ toml");
        let result = Config::load(&path);
        assert!(matches!(result, Err(common::Error::Toml(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_base_url_env_override() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CRM_DEV_MODE") };
        let (dir, path) = write_config("env-base", valid_toml());

        unsafe { set_env("CRM_BASE_URL", "http://192.168.7.7:8005") };
        let config = Config::load(&path).unwrap();
        unsafe { remove_env("CRM_BASE_URL") };

        assert_eq!(config.api.base_url, "http://192.168.7.7:8005");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_dev_mode_env_override() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CRM_BASE_URL") };
        let (dir, path) = write_config("env-dev", valid_toml());

        unsafe { set_env("CRM_DEV_MODE", "true") };
        let config = Config::load(&path).unwrap();
        assert!(config.api.dev_mode);

        unsafe { set_env("CRM_DEV_MODE", "sometimes") };
        let result = Config::load(&path);
        unsafe { remove_env("CRM_DEV_MODE") };
        assert!(result.is_err(), "unrecognized CRM_DEV_MODE must be rejected");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CRM_BASE_URL") };
        unsafe { remove_env("CRM_DEV_MODE") };
        let (dir, path) = write_config("bad-url", "[api]\nbase_url = \"api.yourcrm.com\"\n");

        let err = Config::load(&path).unwrap_err().to_string();
        assert!(
            err.contains("base_url must start with http"),
            "error message should explain the issue, got: {err}"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = ApiConfig {
            timeout_secs: 0,
            ..ApiConfig::new("http://localhost:3000")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_relative_refresh_path_rejected() {
        let config = ApiConfig {
            refresh_path: "api/auth/refresh".into(),
            ..ApiConfig::new("http://localhost:3000")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ApiConfig::new("http://localhost:3000/");
        assert_eq!(config.base_url(), "http://localhost:3000");
        assert_eq!(
            config.refresh_url(),
            "http://localhost:3000/api/auth/refresh"
        );
    }

    #[test]
    fn test_resolve_path_explicit() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CRM_CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        unsafe { remove_env("CRM_CONFIG_PATH") };
        assert_eq!(path, PathBuf::from("/env/path.toml"));
    }

    #[test]
    fn test_resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CRM_CONFIG_PATH") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("crm-client.toml"));
    }
}
