//! Application configuration with layered loading.
//!
//! Configuration is loaded with figment from, in increasing precedence:
//!
//! 1. Built-in defaults
//! 2. TOML config file (if HEDGEROW_CONFIG_FILE set)
//! 3. Environment variables (HEDGEROW_*)

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Paths fetched into the static partition at install time.
pub const DEFAULT_STATIC_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/animals.html",
    "/animal-details.html",
    "/map.html",
    "/tips.html",
    "/favourites.html",
    "/css/base.css",
    "/css/navigation.css",
    "/css/home.css",
    "/css/animals.css",
    "/css/animal-details.css",
    "/css/map.css",
    "/css/tips.css",
    "/css/favourites.css",
    "/js/app.js",
    "/js/theme.js",
    "/js/network-status.js",
    "/js/battery-status.js",
    "/js/responsive-images.js",
    "/js/home.js",
    "/js/animals-page.js",
    "/js/animal-details.js",
    "/js/camera.js",
    "/js/map-page.js",
    "/js/tips-page.js",
    "/js/favourites-page.js",
    "/data/animals.json",
    "/data/events.json",
    "/images/logo.svg",
    "/manifest.json",
];

/// The three partition names for one cache version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheNames {
    pub static_assets: String,
    pub dynamic: String,
    pub images: String,
}

impl CacheNames {
    pub fn for_version(version: &str) -> Self {
        Self {
            static_assets: format!("{version}-static"),
            dynamic: format!("{version}-dynamic"),
            images: format!("{version}-images"),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        name == self.static_assets || name == self.dynamic || name == self.images
    }
}

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the site is served from; requests to any other origin bypass the cache.
    ///
    /// Set via HEDGEROW_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Cache version; bumping it is the only way to invalidate the partitions.
    ///
    /// Set via HEDGEROW_CACHE_VERSION environment variable.
    #[serde(default = "default_cache_version")]
    pub cache_version: String,

    /// Prefix shared by every partition this application owns.
    ///
    /// Set via HEDGEROW_CACHE_PREFIX environment variable.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// Path to SQLite cache database.
    ///
    /// Set via HEDGEROW_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via HEDGEROW_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via HEDGEROW_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via HEDGEROW_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Root document served to offline navigations.
    ///
    /// Set via HEDGEROW_SHELL_PATH environment variable.
    #[serde(default = "default_shell_path")]
    pub shell_path: String,

    /// Root-relative paths cached at install time.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<String>,
}

fn default_origin() -> String {
    "http://localhost:8080".into()
}

fn default_cache_version() -> String {
    "wildlife-v1.0.0".into()
}

fn default_cache_prefix() -> String {
    "wildlife-".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./hedgerow-cache.sqlite")
}

fn default_user_agent() -> String {
    "hedgerow/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_shell_path() -> String {
    "/index.html".into()
}

fn default_static_assets() -> Vec<String> {
    DEFAULT_STATIC_ASSETS.iter().map(|s| s.to_string()).collect()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_version: default_cache_version(),
            cache_prefix: default_cache_prefix(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            shell_path: default_shell_path(),
            static_assets: default_static_assets(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be read or
    /// parsed, or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("HEDGEROW_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("HEDGEROW_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
