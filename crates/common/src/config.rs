//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Media storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// QR code rendering configuration.
    pub qr: QrConfig,
    /// Interface language configuration.
    #[serde(default)]
    pub i18n: I18nConfig,
    /// Catalog behaviour.
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Local media storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory that holds uploaded and generated files.
    #[serde(default = "default_media_path")]
    pub base_path: PathBuf,
    /// URL prefix the media directory is served under.
    #[serde(default = "default_media_url")]
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_path: default_media_path(),
            base_url: default_media_url(),
        }
    }
}

/// QR code image configuration.
///
/// The defaults reproduce the printed label layout: a 700px symbol with a
/// 10px margin and a 70px caption band holding the exhibit code.
#[derive(Debug, Clone, Deserialize)]
pub struct QrConfig {
    /// Absolute URL prefix encoded into every QR code.
    pub base_url: String,
    /// Path to the TrueType/OpenType font used for the caption.
    pub font_path: PathBuf,
    /// Side of the square QR symbol in pixels.
    #[serde(default = "default_qr_size")]
    pub qr_size: u32,
    /// White margin around the symbol in pixels.
    #[serde(default = "default_qr_padding")]
    pub padding: u32,
    /// Height of the caption band below the symbol.
    #[serde(default = "default_caption_height")]
    pub caption_height: u32,
    /// Caption font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

/// Interface language configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct I18nConfig {
    /// Language used when neither the request nor the cookie names one.
    #[serde(default = "default_language")]
    pub default_language: String,
    /// Name of the cookie storing the visitor's interface language.
    #[serde(default = "default_language_cookie")]
    pub cookie_name: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            cookie_name: default_language_cookie(),
        }
    }
}

/// Catalog behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Exhibits per page in the public list.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Attempts at assigning an exhibit identity before giving up.
    #[serde(default = "default_identity_retries")]
    pub identity_retries: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            identity_retries: default_identity_retries(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

fn default_media_path() -> PathBuf {
    PathBuf::from("./media")
}

fn default_media_url() -> String {
    "/media".to_string()
}

const fn default_qr_size() -> u32 {
    700
}

const fn default_qr_padding() -> u32 {
    10
}

const fn default_caption_height() -> u32 {
    70
}

const fn default_font_size() -> f32 {
    60.0
}

fn default_language() -> String {
    "ru".to_string()
}

fn default_language_cookie() -> String {
    "museum_language".to_string()
}

const fn default_page_size() -> u64 {
    20
}

const fn default_identity_retries() -> u32 {
    5
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present, via `dotenvy`)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `MUSEUM_ENV`)
    /// 4. Environment variables with `MUSEUM__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("MUSEUM_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MUSEUM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("MUSEUM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
