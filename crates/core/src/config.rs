//! Configuration management for sitepilot

use crate::error::{Error, Result};
use crate::session::SessionOptions;
use crate::storage::WebsiteDocuments;
use crate::transfer::{MultipartUploadConfig, MIN_CHUNK_SIZE, MIB};
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration directory name
const CONFIG_DIR: &str = "sitepilot";

/// Configuration file name
const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub website: WebsiteConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// AWS session selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwsConfig {
    /// Named profile from ~/.aws/config
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Region for new buckets and API calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Transfer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Multipart chunk size in MiB; also the fingerprint chunk size (default: 8)
    #[serde(default = "default_chunk_size_mb")]
    pub chunk_size_mb: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chunk_size_mb: default_chunk_size_mb(),
        }
    }
}

/// Website hosting documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsiteConfig {
    #[serde(default = "default_index_document")]
    pub index_document: String,
    #[serde(default = "default_error_document")]
    pub error_document: String,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            index_document: default_index_document(),
            error_document: default_error_document(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_chunk_size_mb() -> u64 {
    8
}

fn default_index_document() -> String {
    "index.html".to_string()
}

fn default_error_document() -> String {
    "error.html".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ConfigFile {
    /// Chunking for fingerprints and multipart uploads
    pub fn multipart(&self) -> Result<MultipartUploadConfig> {
        MultipartUploadConfig::from_mb(self.transfer.chunk_size_mb)
    }

    /// Website documents for bucket setup
    pub fn website_documents(&self) -> WebsiteDocuments {
        WebsiteDocuments {
            index_document: self.website.index_document.clone(),
            error_document: self.website.error_document.clone(),
        }
    }

    /// Session options, with explicit overrides taking precedence
    pub fn session_options(&self, profile: Option<String>, region: Option<String>) -> SessionOptions {
        SessionOptions {
            profile: profile.or_else(|| self.aws.profile.clone()),
            region: region.or_else(|| self.aws.region.clone()),
        }
    }
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let home = home_dir().ok_or_else(|| Error::Config("Cannot determine home directory".to_string()))?;
    Ok(home.join(".config").join(CONFIG_DIR))
}

/// Get the configuration file path
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

/// Load configuration from file
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&get_config_path()?)
}

/// Load configuration, falling back to defaults when no file exists
pub fn load_config_or_default() -> Result<ConfigFile> {
    match load_config() {
        Err(Error::ConfigNotFound(_)) => Ok(ConfigFile::default()),
        other => other,
    }
}

/// Load configuration from a specific path
pub fn load_config_from(config_path: &Path) -> Result<ConfigFile> {
    if !config_path.exists() {
        return Err(Error::ConfigNotFound(config_path.to_path_buf()));
    }

    let content = fs::read_to_string(config_path).map_err(|e| {
        Error::InvalidConfig(format!("Failed to read config file: {}", e))
    })?;

    let config: ConfigFile = toml::from_str(&content).map_err(|e| {
        Error::InvalidConfig(format!("Failed to parse config file: {}", e))
    })?;

    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let config_path = get_config_path()?;
    save_config_to(config, &config_path)?;
    Ok(config_path)
}

/// Save configuration to a specific path
pub fn save_config_to(config: &ConfigFile, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::Config(format!("Failed to create config directory: {}", e)))?;
    }

    let content = toml::to_string_pretty(config)?;

    fs::write(config_path, content).map_err(|e| {
        Error::Config(format!("Failed to write config file: {}", e))
    })?;

    // Read/write for owner only
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(config_path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(config_path, perms)?;
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &ConfigFile) -> Result<()> {
    if config.transfer.chunk_size_mb.saturating_mul(MIB) < MIN_CHUNK_SIZE {
        return Err(Error::InvalidInput(format!(
            "transfer.chunk_size_mb must be at least {} (S3 minimum part size), got {}",
            MIN_CHUNK_SIZE / MIB,
            config.transfer.chunk_size_mb
        )));
    }
    config.multipart()?;

    if config.website.index_document.is_empty() || config.website.index_document.contains('/') {
        return Err(Error::InvalidInput(format!(
            "website.index_document must be a plain file name, got '{}'",
            config.website.index_document
        )));
    }

    if config.website.error_document.is_empty() {
        return Err(Error::InvalidInput("website.error_document cannot be empty".to_string()));
    }

    if let Some(region) = &config.aws.region {
        if region.trim().is_empty() {
            return Err(Error::InvalidInput("aws.region cannot be empty".to_string()));
        }
    }

    Ok(())
}

/// Check if configuration exists
pub fn config_exists() -> bool {
    get_config_path().map(|p| p.exists()).unwrap_or(false)
}
