use crate::config::types::CrawlerConfig;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(CrawlerConfig)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use arachnid::config::load_config;
///
/// let config = load_config(Path::new("arachnid.toml")).unwrap();
/// println!("Obeying robots.txt: {}", config.obey_robots);
/// ```
pub fn load_config(path: &Path) -> Result<CrawlerConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: CrawlerConfig = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(sha256_hex(content.as_bytes()))
}

/// Loads a configuration and returns both the config and its file hash
pub fn load_config_with_hash(path: &Path) -> Result<(CrawlerConfig, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Hashes the effective configuration, including CLI overrides
///
/// Two crawls with the same fingerprint ran with identical settings.
pub fn config_fingerprint(config: &CrawlerConfig) -> String {
    // Serializing plain data cannot fail; fall back to Debug just in case
    let rendered = serde_json::to_string(config).unwrap_or_else(|_| format!("{:?}", config));
    sha256_hex(rendered.as_bytes())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
