use crate::config::types::{CrawlerConfig, DelayProfile};
use crate::crawler::MAX_DELAY_SECS;
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_timeout(config.timeout_secs)?;
    validate_user_agent(&config.user_agent)?;
    validate_documents(config)?;
    validate_custom_matching(config)?;
    validate_delay(&config.default_delay)?;
    validate_blacklist(&config.blacklisted_directories)?;
    Ok(())
}

/// Validates a seed URL and returns it parsed
///
/// The seed must be an absolute HTTP(S) URL with a host.
pub fn validate_seed(seed: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(seed.trim())
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            seed
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(url)
}

fn validate_timeout(timeout_secs: u64) -> Result<(), ConfigError> {
    if timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_user_agent(user_agent: &str) -> Result<(), ConfigError> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }
    if user_agent.chars().any(char::is_control) {
        return Err(ConfigError::Validation(
            "user_agent cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}

fn validate_documents(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for ext in config.documents.iter().chain(config.custom_documents.iter()) {
        let ext = ext.trim_start_matches('.');
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "Document extension '{}' must be alphanumeric",
                ext
            )));
        }
    }
    Ok(())
}

fn validate_custom_matching(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if let Some(needle) = &config.custom_str {
        if needle.is_empty() {
            return Err(ConfigError::Validation(
                "custom_str cannot be empty".to_string(),
            ));
        }
    }

    if let Some(pattern) = &config.custom_regex {
        Regex::new(pattern)
            .map_err(|e| ConfigError::InvalidPattern(format!("custom_regex: {}", e)))?;
    }

    Ok(())
}

fn validate_delay(profile: &DelayProfile) -> Result<(), ConfigError> {
    if let DelayProfile::Custom(values) = profile {
        if values.is_empty() {
            return Err(ConfigError::Validation(
                "custom delay list cannot be empty".to_string(),
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v < 0.0) {
            return Err(ConfigError::Validation(format!(
                "delay values must be non-negative seconds, got {}",
                bad
            )));
        }
        if let Some(bad) = values.iter().find(|v| **v > MAX_DELAY_SECS) {
            return Err(ConfigError::Validation(format!(
                "delay values cannot exceed {} seconds, got {}",
                MAX_DELAY_SECS, bad
            )));
        }
    }
    Ok(())
}

fn validate_blacklist(entries: &[String]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.trim().is_empty() {
            return Err(ConfigError::InvalidPattern(
                "Blacklist entries cannot be empty".to_string(),
            ));
        }
        if entry.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidPattern(format!(
                "Blacklist entry '{}' cannot contain whitespace",
                entry
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&CrawlerConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_seed() {
        assert!(validate_seed("https://example.com").is_ok());
        assert!(validate_seed("http://127.0.0.1:8080/start").is_ok());

        assert!(validate_seed("example.com").is_err());
        assert!(validate_seed("ftp://example.com").is_err());
        assert!(validate_seed("").is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = CrawlerConfig {
            timeout_secs: 0,
            ..CrawlerConfig::default()
        };
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let config = CrawlerConfig {
            custom_regex: Some("([a-z".to_string()),
            ..CrawlerConfig::default()
        };
        assert!(matches!(validate(&config), Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_bad_document_extension_rejected() {
        let mut config = CrawlerConfig::default();
        config.custom_documents.insert("tar.gz".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_custom_delay_rules() {
        let mut config = CrawlerConfig {
            default_delay: DelayProfile::Custom(vec![]),
            ..CrawlerConfig::default()
        };
        assert!(validate(&config).is_err());

        config.default_delay = DelayProfile::Custom(vec![1.0, -2.0]);
        assert!(validate(&config).is_err());

        config.default_delay = DelayProfile::Custom(vec![0.0, 2.5]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_custom_delay_too_long_rejected() {
        let mut config = CrawlerConfig {
            default_delay: DelayProfile::Custom(vec![1.0, 1e20]),
            ..CrawlerConfig::default()
        };
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));

        config.default_delay = DelayProfile::Custom(vec![86_400.0]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_blacklist_entries() {
        let mut config = CrawlerConfig {
            blacklisted_directories: vec!["/admin".to_string(), "dev.x.com/private".to_string()],
            ..CrawlerConfig::default()
        };
        assert!(validate(&config).is_ok());

        config.blacklisted_directories.push(" ".to_string());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let config = CrawlerConfig {
            user_agent: "  ".to_string(),
            ..CrawlerConfig::default()
        };
        assert!(validate(&config).is_err());
    }
}
