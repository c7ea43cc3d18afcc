use crate::config::category::validate_category;
use crate::config::types::{Config, OutputConfig, ScraperConfig, SelectorConfig, UserAgentConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Smallest pause accepted between requests to the remote site (milliseconds)
const MIN_DELAY_MS: u64 = 500;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    validate_category(&config.category)?;

    if config.page_size < 1 || config.page_size > 100 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 100, got {}",
            config.page_size
        )));
    }

    if config.wait_timeout < 100 || config.wait_timeout > 60_000 {
        return Err(ConfigError::Validation(format!(
            "wait_timeout must be between 100ms and 60000ms, got {}ms",
            config.wait_timeout
        )));
    }

    if config.detail_delay < MIN_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "detail_delay must be >= {}ms, got {}ms",
            MIN_DELAY_MS, config.detail_delay
        )));
    }

    if config.page_delay < MIN_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "page_delay must be >= {}ms, got {}ms",
            MIN_DELAY_MS, config.page_delay
        )));
    }

    if config.max_pages == Some(0) {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.run_log_path, Some(path) if path.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "run_log_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Checks that every selector is valid CSS
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (key, selector) in config.entries() {
        compile_selector(selector).map_err(|e| match e {
            ConfigError::InvalidSelector { message, .. } => ConfigError::InvalidSelector {
                selector: format!("{} = {}", key, selector),
                message,
            },
            other => other,
        })?;
    }
    Ok(())
}

/// Parses a CSS selector, reporting failures as configuration errors
pub fn compile_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
