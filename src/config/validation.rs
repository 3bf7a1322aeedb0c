use crate::config::types::{BrowserConfig, Config, FetchConfig, HarvestConfig, PathsConfig};
use crate::ConfigError;

/// Highest slot number an output file can carry
const MAX_SLOTS: usize = 4;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_paths_config(&config.paths)?;
    validate_browser_config(&config.browser)?;
    validate_fetch_config(&config.fetch)?;
    validate_harvest_config(&config.harvest)?;
    Ok(())
}

/// Validates path configuration
fn validate_paths_config(config: &PathsConfig) -> Result<(), ConfigError> {
    if config.url_list.is_empty() {
        return Err(ConfigError::Validation(
            "url_list cannot be empty".to_string(),
        ));
    }

    if config.merge_file.is_empty() {
        return Err(ConfigError::Validation(
            "merge_file cannot be empty".to_string(),
        ));
    }

    if config.output_dir.is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates browser configuration
fn validate_browser_config(config: &BrowserConfig) -> Result<(), ConfigError> {
    if config.window_width == 0 || config.window_height == 0 {
        return Err(ConfigError::Validation(format!(
            "window size must be non-zero, got {}x{}",
            config.window_width, config.window_height
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "browser user_agent cannot be empty".to_string(),
        ));
    }

    if config.navigation_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "navigation_timeout_secs must be >= 1, got {}",
            config.navigation_timeout_secs
        )));
    }

    if let Some(path) = &config.chrome_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "chrome_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fetch user_agent cannot be empty".to_string(),
        ));
    }

    if config.probe_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "probe_timeout_secs must be >= 1, got {}",
            config.probe_timeout_secs
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be >= 1, got {}",
            config.fetch_timeout_secs
        )));
    }

    Ok(())
}

/// Validates image selection configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.max_images < 1 || config.max_images > MAX_SLOTS {
        return Err(ConfigError::Validation(format!(
            "max_images must be between 1 and {}, got {}",
            MAX_SLOTS, config.max_images
        )));
    }

    if !(config.page_budget_kib.is_finite() && config.page_budget_kib > 0.0) {
        return Err(ConfigError::Validation(format!(
            "page_budget_kib must be a positive number, got {}",
            config.page_budget_kib
        )));
    }

    Ok(())
}
