use crate::config::types::{Config, CrawlerConfig, IntentConfig, OutputConfig, RootEntry};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_intent_config(&config.intent)?;
    validate_output_config(&config.output)?;
    validate_roots(&config.roots)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.branch_workers < 1 || config.branch_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "branch_workers must be between 1 and 100, got {}",
            config.branch_workers
        )));
    }

    if config.fetch_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_retries must be >= 1, got {}",
            config.fetch_retries
        )));
    }

    if config.ready_poll_ceiling < 1 {
        return Err(ConfigError::Validation(format!(
            "ready_poll_ceiling must be >= 1, got {}",
            config.ready_poll_ceiling
        )));
    }

    Ok(())
}

/// Validates the intent section
fn validate_intent_config(config: &IntentConfig) -> Result<(), ConfigError> {
    if config.query.trim().is_empty() {
        return Err(ConfigError::Validation(
            "intent query cannot be empty".to_string(),
        ));
    }

    for keyword in &config.priority_keywords {
        if keyword.trim().is_empty() {
            return Err(ConfigError::Validation(
                "priority keywords cannot be empty strings".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.results_dir.is_empty() {
        return Err(ConfigError::Validation(
            "results_dir cannot be empty".to_string(),
        ));
    }

    if config.raw_dir.is_empty() {
        return Err(ConfigError::Validation(
            "raw_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates root URL entries
fn validate_roots(roots: &[RootEntry]) -> Result<(), ConfigError> {
    if roots.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[roots]] entry is required".to_string(),
        ));
    }

    for entry in roots {
        let url = Url::parse(&entry.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root URL '{}': {}", entry.url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Root URL '{}' must use the http or https scheme",
                entry.url
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::OracleConfig;

    fn valid_config() -> Config {
        Config {
            crawler: CrawlerConfig {
                max_depth: 2,
                max_links_per_page: 8,
                branch_workers: 5,
                fetch_retries: 3,
                retry_delay_ms: 2000,
                ready_poll_ceiling: 10,
                interactive_fetch: false,
            },
            oracle: OracleConfig {
                base_url: "https://api.example.com/v1".to_string(),
                model: "test-model".to_string(),
                api_key_env: "CARDSCOUT_API_KEY".to_string(),
                timeout_secs: 60,
            },
            intent: IntentConfig {
                query: "list all credit card offers".to_string(),
                priority_keywords: vec!["card".to_string(), "credit".to_string()],
            },
            output: OutputConfig {
                results_dir: "./results".to_string(),
                raw_dir: "./raw".to_string(),
            },
            roots: vec![RootEntry {
                url: "https://bank.example.com/cards".to_string(),
            }],
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_zero_branch_workers_rejected() {
        let mut config = valid_config();
        config.crawler.branch_workers = 0;
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_empty_query_rejected() {
        let mut config = valid_config();
        config.intent.query = "   ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_missing_roots_rejected() {
        let mut config = valid_config();
        config.roots.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_non_http_root_rejected() {
        let mut config = valid_config();
        config.roots[0].url = "ftp://bank.example.com/cards".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_malformed_root_rejected() {
        let mut config = valid_config();
        config.roots[0].url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }
}
