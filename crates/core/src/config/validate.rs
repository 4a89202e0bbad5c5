use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - api_key auth has a non-empty key
/// - Queue URL is set and the queue timeout is not 0
/// - Pipeline page/chunk/batch sizes are positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.auth.method == AuthMethod::ApiKey
        && config.auth.api_key.as_deref().unwrap_or("").is_empty()
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method = \"api_key\"".to_string(),
        ));
    }

    if config.queue.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "queue.url cannot be empty".to_string(),
        ));
    }

    if config.queue.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "queue.timeout_secs cannot be 0".to_string(),
        ));
    }

    config
        .pipeline
        .validate()
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

    Ok(())
}
