//! Caller authentication for the trigger surface.
//!
//! Deletion requests come from other services (account deletion, saved-item
//! removal), so an identity names the calling service rather than an end user.

mod api_key;
mod none;

pub use api_key::ApiKeyAuthenticator;
pub use none::NoneAuthenticator;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::{AuthConfig, AuthMethod};

/// Header a calling service may use to name itself in the audit trail.
pub const CALLER_HEADER: &str = "x-caller";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Lower-cased request headers handed to an authenticator.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
}

impl AuthRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    /// Caller name from `x-caller`, if present and non-blank.
    pub fn caller(&self) -> Option<&str> {
        self.header(CALLER_HEADER)
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Authenticated calling service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub caller: String,
    pub method: &'static str,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            caller: "anonymous".to_string(),
            method: "none",
        }
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate a request and return the calling identity
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    /// Name of this authentication method
    fn method_name(&self) -> &'static str;
}

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator)),
        AuthMethod::ApiKey => {
            let key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    AuthError::ConfigurationError(
                        "api_key must be set when using the api_key auth method".to_string(),
                    )
                })?;
            Ok(Box::new(ApiKeyAuthenticator::new(key)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_authenticator_none() {
        let config = AuthConfig {
            method: AuthMethod::None,
            api_key: None,
        };
        let auth = create_authenticator(&config).unwrap();
        assert_eq!(auth.method_name(), "none");
    }

    #[test]
    fn test_create_authenticator_api_key() {
        let config = AuthConfig {
            method: AuthMethod::ApiKey,
            api_key: Some("secret-key".to_string()),
        };
        let auth = create_authenticator(&config).unwrap();
        assert_eq!(auth.method_name(), "api_key");
    }

    #[test]
    fn test_create_authenticator_api_key_missing_key() {
        for api_key in [None, Some(String::new())] {
            let config = AuthConfig {
                method: AuthMethod::ApiKey,
                api_key,
            };
            let result = create_authenticator(&config);
            assert!(matches!(result, Err(AuthError::ConfigurationError(_))));
        }
    }

    #[test]
    fn test_caller_header_is_trimmed() {
        let mut request = AuthRequest::default();
        assert_eq!(request.caller(), None);

        request
            .headers
            .insert(CALLER_HEADER.to_string(), "  account-delete  ".to_string());
        assert_eq!(request.caller(), Some("account-delete"));

        request
            .headers
            .insert(CALLER_HEADER.to_string(), "   ".to_string());
        assert_eq!(request.caller(), None);
    }
}
