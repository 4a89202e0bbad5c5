use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Accepts every request. The caller name is taken from `x-caller` when sent.
/// Must be explicitly configured - the system won't default to this
#[derive(Debug, Default)]
pub struct NoneAuthenticator;

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let mut identity = Identity::anonymous();
        if let Some(caller) = request.caller() {
            identity.caller = caller.to_string();
        }
        Ok(identity)
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CALLER_HEADER;

    #[tokio::test]
    async fn test_none_authenticator_returns_anonymous() {
        let identity = NoneAuthenticator
            .authenticate(&AuthRequest::default())
            .await
            .unwrap();

        assert_eq!(identity, Identity::anonymous());
    }

    #[tokio::test]
    async fn test_none_authenticator_uses_caller_header() {
        let mut request = AuthRequest::default();
        request
            .headers
            .insert(CALLER_HEADER.to_string(), "saved-items".to_string());

        let identity = NoneAuthenticator.authenticate(&request).await.unwrap();
        assert_eq!(identity.caller, "saved-items");
        assert_eq!(identity.method, "none");
    }
}
