//! Type conversions into the error families.

use super::provider::ProviderError;
use super::types::ProxyError;

impl From<serde_json::Error> for ProxyError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::Response(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let proxy_err: ProxyError = json_err.into();
        assert!(matches!(proxy_err, ProxyError::BadRequest(_)));

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let provider_err: ProviderError = json_err.into();
        assert!(matches!(provider_err, ProviderError::Response(_)));
    }
}
