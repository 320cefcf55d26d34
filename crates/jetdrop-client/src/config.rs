//! Network configuration and endpoint presets

use std::time::Duration;

/// RPC network configuration
///
/// The endpoint list is ordered; the client starts on the first entry and
/// rotates forward (with wrap-around) when the retry scheduler asks it to.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Ordered JSON-RPC endpoint URLs
    pub endpoints: Vec<String>,
    /// API key sent as `X-API-Key` when present
    pub api_key: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl NetworkConfig {
    /// Public mainnet gateways
    pub fn mainnet() -> Self {
        Self {
            endpoints: vec![
                "https://toncenter.com/api/v2/jsonRPC".to_string(),
                "https://ton.access.orbs.network/mainnet/toncenter-api-v2/jsonRPC".to_string(),
                "https://mainnet.tonhubapi.com/jsonRPC".to_string(),
            ],
            api_key: None,
            request_timeout: Duration::from_secs(15),
        }
    }

    /// Public testnet gateways
    pub fn testnet() -> Self {
        Self {
            endpoints: vec![
                "https://testnet.toncenter.com/api/v2/jsonRPC".to_string(),
                "https://ton.access.orbs.network/testnet/toncenter-api-v2/jsonRPC".to_string(),
                "https://testnet.tonhubapi.com/jsonRPC".to_string(),
            ],
            api_key: None,
            request_timeout: Duration::from_secs(15),
        }
    }

    /// A single explicit endpoint (local nodes, tests)
    pub fn single(endpoint: &str) -> Self {
        Self {
            endpoints: vec![endpoint.to_string()],
            api_key: None,
            request_timeout: Duration::from_secs(15),
        }
    }

    /// Attach an API key
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mainnet() {
        let config = NetworkConfig::default();
        assert_eq!(config.endpoints, NetworkConfig::mainnet().endpoints);
        assert!(!config.endpoints.is_empty());
    }

    #[test]
    fn test_presets_have_three_gateways() {
        assert_eq!(NetworkConfig::mainnet().endpoints.len(), 3);
        assert_eq!(NetworkConfig::testnet().endpoints.len(), 3);
    }

    #[test]
    fn test_with_api_key() {
        let config = NetworkConfig::single("http://localhost:8081").with_api_key("k");
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.endpoints.len(), 1);
    }
}
