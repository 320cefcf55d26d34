//! JSON-RPC client handle with endpoint rotation
//!
//! [`RpcClient`] is the explicit handle object that owns the ordered
//! endpoint list and the current-endpoint index. Every caller that wants
//! the same rotation behavior shares the same handle; there is no global
//! client anywhere in the workspace.

use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use tracing::{debug, info};

use jetdrop_primitives::{Address, TokenAmount};

use crate::config::NetworkConfig;
use crate::error::{is_rate_limit_signal, ClientError, Result};
use crate::traits::{ChainReader, EndpointRotation};
use crate::types::{AccountInfo, DeploymentState, GetMethodResult, RpcRequest, RpcResponse};

/// HTTP JSON-RPC client over an ordered endpoint list
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoints: Vec<String>,
    current: AtomicUsize,
}

impl RpcClient {
    /// Build a client from network configuration
    pub fn new(config: &NetworkConfig) -> Result<Self> {
        if config.endpoints.is_empty() {
            return Err(ClientError::NoEndpoints);
        }
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| ClientError::InvalidApiKey)?;
            headers.insert(HeaderName::from_static("x-api-key"), value);
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            http,
            endpoints: config.endpoints.clone(),
            current: AtomicUsize::new(0),
        })
    }

    /// The configured endpoints, in rotation order
    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Index of the active endpoint
    pub fn endpoint_index(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    async fn call(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        let endpoint = self.active_endpoint();
        debug!(%endpoint, method, "rpc call");

        let request = RpcRequest {
            id: 1,
            jsonrpc: "2.0",
            method,
            params,
        };
        let response = self
            .http
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        endpoint: endpoint.clone(),
                    }
                } else {
                    ClientError::Http(e)
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            return Err(ClientError::RateLimited {
                endpoint,
                message: "HTTP 429 Too Many Requests".to_string(),
            });
        }
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            if is_rate_limit_signal(Some(status), None, &body) {
                return Err(ClientError::RateLimited {
                    endpoint,
                    message: body,
                });
            }
            return Err(ClientError::Rpc {
                endpoint,
                code: status as i64,
                message: body,
            });
        }

        let envelope: RpcResponse = response.json().await?;
        if !envelope.ok {
            let message = envelope
                .error
                .unwrap_or_else(|| "unspecified gateway error".to_string());
            if is_rate_limit_signal(None, envelope.code, &message) {
                return Err(ClientError::RateLimited { endpoint, message });
            }
            return Err(ClientError::Rpc {
                endpoint,
                code: envelope.code.unwrap_or(-1),
                message,
            });
        }
        envelope
            .result
            .ok_or_else(|| ClientError::malformed("response carried no result"))
    }

    async fn run_get_method(
        &self,
        address: &Address,
        method: &str,
        stack: Vec<(String, String)>,
    ) -> Result<GetMethodResult> {
        let result = self
            .call(
                "runGetMethod",
                serde_json::json!({
                    "address": address.to_raw(),
                    "method": method,
                    "stack": stack,
                }),
            )
            .await?;
        let parsed: GetMethodResult = serde_json::from_value(result)?;
        if parsed.exit_code != 0 {
            return Err(ClientError::GetMethodFailed {
                method: method.to_string(),
                exit_code: parsed.exit_code,
            });
        }
        Ok(parsed)
    }
}

impl EndpointRotation for RpcClient {
    fn active_endpoint(&self) -> String {
        self.endpoints[self.endpoint_index()].clone()
    }

    fn rotate_endpoint(&self) -> String {
        let len = self.endpoints.len();
        // the closure is total, so fetch_update cannot fail
        let _ = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |i| Some((i + 1) % len));
        let active = self.active_endpoint();
        info!(endpoint = %active, "rotated rpc endpoint");
        active
    }
}

impl ChainReader for RpcClient {
    async fn sequence_number(&self, address: &Address) -> Result<u32> {
        match self.run_get_method(address, "seqno", vec![]).await {
            Ok(result) => {
                let value = parse_stack_num(&result.stack)?;
                u32::try_from(value)
                    .map_err(|_| ClientError::malformed("sequence number out of range"))
            }
            // a wallet that is not deployed yet has no seqno method;
            // its first transaction uses sequence number 0
            Err(ClientError::GetMethodFailed { .. }) => Ok(0),
            Err(e) => Err(e),
        }
    }

    async fn derived_wallet_address(&self, owner: &Address, registry: &Address) -> Result<Address> {
        let result = self
            .run_get_method(
                registry,
                "get_wallet_address",
                vec![("addr".to_string(), owner.to_raw())],
            )
            .await?;
        parse_stack_address(&result.stack)
    }

    async fn deployment_state(&self, address: &Address) -> Result<DeploymentState> {
        let result = self
            .call(
                "getAddressInformation",
                serde_json::json!({ "address": address.to_raw() }),
            )
            .await?;
        let info: AccountInfo = serde_json::from_value(result)?;
        Ok(DeploymentState::parse(&info.state))
    }

    async fn balance(&self, address: &Address) -> Result<TokenAmount> {
        let result = self
            .call(
                "getAddressInformation",
                serde_json::json!({ "address": address.to_raw() }),
            )
            .await?;
        let info: AccountInfo = serde_json::from_value(result)?;
        TokenAmount::from_nano_str(&info.balance)
            .map_err(|e| ClientError::malformed(format!("bad balance string: {}", e)))
    }
}

/// Read the first stack item as a numeric value
fn parse_stack_num(stack: &[(String, String)]) -> Result<u64> {
    let (tag, value) = stack
        .first()
        .ok_or_else(|| ClientError::malformed("get-method returned an empty stack"))?;
    if tag != "num" {
        return Err(ClientError::malformed(format!(
            "expected num on stack, got {}",
            tag
        )));
    }
    let digits = value.strip_prefix("0x").unwrap_or(value);
    u64::from_str_radix(digits, 16)
        .map_err(|_| ClientError::malformed(format!("bad numeric stack value: {}", value)))
}

/// Read the first stack item as an address
fn parse_stack_address(stack: &[(String, String)]) -> Result<Address> {
    let (tag, value) = stack
        .first()
        .ok_or_else(|| ClientError::malformed("get-method returned an empty stack"))?;
    if tag != "addr" {
        return Err(ClientError::malformed(format!(
            "expected addr on stack, got {}",
            tag
        )));
    }
    Address::parse(value).map_err(|e| ClientError::InvalidAddress(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(n: usize) -> RpcClient {
        let config = NetworkConfig {
            endpoints: (0..n).map(|i| format!("http://rpc-{i}.test")).collect(),
            api_key: None,
            request_timeout: std::time::Duration::from_secs(1),
        };
        RpcClient::new(&config).unwrap()
    }

    #[test]
    fn test_empty_endpoint_list_rejected() {
        let config = NetworkConfig {
            endpoints: vec![],
            api_key: None,
            request_timeout: std::time::Duration::from_secs(1),
        };
        assert!(matches!(
            RpcClient::new(&config).unwrap_err(),
            ClientError::NoEndpoints
        ));
    }

    #[test]
    fn test_rotation_wraps_around() {
        let client = test_client(3);
        assert_eq!(client.endpoint_index(), 0);
        assert_eq!(client.rotate_endpoint(), "http://rpc-1.test");
        assert_eq!(client.rotate_endpoint(), "http://rpc-2.test");
        assert_eq!(client.rotate_endpoint(), "http://rpc-0.test");
        assert_eq!(client.endpoint_index(), 0);
    }

    #[test]
    fn test_single_endpoint_rotation_is_stable() {
        let client = test_client(1);
        assert_eq!(client.rotate_endpoint(), "http://rpc-0.test");
        assert_eq!(client.active_endpoint(), "http://rpc-0.test");
    }

    #[test]
    fn test_shared_handle_observes_rotation() {
        let client = std::sync::Arc::new(test_client(3));
        let other = client.clone();
        client.rotate_endpoint();
        assert_eq!(other.endpoint_index(), 1);
        assert_eq!(other.active_endpoint(), "http://rpc-1.test");
    }

    #[test]
    fn test_parse_stack_num() {
        let stack = vec![("num".to_string(), "0x2a".to_string())];
        assert_eq!(parse_stack_num(&stack).unwrap(), 42);
        let bad_tag = vec![("cell".to_string(), "xx".to_string())];
        assert!(parse_stack_num(&bad_tag).is_err());
        assert!(parse_stack_num(&[]).is_err());
    }

    #[test]
    fn test_parse_stack_address() {
        let raw = Address::new(0, [7u8; 32]).to_raw();
        let stack = vec![("addr".to_string(), raw.clone())];
        assert_eq!(parse_stack_address(&stack).unwrap().to_raw(), raw);
        let bad = vec![("addr".to_string(), "nonsense".to_string())];
        assert!(matches!(
            parse_stack_address(&bad).unwrap_err(),
            ClientError::InvalidAddress(_)
        ));
    }
}
