//! HTTP wallet-bridge submitter
//!
//! The bridge is the production [`TransferSubmitter`]: it posts transaction
//! envelopes to a wallet daemon that signs and forwards them. The engine
//! treats an accepted post as optimistic confirmation; it never polls for
//! on-chain finality.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use tracing::info;

use crate::error::{is_rate_limit_signal, ClientError, Result};
use crate::traits::TransferSubmitter;
use crate::types::ExternalTransaction;

/// Submits transaction envelopes to a wallet bridge over HTTP
#[derive(Debug)]
pub struct HttpWalletBridge {
    http: reqwest::Client,
    base_url: String,
}

impl HttpWalletBridge {
    /// Create a bridge client for the given base URL
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// The bridge base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl TransferSubmitter for HttpWalletBridge {
    async fn submit(&self, transaction: &ExternalTransaction) -> Result<()> {
        let url = format!("{}/v1/transactions", self.base_url);
        info!(
            messages = transaction.messages.len(),
            valid_until = transaction.valid_until,
            "submitting transaction envelope"
        );

        let response = self
            .http
            .post(&url)
            .json(transaction)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        endpoint: url.clone(),
                    }
                } else {
                    ClientError::Http(e)
                }
            })?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        if is_rate_limit_signal(Some(status), None, &body) {
            return Err(ClientError::RateLimited {
                endpoint: url,
                message: body,
            });
        }
        Err(ClientError::SubmissionRejected {
            status,
            message: body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let bridge = HttpWalletBridge::new("http://localhost:9700/").unwrap();
        assert_eq!(bridge.base_url(), "http://localhost:9700");
    }
}
