//! Error types for RPC reads and transaction submission

use thiserror::Error;

/// Errors from the RPC client and submission collaborators
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configuration carried no endpoints
    #[error("no rpc endpoints configured")]
    NoEndpoints,

    /// The configured API key cannot be sent as an HTTP header
    #[error("api key is not a valid header value")]
    InvalidApiKey,

    /// Transport-level HTTP failure
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint signaled a rate limit; retryable
    #[error("rate limited by {endpoint}: {message}")]
    RateLimited {
        /// Endpoint that refused the request
        endpoint: String,
        /// The signal as received
        message: String,
    },

    /// The request timed out; retryable
    #[error("request to {endpoint} timed out")]
    Timeout {
        /// Endpoint that timed out
        endpoint: String,
    },

    /// The endpoint returned an RPC-level error
    #[error("rpc error {code} from {endpoint}: {message}")]
    Rpc {
        /// Endpoint that answered
        endpoint: String,
        /// Error code from the response
        code: i64,
        /// Error message from the response
        message: String,
    },

    /// A get-method call completed with a non-zero exit code
    #[error("get-method {method} exited with code {exit_code}")]
    GetMethodFailed {
        /// Method name
        method: String,
        /// VM exit code
        exit_code: i32,
    },

    /// The external system refused a submitted transaction
    #[error("transaction rejected with status {status}: {message}")]
    SubmissionRejected {
        /// HTTP status of the refusal
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// The response did not have the expected shape
    #[error("malformed rpc response: {0}")]
    MalformedResponse(String),

    /// An address field in a response failed to parse
    #[error("invalid address in rpc response: {0}")]
    InvalidAddress(String),

    /// JSON encoding or decoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Helper for malformed-response errors
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// True for errors the retry scheduler may retry
    ///
    /// Only rate limits and timeouts qualify. Everything else, including
    /// submission rejections, propagates immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// True if a status code, error code, or message signals a rate limit
///
/// Upstream gateways are inconsistent: some answer HTTP 429, some wrap a
/// 429 code in the RPC envelope, some only say so in the message text.
pub fn is_rate_limit_signal(status: Option<u16>, code: Option<i64>, message: &str) -> bool {
    if status == Some(429) || code == Some(429) {
        return true;
    }
    let message = message.to_ascii_lowercase();
    message.contains("rate limit")
        || message.contains("too many requests")
        || message.contains("429")
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_signal_from_status() {
        assert!(is_rate_limit_signal(Some(429), None, ""));
        assert!(!is_rate_limit_signal(Some(500), None, "internal error"));
    }

    #[test]
    fn test_rate_limit_signal_from_code() {
        assert!(is_rate_limit_signal(None, Some(429), ""));
        assert!(!is_rate_limit_signal(None, Some(-32601), "method not found"));
    }

    #[test]
    fn test_rate_limit_signal_from_message() {
        assert!(is_rate_limit_signal(None, None, "Rate Limit exceeded"));
        assert!(is_rate_limit_signal(None, None, "Too Many Requests"));
        assert!(is_rate_limit_signal(None, None, "upstream said 429"));
        assert!(!is_rate_limit_signal(None, None, "connection refused"));
    }

    #[test]
    fn test_transient_classification() {
        let rate_limited = ClientError::RateLimited {
            endpoint: "a".into(),
            message: "m".into(),
        };
        let timeout = ClientError::Timeout { endpoint: "a".into() };
        let rejected = ClientError::SubmissionRejected {
            status: 400,
            message: "bad".into(),
        };
        let rpc = ClientError::Rpc {
            endpoint: "a".into(),
            code: -32000,
            message: "m".into(),
        };
        assert!(rate_limited.is_transient());
        assert!(timeout.is_transient());
        assert!(!rejected.is_transient());
        assert!(!rpc.is_transient());
    }
}
