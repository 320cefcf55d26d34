//! Wire types for chain reads and transaction submission

use serde::{Deserialize, Serialize};

use jetdrop_primitives::{Address, TokenAmount};

/// Deployment state of a contract account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentState {
    /// Code and data are live
    Active,
    /// Address exists but carries no code
    Uninitialized,
    /// Frozen by the network for unpaid storage
    Frozen,
}

impl DeploymentState {
    /// Parse the state string of an account-information response
    ///
    /// Gateways report an empty string for addresses never touched; that
    /// also reads as uninitialized.
    pub fn parse(state: &str) -> Self {
        match state {
            "active" => Self::Active,
            "frozen" => Self::Frozen,
            _ => Self::Uninitialized,
        }
    }

    /// True if the account is live
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// One outgoing message inside an external transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    /// Destination account
    pub destination: Address,
    /// Attached value in minimal units
    pub value: TokenAmount,
    /// Deployment image for messages that create a contract
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub state_init: Option<Vec<u8>>,
    /// Opaque message body
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<u8>>,
}

impl OutgoingMessage {
    /// A plain value transfer with no body
    pub fn transfer(destination: Address, value: TokenAmount) -> Self {
        Self {
            destination,
            value,
            state_init: None,
            payload: None,
        }
    }

    /// Attach a message body
    pub fn with_payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Attach a deployment image
    pub fn with_state_init(mut self, state_init: Vec<u8>) -> Self {
        self.state_init = Some(state_init);
        self
    }
}

/// A transaction envelope handed to the submission collaborator
///
/// `valid_until` is a unix timestamp after which the external system must
/// treat the envelope as expired. `sequence_number` is set only on the
/// direct-signing path; wallet sessions manage their own cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTransaction {
    /// Expiry as unix seconds
    pub valid_until: u64,
    /// Sender sequence number, when the signer needs it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u32>,
    /// Messages carried by this transaction
    pub messages: Vec<OutgoingMessage>,
}

impl ExternalTransaction {
    /// Build an envelope expiring `window` seconds from now
    pub fn with_window(window_secs: u64, messages: Vec<OutgoingMessage>) -> Self {
        Self {
            valid_until: unix_now() + window_secs,
            sequence_number: None,
            messages,
        }
    }

    /// Record the sender sequence number for the signing collaborator
    pub fn with_sequence_number(mut self, sequence_number: u32) -> Self {
        self.sequence_number = Some(sequence_number);
        self
    }
}

/// Current unix time in seconds
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ---- JSON-RPC envelope ----

/// Outgoing JSON-RPC request
#[derive(Debug, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub id: u32,
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: serde_json::Value,
}

/// Incoming JSON-RPC response as the public gateways shape it
#[derive(Debug, Deserialize)]
pub(crate) struct RpcResponse {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
}

/// Result of a `runGetMethod` call
#[derive(Debug, Deserialize)]
pub(crate) struct GetMethodResult {
    pub exit_code: i32,
    #[serde(default)]
    pub stack: Vec<(String, String)>,
}

/// Result of a `getAddressInformation` call
#[derive(Debug, Deserialize)]
pub(crate) struct AccountInfo {
    #[serde(default)]
    pub balance: String,
    #[serde(default)]
    pub state: String,
}

/// Serde adapter carrying `Option<Vec<u8>>` as standard base64 text
mod base64_bytes {
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer
                .serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let text: Option<String> = Option::deserialize(deserializer)?;
        match text {
            Some(text) => base64::engine::general_purpose::STANDARD
                .decode(text)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_address(seed: u8) -> Address {
        let mut id = [0u8; 32];
        id[0] = seed;
        Address::new(0, id)
    }

    #[test]
    fn test_deployment_state_parse() {
        assert_eq!(DeploymentState::parse("active"), DeploymentState::Active);
        assert_eq!(DeploymentState::parse("frozen"), DeploymentState::Frozen);
        assert_eq!(DeploymentState::parse("uninitialized"), DeploymentState::Uninitialized);
        assert_eq!(DeploymentState::parse(""), DeploymentState::Uninitialized);
        assert!(DeploymentState::Active.is_active());
    }

    #[test]
    fn test_transaction_serde_roundtrip() {
        let tx = ExternalTransaction {
            valid_until: 1_700_000_300,
            sequence_number: Some(7),
            messages: vec![OutgoingMessage::transfer(
                test_address(1),
                TokenAmount::from_nano(50_000_000),
            )
            .with_payload(vec![1, 2, 3])],
        };
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("validUntil"));
        assert!(json.contains("sequenceNumber"));
        let recovered: ExternalTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, tx);
    }

    #[test]
    fn test_payload_travels_as_base64() {
        let msg = OutgoingMessage::transfer(test_address(2), TokenAmount::from_nano(1))
            .with_payload(vec![0xde, 0xad, 0xbe, 0xef]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["payload"], "3q2+7w==");
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let tx = ExternalTransaction::with_window(
            300,
            vec![OutgoingMessage::transfer(test_address(1), TokenAmount::ZERO)],
        );
        let json = serde_json::to_string(&tx).unwrap();
        assert!(!json.contains("sequenceNumber"));
        assert!(!json.contains("stateInit"));
        assert!(!json.contains("payload"));
    }

    #[test]
    fn test_with_window_sets_future_expiry() {
        let tx = ExternalTransaction::with_window(60, vec![]);
        assert!(tx.valid_until > unix_now() - 1);
        assert!(tx.valid_until <= unix_now() + 61);
    }
}
