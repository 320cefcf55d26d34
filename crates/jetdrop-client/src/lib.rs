//! Jetdrop Client
//!
//! Network plumbing for the airdrop engine:
//! - [`RpcClient`]: a JSON-RPC handle owning an ordered endpoint list and
//!   the current-endpoint index, rotated in place on transient failure
//! - [`HttpWalletBridge`]: the production submitter posting transaction
//!   envelopes to a wallet daemon
//! - [`ChainReader`] / [`TransferSubmitter`] / [`EndpointRotation`]: the
//!   seams the dispatcher and claim coordinator are driven through, so
//!   tests can substitute in-memory doubles

pub mod bridge;
pub mod client;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use bridge::HttpWalletBridge;
pub use client::RpcClient;
pub use config::NetworkConfig;
pub use error::{is_rate_limit_signal, ClientError, Result};
pub use traits::{ChainReader, EndpointRotation, TransferSubmitter};
pub use types::{
    unix_now, DeploymentState, ExternalTransaction, OutgoingMessage,
};
