//! Binary body of a fungible-token transfer message.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jetdrop_primitives::{Address, TokenAmount};

use crate::error::{DispatchError, Result};

/// Operation code of a standard fungible-token transfer.
pub const TOKEN_TRANSFER_OP: u32 = 0x0f8a_7ea5;

/// Serialized size of a transfer payload in bytes.
const PAYLOAD_WIDTH: usize = 4 + 8 + 16 + 33 + 33 + 16;

/// The message body attached to a token-wallet transfer.
///
/// The wallet contract that receives this body moves `amount` tokens to
/// `destination` and sends any excess gas back to `response_destination`.
/// `forward_amount` is carried to the destination wallet so the recipient
/// gets a transfer notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPayload {
    pub query_id: u64,
    pub amount: TokenAmount,
    pub destination: Address,
    pub response_destination: Address,
    pub forward_amount: TokenAmount,
}

impl TransferPayload {
    pub fn new(
        amount: TokenAmount,
        destination: Address,
        response_destination: Address,
        forward_amount: TokenAmount,
    ) -> Self {
        TransferPayload {
            query_id: 0,
            amount,
            destination,
            response_destination,
            forward_amount,
        }
    }

    pub fn with_query_id(mut self, query_id: u64) -> Self {
        self.query_id = query_id;
        self
    }

    /// Serializes the payload into its fixed 110-byte wire form.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PAYLOAD_WIDTH);
        bytes.extend_from_slice(&TOKEN_TRANSFER_OP.to_be_bytes());
        bytes.extend_from_slice(&self.query_id.to_be_bytes());
        bytes.extend_from_slice(&self.amount.nano().to_be_bytes());
        push_address(&mut bytes, &self.destination);
        push_address(&mut bytes, &self.response_destination);
        bytes.extend_from_slice(&self.forward_amount.nano().to_be_bytes());
        bytes
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PAYLOAD_WIDTH {
            return Err(DispatchError::malformed_payload(format!(
                "expected {PAYLOAD_WIDTH} bytes, got {}",
                bytes.len()
            )));
        }
        let op = u32::from_be_bytes(read_array(bytes, 0));
        if op != TOKEN_TRANSFER_OP {
            return Err(DispatchError::malformed_payload(format!(
                "unexpected operation 0x{op:08x}"
            )));
        }
        let query_id = u64::from_be_bytes(read_array(bytes, 4));
        let amount = u128::from_be_bytes(read_array(bytes, 12));
        let destination = read_address(bytes, 28);
        let response_destination = read_address(bytes, 61);
        let forward_amount = u128::from_be_bytes(read_array(bytes, 94));
        Ok(TransferPayload {
            query_id,
            amount: TokenAmount::from_nano(amount),
            destination,
            response_destination,
            forward_amount: TokenAmount::from_nano(forward_amount),
        })
    }
}

fn push_address(bytes: &mut Vec<u8>, address: &Address) {
    bytes.push(address.workchain() as u8);
    bytes.extend_from_slice(address.account_id());
}

fn read_address(bytes: &[u8], offset: usize) -> Address {
    let workchain = bytes[offset] as i8;
    let mut account_id = [0u8; 32];
    account_id.copy_from_slice(&bytes[offset + 1..offset + 33]);
    Address::new(workchain, account_id)
}

fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}
