use alloy_primitives::{Address, B256};
use sha2::{Digest, Sha256};

/// BLS withdrawal credentials prefix byte.
pub const BLS_WITHDRAWAL_PREFIX: u8 = 0x00;

/// Execution-address withdrawal credentials prefix byte.
pub const ETH1_ADDRESS_WITHDRAWAL_PREFIX: u8 = 0x01;

/// Withdrawal credentials committing to a BLS withdrawal public key:
/// the prefix byte followed by `sha256(pubkey)[1..]`.
pub fn bls_withdrawal_credentials(withdrawal_pubkey: &[u8]) -> B256 {
    let hash = Sha256::digest(withdrawal_pubkey);
    let mut credentials = [0u8; 32];
    credentials[0] = BLS_WITHDRAWAL_PREFIX;
    credentials[1..].copy_from_slice(&hash[1..]);
    B256::from(credentials)
}

/// Withdrawal credentials committing to an execution-layer address:
/// the prefix byte, eleven zero bytes, then the address.
pub fn eth1_withdrawal_credentials(withdrawal_address: Address) -> B256 {
    let mut credentials = [0u8; 32];
    credentials[0] = ETH1_ADDRESS_WITHDRAWAL_PREFIX;
    credentials[12..].copy_from_slice(withdrawal_address.as_slice());
    B256::from(credentials)
}
