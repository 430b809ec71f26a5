use crate::{Signature, SignedTransaction, UnsignedTransaction};
use alloy_primitives::{keccak256, Address, B256, U256};
use secp256k1::{
    ecdsa::{RecoverableSignature, RecoveryId},
    Message, PublicKey, SecretKey, SECP256K1,
};
use std::fmt;

/// Failure to sign or to recover a signer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    /// The supplied bytes are not a valid scalar in the secp256k1
    /// private-key range.
    #[error("private key is not a valid secp256k1 scalar")]
    InvalidKey,
    /// The recovery value does not correspond to any parity/chain-id
    /// combination.
    #[error("invalid recovery value {0}")]
    InvalidRecoveryValue(u64),
    /// The underlying curve operation failed.
    #[error(transparent)]
    Ecdsa(#[from] secp256k1::Error),
}

/// A secp256k1 signing key scoped to the signing operation.
///
/// The scalar is erased when the key is dropped and never appears in
/// `Debug` output; callers must not log, persist, or echo the bytes it was
/// built from.
pub struct SigningKey {
    secret: SecretKey,
}

impl SigningKey {
    /// Validates the bytes against the curve's private-key range.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SigningError> {
        let secret = SecretKey::from_slice(bytes).map_err(|_| SigningError::InvalidKey)?;
        Ok(Self { secret })
    }

    /// The account address controlled by this key.
    pub fn address(&self) -> Address {
        public_key_to_address(self.secret.public_key(SECP256K1))
    }
}

impl Drop for SigningKey {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// Signs the transaction's signing payload with deterministic (RFC 6979)
/// recoverable ECDSA and embeds the chain-id-adjusted recovery value.
///
/// libsecp256k1 always yields the low-S form, so the signature is canonical
/// on networks that enforce malleability protection.
pub fn sign_transaction(
    tx: &UnsignedTransaction,
    key: &SigningKey,
) -> Result<SignedTransaction, SigningError> {
    let sighash = tx.signature_hash();
    let message = Message::from_digest(sighash.0);
    let (recovery_id, data) = SECP256K1
        .sign_ecdsa_recoverable(&message, &key.secret)
        .serialize_compact();

    let signature = Signature {
        v: Signature::v_from_parity(i32::from(recovery_id) as u8, tx.chain_id),
        r: U256::from_be_slice(&data[..32]),
        s: U256::from_be_slice(&data[32..]),
    };
    Ok(SignedTransaction { transaction: tx.clone(), signature })
}

/// Recovers the signing account from a signature over `sighash`.
pub fn recover_signer(sighash: B256, signature: &Signature) -> Result<Address, SigningError> {
    let parity = match signature.v {
        27 | 28 => signature.v - 27,
        v if v >= 35 => (v - 35) % 2,
        v => return Err(SigningError::InvalidRecoveryValue(v)),
    };

    let mut data = [0u8; 64];
    data[..32].copy_from_slice(&signature.r.to_be_bytes::<32>());
    data[32..].copy_from_slice(&signature.s.to_be_bytes::<32>());
    let recoverable =
        RecoverableSignature::from_compact(&data, RecoveryId::try_from(parity as i32)?)?;

    let message = Message::from_digest(sighash.0);
    Ok(public_key_to_address(SECP256K1.recover_ecdsa(&message, &recoverable)?))
}

/// Account address for an uncompressed public key.
pub fn public_key_to_address(public: PublicKey) -> Address {
    // strip the SECP256K1_TAG_PUBKEY_UNCOMPRESSED byte before hashing
    let hash = keccak256(&public.serialize_uncompressed()[1..]);
    Address::from_slice(&hash[12..])
}
