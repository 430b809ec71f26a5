//! Legacy Ethereum transaction assembly, canonical RLP serialization, and
//! EIP-155 recoverable signing.
//!
//! The transaction record is built once per send attempt from caller-supplied
//! fields, serialized to its signing payload (with the `{chain_id, 0, 0}`
//! placeholder triple when replay protection is on), signed with
//! deterministic recoverable ECDSA, and serialized again for broadcast.

mod signer;
mod transaction;

pub use signer::{
    public_key_to_address, recover_signer, sign_transaction, SigningError, SigningKey,
};
pub use transaction::{
    assemble, InvalidFieldError, Signature, SignedTransaction, UnsignedTransaction,
};
