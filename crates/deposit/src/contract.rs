use crate::sender::DepositError;
use alloy_primitives::{hex, Bytes, B256};
use once_cell::sync::Lazy;
use stakewire_abi::{encode_call, EncodingError, Function, ParamType, Token};

/// Byte length of a BLS12-381 public key.
pub const PUBKEY_LENGTH: usize = 48;

/// Byte length of a BLS12-381 signature.
pub const SIGNATURE_LENGTH: usize = 96;

static DEPOSIT_FUNCTION: Lazy<Function> = Lazy::new(|| Function {
    name: "deposit".to_owned(),
    inputs: vec![
        ParamType::Bytes,          // pubkey
        ParamType::Bytes,          // withdrawal_credentials
        ParamType::Bytes,          // signature
        ParamType::FixedBytes(32), // deposit_data_root
    ],
});

/// Looks up a deposit-contract method by name.
pub fn contract_function(name: &str) -> Option<&'static Function> {
    (name == "deposit").then(|| &*DEPOSIT_FUNCTION)
}

/// Arguments of one `deposit` call, validated to their exact byte lengths.
///
/// The values come pre-computed from the validator tooling; this type only
/// carries them into calldata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositCall {
    /// Validator BLS public key, 48 bytes.
    pub pubkey: Bytes,
    /// Withdrawal credentials commitment.
    pub withdrawal_credentials: B256,
    /// BLS signature over the deposit message, 96 bytes.
    pub signature: Bytes,
    /// SSZ root of the signed deposit data.
    pub deposit_data_root: B256,
}

impl DepositCall {
    /// Builds a call after checking the variable-length arguments.
    pub fn new(
        pubkey: Bytes,
        withdrawal_credentials: B256,
        signature: Bytes,
        deposit_data_root: B256,
    ) -> Result<Self, DepositError> {
        if pubkey.len() != PUBKEY_LENGTH {
            return Err(DepositError::InvalidLength {
                field: "pubkey",
                expected: PUBKEY_LENGTH,
                got: pubkey.len(),
            });
        }
        if signature.len() != SIGNATURE_LENGTH {
            return Err(DepositError::InvalidLength {
                field: "signature",
                expected: SIGNATURE_LENGTH,
                got: signature.len(),
            });
        }
        Ok(Self { pubkey, withdrawal_credentials, signature, deposit_data_root })
    }

    /// Builds a call from hex strings, with or without `0x` prefixes.
    pub fn from_hex(
        pubkey: &str,
        withdrawal_credentials: &str,
        signature: &str,
        deposit_data_root: &str,
    ) -> Result<Self, DepositError> {
        Self::new(
            Bytes::from(hex::decode(pubkey)?),
            decode_word("withdrawal_credentials", withdrawal_credentials)?,
            Bytes::from(hex::decode(signature)?),
            decode_word("deposit_data_root", deposit_data_root)?,
        )
    }

    /// Calldata for the deposit method: selector plus encoded arguments.
    pub fn calldata(&self) -> Result<Bytes, EncodingError> {
        encode_call(
            &DEPOSIT_FUNCTION,
            &[
                Token::Bytes(self.pubkey.clone()),
                Token::Bytes(Bytes::from(self.withdrawal_credentials.to_vec())),
                Token::Bytes(self.signature.clone()),
                Token::FixedBytes(Bytes::from(self.deposit_data_root.to_vec())),
            ],
        )
    }
}

fn decode_word(field: &'static str, text: &str) -> Result<B256, DepositError> {
    let bytes = hex::decode(text)?;
    if bytes.len() != 32 {
        return Err(DepositError::InvalidLength { field, expected: 32, got: bytes.len() });
    }
    Ok(B256::from_slice(&bytes))
}
