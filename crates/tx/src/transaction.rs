use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{length_of_length, Decodable, Encodable, Error as RlpError, Header};
use bytes::BufMut;

/// A transaction field that failed validation during assembly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transaction field `{field}`: {reason}")]
pub struct InvalidFieldError {
    /// Name of the offending field.
    pub field: &'static str,
    /// What was wrong with it.
    pub reason: String,
}

impl InvalidFieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self { field, reason: reason.into() }
    }
}

/// An unsigned legacy transaction, immutable once assembled.
///
/// `chain_id: None` selects the pre-EIP-155 signing form; the choice is the
/// caller's and is never defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnsignedTransaction {
    /// Per-account strictly increasing counter.
    pub nonce: u64,
    /// Fee per gas unit, in wei.
    pub gas_price: u128,
    /// Maximum gas the transaction may consume.
    pub gas_limit: u64,
    /// Destination account.
    pub to: Address,
    /// Amount transferred, in wei.
    pub value: U256,
    /// Calldata payload.
    pub input: Bytes,
    /// Network identifier bound into the signature, if replay protection
    /// is on.
    pub chain_id: Option<u64>,
}

/// Builds an [`UnsignedTransaction`] from raw caller-supplied fields.
///
/// Pure value construction, no I/O. Fields wider than the serialized
/// representation are rejected rather than truncated; nonce and gas
/// parameters come from the caller, never from here.
pub fn assemble(
    calldata: Bytes,
    to: &[u8],
    value: U256,
    nonce: U256,
    gas_price: U256,
    gas_limit: U256,
    chain_id: Option<u64>,
) -> Result<UnsignedTransaction, InvalidFieldError> {
    if to.len() != Address::len_bytes() {
        return Err(InvalidFieldError::new(
            "to",
            format!("must be {} bytes, got {}", Address::len_bytes(), to.len()),
        ));
    }
    let nonce = u64::try_from(nonce)
        .map_err(|_| InvalidFieldError::new("nonce", "does not fit in 64 bits"))?;
    let gas_price = u128::try_from(gas_price)
        .map_err(|_| InvalidFieldError::new("gas_price", "does not fit in 128 bits"))?;
    let gas_limit = u64::try_from(gas_limit)
        .map_err(|_| InvalidFieldError::new("gas_limit", "does not fit in 64 bits"))?;

    Ok(UnsignedTransaction {
        nonce,
        gas_price,
        gas_limit,
        to: Address::from_slice(to),
        value,
        input: calldata,
        chain_id,
    })
}

impl UnsignedTransaction {
    fn fields_payload_length(&self) -> usize {
        self.nonce.length()
            + self.gas_price.length()
            + self.gas_limit.length()
            + self.to.length()
            + self.value.length()
            + self.input.length()
    }

    fn encode_fields(&self, out: &mut dyn BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
    }

    /// Canonical RLP encoding of the signing payload.
    ///
    /// With a chain id set, the placeholder triple `{chain_id, 0, 0}` is
    /// appended to the field list per EIP-155; without one, the list holds
    /// the six payload fields only.
    pub fn encode_for_signing(&self) -> Vec<u8> {
        let mut payload_length = self.fields_payload_length();
        if let Some(id) = self.chain_id {
            payload_length += id.length() + 0u8.length() + 0u8.length();
        }
        let mut out = Vec::with_capacity(payload_length + length_of_length(payload_length) + 1);
        Header { list: true, payload_length }.encode(&mut out);
        self.encode_fields(&mut out);
        if let Some(id) = self.chain_id {
            id.encode(&mut out);
            0u8.encode(&mut out);
            0u8.encode(&mut out);
        }
        out
    }

    /// Keccak-256 hash of the signing payload.
    pub fn signature_hash(&self) -> B256 {
        keccak256(self.encode_for_signing())
    }
}

impl Decodable for UnsignedTransaction {
    /// Accepts both the 6-field legacy list and the 9-field signing form;
    /// in the latter the two trailing placeholders must decode to zero.
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(RlpError::UnexpectedString);
        }
        let started_len = buf.len();
        if header.payload_length > started_len {
            return Err(RlpError::InputTooShort);
        }

        let nonce = u64::decode(buf)?;
        let gas_price = u128::decode(buf)?;
        let gas_limit = u64::decode(buf)?;
        let to = Address::decode(buf)?;
        let value = U256::decode(buf)?;
        let input = Bytes::decode(buf)?;

        let chain_id = if started_len - buf.len() < header.payload_length {
            let id = u64::decode(buf)?;
            let r = U256::decode(buf)?;
            let s = U256::decode(buf)?;
            if !r.is_zero() || !s.is_zero() {
                return Err(RlpError::Custom("signing placeholder fields must be zero"));
            }
            Some(id)
        } else {
            None
        };

        let consumed = started_len - buf.len();
        if consumed != header.payload_length {
            return Err(RlpError::ListLengthMismatch {
                expected: header.payload_length,
                got: consumed,
            });
        }

        Ok(Self { nonce, gas_price, gas_limit, to, value, input, chain_id })
    }
}

/// Recoverable ECDSA signature with chain-id-adjusted recovery value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Recovery value: `parity + chain_id * 2 + 35`, or `parity + 27` for
    /// the unprotected legacy form.
    pub v: u64,
    /// First signature scalar, non-zero.
    pub r: U256,
    /// Second signature scalar, non-zero and in low-S form.
    pub s: U256,
}

impl Signature {
    /// Recovery value combining the curve point's parity with the chain id.
    pub const fn v_from_parity(parity: u8, chain_id: Option<u64>) -> u64 {
        match chain_id {
            Some(id) => parity as u64 + id * 2 + 35,
            None => parity as u64 + 27,
        }
    }

    /// Chain id encoded in `v`, if the signature is replay-protected.
    pub const fn chain_id(&self) -> Option<u64> {
        if self.v >= 35 {
            Some((self.v - 35) / 2)
        } else {
            None
        }
    }
}

/// A signed legacy transaction ready for canonical serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SignedTransaction {
    /// The payload that was signed.
    pub transaction: UnsignedTransaction,
    /// The recoverable signature over the signing payload.
    pub signature: Signature,
}

impl SignedTransaction {
    fn payload_length(&self) -> usize {
        self.transaction.fields_payload_length()
            + self.signature.v.length()
            + self.signature.r.length()
            + self.signature.s.length()
    }

    /// Canonical RLP bytes for broadcast.
    pub fn raw(&self) -> Bytes {
        alloy_rlp::encode(self).into()
    }

    /// Canonical transaction hash: keccak-256 of the broadcast bytes.
    pub fn hash(&self) -> B256 {
        keccak256(self.raw())
    }
}

impl Encodable for SignedTransaction {
    fn encode(&self, out: &mut dyn BufMut) {
        Header { list: true, payload_length: self.payload_length() }.encode(out);
        self.transaction.encode_fields(out);
        self.signature.v.encode(out);
        self.signature.r.encode(out);
        self.signature.s.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + length_of_length(payload_length)
    }
}

impl Decodable for SignedTransaction {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(RlpError::UnexpectedString);
        }
        let started_len = buf.len();
        if header.payload_length > started_len {
            return Err(RlpError::InputTooShort);
        }

        let nonce = u64::decode(buf)?;
        let gas_price = u128::decode(buf)?;
        let gas_limit = u64::decode(buf)?;
        let to = Address::decode(buf)?;
        let value = U256::decode(buf)?;
        let input = Bytes::decode(buf)?;
        let v = u64::decode(buf)?;
        let r = U256::decode(buf)?;
        let s = U256::decode(buf)?;

        let consumed = started_len - buf.len();
        if consumed != header.payload_length {
            return Err(RlpError::ListLengthMismatch {
                expected: header.payload_length,
                got: consumed,
            });
        }
        if r.is_zero() || s.is_zero() {
            return Err(RlpError::Custom("signature scalars must be non-zero"));
        }
        let signature = Signature { v, r, s };
        let chain_id = match v {
            27 | 28 => None,
            v if v >= 35 => signature.chain_id(),
            _ => return Err(RlpError::Custom("invalid recovery value")),
        };

        Ok(Self {
            transaction: UnsignedTransaction {
                nonce,
                gas_price,
                gas_limit,
                to,
                value,
                input,
                chain_id,
            },
            signature,
        })
    }
}
