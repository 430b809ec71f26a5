use alloy_primitives::{keccak256, Address, Bytes, Selector, U256};
use std::fmt;

/// Declared type of a single contract-method parameter.
///
/// Only the types the deposit call shape needs are represented. `Bytes` is
/// the sole dynamic type; everything else packs into one 32-byte word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// 20-byte account address.
    Address,
    /// Unsigned integer of the given bit width (8..=256, multiple of 8).
    Uint(usize),
    /// Fixed-size byte array of the given length (1..=32).
    FixedBytes(usize),
    /// Variable-length byte string.
    Bytes,
}

impl ParamType {
    /// Whether the type encodes through an offset word into the tail region.
    pub const fn is_dynamic(&self) -> bool {
        matches!(self, Self::Bytes)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::FixedBytes(len) => write!(f, "bytes{len}"),
            Self::Bytes => f.write_str("bytes"),
        }
    }
}

/// Runtime value for a single contract-method argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// 20-byte account address.
    Address(Address),
    /// Unsigned integer value.
    Uint(U256),
    /// Fixed-size byte array, length must match the declared `bytesN`.
    FixedBytes(Bytes),
    /// Variable-length byte string.
    Bytes(Bytes),
}

impl Token {
    /// Short name used in error messages.
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Uint(_) => "uint",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// A named contract method together with its ordered parameter types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Method name as it appears in the contract interface.
    pub name: String,
    /// Declared parameter types, in call order.
    pub inputs: Vec<ParamType>,
}

impl Function {
    /// Canonical signature string: name plus parenthesized comma-joined
    /// type names, no spaces.
    pub fn signature(&self) -> String {
        let types = self
            .inputs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}({types})", self.name)
    }

    /// First 4 bytes of the keccak-256 hash of the canonical signature.
    pub fn selector(&self) -> Selector {
        let hash = keccak256(self.signature().as_bytes());
        Selector::from_slice(&hash[..4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_signature_has_no_spaces() {
        let f = Function {
            name: "deposit".to_owned(),
            inputs: vec![
                ParamType::Bytes,
                ParamType::Bytes,
                ParamType::Bytes,
                ParamType::FixedBytes(32),
            ],
        };
        assert_eq!(f.signature(), "deposit(bytes,bytes,bytes,bytes32)");
    }

    #[test]
    fn deposit_selector() {
        let f = Function {
            name: "deposit".to_owned(),
            inputs: vec![
                ParamType::Bytes,
                ParamType::Bytes,
                ParamType::Bytes,
                ParamType::FixedBytes(32),
            ],
        };
        assert_eq!(f.selector().as_slice(), &[0x22, 0x89, 0x51, 0x18]);
    }

    #[test]
    fn param_type_names() {
        assert_eq!(ParamType::Address.to_string(), "address");
        assert_eq!(ParamType::Uint(256).to_string(), "uint256");
        assert_eq!(ParamType::FixedBytes(32).to_string(), "bytes32");
        assert_eq!(ParamType::Bytes.to_string(), "bytes");
    }
}
