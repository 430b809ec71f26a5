use crate::{Function, ParamType, Token, WORD_LEN};
use alloy_primitives::{Bytes, U256};

/// Failure to encode a call because an argument's runtime shape does not
/// match its declared type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// Number of supplied values differs from the declared parameter count.
    #[error("method takes {expected} arguments, {got} supplied")]
    ArityMismatch {
        /// Declared parameter count.
        expected: usize,
        /// Supplied value count.
        got: usize,
    },
    /// A value's variant does not correspond to the declared type.
    #[error("argument {index} is {got}, declared type is {expected}")]
    TypeMismatch {
        /// Zero-based argument position.
        index: usize,
        /// Declared type name.
        expected: String,
        /// Supplied value kind.
        got: &'static str,
    },
    /// A fixed-size byte array has the wrong length for its declared type.
    #[error("argument {index} must be {expected} bytes, got {got}")]
    FixedBytesLength {
        /// Zero-based argument position.
        index: usize,
        /// Declared byte length.
        expected: usize,
        /// Supplied byte length.
        got: usize,
    },
    /// An integer value exceeds its declared bit width.
    #[error("argument {index} does not fit in uint{bits}")]
    UintOutOfRange {
        /// Zero-based argument position.
        index: usize,
        /// Declared bit width.
        bits: usize,
    },
    /// A declared width outside what the word encoding can represent.
    #[error("argument {index} declares unsupported width {width}")]
    UnsupportedWidth {
        /// Zero-based argument position.
        index: usize,
        /// Declared width (bits for integers, bytes for byte arrays).
        width: usize,
    },
}

/// Encodes a method call as calldata: `selector || head words || tail`.
///
/// Static arguments occupy one 32-byte word each in declaration order.
/// A dynamic `bytes` argument occupies an offset word in the head, with its
/// length-prefixed payload appended to the tail; offsets are measured from
/// the start of the argument region (immediately after the selector).
pub fn encode_call(function: &Function, args: &[Token]) -> Result<Bytes, EncodingError> {
    if args.len() != function.inputs.len() {
        return Err(EncodingError::ArityMismatch {
            expected: function.inputs.len(),
            got: args.len(),
        });
    }
    for (index, (token, param)) in args.iter().zip(&function.inputs).enumerate() {
        check_token(index, token, param)?;
    }

    let head_len = WORD_LEN * args.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in args {
        match token {
            Token::Address(addr) => {
                head.extend_from_slice(&[0u8; 12]);
                head.extend_from_slice(addr.as_slice());
            }
            Token::Uint(value) => head.extend_from_slice(&value.to_be_bytes::<WORD_LEN>()),
            Token::FixedBytes(data) => {
                let start = head.len();
                head.extend_from_slice(data);
                head.resize(start + WORD_LEN, 0);
            }
            Token::Bytes(data) => {
                let offset = U256::from(head_len + tail.len());
                head.extend_from_slice(&offset.to_be_bytes::<WORD_LEN>());
                tail.extend_from_slice(&U256::from(data.len()).to_be_bytes::<WORD_LEN>());
                tail.extend_from_slice(data);
                let padded = tail.len() + padding(data.len());
                tail.resize(padded, 0);
            }
        }
    }

    let mut out = Vec::with_capacity(4 + head.len() + tail.len());
    out.extend_from_slice(function.selector().as_slice());
    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(out.into())
}

fn check_token(index: usize, token: &Token, param: &ParamType) -> Result<(), EncodingError> {
    match (token, param) {
        (Token::Address(_), ParamType::Address) => Ok(()),
        (Token::Uint(value), ParamType::Uint(bits)) => {
            if *bits == 0 || *bits > 256 || *bits % 8 != 0 {
                Err(EncodingError::UnsupportedWidth { index, width: *bits })
            } else if *bits < 256 && *value > (U256::MAX >> (256 - bits)) {
                Err(EncodingError::UintOutOfRange { index, bits: *bits })
            } else {
                Ok(())
            }
        }
        (Token::FixedBytes(data), ParamType::FixedBytes(len)) => {
            if *len == 0 || *len > WORD_LEN {
                Err(EncodingError::UnsupportedWidth { index, width: *len })
            } else if data.len() == *len {
                Ok(())
            } else {
                Err(EncodingError::FixedBytesLength {
                    index,
                    expected: *len,
                    got: data.len(),
                })
            }
        }
        (Token::Bytes(_), ParamType::Bytes) => Ok(()),
        _ => Err(EncodingError::TypeMismatch {
            index,
            expected: param.to_string(),
            got: token.kind(),
        }),
    }
}

/// Zero bytes needed to pad `len` up to the next word boundary.
const fn padding(len: usize) -> usize {
    (WORD_LEN - len % WORD_LEN) % WORD_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Address};

    fn deposit_function() -> Function {
        Function {
            name: "deposit".to_owned(),
            inputs: vec![
                ParamType::Bytes,
                ParamType::Bytes,
                ParamType::Bytes,
                ParamType::FixedBytes(32),
            ],
        }
    }

    fn zero_deposit_args() -> Vec<Token> {
        vec![
            Token::Bytes(Bytes::from(vec![0u8; 48])),
            Token::Bytes(Bytes::from(vec![0u8; 32])),
            Token::Bytes(Bytes::from(vec![0u8; 96])),
            Token::FixedBytes(Bytes::from(vec![0u8; 32])),
        ]
    }

    fn word_at(data: &[u8], arg_index: usize) -> U256 {
        let start = 4 + arg_index * WORD_LEN;
        U256::from_be_slice(&data[start..start + WORD_LEN])
    }

    #[test]
    fn zero_deposit_layout() {
        let calldata = encode_call(&deposit_function(), &zero_deposit_args()).unwrap();

        // selector + 4 head words + (48B, 32B, 96B) length-prefixed tails
        assert_eq!(calldata.len(), 4 + 4 * 32 + (32 + 64) + (32 + 32) + (32 + 96));
        assert_eq!(&calldata[..4], &[0x22, 0x89, 0x51, 0x18]);

        // offsets are relative to the argument region
        assert_eq!(word_at(&calldata, 0), U256::from(0x80u64));
        assert_eq!(word_at(&calldata, 1), U256::from(0xe0u64));
        assert_eq!(word_at(&calldata, 2), U256::from(0x120u64));
        // static bytes32 lives in its head slot
        assert_eq!(word_at(&calldata, 3), U256::ZERO);

        // pubkey tail: length word then 48 data bytes padded to 64
        assert_eq!(
            U256::from_be_slice(&calldata[4 + 0x80..4 + 0x80 + 32]),
            U256::from(48u64)
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        let f = deposit_function();
        let args = zero_deposit_args();
        assert_eq!(encode_call(&f, &args).unwrap(), encode_call(&f, &args).unwrap());
    }

    #[test]
    fn static_arguments_pack_in_order() {
        let f = Function {
            name: "transfer".to_owned(),
            inputs: vec![ParamType::Address, ParamType::Uint(256)],
        };
        let to = address!("0x00000000219ab540356cbb839cbe05303d7705fa");
        let calldata = encode_call(
            &f,
            &[Token::Address(to), Token::Uint(U256::from(7u64))],
        )
        .unwrap();

        assert_eq!(calldata.len(), 4 + 64);
        assert_eq!(&calldata[16..36], to.as_slice());
        assert_eq!(word_at(&calldata, 1), U256::from(7u64));
    }

    #[test]
    fn arity_mismatch() {
        let err = encode_call(&deposit_function(), &[]).unwrap_err();
        assert_eq!(err, EncodingError::ArityMismatch { expected: 4, got: 0 });
    }

    #[test]
    fn fixed_bytes_length_mismatch() {
        let mut args = zero_deposit_args();
        args[3] = Token::FixedBytes(Bytes::from(vec![0u8; 31]));
        let err = encode_call(&deposit_function(), &args).unwrap_err();
        assert_eq!(
            err,
            EncodingError::FixedBytesLength { index: 3, expected: 32, got: 31 }
        );
    }

    #[test]
    fn uint_out_of_range() {
        let f = Function {
            name: "set".to_owned(),
            inputs: vec![ParamType::Uint(8)],
        };
        let err = encode_call(&f, &[Token::Uint(U256::from(256u64))]).unwrap_err();
        assert_eq!(err, EncodingError::UintOutOfRange { index: 0, bits: 8 });

        assert!(encode_call(&f, &[Token::Uint(U256::from(255u64))]).is_ok());
    }

    #[test]
    fn unsupported_declared_widths() {
        let f = Function {
            name: "set".to_owned(),
            inputs: vec![ParamType::FixedBytes(33)],
        };
        let err = encode_call(&f, &[Token::FixedBytes(Bytes::from(vec![0u8; 33]))]).unwrap_err();
        assert_eq!(err, EncodingError::UnsupportedWidth { index: 0, width: 33 });

        let f = Function {
            name: "set".to_owned(),
            inputs: vec![ParamType::Uint(12)],
        };
        let err = encode_call(&f, &[Token::Uint(U256::ZERO)]).unwrap_err();
        assert_eq!(err, EncodingError::UnsupportedWidth { index: 0, width: 12 });
    }

    #[test]
    fn type_mismatch_names_the_argument() {
        let mut args = zero_deposit_args();
        args[0] = Token::Address(Address::ZERO);
        let err = encode_call(&deposit_function(), &args).unwrap_err();
        assert_eq!(
            err,
            EncodingError::TypeMismatch {
                index: 0,
                expected: "bytes".to_owned(),
                got: "address",
            }
        );
    }
}
