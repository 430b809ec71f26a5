use alloy_primitives::B256;
use std::fmt;

/// Terminal verdict of one submission attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The endpoint accepted the transaction into its pool.
    Accepted {
        /// Canonical hash, recomputed locally from the broadcast bytes.
        tx_hash: B256,
    },
    /// The endpoint explicitly refused the transaction.
    Rejected {
        /// The endpoint's classification of the refusal.
        reason: RejectReason,
    },
}

/// Why the endpoint refused a transaction.
///
/// The classification steers the caller's next move: a nonce-related
/// refusal requires a fresh nonce fetch, an underpriced one a gas-price
/// bump; none of them is retried with the identical bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The nonce was already consumed on chain.
    NonceTooLow,
    /// The nonce skips ahead of the account's next expected value.
    NonceGap,
    /// Balance cannot cover `value + gas_price * gas_limit`.
    InsufficientFunds,
    /// Gas price below what the pool currently admits.
    Underpriced,
    /// The identical transaction is already in the pool.
    AlreadyKnown,
    /// The payload did not decode as a valid transaction.
    Malformed,
    /// Anything the endpoint reported that fits no bucket above.
    Other {
        /// JSON-RPC error code.
        code: i64,
        /// Verbatim endpoint message.
        message: String,
    },
}

impl RejectReason {
    /// Buckets an endpoint's JSON-RPC error by its message text.
    ///
    /// Error codes for transaction refusal are not standardized across
    /// implementations; the message substrings below are the ones geth and
    /// its descendants emit.
    pub fn from_rpc(code: i64, message: &str) -> Self {
        let text = message.to_lowercase();
        if text.contains("nonce too low") {
            Self::NonceTooLow
        } else if text.contains("nonce too high") || text.contains("nonce gap") {
            Self::NonceGap
        } else if text.contains("insufficient funds") {
            Self::InsufficientFunds
        } else if text.contains("underpriced") {
            Self::Underpriced
        } else if text.contains("already known") || text.contains("known transaction") {
            Self::AlreadyKnown
        } else if text.contains("rlp") || text.contains("invalid sender") || text.contains("malformed")
        {
            Self::Malformed
        } else {
            Self::Other { code, message: message.to_owned() }
        }
    }

    /// Whether the caller must fetch a fresh nonce before trying again.
    pub const fn requires_nonce_refresh(&self) -> bool {
        matches!(self, Self::NonceTooLow | Self::NonceGap | Self::AlreadyKnown)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonceTooLow => f.write_str("nonce too low"),
            Self::NonceGap => f.write_str("nonce gap"),
            Self::InsufficientFunds => f.write_str("insufficient funds"),
            Self::Underpriced => f.write_str("underpriced"),
            Self::AlreadyKnown => f.write_str("already known"),
            Self::Malformed => f.write_str("malformed transaction"),
            Self::Other { code, message } => write!(f, "{message} (code {code})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_geth_messages() {
        let cases = [
            ("nonce too low", RejectReason::NonceTooLow),
            ("Nonce too low: next nonce 6, tx nonce 5", RejectReason::NonceTooLow),
            ("nonce too high", RejectReason::NonceGap),
            (
                "insufficient funds for gas * price + value",
                RejectReason::InsufficientFunds,
            ),
            ("transaction underpriced", RejectReason::Underpriced),
            ("replacement transaction underpriced", RejectReason::Underpriced),
            ("already known", RejectReason::AlreadyKnown),
            ("known transaction: 0xabc", RejectReason::AlreadyKnown),
            ("rlp: expected input list", RejectReason::Malformed),
            ("invalid sender", RejectReason::Malformed),
        ];
        for (message, expected) in cases {
            assert_eq!(RejectReason::from_rpc(-32000, message), expected, "{message}");
        }
    }

    #[test]
    fn unknown_messages_keep_code_and_text() {
        let reason = RejectReason::from_rpc(-32603, "execution aborted");
        assert_eq!(
            reason,
            RejectReason::Other { code: -32603, message: "execution aborted".to_owned() }
        );
    }

    #[test]
    fn nonce_refusals_require_refresh() {
        assert!(RejectReason::NonceTooLow.requires_nonce_refresh());
        assert!(RejectReason::NonceGap.requires_nonce_refresh());
        assert!(!RejectReason::Underpriced.requires_nonce_refresh());
        assert!(!RejectReason::InsufficientFunds.requires_nonce_refresh());
    }
}
