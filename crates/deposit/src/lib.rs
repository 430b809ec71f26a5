//! Validator deposit pipeline: encode the deposit contract call, assemble
//! and sign the funding transaction, broadcast it, and classify the
//! endpoint's verdict.
//!
//! Each send is one strictly sequential attempt (nonce fetch, encode,
//! assemble, sign, submit) against an immutable [`DepositSender`] built
//! once from configuration.

mod contract;
mod credentials;
mod outcome;
mod sender;

pub use contract::{contract_function, DepositCall, PUBKEY_LENGTH, SIGNATURE_LENGTH};
pub use credentials::{
    bls_withdrawal_credentials, eth1_withdrawal_credentials, BLS_WITHDRAWAL_PREFIX,
    ETH1_ADDRESS_WITHDRAWAL_PREFIX,
};
pub use outcome::{RejectReason, SubmissionOutcome};
pub use sender::{submit, DepositError, DepositSender, GasParams};

use alloy_primitives::{address, Address, U256};

/// Mainnet deposit contract.
pub const MAINNET_DEPOSIT_CONTRACT_ADDRESS: Address =
    address!("0x00000000219ab540356cbb839cbe05303d7705fa");

/// Amount staked per validator, in wei (32 ether).
pub const DEPOSIT_VALUE_WEI: U256 = U256::from_limbs([0xbc16d674ec800000, 0x1, 0, 0]);

/// Amount staked per validator, in gwei.
pub const MAX_EFFECTIVE_BALANCE_GWEI: u64 = 32_000_000_000;

/// Gas limit that comfortably covers a deposit call.
pub const DEPOSIT_GAS_LIMIT: u64 = 500_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_value_is_32_ether() {
        let wei_in_ether = U256::from(10u64).pow(U256::from(18u64));
        assert_eq!(DEPOSIT_VALUE_WEI, wei_in_ether * U256::from(32u64));
        assert_eq!(
            DEPOSIT_VALUE_WEI / U256::from(1_000_000_000u64),
            U256::from(MAX_EFFECTIVE_BALANCE_GWEI)
        );
    }
}
