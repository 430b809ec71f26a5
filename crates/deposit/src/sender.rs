use crate::{DepositCall, RejectReason, SubmissionOutcome};
use alloy_primitives::{hex, keccak256, Address, U256};
use stakewire_abi::EncodingError;
use stakewire_rpc::{Eth1Provider, TransportError};
use stakewire_tx::{
    assemble, sign_transaction, InvalidFieldError, SigningError, SigningKey,
};
use tracing::{debug, info, warn};

/// Any failure along the deposit pipeline, by stage.
///
/// `Transport` is the only transient kind: nothing reached the chain, so the
/// caller may resubmit the identical bytes under the same nonce. Everything
/// else is fatal to the attempt and needs a corrected input.
#[derive(Debug, thiserror::Error)]
pub enum DepositError {
    /// A deposit argument has the wrong byte length.
    #[error("{field} must be {expected} bytes, got {got}")]
    InvalidLength {
        /// Argument name.
        field: &'static str,
        /// Required byte length.
        expected: usize,
        /// Supplied byte length.
        got: usize,
    },
    /// A hex argument did not decode.
    #[error("invalid hex input: {0}")]
    Hex(#[from] hex::FromHexError),
    /// The call arguments did not match the contract interface.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    /// A transaction field failed assembly validation.
    #[error(transparent)]
    InvalidField(#[from] InvalidFieldError),
    /// The key material was unusable.
    #[error(transparent)]
    Signing(#[from] SigningError),
    /// The endpoint was unreachable or answered garbage.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Caller-chosen gas parameters for one send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasParams {
    /// Fee per gas unit, in wei.
    pub gas_price: u128,
    /// Maximum gas for the call.
    pub gas_limit: u64,
}

/// Immutable deposit pipeline, constructed once from configuration.
///
/// Each [`send`](Self::send) is a strictly sequential single attempt:
/// nonce fetch, encode, assemble, sign, submit. There is no internal retry
/// and no state shared between sends beyond this configuration.
#[derive(Debug)]
pub struct DepositSender<P> {
    provider: P,
    contract: Address,
    chain_id: u64,
}

impl<P: Eth1Provider> DepositSender<P> {
    /// Pipeline against `contract` on the network identified by `chain_id`.
    pub const fn new(provider: P, contract: Address, chain_id: u64) -> Self {
        Self { provider, contract, chain_id }
    }

    /// The configured deposit contract address.
    pub const fn contract(&self) -> Address {
        self.contract
    }

    /// Runs one deposit send to completion.
    ///
    /// Dropping the returned future before the submission stage has no side
    /// effect. Once the network write is issued the operation is no longer
    /// cancellable; if it times out, treat the outcome as unknown and check
    /// chain state before reusing the nonce.
    pub async fn send(
        &self,
        call: &DepositCall,
        value: U256,
        gas: GasParams,
        key: &SigningKey,
    ) -> Result<SubmissionOutcome, DepositError> {
        let sender = key.address();
        let nonce = self.provider.nonce(sender).await?;
        debug!(target: "deposit::sender", %sender, nonce, "fetched account nonce");

        let calldata = call.calldata()?;
        let tx = assemble(
            calldata,
            self.contract.as_slice(),
            value,
            U256::from(nonce),
            U256::from(gas.gas_price),
            U256::from(gas.gas_limit),
            Some(self.chain_id),
        )?;
        let signed = sign_transaction(&tx, key)?;
        let raw = signed.raw();
        debug!(
            target: "deposit::sender",
            raw = %hex::encode_prefixed(&raw),
            "signed deposit transaction"
        );

        let outcome = submit(&self.provider, &raw).await?;
        Ok(outcome)
    }
}

/// Broadcasts raw signed bytes and interprets the endpoint's verdict.
///
/// Exactly one network write per call, never a resubmission: a refusal comes
/// back as [`SubmissionOutcome::Rejected`] for the caller to act on, and a
/// transport failure as an error with the write possibly not delivered.
/// The accepted hash is recomputed locally from `raw` rather than trusted
/// from the endpoint.
pub async fn submit<P: Eth1Provider>(
    provider: &P,
    raw: &[u8],
) -> Result<SubmissionOutcome, TransportError> {
    let local_hash = keccak256(raw);
    match provider.send_raw(raw).await {
        Ok(reported) => {
            if reported != local_hash {
                warn!(
                    target: "deposit::submitter",
                    %reported,
                    local = %local_hash,
                    "endpoint echoed a different transaction hash"
                );
            }
            info!(target: "deposit::submitter", tx_hash = %local_hash, "transaction accepted");
            Ok(SubmissionOutcome::Accepted { tx_hash: local_hash })
        }
        Err(TransportError::Rpc { code, message }) => {
            let reason = RejectReason::from_rpc(code, &message);
            warn!(target: "deposit::submitter", %reason, "transaction rejected");
            Ok(SubmissionOutcome::Rejected { reason })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEPOSIT_GAS_LIMIT, DEPOSIT_VALUE_WEI, MAINNET_DEPOSIT_CONTRACT_ADDRESS, PUBKEY_LENGTH, SIGNATURE_LENGTH};
    use alloy_primitives::{Bytes, B256};
    use alloy_rlp::Decodable;
    use async_trait::async_trait;
    use stakewire_tx::{recover_signer, SignedTransaction};
    use std::{collections::VecDeque, sync::Mutex};

    enum Reply {
        Echo,
        Hash(B256),
        Refuse { code: i64, message: &'static str },
        Down,
    }

    struct MockProvider {
        nonce: u64,
        replies: Mutex<VecDeque<Reply>>,
        sent: Mutex<Vec<Vec<u8>>>,
    }

    impl MockProvider {
        fn new(nonce: u64, replies: Vec<Reply>) -> Self {
            Self {
                nonce,
                replies: Mutex::new(replies.into()),
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<Vec<u8>> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Eth1Provider for MockProvider {
        async fn nonce(&self, _address: Address) -> Result<u64, TransportError> {
            Ok(self.nonce)
        }

        async fn send_raw(&self, raw: &[u8]) -> Result<B256, TransportError> {
            self.sent.lock().unwrap().push(raw.to_vec());
            match self.replies.lock().unwrap().pop_front().expect("unexpected send") {
                Reply::Echo => Ok(keccak256(raw)),
                Reply::Hash(hash) => Ok(hash),
                Reply::Refuse { code, message } => {
                    Err(TransportError::Rpc { code, message: message.to_owned() })
                }
                Reply::Down => Err(TransportError::InvalidResponse("gateway timeout".to_owned())),
            }
        }
    }

    fn test_call() -> DepositCall {
        DepositCall::new(
            Bytes::from(vec![0x84u8; PUBKEY_LENGTH]),
            B256::ZERO,
            Bytes::from(vec![0xadu8; SIGNATURE_LENGTH]),
            B256::ZERO,
        )
        .unwrap()
    }

    fn test_key() -> SigningKey {
        SigningKey::from_slice(&[0x46u8; 32]).unwrap()
    }

    fn gas() -> GasParams {
        GasParams { gas_price: 1_500_000_002, gas_limit: DEPOSIT_GAS_LIMIT }
    }

    fn sender(provider: MockProvider) -> DepositSender<MockProvider> {
        DepositSender::new(provider, MAINNET_DEPOSIT_CONTRACT_ADDRESS, 5)
    }

    #[tokio::test]
    async fn sends_a_well_formed_transaction() {
        let sender = sender(MockProvider::new(5, vec![Reply::Echo]));
        let key = test_key();

        let outcome = sender
            .send(&test_call(), DEPOSIT_VALUE_WEI, gas(), &key)
            .await
            .unwrap();

        let sent = sender.provider.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(outcome, SubmissionOutcome::Accepted { tx_hash: keccak256(&sent[0]) });

        let signed = SignedTransaction::decode(&mut sent[0].as_slice()).unwrap();
        assert_eq!(signed.transaction.nonce, 5);
        assert_eq!(signed.transaction.to, MAINNET_DEPOSIT_CONTRACT_ADDRESS);
        assert_eq!(signed.transaction.value, DEPOSIT_VALUE_WEI);
        assert_eq!(signed.transaction.gas_price, 1_500_000_002);
        assert_eq!(signed.transaction.gas_limit, DEPOSIT_GAS_LIMIT);
        assert_eq!(signed.transaction.chain_id, Some(5));
        assert_eq!(&signed.transaction.input[..4], &[0x22, 0x89, 0x51, 0x18]);
        assert_eq!(
            recover_signer(signed.transaction.signature_hash(), &signed.signature).unwrap(),
            key.address()
        );
    }

    #[tokio::test]
    async fn accepted_hash_is_recomputed_locally() {
        let sender = sender(MockProvider::new(0, vec![Reply::Hash(B256::ZERO)]));

        let outcome = sender
            .send(&test_call(), DEPOSIT_VALUE_WEI, gas(), &test_key())
            .await
            .unwrap();

        let sent = sender.provider.sent();
        assert_eq!(outcome, SubmissionOutcome::Accepted { tx_hash: keccak256(&sent[0]) });
    }

    #[tokio::test]
    async fn rejection_is_classified_and_not_retried() {
        let sender = sender(MockProvider::new(
            3,
            vec![Reply::Refuse { code: -32000, message: "nonce too low" }],
        ));

        let outcome = sender
            .send(&test_call(), DEPOSIT_VALUE_WEI, gas(), &test_key())
            .await
            .unwrap();

        assert_eq!(outcome, SubmissionOutcome::Rejected { reason: RejectReason::NonceTooLow });
        assert_eq!(sender.provider.sent().len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_propagates_without_retry() {
        let sender = sender(MockProvider::new(0, vec![Reply::Down]));

        let err = sender
            .send(&test_call(), DEPOSIT_VALUE_WEI, gas(), &test_key())
            .await
            .unwrap_err();

        assert!(matches!(err, DepositError::Transport(TransportError::InvalidResponse(_))));
        assert_eq!(sender.provider.sent().len(), 1);
    }

    #[tokio::test]
    async fn identical_inputs_produce_identical_bytes() {
        let sender = sender(MockProvider::new(9, vec![Reply::Echo, Reply::Echo]));
        let call = test_call();
        let key = test_key();

        sender.send(&call, DEPOSIT_VALUE_WEI, gas(), &key).await.unwrap();
        sender.send(&call, DEPOSIT_VALUE_WEI, gas(), &key).await.unwrap();

        let sent = sender.provider.sent();
        assert_eq!(sent[0], sent[1]);
    }
}
