#![allow(missing_docs)]

//! Submit a validator deposit transaction to an execution-layer endpoint.

use alloy_primitives::{hex, Address, Bytes, B256, U256};
use clap::Parser;
use eyre::{bail, eyre, WrapErr};
use serde::Deserialize;
use stakewire_deposit::{
    eth1_withdrawal_credentials, DepositCall, DepositSender, GasParams, SubmissionOutcome,
    DEPOSIT_GAS_LIMIT, DEPOSIT_VALUE_WEI, MAINNET_DEPOSIT_CONTRACT_ADDRESS,
};
use stakewire_rpc::Eth1Client;
use stakewire_tx::SigningKey;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;
use zeroize::Zeroizing;

/// Gas price the original deposit tooling shipped with, in wei.
const DEFAULT_GAS_PRICE: u128 = 1_500_000_002;

#[derive(Debug, Parser)]
#[command(name = "stakewire", about = "Send a validator deposit transaction")]
struct Args {
    /// Execution-layer JSON-RPC endpoint.
    #[arg(long, env = "STAKEWIRE_RPC_URL")]
    rpc_url: Option<Url>,

    /// TOML file supplying endpoint, chain id, and contract address.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chain id bound into the signature; fetched from the endpoint when
    /// not given.
    #[arg(long)]
    chain_id: Option<u64>,

    /// Deposit contract address.
    #[arg(long)]
    contract: Option<Address>,

    /// Validator BLS public key, 48 bytes of hex.
    #[arg(long)]
    pubkey: String,

    /// Withdrawal credentials, 32 bytes of hex.
    #[arg(long, conflicts_with = "withdrawal_address")]
    withdrawal_credentials: Option<B256>,

    /// Execution-layer withdrawal address; converted to 0x01 credentials.
    #[arg(long)]
    withdrawal_address: Option<Address>,

    /// BLS signature over the deposit message, 96 bytes of hex.
    #[arg(long)]
    signature: String,

    /// SSZ root of the signed deposit data, 32 bytes of hex.
    #[arg(long)]
    deposit_data_root: B256,

    /// Gas price in wei.
    #[arg(long, default_value_t = DEFAULT_GAS_PRICE)]
    gas_price: u128,

    /// Gas limit for the deposit call.
    #[arg(long, default_value_t = DEPOSIT_GAS_LIMIT)]
    gas_limit: u64,

    /// Deposit value in wei.
    #[arg(long, default_value_t = DEPOSIT_VALUE_WEI)]
    value: U256,

    /// File holding the sender's private key as hex. Falls back to the
    /// STAKEWIRE_PRIVATE_KEY environment variable.
    #[arg(long)]
    key_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    rpc_url: Option<Url>,
    chain_id: Option<u64>,
    contract: Option<Address>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let file = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("reading config {}", path.display()))?;
            toml::from_str(&text).wrap_err("parsing config")?
        }
        None => FileConfig::default(),
    };

    let rpc_url = args
        .rpc_url
        .or(file.rpc_url)
        .ok_or_else(|| eyre!("an rpc endpoint is required (--rpc-url or config file)"))?;
    let client = Eth1Client::new(rpc_url);

    let chain_id = match args.chain_id.or(file.chain_id) {
        Some(id) => id,
        None => client.chain_id().await.wrap_err("fetching chain id")?,
    };
    let contract = args
        .contract
        .or(file.contract)
        .unwrap_or(MAINNET_DEPOSIT_CONTRACT_ADDRESS);

    let withdrawal_credentials = match (args.withdrawal_credentials, args.withdrawal_address) {
        (Some(credentials), None) => credentials,
        (None, Some(address)) => eth1_withdrawal_credentials(address),
        _ => bail!("exactly one of --withdrawal-credentials or --withdrawal-address is required"),
    };
    let call = DepositCall::new(
        Bytes::from(hex::decode(&args.pubkey)?),
        withdrawal_credentials,
        Bytes::from(hex::decode(&args.signature)?),
        args.deposit_data_root,
    )?;

    let key = read_signing_key(args.key_file.as_deref())?;
    let sender = DepositSender::new(client, contract, chain_id);
    info!(target: "stakewire::cli", chain_id, contract = %contract, "submitting deposit");

    let gas = GasParams { gas_price: args.gas_price, gas_limit: args.gas_limit };
    match sender.send(&call, args.value, gas, &key).await? {
        SubmissionOutcome::Accepted { tx_hash } => {
            println!("deposit accepted: {tx_hash}");
        }
        SubmissionOutcome::Rejected { reason } => {
            eprintln!("deposit rejected: {reason}");
            if reason.requires_nonce_refresh() {
                eprintln!("check chain state and refetch the nonce before trying again");
            }
            std::process::exit(1);
        }
    }
    Ok(())
}

/// Reads the key hex from a file or the environment into zeroized buffers
/// and keeps only the parsed key.
fn read_signing_key(path: Option<&std::path::Path>) -> eyre::Result<SigningKey> {
    let text = match path {
        Some(path) => Zeroizing::new(
            fs::read_to_string(path)
                .wrap_err_with(|| format!("reading key file {}", path.display()))?,
        ),
        None => Zeroizing::new(std::env::var("STAKEWIRE_PRIVATE_KEY").map_err(|_| {
            eyre!("a private key is required (--key-file or STAKEWIRE_PRIVATE_KEY)")
        })?),
    };
    let bytes = Zeroizing::new(hex::decode(text.trim()).wrap_err("decoding private key hex")?);
    Ok(SigningKey::from_slice(&bytes)?)
}
