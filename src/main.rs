//! eth-wallet-link
//!
//! Development tool that links a local Ethereum key to its CENNZnet address:
//!
//! 1. Connect to the node and read the key's `ethWallet` nonce
//! 2. Sign `encode(system.remark(message)) ‖ nonce_le` with `personal_sign`
//! 3. Derive and print the CENNZnet address the signature maps to
//! 4. Submit the call through `ethWallet.call` (skipped with `DRY_RUN=true`)

use eth_wallet_link::config::Config;
use eth_wallet_link::{
    AddressDeriver, CallSubmitter, CennznetClient, Call, Linker, LocalKeyOracle, NonceTracker,
};
use std::sync::Arc;
use tracing::info;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    info!("Starting eth-wallet-link");

    let config = Config::load()?;
    info!(
        rpc = %config.rpc_url,
        eth_wallet_call = %config.eth_wallet_call,
        ss58_format = config.ss58_format,
        dry_run = config.dry_run,
        "Configuration loaded"
    );

    let client = Arc::new(CennznetClient::new(
        &config.rpc_url,
        config.eth_wallet_call,
        config.rpc_timeout(),
    )?);
    let chain = client.check_connection().await?;
    info!(chain = %chain, "Connected to CENNZnet node");

    let oracle = Arc::new(LocalKeyOracle::from_secret_key(
        config.require_private_key()?,
    )?);
    let deriver = AddressDeriver::new(config.ss58_format)?;

    let linker = Linker::new(
        NonceTracker::new(client.clone()),
        oracle,
        deriver,
        CallSubmitter::new(client),
    );

    let call = Call::remark_with_index(config.remark_call, config.remark_message.as_bytes());
    let signed = linker.authorize(call).await?;

    info!(
        eth_address = %signed.source(),
        nonce = signed.nonce(),
        signature = %signed.signature(),
        public_key = %signed.identity().public_key_hex(),
        cennznet_address = %signed.target(),
        "Derived CENNZnet address"
    );

    if config.dry_run {
        info!("Dry run, not submitting");
        return Ok(());
    }

    let outcome = linker.submit(signed).await?;
    info!(
        eth_address = %outcome.source,
        cennznet_address = %outcome.target,
        tx_hash = %outcome.tx,
        "Linked call submitted"
    );

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,eth_wallet_link=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
