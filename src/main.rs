use anyhow::{Context, Result};
use icrc_wallet::{
    spawn_monitor, Config, IcrcClient, IdentityStore, TransactionChange, TransactionMonitor,
    TransferArg, WalletIdentity,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn log_new_transactions(change: TransactionChange) {
    tracing::info!(
        previous = change.previous_count,
        count = change.count,
        oldest_tx_id = ?change.transactions.oldest_tx_id,
        "New transactions detected"
    );
    for tx in &change.transactions.transactions {
        let transaction = &tx.transaction;
        match &transaction.transfer {
            Some(transfer) => tracing::info!(
                id = %tx.id,
                from = %transfer.from.owner,
                to = %transfer.to.owner,
                amount = %transfer.amount,
                timestamp = transaction.timestamp,
                "Transfer"
            ),
            None => tracing::info!(
                id = %tx.id,
                kind = %transaction.kind,
                timestamp = transaction.timestamp,
                "Transaction"
            ),
        }
    }
}

/// Balance, transfer, balance again. The second balance is only fetched
/// once the transfer call has returned.
async fn run_transfer(
    client: &IcrcClient,
    identity: &WalletIdentity,
    config: &Config,
) -> Result<()> {
    let account = identity.account();

    let balance = client
        .get_balance(&account)
        .await
        .context("failed to fetch balance")?;
    tracing::info!(balance = %balance, "Current balance");

    let args = TransferArg::new(
        config.recipient,
        config.transfer_amount,
        config.transfer_fee(),
    );
    tracing::info!(
        to = %config.recipient,
        amount = config.transfer_amount,
        fee = ?config.transfer_fee,
        "Attempting transfer"
    );
    let block_index = client.transfer(&args).await.context("transfer failed")?;
    tracing::info!(block_index = %block_index, "Transfer completed");

    let balance = client
        .get_balance(&account)
        .await
        .context("failed to fetch new balance")?;
    tracing::info!(balance = %balance, "New balance");

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let store = IdentityStore::new(config.pem_path.clone(), config.identity_policy);
    let identity = store.load_or_create_identity().await?;
    tracing::info!(principal = %identity.principal(), "Principal ID");

    let client = IcrcClient::new(&identity, &config)
        .await
        .with_context(|| format!("failed to connect to {}", config.endpoint))?;
    tracing::info!(
        endpoint = %config.endpoint,
        ledger = %client.ledger_id(),
        index = %client.index_id(),
        "Created ledger client"
    );

    let monitor = spawn_monitor(
        client.clone(),
        TransactionMonitor::new(identity.account(), config.max_poll_results),
        config.poll_interval(),
        log_new_transactions,
    );

    let outcome = run_transfer(&client, &identity, &config).await;
    if let Err(e) = &outcome {
        tracing::error!(error = %format!("{e:#}"), "Error");
    }

    tracing::info!("Watching for new transactions, press Ctrl-C to exit");
    tokio::signal::ctrl_c().await?;

    let monitor = monitor.shutdown().await?;
    tracing::info!(
        last_seen = monitor.last_seen_count(),
        "Stopped transaction monitor"
    );

    outcome
}
