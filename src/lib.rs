use async_trait::async_trait;
use candid::Nat;
use ic_agent::{export::Principal, identity::Secp256k1Identity, Agent};
use ic_utils::call::SyncCall;
use ic_utils::Canister;

pub mod config;
pub mod error;
pub mod identity;
pub mod monitor;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use identity::{load_identity, IdentityStore, LoadPolicy, WalletIdentity};
pub use monitor::{
    spawn_monitor, MonitorHandle, TransactionChange, TransactionMonitor, TransactionSource,
};
pub use types::{Account, GetTransactions, TransferArg, TransferError};

use types::{GetAccountTransactionsArgs, GetTransactionsResult, TransferResult};

#[cfg(test)]
mod tests;

/// Build an agent for `url`. The root key is only fetched when asked to,
/// which must never be the case for mainnet.
pub async fn create_agent(
    url: &str,
    identity: Secp256k1Identity,
    fetch_root_key: bool,
) -> Result<Agent> {
    let agent = Agent::builder()
        .with_url(url)
        .with_identity(identity)
        .build()?;
    if fetch_root_key {
        agent.fetch_root_key().await?;
    }
    Ok(agent)
}

/// A client for an ICRC-1 ledger and its index canister.
///
/// ## Features
/// - Get balances
/// - Transfer tokens
/// - List an account's transactions
#[derive(Clone, Debug)]
pub struct IcrcClient {
    agent: Agent,
    ledger_id: Principal,
    index_id: Principal,
}

impl IcrcClient {
    /// Create a new client signing with `identity`.
    /// ## Arguments
    /// * `identity` - The wallet identity, usually from [`IdentityStore::load_or_create_identity`].
    /// * `config` - Endpoint and canister ids.
    pub async fn new(identity: &WalletIdentity, config: &Config) -> Result<Self> {
        let agent = create_agent(
            &config.endpoint,
            identity.to_agent_identity(),
            config.fetch_root_key,
        )
        .await?;
        Ok(Self::with_agent(agent, config.ledger_id, config.index_id))
    }

    pub fn with_agent(agent: Agent, ledger_id: Principal, index_id: Principal) -> Self {
        Self {
            agent,
            ledger_id,
            index_id,
        }
    }

    pub fn ledger_id(&self) -> Principal {
        self.ledger_id
    }

    pub fn index_id(&self) -> Principal {
        self.index_id
    }

    fn ledger(&self) -> Result<Canister<'_>> {
        Ok(Canister::builder()
            .with_agent(&self.agent)
            .with_canister_id(self.ledger_id)
            .build()?)
    }

    fn index(&self) -> Result<Canister<'_>> {
        Ok(Canister::builder()
            .with_agent(&self.agent)
            .with_canister_id(self.index_id)
            .build()?)
    }

    /// Get the token balance of an account, in the ledger's smallest unit.
    pub async fn get_balance(&self, owner: &Account) -> Result<Nat> {
        let (balance,): (Nat,) = self
            .ledger()?
            .query("icrc1_balance_of")
            .with_arg(*owner)
            .build()
            .call()
            .await?;
        Ok(balance)
    }

    /// Transfer tokens from the caller's account.
    /// ## Returns
    /// The index of the ledger block that holds the transfer.
    pub async fn transfer(&self, args: &TransferArg) -> Result<Nat> {
        let (result,): (TransferResult,) = self
            .ledger()?
            .update("icrc1_transfer")
            .with_arg(args.clone())
            .build()
            .call_and_wait()
            .await?;
        result.map_err(Error::Transfer)
    }

    /// List the most recent transactions of `account`, newest first.
    pub async fn get_transactions(
        &self,
        account: &Account,
        max_results: u64,
    ) -> Result<GetTransactions> {
        let args = GetAccountTransactionsArgs {
            account: *account,
            start: None,
            max_results: Nat::from(max_results),
        };
        let (result,): (GetTransactionsResult,) = self
            .index()?
            .query("get_account_transactions")
            .with_arg(args)
            .build()
            .call()
            .await?;
        result.map_err(|e| Error::Index(e.message))
    }
}

#[async_trait]
impl TransactionSource for IcrcClient {
    async fn get_transactions(
        &self,
        account: &Account,
        max_results: u64,
    ) -> Result<GetTransactions> {
        IcrcClient::get_transactions(self, account, max_results).await
    }
}
