//! Polling watcher for new account transactions.
//!
//! The index canister offers no subscription, so the monitor asks for the
//! account's recent transactions on a fixed period and reports whenever the
//! returned list is longer than any list seen before. Only the count is
//! compared; the index is assumed to be append-only for an account.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::types::{Account, GetTransactions};
use crate::Result;

/// Anything that can list an account's transactions.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn get_transactions(&self, account: &Account, max_results: u64)
        -> Result<GetTransactions>;
}

#[async_trait]
impl<T: TransactionSource + ?Sized> TransactionSource for Arc<T> {
    async fn get_transactions(
        &self,
        account: &Account,
        max_results: u64,
    ) -> Result<GetTransactions> {
        (**self).get_transactions(account, max_results).await
    }
}

/// Emitted when a poll returns more transactions than previously seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionChange {
    pub previous_count: usize,
    pub count: usize,
    pub transactions: GetTransactions,
}

/// High-water mark over the number of transactions returned for an account.
#[derive(Debug, Clone)]
pub struct TransactionMonitor {
    account: Account,
    max_results: u64,
    last_seen: usize,
}

impl TransactionMonitor {
    pub fn new(account: Account, max_results: u64) -> Self {
        Self {
            account,
            max_results,
            last_seen: 0,
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn last_seen_count(&self) -> usize {
        self.last_seen
    }

    /// Compare a poll result against the high-water mark.
    ///
    /// A shorter or equal list is ignored and never lowers the mark.
    pub fn observe(&mut self, transactions: GetTransactions) -> Option<TransactionChange> {
        let count = transactions.transactions.len();
        if count <= self.last_seen {
            return None;
        }
        let previous_count = std::mem::replace(&mut self.last_seen, count);
        Some(TransactionChange {
            previous_count,
            count,
            transactions,
        })
    }

    /// Fetch once from `source` and compare. On error the mark is unchanged.
    pub async fn poll<S>(&mut self, source: &S) -> Result<Option<TransactionChange>>
    where
        S: TransactionSource + ?Sized,
    {
        let transactions = source
            .get_transactions(&self.account, self.max_results)
            .await?;
        Ok(self.observe(transactions))
    }
}

/// Handle to a running monitor task.
#[derive(Debug)]
pub struct MonitorHandle {
    token: CancellationToken,
    task: JoinHandle<TransactionMonitor>,
}

impl MonitorHandle {
    /// Ask the task to stop. An in-flight poll is abandoned.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the task and wait for it, returning the monitor's final state.
    pub async fn shutdown(self) -> std::result::Result<TransactionMonitor, JoinError> {
        self.token.cancel();
        self.task.await
    }
}

/// Poll `source` every `period` until cancelled, calling `on_change` for every
/// increase in the transaction count. The first poll happens one period after
/// the call. Poll errors are logged and the next tick proceeds as usual.
pub fn spawn_monitor<S, F>(
    source: S,
    mut monitor: TransactionMonitor,
    period: Duration,
    mut on_change: F,
) -> MonitorHandle
where
    S: TransactionSource + 'static,
    F: FnMut(TransactionChange) + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut consecutive_failures: u32 = 0;

        loop {
            tokio::select! {
                _ = cancelled.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let polled = tokio::select! {
                _ = cancelled.cancelled() => break,
                polled = monitor.poll(&source) => polled,
            };

            match polled {
                Ok(change) => {
                    if consecutive_failures > 0 {
                        tracing::info!(
                            failures = consecutive_failures,
                            "Transaction polling recovered"
                        );
                        consecutive_failures = 0;
                    }
                    if let Some(change) = change {
                        tracing::debug!(
                            owner = %monitor.account().owner,
                            previous = change.previous_count,
                            count = change.count,
                            "Transaction count increased"
                        );
                        on_change(change);
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    tracing::warn!(
                        owner = %monitor.account().owner,
                        error = %e,
                        failures = consecutive_failures,
                        "Error monitoring transactions"
                    );
                }
            }
        }

        tracing::debug!(
            last_seen = monitor.last_seen_count(),
            "Transaction monitor stopped"
        );
        monitor
    });

    MonitorHandle { token, task }
}
