//! Candid types for the ICRC-1 ledger and the ICRC index canister.

use std::fmt;

use candid::{CandidType, Nat, Principal};
use serde::{Deserialize, Serialize};

pub type Subaccount = [u8; 32];

/// An ICRC-1 account: an owner principal plus an optional subaccount.
///
/// `subaccount: None` is the default subaccount of the owner.
#[derive(CandidType, Deserialize, Serialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Account {
    pub owner: Principal,
    pub subaccount: Option<Subaccount>,
}

impl From<Principal> for Account {
    fn from(owner: Principal) -> Self {
        Self {
            owner,
            subaccount: None,
        }
    }
}

/// Arguments for `icrc1_transfer`.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TransferArg {
    pub from_subaccount: Option<Subaccount>,
    pub to: Account,
    pub amount: Nat,
    pub fee: Option<Nat>,
    pub memo: Option<Vec<u8>>,
    pub created_at_time: Option<u64>,
}

impl TransferArg {
    /// Transfer `amount` from the caller's default subaccount to `to`.
    /// A `fee` of `None` lets the ledger charge its configured fee.
    pub fn new(to: impl Into<Account>, amount: impl Into<Nat>, fee: Option<Nat>) -> Self {
        Self {
            from_subaccount: None,
            to: to.into(),
            amount: amount.into(),
            fee,
            memo: None,
            created_at_time: None,
        }
    }
}

/// Rejection reasons returned by `icrc1_transfer`.
#[derive(
    CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq, strum_macros::IntoStaticStr,
)]
pub enum TransferError {
    BadFee { expected_fee: Nat },
    BadBurn { min_burn_amount: Nat },
    InsufficientFunds { balance: Nat },
    TooOld,
    CreatedInFuture { ledger_time: u64 },
    TemporarilyUnavailable,
    Duplicate { duplicate_of: Nat },
    GenericError { error_code: Nat, message: String },
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        match self {
            TransferError::BadFee { expected_fee } => {
                write!(f, "{name} (expected fee {expected_fee})")
            }
            TransferError::BadBurn { min_burn_amount } => {
                write!(f, "{name} (minimum burn amount {min_burn_amount})")
            }
            TransferError::InsufficientFunds { balance } => {
                write!(f, "{name} (balance {balance})")
            }
            TransferError::CreatedInFuture { ledger_time } => {
                write!(f, "{name} (ledger time {ledger_time})")
            }
            TransferError::Duplicate { duplicate_of } => {
                write!(f, "{name} (duplicate of block {duplicate_of})")
            }
            TransferError::GenericError {
                error_code,
                message,
            } => write!(f, "{name} ({error_code}: {message})"),
            TransferError::TooOld | TransferError::TemporarilyUnavailable => f.write_str(name),
        }
    }
}

pub(crate) type TransferResult = Result<Nat, TransferError>;

/// Arguments for the index canister's `get_account_transactions`.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GetAccountTransactionsArgs {
    pub account: Account,
    /// Newest transaction id to start from; `None` starts at the most recent one.
    pub start: Option<Nat>,
    pub max_results: Nat,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Mint {
    pub to: Account,
    pub amount: Nat,
    pub created_at_time: Option<u64>,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Burn {
    pub from: Account,
    pub amount: Nat,
    pub spender: Option<Account>,
    pub created_at_time: Option<u64>,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: Account,
    pub to: Account,
    pub amount: Nat,
    pub fee: Option<Nat>,
    pub spender: Option<Account>,
    pub created_at_time: Option<u64>,
}

/// A ledger transaction as reported by the index canister.
///
/// Exactly one of `mint`, `burn` or `transfer` is set for the kinds this
/// client understands; other kinds (e.g. `approve`) only carry `kind`.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub kind: String,
    pub mint: Option<Mint>,
    pub burn: Option<Burn>,
    pub transfer: Option<Transfer>,
    pub timestamp: u64,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TransactionWithId {
    pub id: Nat,
    pub transaction: Transaction,
}

/// Response payload of `get_account_transactions`.
#[derive(CandidType, Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct GetTransactions {
    /// Only reported by index-ng canisters.
    pub balance: Option<Nat>,
    pub transactions: Vec<TransactionWithId>,
    pub oldest_tx_id: Option<Nat>,
}

#[derive(CandidType, Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GetTransactionsErr {
    pub message: String,
}

pub(crate) type GetTransactionsResult = Result<GetTransactions, GetTransactionsErr>;
