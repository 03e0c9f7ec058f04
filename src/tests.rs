use candid::{CandidType, Nat, Principal};
use serde::Deserialize;

use crate::types::{
    Burn, GetTransactionsErr, GetTransactionsResult, Mint, Transfer, TransferResult,
};
use crate::*;

fn account(byte: u8) -> Account {
    Account::from(Principal::from_slice(&[byte; 29]))
}

#[derive(CandidType, Deserialize)]
struct WireApprove {
    from: Account,
    spender: Account,
    amount: Nat,
}

#[derive(CandidType, Deserialize)]
struct WireTransfer {
    from: Account,
    to: Account,
    amount: Nat,
    fee: Option<Nat>,
    spender: Option<Account>,
    memo: Option<Vec<u8>>,
    created_at_time: Option<u64>,
}

#[derive(CandidType, Deserialize)]
struct WireTransaction {
    kind: String,
    mint: Option<Mint>,
    burn: Option<Burn>,
    transfer: Option<WireTransfer>,
    approve: Option<WireApprove>,
    timestamp: u64,
}

#[derive(CandidType, Deserialize)]
struct WireTransactionWithId {
    id: Nat,
    transaction: WireTransaction,
}

/// Shape of the older index canister response: no `balance`.
#[derive(CandidType, Deserialize)]
struct WireGetTransactions {
    transactions: Vec<WireTransactionWithId>,
    oldest_tx_id: Option<Nat>,
}

#[test]
fn index_response_with_unknown_fields_decodes() {
    let wire: std::result::Result<WireGetTransactions, GetTransactionsErr> = Ok(WireGetTransactions {
        transactions: vec![
            WireTransactionWithId {
                id: Nat::from(42u64),
                transaction: WireTransaction {
                    kind: "transfer".to_string(),
                    mint: None,
                    burn: None,
                    transfer: Some(WireTransfer {
                        from: account(1),
                        to: account(2),
                        amount: Nat::from(100_000_000u64),
                        fee: Some(Nat::from(10u64)),
                        spender: None,
                        memo: Some(vec![1, 2, 3]),
                        created_at_time: None,
                    }),
                    approve: None,
                    timestamp: 1_700_000_000_000_000_000,
                },
            },
            WireTransactionWithId {
                id: Nat::from(41u64),
                transaction: WireTransaction {
                    kind: "approve".to_string(),
                    mint: None,
                    burn: None,
                    transfer: None,
                    approve: Some(WireApprove {
                        from: account(1),
                        spender: account(3),
                        amount: Nat::from(5u64),
                    }),
                    timestamp: 1_699_999_999_000_000_000,
                },
            },
        ],
        oldest_tx_id: Some(Nat::from(0u64)),
    });

    let bytes = candid::encode_one(wire).unwrap();
    let decoded: GetTransactionsResult = candid::decode_one(&bytes).unwrap();
    let page = decoded.unwrap();

    assert_eq!(page.balance, None);
    assert_eq!(page.transactions.len(), 2);
    assert_eq!(page.transactions[0].id, Nat::from(42u64));
    assert_eq!(
        page.transactions[0].transaction.transfer,
        Some(Transfer {
            from: account(1),
            to: account(2),
            amount: Nat::from(100_000_000u64),
            fee: Some(Nat::from(10u64)),
            spender: None,
            created_at_time: None,
        })
    );
    assert_eq!(page.transactions[1].transaction.kind, "approve");
    assert!(page.transactions[1].transaction.transfer.is_none());
}

#[test]
fn index_error_decodes() {
    let wire: GetTransactionsResult = Err(GetTransactionsErr {
        message: "account not indexed".to_string(),
    });
    let bytes = candid::encode_one(wire).unwrap();
    let decoded: GetTransactionsResult = candid::decode_one(&bytes).unwrap();
    assert_eq!(decoded.unwrap_err().message, "account not indexed");
}

#[test]
fn transfer_rejection_decodes() {
    let wire: TransferResult = Err(TransferError::InsufficientFunds {
        balance: Nat::from(7u64),
    });
    let bytes = candid::encode_one(wire).unwrap();
    let decoded: TransferResult = candid::decode_one(&bytes).unwrap();
    let err = decoded.unwrap_err();
    assert_eq!(err.to_string(), "InsufficientFunds (balance 7)");
    assert_eq!(
        Error::Transfer(err).to_string(),
        "Transfer rejected by ledger: InsufficientFunds (balance 7)"
    );
}

#[test]
fn transfer_error_messages() {
    assert_eq!(TransferError::TooOld.to_string(), "TooOld");
    assert_eq!(
        TransferError::GenericError {
            error_code: Nat::from(3u64),
            message: "frozen".to_string(),
        }
        .to_string(),
        "GenericError (3: frozen)"
    );
}

#[test]
fn transfer_arg_defaults_to_caller_default_subaccount() {
    let recipient = Principal::from_slice(&[9; 29]);
    let arg = TransferArg::new(recipient, 100_000_000u64, Some(Nat::from(10u64)));
    assert_eq!(arg.from_subaccount, None);
    assert_eq!(arg.to, Account::from(recipient));
    assert_eq!(arg.amount, Nat::from(100_000_000u64));
    assert_eq!(arg.memo, None);
    assert_eq!(arg.created_at_time, None);
}

#[test]
fn identity_account_uses_default_subaccount() {
    let identity = WalletIdentity::generate().unwrap();
    let account = identity.account();
    assert_eq!(account.owner, identity.principal());
    assert_eq!(account.subaccount, None);
}

#[tokio::test]
#[ignore = "requires a reachable replica and a funded test identity"]
async fn test_get_balance() -> Result<()> {
    let config = Config::from_env()?;
    let identity = load_identity(&config.pem_path).await?;
    let client = IcrcClient::new(&identity, &config).await?;
    let balance = client.get_balance(&identity.account()).await?;
    assert!(balance > Nat::from(0u64));
    Ok(())
}

#[tokio::test]
#[ignore = "requires a reachable replica and a funded test identity"]
async fn test_get_transactions() -> Result<()> {
    let config = Config::from_env()?;
    let identity = load_identity(&config.pem_path).await?;
    let client = IcrcClient::new(&identity, &config).await?;
    let page = client
        .get_transactions(&identity.account(), config.max_poll_results)
        .await?;
    assert!(page.transactions.len() as u64 <= config.max_poll_results);
    Ok(())
}
