//! Configuration for the wallet demo, read from `WALLET_*` environment variables.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use candid::{Nat, Principal};
use serde::{Deserialize, Serialize};

use crate::identity::LoadPolicy;
use crate::{Error, Result};

/// `ulmlj-vaaaa-aaaak-qtpza-cai`
const DEFAULT_LEDGER_CANISTER_ID: Principal =
    Principal::from_slice(&[0x00, 0x00, 0x00, 0x00, 0x01, 0x50, 0x9b, 0xf2, 0x01, 0x01]);
/// `ucpav-diaaa-aaaak-qtpyq-cai`
const DEFAULT_INDEX_CANISTER_ID: Principal =
    Principal::from_slice(&[0x00, 0x00, 0x00, 0x00, 0x01, 0x50, 0x9b, 0xf1, 0x01, 0x01]);
const DEFAULT_IC_URL: &str = "https://ic0.app";
const DEFAULT_PEM_PATH: &str = "./wallet_identity.pem";
/// `rwd6d-yyjkg-75uj5-owi47-2guae-e6f3u-dja4x-viosl-cb63s-jcvco-jae`
const DEFAULT_RECIPIENT: Principal = Principal::from_slice(&[
    0x09, 0x51, 0xbf, 0xda, 0x27, 0xae, 0xb2, 0x39, 0xfd, 0x1a, 0x80, 0x21, 0x3c, 0x5d, 0xd0,
    0x69, 0x07, 0x2f, 0x54, 0x3a, 0x4b, 0x10, 0x7d, 0xb9, 0x24, 0x55, 0x13, 0x92, 0x02,
]);

const MAINNET_HOSTS: [&str; 2] = ["ic0.app", "icp0.io"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ICRC-1 ledger canister
    pub ledger_id: Principal,
    /// ICRC index canister for the same ledger
    pub index_id: Principal,
    /// Replica or boundary node URL
    pub endpoint: String,
    /// Where the wallet key record lives
    pub pem_path: PathBuf,
    pub poll_interval_ms: u64,
    pub max_poll_results: u64,
    pub recipient: Principal,
    /// Amount in the ledger's smallest unit
    pub transfer_amount: u64,
    /// `None` lets the ledger charge its default fee
    pub transfer_fee: Option<u64>,
    /// Fetch the replica root key before the first call. Never do this against mainnet.
    pub fetch_root_key: bool,
    pub identity_policy: LoadPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_id: DEFAULT_LEDGER_CANISTER_ID,
            index_id: DEFAULT_INDEX_CANISTER_ID,
            endpoint: DEFAULT_IC_URL.to_string(),
            pem_path: PathBuf::from(DEFAULT_PEM_PATH),
            poll_interval_ms: 5000,
            max_poll_results: 1,
            recipient: DEFAULT_RECIPIENT,
            transfer_amount: 100_000_000,
            transfer_fee: Some(10),
            fetch_root_key: !is_mainnet(DEFAULT_IC_URL),
            identity_policy: LoadPolicy::Lenient,
        }
    }
}

impl Config {
    /// Load from the process environment. Call `dotenv::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("WALLET_LEDGER_CANISTER_ID") {
            config.ledger_id = parse_principal("WALLET_LEDGER_CANISTER_ID", &v)?;
        }
        if let Some(v) = get("WALLET_INDEX_CANISTER_ID") {
            config.index_id = parse_principal("WALLET_INDEX_CANISTER_ID", &v)?;
        }
        if let Some(v) = get("WALLET_IC_URL") {
            config.endpoint = v.trim().to_string();
        }
        if let Some(v) = get("WALLET_PEM_PATH") {
            config.pem_path = PathBuf::from(v.trim());
        }
        if let Some(v) = get("WALLET_POLL_INTERVAL_MS") {
            config.poll_interval_ms = parse("WALLET_POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = get("WALLET_MAX_POLL_RESULTS") {
            config.max_poll_results = parse("WALLET_MAX_POLL_RESULTS", &v)?;
        }
        if let Some(v) = get("WALLET_RECIPIENT") {
            config.recipient = parse_principal("WALLET_RECIPIENT", &v)?;
        }
        if let Some(v) = get("WALLET_TRANSFER_AMOUNT") {
            config.transfer_amount = parse("WALLET_TRANSFER_AMOUNT", &v)?;
        }
        if let Some(v) = get("WALLET_TRANSFER_FEE") {
            config.transfer_fee = if v.trim().eq_ignore_ascii_case("none") {
                None
            } else {
                Some(parse("WALLET_TRANSFER_FEE", &v)?)
            };
        }
        config.fetch_root_key = match get("WALLET_FETCH_ROOT_KEY") {
            Some(v) => parse("WALLET_FETCH_ROOT_KEY", &v)?,
            None => !is_mainnet(&config.endpoint),
        };
        if let Some(v) = get("WALLET_STRICT_IDENTITY") {
            config.identity_policy = if parse("WALLET_STRICT_IDENTITY", &v)? {
                LoadPolicy::Strict
            } else {
                LoadPolicy::Lenient
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.max_poll_results == 0 {
            return Err(Error::Config(
                "max poll results must be greater than zero".to_string(),
            ));
        }
        if self.fetch_root_key && is_mainnet(&self.endpoint) {
            tracing::warn!(
                endpoint = %self.endpoint,
                "Fetching the root key from a mainnet endpoint; this is only safe for testing"
            );
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn transfer_fee(&self) -> Option<Nat> {
        self.transfer_fee.map(Nat::from)
    }
}

fn is_mainnet(endpoint: &str) -> bool {
    let host = endpoint
        .split("://")
        .last()
        .unwrap_or(endpoint)
        .split(|c: char| c == '/' || c == ':')
        .next()
        .unwrap_or_default();
    MAINNET_HOSTS
        .iter()
        .any(|mainnet| host == *mainnet || host.ends_with(&format!(".{mainnet}")))
}

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("invalid {}={:?}: {}", key, value, e)))
}

fn parse_principal(key: &str, value: &str) -> Result<Principal> {
    Principal::from_text(value.trim())
        .map_err(|e| Error::Config(format!("invalid {}={:?}: {}", key, value, e)))
}
