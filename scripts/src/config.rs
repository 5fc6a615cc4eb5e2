//! Resolution of the network profile a run deploys to

use std::{str::FromStr, time::Duration};

use alloy::{
    primitives::Address, signers::local::PrivateKeySigner, transports::http::reqwest::Url,
};

use crate::{
    cli::{Cli, Network},
    constants::{
        LOCALHOST_CHAIN_ID, LOCALHOST_DEFAULT_PKEY, LOCALHOST_RPC_URL, LOCALHOST_TIMEOUT,
        MRTR_PRIVATE_KEY_ENV_VAR, MRTR_TEST_CHAIN_ID, MRTR_TEST_RPC_URL, MRTR_TEST_TIMEOUT,
    },
    errors::ScriptError,
};

/// The connection parameters of a target network
#[derive(Clone)]
pub struct NetworkProfile {
    /// The profile name
    pub name: Network,
    /// The JSON-RPC endpoint
    pub rpc_url: Url,
    /// The chain ID the endpoint must report
    pub chain_id: u64,
    /// The signers, the first of which deploys and owns the contracts
    pub signers: Vec<PrivateKeySigner>,
    /// The bound on each JSON-RPC round trip and receipt wait
    pub timeout: Duration,
    /// The confirmations awaited on each deployment
    pub confirmations: u64,
}

impl NetworkProfile {
    /// Resolve the profile selected by the CLI, applying its overrides
    pub fn resolve(cli: &Cli) -> Result<Self, ScriptError> {
        let (default_url, default_chain_id, default_timeout) = match cli.network {
            Network::MrtrTest => (MRTR_TEST_RPC_URL, MRTR_TEST_CHAIN_ID, MRTR_TEST_TIMEOUT),
            Network::Localhost => (LOCALHOST_RPC_URL, LOCALHOST_CHAIN_ID, LOCALHOST_TIMEOUT),
        };

        let raw_url = cli.rpc_url.as_deref().unwrap_or(default_url);
        let rpc_url = Url::parse(raw_url)
            .map_err(|e| ScriptError::Config(format!("invalid RPC URL `{}`: {}", raw_url, e)))?;

        let timeout = match cli.timeout_ms {
            Some(0) => return Err(ScriptError::Config("timeout must be positive".to_string())),
            Some(ms) => Duration::from_millis(ms),
            None => default_timeout,
        };

        let signers = parse_signers(&collect_keys(cli))?;

        Ok(Self {
            name: cli.network,
            rpc_url,
            chain_id: cli.chain_id.unwrap_or(default_chain_id),
            signers,
            timeout,
            confirmations: cli.confirmations,
        })
    }

    /// The signer that sends every deployment transaction
    pub fn deployer(&self) -> &PrivateKeySigner {
        // `resolve` guarantees at least one signer
        &self.signers[0]
    }

    /// The addresses of all configured signers
    pub fn addresses(&self) -> Vec<Address> {
        self.signers.iter().map(PrivateKeySigner::address).collect()
    }
}

/// Gather the raw keys in priority order, falling back to the dev-node key
/// on a local network
fn collect_keys(cli: &Cli) -> Vec<String> {
    let mut keys: Vec<String> = cli
        .private_keys
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    if let Some(key) = cli.mrtr_private_key.as_deref().map(str::trim) {
        if !key.is_empty() {
            keys.push(key.to_string());
        }
    }

    if keys.is_empty() && cli.network == Network::Localhost {
        keys.push(LOCALHOST_DEFAULT_PKEY.to_string());
    }

    keys
}

/// Parse hex private keys, with or without their `0x` prefix
fn parse_signers(keys: &[String]) -> Result<Vec<PrivateKeySigner>, ScriptError> {
    if keys.is_empty() {
        return Err(ScriptError::Config(format!(
            "no signer configured, set PRIVATE_KEYS or {}",
            MRTR_PRIVATE_KEY_ENV_VAR
        )));
    }

    keys.iter()
        .enumerate()
        .map(|(i, key)| {
            let key = if key.starts_with("0x") {
                key.clone()
            } else {
                format!("0x{key}")
            };
            // Never echo the key itself
            PrivateKeySigner::from_str(&key)
                .map_err(|e| ScriptError::Config(format!("invalid private key #{}: {}", i, e)))
        })
        .collect()
}
