//! Type definitions used throughout the scripts

use std::fmt::{self, Display};

use alloy::primitives::Address;
use serde::Deserialize;

/// The upgradeability pattern a contract is deployed behind
#[derive(Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProxyKind {
    /// An `ERC1967Proxy` whose upgrade logic lives in the implementation
    #[default]
    Uups,
    /// A `TransparentUpgradeableProxy`, upgraded through its `ProxyAdmin`
    Transparent,
    /// An `UpgradeableBeacon` pointing at the implementation
    Beacon,
}

impl Display for ProxyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyKind::Uups => write!(f, "uups"),
            ProxyKind::Transparent => write!(f, "transparent"),
            ProxyKind::Beacon => write!(f, "beacon"),
        }
    }
}

/// A fully resolved request for the proxy deployment collaborator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyRequest {
    /// The name of the implementation contract
    pub contract: String,
    /// The proxy pattern to deploy
    pub kind: ProxyKind,
    /// The initializer to call through the proxy, if not the default
    pub initializer: Option<String>,
    /// The initializer arguments, in their string form
    pub args: Vec<String>,
}

/// The gas spent by a single deployment transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxCost {
    /// What the transaction deployed
    pub label: String,
    /// The gas used by the transaction
    pub gas_used: u64,
    /// The effective gas price paid, in wei
    pub effective_gas_price: u128,
}

impl TxCost {
    /// The fee paid for the transaction, in wei
    pub fn fee(&self) -> u128 {
        (self.gas_used as u128).saturating_mul(self.effective_gas_price)
    }
}

/// The on-chain result of a confirmed proxy deployment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployedProxy {
    /// The address users interact with: the proxy, or the beacon
    pub address: Address,
    /// The implementation contract behind it
    pub implementation: Address,
    /// The `ProxyAdmin`, for transparent proxies
    pub admin: Option<Address>,
    /// The transactions sent for this deployment
    pub costs: Vec<TxCost>,
}

/// One confirmed deployment, kept for the duration of the run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeploymentRecord {
    /// The implementation contract name
    pub contract: String,
    /// The proxy pattern deployed
    pub kind: ProxyKind,
    /// The resolved initializer arguments
    pub args: Vec<String>,
    /// The proxy (or beacon) address
    pub address: Address,
    /// The implementation address
    pub implementation: Address,
    /// The `ProxyAdmin` address, for transparent proxies
    pub admin: Option<Address>,
    /// The transactions sent for this deployment
    pub costs: Vec<TxCost>,
}

impl DeploymentRecord {
    /// Pair a request with the collaborator's confirmation
    pub fn new(request: ProxyRequest, deployed: DeployedProxy) -> Self {
        Self {
            contract: request.contract,
            kind: request.kind,
            args: request.args,
            address: deployed.address,
            implementation: deployed.implementation,
            admin: deployed.admin,
            costs: deployed.costs,
        }
    }
}
