//! The proxy deployment collaborator and its on-chain implementation

use std::time::Duration;

use alloy::{
    network::TransactionBuilder,
    primitives::{Address, Bytes},
    providers::{DynProvider, Provider},
    rpc::types::{TransactionReceipt, TransactionRequest},
    sol_types::{SolCall, SolValue},
};
use tracing::{info, warn};

use crate::{
    artifacts::{ArtifactStore, ContractTemplate},
    config::NetworkProfile,
    constants::{
        BEACON_CONTRACT, ERC1967_PROXY_CONTRACT, IMPLEMENTATION_STORAGE_SLOT,
        PROXY_ADMIN_STORAGE_SLOT, TRANSPARENT_PROXY_CONTRACT,
    },
    errors::ScriptError,
    plan::{DeploymentPlan, InitArg},
    solidity::implementationCall,
    types::{DeployedProxy, ProxyKind, ProxyRequest, TxCost},
    utils::{initializer_calldata, proxy_constructor_args, read_slot_address, supports_uups},
};

/// Puts an implementation contract on chain behind an upgradeable proxy
#[allow(async_fn_in_trait)]
pub trait ProxyDeployer {
    /// Deploy `request.contract` behind a `request.kind` proxy, returning once
    /// every transaction involved is confirmed
    async fn deploy_proxy(&self, request: &ProxyRequest) -> Result<DeployedProxy, ScriptError>;
}

/// The artifact name of the contract fronting an implementation
pub fn proxy_contract(kind: ProxyKind) -> &'static str {
    match kind {
        ProxyKind::Uups => ERC1967_PROXY_CONTRACT,
        ProxyKind::Transparent => TRANSPARENT_PROXY_CONTRACT,
        ProxyKind::Beacon => BEACON_CONTRACT,
    }
}

/// Check every step of `plan` against the compiled artifacts.
///
/// Templates are resolved and the UUPS entrypoint checked for every step.
/// Initializer calldata is encoded for every step whose arguments are all
/// known up front, i.e. those not referencing an earlier deployment.
pub fn check_plan(artifacts: &ArtifactStore, plan: &DeploymentPlan) -> Result<(), ScriptError> {
    for step in &plan.steps {
        let (template, _) = load_templates(artifacts, &step.contract, step.kind)?;

        let literals = step
            .args
            .iter()
            .map(|arg| match arg {
                InitArg::Literal(value) => Some(value.clone()),
                InitArg::Env { .. } | InitArg::Deployed { .. } => None,
            })
            .collect::<Option<Vec<_>>>();

        if let Some(args) = literals {
            let request = ProxyRequest {
                contract: step.contract.clone(),
                kind: step.kind,
                initializer: step.initializer.clone(),
                args,
            };
            proxy_init_data(&template, &request)?;
        }
    }

    Ok(())
}

/// Resolve the implementation and proxy templates of a deployment
fn load_templates(
    artifacts: &ArtifactStore,
    contract: &str,
    kind: ProxyKind,
) -> Result<(ContractTemplate, ContractTemplate), ScriptError> {
    let template = artifacts.template(contract)?;
    let proxy_template = artifacts.template(proxy_contract(kind))?;

    if kind == ProxyKind::Uups && !supports_uups(&template.abi) {
        return Err(ScriptError::ContractDeployment(format!(
            "`{}` is not UUPS upgradeable, it has no `upgradeToAndCall`",
            template.name
        )));
    }

    Ok((template, proxy_template))
}

/// The calldata the proxy forwards to the implementation on construction
fn proxy_init_data(template: &ContractTemplate, request: &ProxyRequest) -> Result<Bytes, ScriptError> {
    match request.kind {
        ProxyKind::Beacon => {
            if !request.args.is_empty() {
                warn!(
                    contract = %template.name,
                    "beacons are not initialized, ignoring {} argument(s)",
                    request.args.len()
                );
            }
            Ok(Bytes::new())
        }
        ProxyKind::Uups | ProxyKind::Transparent => {
            initializer_calldata(&template.abi, request.initializer.as_deref(), &request.args)
        }
    }
}

/// Check a deployment receipt, returning the created contract and the cost
fn deployment_outcome(
    label: &str,
    receipt: &TransactionReceipt,
) -> Result<(Address, TxCost), ScriptError> {
    if !receipt.status() {
        return Err(ScriptError::ContractDeployment(format!(
            "{} deployment reverted in {:#x}",
            label, receipt.transaction_hash
        )));
    }

    let address = receipt.contract_address.ok_or_else(|| {
        ScriptError::ContractDeployment(format!(
            "{} receipt {:#x} has no contract address",
            label, receipt.transaction_hash
        ))
    })?;

    let cost = TxCost {
        label: label.to_string(),
        gas_used: receipt.gas_used,
        effective_gas_price: receipt.effective_gas_price,
    };

    Ok((address, cost))
}

/// Deploys through a JSON-RPC endpoint, reading contracts from compiled artifacts
pub struct ChainDeployer {
    /// The client, with the deployer's signer attached
    provider: DynProvider,
    /// The compiled contracts
    artifacts: ArtifactStore,
    /// The owner of transparent proxies and beacons
    owner: Address,
    /// The confirmations to await on each transaction
    confirmations: u64,
    /// The bound on each receipt wait
    timeout: Duration,
}

impl ChainDeployer {
    /// Create a deployer sending from the profile's first signer
    pub fn new(provider: DynProvider, artifacts: ArtifactStore, profile: &NetworkProfile) -> Self {
        Self {
            provider,
            artifacts,
            owner: profile.deployer().address(),
            confirmations: profile.confirmations.max(1),
            timeout: profile.timeout,
        }
    }

    /// Send a contract creation transaction and wait for its confirmation
    async fn deploy_code(&self, label: &str, code: Vec<u8>) -> Result<(Address, TxCost), ScriptError> {
        let tx = TransactionRequest::default().with_deploy_code(code);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", label, e)))?;
        info!(contract = label, tx = %pending.tx_hash(), "sent deployment transaction");

        let receipt = pending
            .with_required_confirmations(self.confirmations)
            .with_timeout(Some(self.timeout))
            .get_receipt()
            .await
            .map_err(|e| ScriptError::ContractDeployment(format!("{}: {}", label, e)))?;

        deployment_outcome(label, &receipt)
    }

    /// Ask a beacon which implementation it points at
    async fn beacon_implementation(&self, beacon: Address) -> Result<Address, ScriptError> {
        let call = TransactionRequest::default()
            .with_to(beacon)
            .with_input(implementationCall {}.abi_encode());

        let ret = self
            .provider
            .call(call)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

        Address::abi_decode(&ret).map_err(|e| ScriptError::ContractInteraction(e.to_string()))
    }

    /// Check that the contract fronting `implementation` actually points at it
    async fn verify_implementation(
        &self,
        kind: ProxyKind,
        address: Address,
        implementation: Address,
    ) -> Result<(), ScriptError> {
        let stored = match kind {
            ProxyKind::Beacon => self.beacon_implementation(address).await?,
            ProxyKind::Uups | ProxyKind::Transparent => {
                read_slot_address(&self.provider, address, IMPLEMENTATION_STORAGE_SLOT).await?
            }
        };

        if stored != implementation {
            return Err(ScriptError::ContractInteraction(format!(
                "{:#x} points at {:#x}, expected {:#x}",
                address, stored, implementation
            )));
        }

        Ok(())
    }
}

impl ProxyDeployer for ChainDeployer {
    async fn deploy_proxy(&self, request: &ProxyRequest) -> Result<DeployedProxy, ScriptError> {
        // Resolve and encode everything before the first transaction
        let (template, proxy_template) =
            load_templates(&self.artifacts, &request.contract, request.kind)?;
        let init_data = proxy_init_data(&template, request)?;

        let (implementation, implementation_cost) = self
            .deploy_code(&template.name, template.bytecode.to_vec())
            .await?;
        info!(contract = %template.name, implementation = %implementation, "implementation deployed");

        let mut code = proxy_template.bytecode.to_vec();
        code.extend(proxy_constructor_args(
            request.kind,
            implementation,
            self.owner,
            init_data,
        ));
        let (address, proxy_cost) = self.deploy_code(&proxy_template.name, code).await?;

        self.verify_implementation(request.kind, address, implementation)
            .await?;

        let admin = match request.kind {
            ProxyKind::Transparent => {
                // The proxy creates its own `ProxyAdmin`, recorded per EIP-1967
                Some(read_slot_address(&self.provider, address, PROXY_ADMIN_STORAGE_SLOT).await?)
            }
            ProxyKind::Uups | ProxyKind::Beacon => None,
        };

        Ok(DeployedProxy {
            address,
            implementation,
            admin,
            costs: vec![implementation_cost, proxy_cost],
        })
    }
}
