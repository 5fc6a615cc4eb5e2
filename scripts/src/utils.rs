//! Utilities for the deploy scripts.

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt, Specifier},
    json_abi::{Function, JsonAbi},
    network::EthereumWallet,
    primitives::{Address, Bytes, B256, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    sol_types::{SolCall, SolValue},
};
use itertools::Itertools;

use crate::{
    config::NetworkProfile, constants::DEFAULT_INITIALIZER, errors::ScriptError,
    solidity::upgradeToAndCallCall, types::ProxyKind,
};

/// Sets up the client for the given network profile, with every configured
/// signer attached and the first one sending transactions.
///
/// Fails if the endpoint reports a different chain ID than the profile.
pub async fn setup_client(profile: &NetworkProfile) -> Result<DynProvider, ScriptError> {
    let mut wallet = EthereumWallet::from(profile.deployer().clone());
    for signer in profile.signers.iter().skip(1) {
        wallet.register_signer(signer.clone());
    }

    let provider = ProviderBuilder::new()
        .wallet(wallet)
        .connect_http(profile.rpc_url.clone());

    let chain_id = tokio::time::timeout(profile.timeout, provider.get_chain_id())
        .await
        .map_err(|_| {
            ScriptError::ClientInitialization(format!(
                "no response from {} within {:?}",
                profile.rpc_url, profile.timeout
            ))
        })?
        .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;

    if chain_id != profile.chain_id {
        return Err(ScriptError::Config(format!(
            "{} reports chain ID {}, the {} profile expects {}",
            profile.rpc_url, chain_id, profile.name, profile.chain_id
        )));
    }

    Ok(DynProvider::new(provider))
}

/// Prepare the calldata of the initializer invoked through the proxy.
///
/// Without an explicit initializer, `initialize` is called if the contract has
/// one, otherwise no call is made.
pub fn initializer_calldata(
    abi: &JsonAbi,
    initializer: Option<&str>,
    args: &[String],
) -> Result<Bytes, ScriptError> {
    let name = match initializer {
        Some(name) => name,
        None if abi.function(DEFAULT_INITIALIZER).is_some() => DEFAULT_INITIALIZER,
        None if args.is_empty() => return Ok(Bytes::new()),
        None => {
            return Err(ScriptError::CalldataConstruction(format!(
                "{} initializer argument(s) given, but the contract has no `{}`",
                args.len(),
                DEFAULT_INITIALIZER
            )))
        }
    };

    let overloads = abi.function(name).ok_or_else(|| {
        ScriptError::CalldataConstruction(format!("no initializer `{}` in the ABI", name))
    })?;

    let function = overloads
        .iter()
        .find(|f| f.inputs.len() == args.len())
        .ok_or_else(|| {
            ScriptError::CalldataConstruction(format!(
                "no `{}` overload takes {} argument(s), candidates: {}",
                name,
                args.len(),
                overloads.iter().map(Function::signature).join(", ")
            ))
        })?;

    encode_call(function, args)
}

/// ABI-encode a call to `function`, coercing each string argument to the
/// Solidity type of its parameter
pub fn encode_call(function: &Function, args: &[String]) -> Result<Bytes, ScriptError> {
    let values = function
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| {
            let ty = param
                .resolve()
                .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?;
            ty.coerce_str(arg).map_err(|e| {
                ScriptError::CalldataConstruction(format!(
                    "argument `{}` of `{}` is not a valid {}: {}",
                    param.name, function.name, param.ty, e
                ))
            })
        })
        .collect::<Result<Vec<DynSolValue>, _>>()?;

    function
        .abi_encode_input(&values)
        .map(Bytes::from)
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}

/// Encode the constructor arguments of the contract fronting an implementation:
///
/// - `ERC1967Proxy(implementation, data)`
/// - `TransparentUpgradeableProxy(implementation, initialOwner, data)`
/// - `UpgradeableBeacon(implementation, initialOwner)`
pub fn proxy_constructor_args(
    kind: ProxyKind,
    implementation: Address,
    owner: Address,
    init_data: Bytes,
) -> Vec<u8> {
    match kind {
        ProxyKind::Uups => (implementation, init_data).abi_encode_params(),
        ProxyKind::Transparent => (implementation, owner, init_data).abi_encode_params(),
        ProxyKind::Beacon => (implementation, owner).abi_encode_params(),
    }
}

/// Whether the implementation carries the UUPS upgrade entrypoint
pub fn supports_uups(abi: &JsonAbi) -> bool {
    abi.functions()
        .any(|f| f.selector().0 == upgradeToAndCallCall::SELECTOR)
}

/// Read an address stored in one of a contract's storage slots
pub async fn read_slot_address(
    provider: &impl Provider,
    contract: Address,
    slot: B256,
) -> Result<Address, ScriptError> {
    let word = provider
        .get_storage_at(contract, U256::from_be_bytes(slot.0))
        .await
        .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;

    Ok(Address::from_word(B256::from(word.to_be_bytes::<32>())))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, hex};

    use super::*;

    /// A token ABI with an overloaded initializer and a UUPS entrypoint
    const TOKEN_ABI: &str = r#"[
        {
            "type": "function",
            "name": "__VCToken_init",
            "inputs": [{ "name": "upgrader", "type": "address", "internalType": "address" }],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "__VCToken_init",
            "inputs": [
                { "name": "upgrader", "type": "address", "internalType": "address" },
                { "name": "supply", "type": "uint256", "internalType": "uint256" }
            ],
            "outputs": [],
            "stateMutability": "nonpayable"
        },
        {
            "type": "function",
            "name": "upgradeToAndCall",
            "inputs": [
                { "name": "newImplementation", "type": "address", "internalType": "address" },
                { "name": "data", "type": "bytes", "internalType": "bytes" }
            ],
            "outputs": [],
            "stateMutability": "payable"
        }
    ]"#;

    /// An ABI with a default initializer and no upgrade entrypoint
    const PLAIN_ABI: &str = r#"[
        {
            "type": "function",
            "name": "initialize",
            "inputs": [],
            "outputs": [],
            "stateMutability": "nonpayable"
        }
    ]"#;

    const UPGRADER: &str = "0x00000000000000000000000000000000000000aa";

    fn abi(json: &str) -> JsonAbi {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_initializer_selected_by_arity() {
        let abi = abi(TOKEN_ABI);

        let one = initializer_calldata(&abi, Some("__VCToken_init"), &[UPGRADER.to_string()])
            .unwrap();
        let two = initializer_calldata(
            &abi,
            Some("__VCToken_init"),
            &[UPGRADER.to_string(), "1000".to_string()],
        )
        .unwrap();

        assert_eq!(one.len(), 4 + 32);
        assert_eq!(two.len(), 4 + 64);
        assert_ne!(one[..4], two[..4]);
        assert_eq!(one[4 + 12..], hex::decode(&UPGRADER[2..]).unwrap()[..]);
    }

    #[test]
    fn test_initializer_argument_mismatch() {
        let abi = abi(TOKEN_ABI);

        let wrong_arity = initializer_calldata(&abi, Some("__VCToken_init"), &[]);
        assert!(matches!(wrong_arity, Err(ScriptError::CalldataConstruction(_))));

        let wrong_type =
            initializer_calldata(&abi, Some("__VCToken_init"), &["not-an-address".to_string()]);
        assert!(matches!(wrong_type, Err(ScriptError::CalldataConstruction(_))));

        let unknown = initializer_calldata(&abi, Some("__Ampersand_init"), &[]);
        assert!(matches!(unknown, Err(ScriptError::CalldataConstruction(_))));
    }

    #[test]
    fn test_default_initializer() {
        let data = initializer_calldata(&abi(PLAIN_ABI), None, &[]).unwrap();
        assert_eq!(data.len(), 4);

        // No `initialize` and no arguments: nothing to call
        let data = initializer_calldata(&abi(TOKEN_ABI), None, &[]).unwrap();
        assert!(data.is_empty());

        let err = initializer_calldata(&abi(TOKEN_ABI), None, &[UPGRADER.to_string()]);
        assert!(matches!(err, Err(ScriptError::CalldataConstruction(_))));
    }

    #[test]
    fn test_supports_uups() {
        assert!(supports_uups(&abi(TOKEN_ABI)));
        assert!(!supports_uups(&abi(PLAIN_ABI)));
    }

    #[test]
    fn test_proxy_constructor_args() {
        let implementation = address!("00000000000000000000000000000000000000a1");
        let owner = address!("00000000000000000000000000000000000000b2");
        let data = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);

        // address, offset, length, one padded word of data
        let uups = proxy_constructor_args(ProxyKind::Uups, implementation, owner, data.clone());
        assert_eq!(uups.len(), 4 * 32);
        assert_eq!(uups[12..32], implementation[..]);

        let transparent =
            proxy_constructor_args(ProxyKind::Transparent, implementation, owner, data.clone());
        assert_eq!(transparent.len(), 5 * 32);
        assert_eq!(transparent[32 + 12..64], owner[..]);

        let beacon = proxy_constructor_args(ProxyKind::Beacon, implementation, owner, data);
        assert_eq!(beacon.len(), 2 * 32);
    }
}
