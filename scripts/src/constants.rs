//! Constants used in the deploy scripts

use std::time::Duration;

use alloy::primitives::{address, b256, Address, B256};

// ------------
// | Networks |
// ------------

/// The RPC endpoint of the `mrtr-test` network
pub const MRTR_TEST_RPC_URL: &str = "http://35.238.106.48:8545";

/// The chain ID of the `mrtr-test` network
pub const MRTR_TEST_CHAIN_ID: u64 = 1031;

/// The default JSON-RPC timeout of the `mrtr-test` network
pub const MRTR_TEST_TIMEOUT: Duration = Duration::from_millis(20_000);

/// The RPC endpoint of a local development node
pub const LOCALHOST_RPC_URL: &str = "http://127.0.0.1:8545";

/// The chain ID of a local development node
pub const LOCALHOST_CHAIN_ID: u64 = 31337;

/// The default JSON-RPC timeout of a local development node
pub const LOCALHOST_TIMEOUT: Duration = Duration::from_millis(40_000);

/// The first prefunded account of a local development node
pub const LOCALHOST_DEFAULT_PKEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The number of confirmations to wait for each deployment transaction
pub const DEFAULT_NUM_DEPLOY_CONFIRMATIONS: u64 = 1;

// -------------------------
// | Environment variables |
// -------------------------

/// The environment variable holding the deployer key of the `mrtr-test` network
pub const MRTR_PRIVATE_KEY_ENV_VAR: &str = "MRTR_PRIVATE_KEY";

/// The environment variable holding the upgrader address passed to token initializers
pub const UPGRADER_ENV_VAR: &str = "UPGRADER";

// -------------
// | Contracts |
// -------------

/// The `VCToken` contract name
pub const VCTOKEN_CONTRACT: &str = "VCToken";

/// The `VCToken` initializer
pub const VCTOKEN_INITIALIZER: &str = "__VCToken_init";

/// The `Ampersand` contract name
pub const AMPERSAND_CONTRACT: &str = "Ampersand";

/// The `Ampersand` initializer
pub const AMPERSAND_INITIALIZER: &str = "__Ampersand_init";

/// The token address the standalone `Ampersand` deployment is wired to
pub const AMPERSAND_TOKEN_ADDRESS: Address = address!("2354dd5262B66CC36dEACe1C15a2091823462665");

/// The estates factory contract name
pub const ESTATE_FACTORY_CONTRACT: &str = "Factory";

/// The estates factory initializer
pub const ESTATE_FACTORY_INITIALIZER: &str = "__EstateFactory_init";

/// The multi-token contract name
pub const VCTOKENS_CONTRACT: &str = "VCTokens";

/// The initializer used when a step does not name one
pub const DEFAULT_INITIALIZER: &str = "initialize";

/// The artifact name of the ERC1967 proxy used for UUPS deployments
pub const ERC1967_PROXY_CONTRACT: &str = "ERC1967Proxy";

/// The artifact name of the transparent upgradeable proxy
pub const TRANSPARENT_PROXY_CONTRACT: &str = "TransparentUpgradeableProxy";

/// The artifact name of the upgradeable beacon
pub const BEACON_CONTRACT: &str = "UpgradeableBeacon";

// -------------
// | Artifacts |
// -------------

/// The extension of a compiled artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The extension of a Solidity source file, which names the directory
/// holding its artifacts
pub const SOLIDITY_SOURCE_EXTENSION: &str = "sol";

/// The suffix of the Hardhat debug files living next to each artifact
pub const DEBUG_ARTIFACT_SUFFIX: &str = ".dbg.json";

/// The directory holding the compiler's build info, never an artifact
pub const BUILD_INFO_DIR: &str = "build-info";

/// The prefix of an unlinked library placeholder in creation bytecode
pub const LIBRARY_PLACEHOLDER_PREFIX: &str = "__";

// ------------
// | EIP-1967 |
// ------------

/// The storage slot containing the implementation address in an upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const IMPLEMENTATION_STORAGE_SLOT: B256 =
    b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// The storage slot containing the proxy admin contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: B256 =
    b256!("b53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// The default denomination of fees in the gas report
pub const DEFAULT_GAS_REPORT_TOKEN: &str = "BRCK";
