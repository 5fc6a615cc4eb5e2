//! Definitions of CLI arguments for the deploy script.
//!
//! Every argument can be supplied through the environment (or a `.env` file),
//! so the script runs without arguments once a network profile is configured.

use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use clap::{builder::FalseyValueParser, Parser, ValueEnum};

use crate::{
    constants::{DEFAULT_GAS_REPORT_TOKEN, DEFAULT_NUM_DEPLOY_CONFIRMATIONS},
    plan::Plan,
};

/// Deploy the upgradeable token contracts behind their proxies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The network profile to deploy to
    #[arg(short, long, env = "NETWORK", default_value_t = Network::MrtrTest)]
    pub network: Network,

    /// Network RPC URL, overriding the profile's endpoint
    #[arg(short, long, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    /// Chain ID, overriding the profile's chain ID
    #[arg(long, env = "CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Private keys of the signers, comma separated. The first one deploys
    #[arg(long = "pkeys", env = "PRIVATE_KEYS", value_delimiter = ',', hide_env_values = true)]
    pub private_keys: Vec<String>,

    /// Private key of the `mrtr-test` deployer, with or without `0x`
    #[arg(long, env = "MRTR_PRIVATE_KEY", hide_env_values = true)]
    pub mrtr_private_key: Option<String>,

    /// JSON-RPC timeout in milliseconds, overriding the profile's timeout
    #[arg(long, env = "TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// The number of confirmations to wait for on each deployment
    #[arg(long, env = "CONFIRMATIONS", default_value_t = DEFAULT_NUM_DEPLOY_CONFIRMATIONS)]
    pub confirmations: u64,

    /// The built-in deployment plan to run
    #[arg(short, long, env = "DEPLOY_PLAN", default_value_t = Plan::Full)]
    pub plan: Plan,

    /// A JSON deployment plan, run instead of the built-in plan
    #[arg(long, env = "PLAN_FILE")]
    pub plan_file: Option<PathBuf>,

    /// The directory holding the compiled contract artifacts
    #[arg(short, long, env = "ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// Print the gas spent by each deployment transaction. Any value other
    /// than a false literal (`0`, `false`, `no`, `off`...) enables it
    #[arg(long, env = "REPORT_GAS", value_parser = FalseyValueParser::new())]
    pub report_gas: bool,

    /// The token the gas report prices fees in
    #[arg(long, env = "GAS_REPORT_TOKEN", default_value = DEFAULT_GAS_REPORT_TOKEN)]
    pub gas_token: String,
}

/// The named network profiles
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
pub enum Network {
    /// The `mrtr` test chain
    MrtrTest,
    /// A local development node
    Localhost,
}

impl Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::MrtrTest => write!(f, "mrtr-test"),
            Network::Localhost => write!(f, "localhost"),
        }
    }
}


#[cfg(test)]
mod tests {
    use std::env;

    use super::{test_helpers::parse_with_env, *};

    /// Parse `REPORT_GAS` as set to `value`, through a variable only this test uses
    fn report_gas(var: &'static str, value: &str) -> bool {
        env::set_var(var, value);
        parse_with_env(&[], &[("report_gas", var)]).report_gas
    }

    #[test]
    fn test_report_gas_accepts_truthy_values() {
        assert!(report_gas("VCT_DEPLOY_TEST_REPORT_GAS_ONE", "1"));
        assert!(report_gas("VCT_DEPLOY_TEST_REPORT_GAS_YES", "yes"));
        assert!(report_gas("VCT_DEPLOY_TEST_REPORT_GAS_TRUE", "true"));
    }

    #[test]
    fn test_report_gas_accepts_falsey_values() {
        assert!(!report_gas("VCT_DEPLOY_TEST_REPORT_GAS_ZERO", "0"));
        assert!(!report_gas("VCT_DEPLOY_TEST_REPORT_GAS_FALSE", "false"));
        assert!(!parse_with_env(&[], &[]).report_gas);
        assert!(parse_with_env(&["--report-gas"], &[]).report_gas);
    }

    #[test]
    fn test_defaults() {
        let cli = parse_with_env(&[], &[]);
        assert_eq!(cli.network, Network::MrtrTest);
        assert_eq!(cli.plan, Plan::Full);
        assert_eq!(cli.confirmations, DEFAULT_NUM_DEPLOY_CONFIRMATIONS);
        assert_eq!(cli.gas_token, DEFAULT_GAS_REPORT_TOKEN);
    }
}
