use std::sync::Mutex;

use alloy::primitives::Address;
use eyre::Result;
use scripts::{
    deployer::ProxyDeployer,
    errors::ScriptError,
    orchestrator::{run_plan, EXIT_FAILURE, EXIT_SUCCESS},
    plan::{DeploymentPlan, DeploymentStep, InitArg},
    types::{DeployedProxy, ProxyKind, ProxyRequest, TxCost},
};

/// A deployer that hands out sequential addresses, optionally failing on
/// the n-th call
#[derive(Default)]
struct MockDeployer {
    /// The zero-based call that fails, if any
    fail_at: Option<usize>,
    /// Every request received, in order
    requests: Mutex<Vec<ProxyRequest>>,
}

impl MockDeployer {
    fn failing_at(i: usize) -> Self {
        Self {
            fail_at: Some(i),
            ..Default::default()
        }
    }

    fn requests(&self) -> Vec<ProxyRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ProxyDeployer for MockDeployer {
    async fn deploy_proxy(&self, request: &ProxyRequest) -> Result<DeployedProxy, ScriptError> {
        let mut requests = self.requests.lock().unwrap();
        let i = requests.len();
        requests.push(request.clone());

        if self.fail_at == Some(i) {
            return Err(ScriptError::ContractDeployment(format!(
                "{} deployment reverted",
                request.contract
            )));
        }

        let n = (i as u8 + 1) * 2;
        Ok(DeployedProxy {
            address: Address::with_last_byte(n),
            implementation: Address::with_last_byte(n - 1),
            admin: None,
            costs: vec![TxCost {
                label: request.contract.clone(),
                gas_used: 21_000,
                effective_gas_price: 1_000_000_000,
            }],
        })
    }
}

fn token_plan() -> DeploymentPlan {
    DeploymentPlan {
        steps: vec![
            DeploymentStep::uups("VCToken").initializer(
                "__VCToken_init",
                vec![InitArg::literal("0x00000000000000000000000000000000000000aa")],
            ),
            DeploymentStep::uups("Ampersand")
                .initializer("__Ampersand_init", vec![InitArg::deployed("VCToken")]),
            DeploymentStep::uups("Factory").kind(ProxyKind::Beacon),
        ],
    }
}

#[tokio::test]
async fn test_one_record_per_step_in_order() -> Result<()> {
    let deployer = MockDeployer::default();
    let plan = token_plan();

    let report = run_plan(&deployer, &plan).await;

    assert!(report.is_success());
    assert_eq!(report.exit_code(), EXIT_SUCCESS);
    let contracts: Vec<_> = report.records.iter().map(|r| r.contract.as_str()).collect();
    assert_eq!(contracts, vec!["VCToken", "Ampersand", "Factory"]);
    assert_eq!(report.records[2].kind, ProxyKind::Beacon);
    assert_eq!(deployer.requests().len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_failure_stops_the_run() -> Result<()> {
    let deployer = MockDeployer::failing_at(1);
    let plan = token_plan();

    let report = run_plan(&deployer, &plan).await;

    assert!(!report.is_success());
    assert_eq!(report.exit_code(), EXIT_FAILURE);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].contract, "VCToken");
    assert!(matches!(report.failure, Some(ScriptError::ContractDeployment(_))));

    // Nothing after the failed step is attempted
    assert_eq!(deployer.requests().len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_first_step_failure() -> Result<()> {
    let deployer = MockDeployer::failing_at(0);

    let report = run_plan(&deployer, &token_plan()).await;

    assert_eq!(report.exit_code(), EXIT_FAILURE);
    assert!(report.records.is_empty());
    assert_eq!(deployer.requests().len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_runs_are_deterministic() -> Result<()> {
    let plan = token_plan();

    let first = run_plan(&MockDeployer::default(), &plan).await;
    let second = run_plan(&MockDeployer::default(), &plan).await;

    let summarize = |records: &[scripts::types::DeploymentRecord]| {
        records
            .iter()
            .map(|r| (r.contract.clone(), r.args.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(summarize(&first.records), summarize(&second.records));

    Ok(())
}

#[tokio::test]
async fn test_empty_plan() -> Result<()> {
    let deployer = MockDeployer::default();

    let report = run_plan(&deployer, &DeploymentPlan::default()).await;

    assert_eq!(report.exit_code(), EXIT_SUCCESS);
    assert!(report.records.is_empty());
    assert!(deployer.requests().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_earlier_deployment_is_passed_on() -> Result<()> {
    let deployer = MockDeployer::default();

    let report = run_plan(&deployer, &token_plan()).await;

    let token = report.record("VCToken").unwrap();
    let ampersand = report.record("Ampersand").unwrap();
    assert_eq!(ampersand.args, vec![format!("{:#x}", token.address)]);
    assert_eq!(deployer.requests()[1].args, ampersand.args);

    Ok(())
}

#[tokio::test]
async fn test_unresolved_env_argument_fails_before_deploying() -> Result<()> {
    let deployer = MockDeployer::default();
    let plan = DeploymentPlan {
        steps: vec![DeploymentStep::uups("VCToken")
            .initializer("__VCToken_init", vec![InitArg::env("UPGRADER")])],
    };

    let report = run_plan(&deployer, &plan).await;

    assert_eq!(report.exit_code(), EXIT_FAILURE);
    assert!(report.failure.as_ref().is_some_and(ScriptError::is_config));
    assert!(deployer.requests().is_empty());

    Ok(())
}
