//! Sequential execution of a deployment plan.
//!
//! Steps are deployed strictly one after the other. The first failure ends the
//! run: later steps are never attempted, and there is no retry or cleanup of
//! what was already deployed.

use alloy::primitives::utils::format_ether;
use itertools::Itertools;
use tracing::{error, info};

use crate::{
    deployer::ProxyDeployer,
    errors::ScriptError,
    plan::{DeploymentPlan, DeploymentStep, InitArg},
    types::{DeploymentRecord, ProxyRequest},
};

/// The exit code of a successful run
pub const EXIT_SUCCESS: u8 = 0;

/// The exit code of a failed run
pub const EXIT_FAILURE: u8 = 1;

/// The outcome of running a plan
#[derive(Debug, Default)]
pub struct DeploymentReport {
    /// The confirmed deployments, in plan order
    pub records: Vec<DeploymentRecord>,
    /// The error that stopped the run, if any
    pub failure: Option<ScriptError>,
}

impl DeploymentReport {
    /// Whether every step was deployed
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// The process exit code for this outcome
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }

    /// The record of the latest deployment of `contract`
    pub fn record(&self, contract: &str) -> Option<&DeploymentRecord> {
        self.records.iter().rev().find(|r| r.contract == contract)
    }
}

/// Deploy every step of `plan` in order, stopping at the first failure
pub async fn run_plan<D: ProxyDeployer>(deployer: &D, plan: &DeploymentPlan) -> DeploymentReport {
    let mut report = DeploymentReport::default();

    for (i, step) in plan.steps.iter().enumerate() {
        let request = match resolve_request(&report, step) {
            Ok(request) => request,
            Err(e) => {
                report.failure = Some(e);
                break;
            }
        };

        info!(
            step = i,
            contract = %request.contract,
            kind = %request.kind,
            args = %request.args.iter().join(", "),
            "deploying"
        );

        match deployer.deploy_proxy(&request).await {
            Ok(deployed) => {
                let record = DeploymentRecord::new(request, deployed);
                print_record(&record);
                report.records.push(record);
            }
            Err(e) => {
                error!(step = i, contract = %request.contract, "deployment failed: {}", e);
                report.failure = Some(e);
                break;
            }
        }
    }

    report
}

/// Turn a plan step into a request, substituting earlier deployments
fn resolve_request(
    report: &DeploymentReport,
    step: &DeploymentStep,
) -> Result<ProxyRequest, ScriptError> {
    let args = step
        .args
        .iter()
        .map(|arg| match arg {
            InitArg::Literal(value) => Ok(value.clone()),
            InitArg::Deployed { deployed } => report
                .record(deployed)
                .map(|r| format!("{:#x}", r.address))
                .ok_or_else(|| {
                    ScriptError::Config(format!(
                        "`{}` references `{}`, which has not been deployed",
                        step.contract, deployed
                    ))
                }),
            InitArg::Env { env } => Err(ScriptError::Config(format!(
                "`{}` argument from {} was never resolved",
                step.contract, env
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProxyRequest {
        contract: step.contract.clone(),
        kind: step.kind,
        initializer: step.initializer.clone(),
        args,
    })
}

/// Print a confirmed deployment to stdout
fn print_record(record: &DeploymentRecord) {
    println!("{} address: {:#x}", record.contract, record.address);
    if let Some(admin) = record.admin {
        println!("{} proxy admin address: {:#x}", record.contract, admin);
    }
}

/// Print the gas spent by every transaction of the run, with fees priced in `token`
pub fn print_gas_report(records: &[DeploymentRecord], token: &str) {
    let costs = records.iter().flat_map(|r| r.costs.iter()).collect_vec();
    if costs.is_empty() {
        return;
    }

    println!("\n{:<32} {:>12} {:>24}", "Deployment", "Gas", format!("Fee ({token})"));
    for cost in &costs {
        println!(
            "{:<32} {:>12} {:>24}",
            cost.label,
            cost.gas_used,
            format_ether(cost.fee())
        );
    }

    let total_gas: u64 = costs.iter().map(|c| c.gas_used).sum();
    let total_fee: u128 = costs.iter().map(|c| c.fee()).sum();
    println!("{:<32} {:>12} {:>24}", "Total", total_gas, format_ether(total_fee));
}
