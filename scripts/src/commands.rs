//! Implementation of the deploy script

use std::env;

use tracing::{debug, info};

use crate::{
    artifacts::ArtifactStore,
    cli::Cli,
    config::NetworkProfile,
    deployer::{check_plan, ChainDeployer},
    errors::ScriptError,
    orchestrator::{print_gas_report, run_plan, DeploymentReport},
    plan::DeploymentPlan,
    utils::setup_client,
};

/// Resolve the plan selected by the CLI, with environment arguments filled in
pub fn load_plan(cli: &Cli) -> Result<DeploymentPlan, ScriptError> {
    let plan = match &cli.plan_file {
        Some(path) => DeploymentPlan::from_file(path)?,
        None => DeploymentPlan::builtin(cli.plan),
    };

    let plan = plan.resolve_env(|var| env::var(var).ok())?;
    plan.validate()?;
    Ok(plan)
}

/// Run a deployment as configured by the CLI.
///
/// Configuration, plan and artifact errors are returned before anything is
/// sent to the network, as are initializer arguments that fail to encode
/// (except those referencing an earlier deployment). Once deployment starts,
/// the outcome is carried in the returned report.
pub async fn deploy(cli: &Cli) -> Result<DeploymentReport, ScriptError> {
    let profile = NetworkProfile::resolve(cli)?;
    let plan = load_plan(cli)?;
    let artifacts = ArtifactStore::open(cli.artifacts.clone())?;
    debug!(
        artifacts = %artifacts.root().display(),
        contracts = artifacts.len(),
        "indexed compiled artifacts"
    );
    check_plan(&artifacts, &plan)?;

    let client = setup_client(&profile).await?;

    let addresses = profile.addresses();
    println!("Admin Account: {:#x}", addresses[0]);
    for (i, address) in addresses.iter().enumerate().skip(1) {
        debug!(signer = i, address = %address, "additional signer");
    }

    info!(
        network = %profile.name,
        chain_id = profile.chain_id,
        steps = plan.len(),
        "starting deployment"
    );

    let deployer = ChainDeployer::new(client, artifacts, &profile);
    let report = run_plan(&deployer, &plan).await;

    if cli.report_gas {
        print_gas_report(&report.records, &cli.gas_token);
    }

    Ok(report)
}
