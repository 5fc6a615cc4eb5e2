use std::process::ExitCode;

use clap::{error::ErrorKind, Parser};
use scripts::{
    cli::Cli,
    commands::deploy,
    orchestrator::{DeploymentReport, EXIT_FAILURE},
};

#[tokio::main]
async fn main() -> ExitCode {
    // A missing `.env` is fine, the environment may already be set
    dotenvy::dotenv().ok();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
            _ => {
                let _ = e.print();
                return ExitCode::from(EXIT_FAILURE);
            }
        },
    };

    tracing_subscriber::fmt()
        .pretty()
        .with_writer(std::io::stderr)
        .init();

    let report = match deploy(&cli).await {
        Ok(report) => report,
        Err(e) => DeploymentReport {
            records: Vec::new(),
            failure: Some(e),
        },
    };

    match &report.failure {
        None => println!("\nSuccessful Deployment :)"),
        Some(e) => {
            println!("\nFailed Deployment :(");
            eprintln!("{}", e);
        }
    }

    ExitCode::from(report.exit_code())
}
