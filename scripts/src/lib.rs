//! Scripts for deploying the upgradeable token contracts behind their proxies.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod constants;
pub mod deployer;
pub mod errors;
pub mod orchestrator;
pub mod plan;
mod solidity;
pub mod types;
pub mod utils;
