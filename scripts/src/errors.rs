//! Definitions of errors that can occur during a deployment run

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// Missing or invalid configuration (network profile, keys, plan)
    Config(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// No compiled artifact matches the requested contract name
    ArtifactNotFound(String),
    /// Error reading or parsing a compiled contract artifact
    ArtifactParsing(String),
    /// Error constructing calldata for a contract method
    CalldataConstruction(String),
    /// Error deploying a contract
    ContractDeployment(String),
    /// Error calling or reading from a deployed contract
    ContractInteraction(String),
}

impl ScriptError {
    /// Whether this error was raised while resolving configuration,
    /// i.e. before any transaction could have been sent
    pub fn is_config(&self) -> bool {
        matches!(self, ScriptError::Config(_))
    }
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::Config(s) => write!(f, "invalid configuration: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::ArtifactNotFound(s) => write!(f, "artifact not found: {}", s),
            ScriptError::ArtifactParsing(s) => write!(f, "error parsing artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
        }
    }
}

impl Error for ScriptError {}
