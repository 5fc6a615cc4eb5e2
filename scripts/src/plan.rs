//! Deployment plans: the ordered list of contracts a run deploys

use std::{
    fmt::{self, Display},
    fs,
    path::Path,
};

use clap::ValueEnum;
use serde::Deserialize;

use crate::{
    constants::{
        AMPERSAND_CONTRACT, AMPERSAND_INITIALIZER, AMPERSAND_TOKEN_ADDRESS,
        ESTATE_FACTORY_CONTRACT, ESTATE_FACTORY_INITIALIZER, UPGRADER_ENV_VAR, VCTOKENS_CONTRACT,
        VCTOKEN_CONTRACT, VCTOKEN_INITIALIZER,
    },
    errors::ScriptError,
    types::ProxyKind,
};

/// The built-in deployment plans
#[derive(ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Plan {
    /// `VCToken`, then `Ampersand` wired to it
    #[default]
    Full,
    /// `VCToken` alone
    Vct,
    /// `Ampersand` wired to the already deployed token
    Amp,
    /// The estates `Factory` behind a beacon
    Estate,
    /// `VCTokens` with its default initializer
    Tokens,
}

impl Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Full => write!(f, "full"),
            Plan::Vct => write!(f, "vct"),
            Plan::Amp => write!(f, "amp"),
            Plan::Estate => write!(f, "estate"),
            Plan::Tokens => write!(f, "tokens"),
        }
    }
}

/// An initializer argument, before it is resolved to a string
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum InitArg {
    /// A value used as-is
    Literal(String),
    /// A value read from an environment variable
    Env {
        /// The variable name
        env: String,
    },
    /// The proxy address of an earlier step in the same plan
    Deployed {
        /// The contract name of the earlier step
        deployed: String,
    },
}

impl InitArg {
    /// Shorthand for a literal argument
    pub fn literal(value: impl Into<String>) -> Self {
        InitArg::Literal(value.into())
    }

    /// Shorthand for an environment argument
    pub fn env(var: impl Into<String>) -> Self {
        InitArg::Env { env: var.into() }
    }

    /// Shorthand for a reference to an earlier deployment
    pub fn deployed(contract: impl Into<String>) -> Self {
        InitArg::Deployed {
            deployed: contract.into(),
        }
    }
}

/// A single contract deployment within a plan
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct DeploymentStep {
    /// The implementation contract name
    pub contract: String,
    /// The proxy pattern to deploy behind
    #[serde(default)]
    pub kind: ProxyKind,
    /// The initializer to call, `initialize` if present when unset
    #[serde(default)]
    pub initializer: Option<String>,
    /// The initializer arguments
    #[serde(default)]
    pub args: Vec<InitArg>,
}

impl DeploymentStep {
    /// A UUPS deployment of `contract`
    pub fn uups(contract: &str) -> Self {
        Self {
            contract: contract.to_string(),
            kind: ProxyKind::Uups,
            initializer: None,
            args: Vec::new(),
        }
    }

    /// Set the initializer and its arguments
    pub fn initializer(mut self, initializer: &str, args: Vec<InitArg>) -> Self {
        self.initializer = Some(initializer.to_string());
        self.args = args;
        self
    }

    /// Deploy behind the given proxy pattern instead
    pub fn kind(mut self, kind: ProxyKind) -> Self {
        self.kind = kind;
        self
    }
}

/// An ordered list of deployments
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeploymentPlan {
    /// The steps, deployed in order
    #[serde(default)]
    pub steps: Vec<DeploymentStep>,
}

impl DeploymentPlan {
    /// Build the given built-in plan
    pub fn builtin(plan: Plan) -> Self {
        let vct = DeploymentStep::uups(VCTOKEN_CONTRACT)
            .initializer(VCTOKEN_INITIALIZER, vec![InitArg::env(UPGRADER_ENV_VAR)]);

        let steps = match plan {
            Plan::Full => vec![
                vct,
                DeploymentStep::uups(AMPERSAND_CONTRACT).initializer(
                    AMPERSAND_INITIALIZER,
                    vec![InitArg::deployed(VCTOKEN_CONTRACT)],
                ),
            ],
            Plan::Vct => vec![vct],
            Plan::Amp => vec![DeploymentStep::uups(AMPERSAND_CONTRACT).initializer(
                AMPERSAND_INITIALIZER,
                vec![InitArg::literal(format!("{AMPERSAND_TOKEN_ADDRESS:#x}"))],
            )],
            // Beacons take no initializer arguments
            Plan::Estate => vec![DeploymentStep::uups(ESTATE_FACTORY_CONTRACT)
                .initializer(ESTATE_FACTORY_INITIALIZER, Vec::new())
                .kind(ProxyKind::Beacon)],
            Plan::Tokens => vec![DeploymentStep::uups(VCTOKENS_CONTRACT)],
        };

        Self { steps }
    }

    /// Read a plan from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::Config(format!("plan file {}: {}", path.display(), e)))?;
        Self::from_json(&contents)
            .map_err(|e| ScriptError::Config(format!("plan file {}: {}", path.display(), e)))
    }

    /// Parse a plan from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The number of steps in the plan
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan deploys nothing
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Replace every environment argument with its value
    pub fn resolve_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ScriptError> {
        for step in self.steps.iter_mut() {
            for arg in step.args.iter_mut() {
                if let InitArg::Env { env } = arg {
                    let value = lookup(env).filter(|v| !v.is_empty()).ok_or_else(|| {
                        ScriptError::Config(format!(
                            "`{}` needs the environment variable {}",
                            step.contract, env
                        ))
                    })?;
                    *arg = InitArg::Literal(value);
                }
            }
        }

        Ok(self)
    }

    /// Check that every deployment reference names an earlier step
    pub fn validate(&self) -> Result<(), ScriptError> {
        for (i, step) in self.steps.iter().enumerate() {
            if step.contract.is_empty() {
                return Err(ScriptError::Config(format!("step {} has no contract name", i)));
            }

            for arg in &step.args {
                if let InitArg::Deployed { deployed } = arg {
                    let earlier = self.steps[..i].iter().any(|s| &s.contract == deployed);
                    if !earlier {
                        return Err(ScriptError::Config(format!(
                            "`{}` references `{}`, which is not deployed before it",
                            step.contract, deployed
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_full_plan_wires_ampersand_to_token() {
        let plan = DeploymentPlan::builtin(Plan::Full);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.steps[0].contract, VCTOKEN_CONTRACT);
        assert_eq!(plan.steps[1].args, vec![InitArg::deployed(VCTOKEN_CONTRACT)]);
        plan.validate().unwrap();
    }

    #[test]
    fn test_builtin_plans_are_valid() {
        for plan in Plan::value_variants() {
            DeploymentPlan::builtin(*plan).validate().unwrap();
        }
    }

    #[test]
    fn test_resolve_env() {
        let upgrader = "0x00000000000000000000000000000000000000aa";
        let env: HashMap<&str, &str> = [(UPGRADER_ENV_VAR, upgrader)].into();
        let plan = DeploymentPlan::builtin(Plan::Vct)
            .resolve_env(|var| env.get(var).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(plan.steps[0].args, vec![InitArg::literal(upgrader)]);
    }

    #[test]
    fn test_missing_env_is_config_error() {
        let err = DeploymentPlan::builtin(Plan::Full).resolve_env(|_| None).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(UPGRADER_ENV_VAR));
    }

    #[test]
    fn test_forward_reference_rejected() {
        let plan = DeploymentPlan {
            steps: vec![
                DeploymentStep::uups("Ampersand")
                    .initializer("__Ampersand_init", vec![InitArg::deployed("VCToken")]),
                DeploymentStep::uups("VCToken"),
            ],
        };

        assert!(plan.validate().unwrap_err().is_config());
    }

    #[test]
    fn test_plan_from_json() {
        let plan = DeploymentPlan::from_json(
            r#"{
                "steps": [
                    { "contract": "VCToken", "initializer": "__VCToken_init", "args": [{ "env": "UPGRADER" }] },
                    { "contract": "Ampersand", "kind": "transparent", "args": [{ "deployed": "VCToken" }, "7"] },
                    { "contract": "Factory", "kind": "beacon" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.steps[0].kind, ProxyKind::Uups);
        assert_eq!(plan.steps[0].args, vec![InitArg::env("UPGRADER")]);
        assert_eq!(plan.steps[1].kind, ProxyKind::Transparent);
        assert_eq!(plan.steps[1].initializer, None);
        assert_eq!(
            plan.steps[1].args,
            vec![InitArg::deployed("VCToken"), InitArg::literal("7")]
        );
        assert_eq!(plan.steps[2].kind, ProxyKind::Beacon);
        plan.validate().unwrap();
    }

    #[test]
    fn test_empty_plan() {
        let plan = DeploymentPlan::from_json("{}").unwrap();
        assert!(plan.is_empty());
        plan.validate().unwrap();
    }
}
