//! Resolution of compiled contract artifacts by contract name.
//!
//! The contracts themselves are compiled by an external toolchain. Both the
//! Hardhat layout (`artifacts/contracts/Foo.sol/Foo.json`, hex `bytecode`) and
//! the Foundry layout (`out/Foo.sol/Foo.json`, `bytecode.object`) are
//! understood.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::{hex, json_abi::JsonAbi, primitives::Bytes};
use serde::Deserialize;

use crate::{
    constants::{
        ARTIFACT_EXTENSION, BUILD_INFO_DIR, DEBUG_ARTIFACT_SUFFIX, LIBRARY_PLACEHOLDER_PREFIX,
        SOLIDITY_SOURCE_EXTENSION,
    },
    errors::ScriptError,
};

/// A deployable contract: its ABI and creation bytecode
#[derive(Clone, Debug)]
pub struct ContractTemplate {
    /// The contract name
    pub name: String,
    /// The contract ABI
    pub abi: JsonAbi,
    /// The creation bytecode, without constructor arguments
    pub bytecode: Bytes,
}

/// The creation bytecode as emitted by the different toolchains
#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    /// Hardhat emits a bare hex string
    Hex(String),
    /// Foundry nests the hex string under `object`
    Object {
        /// The hex-encoded bytecode
        object: String,
    },
}

/// The subset of an artifact file needed for deployment
#[derive(Deserialize)]
struct ArtifactFile {
    /// The contract ABI
    abi: JsonAbi,
    /// The creation bytecode
    bytecode: BytecodeField,
}

/// An index of the compiled artifacts under a directory
#[derive(Debug)]
pub struct ArtifactStore {
    /// The directory the index was built from
    root: PathBuf,
    /// Artifact paths, keyed by contract name
    index: HashMap<String, Vec<PathBuf>>,
}

impl ArtifactStore {
    /// Index every artifact under `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ScriptError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ScriptError::ArtifactNotFound(format!(
                "artifacts directory {} does not exist, compile the contracts first",
                root.display()
            )));
        }

        let mut index = HashMap::new();
        index_dir(&root, &mut index)?;
        for paths in index.values_mut() {
            paths.sort();
        }

        Ok(Self { root, index })
    }

    /// The directory the artifacts were read from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The number of distinct contract names indexed
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no artifact was found
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Load the template for `name`, either a bare contract name or a fully
    /// qualified `path/to/Source.sol:Contract`
    pub fn template(&self, name: &str) -> Result<ContractTemplate, ScriptError> {
        let path = self.locate(name)?;
        let contract = name.rsplit_once(':').map_or(name, |(_, contract)| contract);
        read_template(contract, &path)
    }

    /// Find the artifact file for `name`
    fn locate(&self, name: &str) -> Result<PathBuf, ScriptError> {
        let (source, contract) = match name.rsplit_once(':') {
            Some((source, contract)) => (Some(Path::new(source)), contract),
            None => (None, name),
        };

        let indexed = self.index.get(contract).map(Vec::as_slice).unwrap_or_default();
        let candidates: Vec<&PathBuf> = match source {
            None => indexed.iter().collect(),
            Some(source) => {
                // Hardhat keeps the full source path, Foundry only the file name
                let exact: Vec<&PathBuf> = indexed
                    .iter()
                    .filter(|path| path.parent().is_some_and(|dir| dir.ends_with(source)))
                    .collect();
                if exact.is_empty() {
                    indexed
                        .iter()
                        .filter(|path| {
                            path.parent()
                                .is_some_and(|dir| dir.file_name() == source.file_name())
                        })
                        .collect()
                } else {
                    exact
                }
            }
        };

        match candidates.as_slice() {
            [] => Err(ScriptError::ArtifactNotFound(format!(
                "no artifact for `{}` under {}",
                name,
                self.root.display()
            ))),
            [path] => Ok((*path).clone()),
            paths => Err(ScriptError::ArtifactNotFound(format!(
                "`{}` is ambiguous, use a fully qualified name: {}",
                name,
                paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

/// Recursively add the artifacts under `dir` to the index
fn index_dir(dir: &Path, index: &mut HashMap<String, Vec<PathBuf>>) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir).map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?;
    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactParsing(e.to_string()))?
            .path();

        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == BUILD_INFO_DIR) {
                continue;
            }
            index_dir(&path, index)?;
            continue;
        }

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if file_name.ends_with(DEBUG_ARTIFACT_SUFFIX)
            || !path.extension().is_some_and(|ext| ext == ARTIFACT_EXTENSION)
        {
            continue;
        }

        // Artifacts sit in a directory named after their source file
        let in_source_dir = path
            .parent()
            .and_then(Path::extension)
            .is_some_and(|ext| ext == SOLIDITY_SOURCE_EXTENSION);
        if !in_source_dir {
            continue;
        }

        if let Some(contract) = path.file_stem().and_then(|s| s.to_str()) {
            index.entry(contract.to_string()).or_default().push(path.clone());
        }
    }

    Ok(())
}

/// Parse the artifact at `path` into a deployable template
fn read_template(contract: &str, path: &Path) -> Result<ContractTemplate, ScriptError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;
    let artifact: ArtifactFile = serde_json::from_str(&contents)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", path.display(), e)))?;

    let code = match artifact.bytecode {
        BytecodeField::Hex(code) => code,
        BytecodeField::Object { object } => object,
    };
    let code = code.strip_prefix("0x").unwrap_or(&code);

    if code.is_empty() {
        return Err(ScriptError::ArtifactParsing(format!(
            "`{}` has no creation bytecode, it is abstract or an interface",
            contract
        )));
    }
    if code.contains(LIBRARY_PLACEHOLDER_PREFIX) {
        return Err(ScriptError::ArtifactParsing(format!(
            "`{}` references unlinked libraries",
            contract
        )));
    }

    let bytecode = hex::decode(code)
        .map_err(|e| ScriptError::ArtifactParsing(format!("{}: {}", contract, e)))?;

    Ok(ContractTemplate {
        name: contract.to_string(),
        abi: artifact.abi,
        bytecode: bytecode.into(),
    })
}
