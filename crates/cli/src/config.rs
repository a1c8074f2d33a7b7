// ==============================================================================
// typecheck.toml Configuration
// ==============================================================================
//
// Discovers and loads `typecheck.toml` files. Provides:
// - Prelude scripts replayed before the script being solved
// - Solver settings
//
// Example typecheck.toml:
//
// ```toml
// prelude = ["./numeric.tcs"]
//
// [solver]
// node_limit = 50000
// ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use typecheck::SolverConfig;

pub const CONFIG_FILE_NAME: &str = "typecheck.toml";

/// Top-level `typecheck.toml` configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypecheckConfig {
    /// Scripts applied before the one being solved (relative to the config
    /// file).
    #[serde(default)]
    pub prelude: Vec<String>,

    #[serde(default)]
    pub solver: SolverSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolverSection {
    /// Search nodes expanded per independent group of variables.
    pub node_limit: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl TypecheckConfig {
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            node_limit: self.solver.node_limit,
        }
    }
}

/// Walk up from `start_dir` looking for `typecheck.toml`. Returns the first
/// match.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    let mut dir = start_dir;
    loop {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = dir.parent()?;
    }
}

pub fn load_config(path: &Path) -> Result<TypecheckConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
