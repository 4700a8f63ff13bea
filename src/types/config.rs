//! Configuration types for the enhancer.

use std::collections::HashMap;

use config::{Config, Environment};
use serde::{Deserialize, Serialize};

use crate::error::{EnhanceError, Result};
use crate::{DEFAULT_CONCURRENCY, DEFAULT_ESTREE_SUFFIX, DEFAULT_EXTENSIONS};

/// Which parser backend produces syntax trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    /// Parse sources directly with tree-sitter grammars
    TreeSitter,
    /// Load ESTree JSON produced by an external JavaScript parser
    Estree,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::TreeSitter => write!(f, "tree-sitter"),
            Backend::Estree => write!(f, "estree"),
        }
    }
}

/// Enhancer settings, loadable from `ENHANCER_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnhancerSettings {
    /// Drop passthrough and unmatched records from the output
    pub discard: bool,

    /// Mark parse failures on each affected record instead of failing the run
    pub errors: bool,

    /// Maximum files parsed concurrently in bulk mode
    pub concurrency: usize,

    /// File extensions eligible for parsing (with leading dot)
    pub extensions: Vec<String>,

    /// Parser backend
    pub backend: Backend,

    /// Suffix appended to a source path to locate its ESTree JSON
    pub estree_suffix: String,

    /// Treat tree-sitter syntax errors as parse failures
    pub strict: bool,
}

impl Default for EnhancerSettings {
    fn default() -> Self {
        Self {
            discard: false,
            errors: false,
            concurrency: DEFAULT_CONCURRENCY,
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            backend: Backend::TreeSitter,
            estree_suffix: DEFAULT_ESTREE_SUFFIX.to_string(),
            strict: false,
        }
    }
}

impl EnhancerSettings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(Self::environment())
    }

    /// Load settings from an explicit variable map (keys include the `ENHANCER_` prefix).
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(Self::environment().source(Some(vars)))
    }

    fn environment() -> Environment {
        Environment::with_prefix("ENHANCER")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("extensions")
    }

    fn load(env: Environment) -> Result<Self> {
        let settings: Self = Config::builder()
            .add_source(env)
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| EnhanceError::Configuration(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the enhancer cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(EnhanceError::Configuration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if let Some(bad) = self.extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(EnhanceError::Configuration(format!(
                "extension must start with a dot: {}",
                bad
            )));
        }
        Ok(())
    }
}
