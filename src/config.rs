// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Analyzer configuration.

use crate::rules::Severity;
use crate::runtime::library::names;

use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid analyzer configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("at least one provider entry point is required")]
    NoEntryPoints,
}

/// A runtime type named by its assembly and qualified metadata name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeName {
    pub assembly: String,
    pub name: String,
}

impl TypeName {
    pub fn new(assembly: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            assembly: assembly.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.name, self.assembly)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Assembly defining `System.Object`, `System.String` and ``IEnumerable`1``.
    pub core_library: String,
    /// Assembly defining `System.Linq.Enumerable`.
    pub sequence_library: String,
    /// Types whose methods capture lambda arguments as expression trees.
    pub provider_entry_points: Vec<TypeName>,
    /// Overrides the default severity of violations.
    pub severity: Option<Severity>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            core_library: names::CORE_LIBRARY.to_string(),
            sequence_library: names::LINQ.to_string(),
            provider_entry_points: vec![TypeName::new(names::LINQ_QUERYABLE, "System.Linq.Queryable")],
            severity: None,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.provider_entry_points.is_empty() {
            return Err(ConfigError::NoEntryPoints);
        }
        Ok(config)
    }
}
