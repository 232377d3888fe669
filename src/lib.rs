// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Use README.md as crate documentation.
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod analyzer;
mod catalog;
mod config;
mod context;
mod derivation;
mod diagnostics;
mod equivalence;
mod operation;
mod rules;
pub mod runtime;
mod signature;
mod symbols;
mod utils;

pub use analyzer::{Analyzer, ANALYZER_NAME};
pub use catalog::{Catalog, CatalogError};
pub use config::{AnalyzerConfig, ConfigError, TypeName};
pub use diagnostics::Diagnostic;
pub use operation::{
    Ancestors, BinaryOperatorKind, ConstantValue, Location, Operation, OperationId, OperationKind,
    OperationTree, TreeError,
};
pub use rules::{RuleDescriptor, Severity, ANALYSIS_FAULT, IMPLICIT_CASE_SENSITIVITY, SUPPORTED_RULES};
pub use symbols::{MethodSymbol, ParameterSymbol, TypeSymbol, TypeSymbolKind};

/// Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::context::is_in_provider_expression_tree;
    pub use crate::derivation::DerivationCache;
    pub use crate::equivalence::types_equivalent;
    pub use crate::signature::method_matches;
    pub use crate::utils::{all_paired, zip_fill, Paired, ZipFill};
}
