// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use thiserror::Error;

/// Errors constructing runtime type or method descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeTypeError {
    #[error("'{0}' is not a generic definition")]
    NotGenericDefinition(String),
    #[error("'{name}' expects {expected} generic arguments, {found} supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

/// Reasons a [`TypeResolver`](super::TypeResolver) could not produce a type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("could not find assembly '{0}'")]
    AssemblyNotFound(String),
    #[error("could not load assembly '{assembly}': {reason}")]
    AssemblyLoad { assembly: String, reason: String },
    #[error("type '{name}' not found in assembly '{assembly}'")]
    TypeNotFound { assembly: String, name: String },
    #[error(transparent)]
    Construct(#[from] RuntimeTypeError),
}
