// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The fixed set of runtime types and methods the analyzer compares against.

use crate::config::{AnalyzerConfig, TypeName};
use crate::runtime::{ResolveError, RuntimeMethod, RuntimeType, RuntimeTypeError, TypeResolver};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("cannot resolve '{name}' in '{assembly}'")]
    MissingType {
        assembly: String,
        name: String,
        #[source]
        source: ResolveError,
    },
    #[error(transparent)]
    Construct(#[from] RuntimeTypeError),
    #[error("no provider entry points configured")]
    NoEntryPoints,
}

/// Immutable catalog shared by every check.
#[derive(Debug, Clone)]
pub struct Catalog {
    string: RuntimeType,
    strings: RuntimeType,
    entry_points: Vec<RuntimeType>,
    static_string_equals: RuntimeMethod,
    string_equals: RuntimeMethod,
    sequence_contains: RuntimeMethod,
    static_object_equals: RuntimeMethod,
}

fn resolve(
    resolver: &dyn TypeResolver,
    assembly: &str,
    name: &str,
    generic_arguments: &[RuntimeType],
) -> Result<RuntimeType, CatalogError> {
    resolver
        .resolve(assembly, name, generic_arguments)
        .map_err(|source| CatalogError::MissingType {
            assembly: assembly.to_string(),
            name: name.to_string(),
            source,
        })
}

impl Catalog {
    pub fn load(config: &AnalyzerConfig, resolver: &dyn TypeResolver) -> Result<Self, CatalogError> {
        let core = config.core_library.as_str();
        let object = resolve(resolver, core, "System.Object", &[])?;
        let string = resolve(resolver, core, "System.String", &[])?;
        let sequence = resolve(resolver, core, "System.Collections.Generic.IEnumerable`1", &[])?;
        let strings = sequence.make_generic(&[string.clone()])?;
        let enumerable = resolve(
            resolver,
            &config.sequence_library,
            "System.Linq.Enumerable",
            &[],
        )?;

        if config.provider_entry_points.is_empty() {
            return Err(CatalogError::NoEntryPoints);
        }
        let entry_points = config
            .provider_entry_points
            .iter()
            .map(|TypeName { assembly, name }| resolve(resolver, assembly, name, &[]))
            .collect::<Result<Vec<_>, _>>()?;

        let contains = RuntimeMethod::generic_definition(
            enumerable,
            "Contains",
            true,
            &["TSource"],
            |tp| Ok(vec![sequence.make_generic(tp)?, tp[0].clone()]),
        )?;

        let catalog = Self {
            static_string_equals: RuntimeMethod::new(
                string.clone(),
                "Equals",
                true,
                vec![string.clone(), string.clone()],
            ),
            string_equals: RuntimeMethod::new(string.clone(), "Equals", false, vec![string.clone()]),
            sequence_contains: contains.make_generic(&[string.clone()])?,
            static_object_equals: RuntimeMethod::new(
                object.clone(),
                "Equals",
                true,
                vec![object.clone(), object],
            ),
            string,
            strings,
            entry_points,
        };
        debug!(
            providers = catalog.entry_points.len(),
            contains = %catalog.sequence_contains,
            "loaded comparison catalog"
        );
        Ok(catalog)
    }

    pub fn string(&self) -> &RuntimeType {
        &self.string
    }

    /// `IEnumerable<String>`.
    pub fn strings(&self) -> &RuntimeType {
        &self.strings
    }

    pub fn entry_points(&self) -> &[RuntimeType] {
        &self.entry_points
    }

    /// `String.Equals(String, String)`.
    pub fn static_string_equals(&self) -> &RuntimeMethod {
        &self.static_string_equals
    }

    /// `String.Equals(String)`.
    pub fn string_equals(&self) -> &RuntimeMethod {
        &self.string_equals
    }

    /// `Enumerable.Contains<String>(IEnumerable<String>, String)`.
    pub fn sequence_contains(&self) -> &RuntimeMethod {
        &self.sequence_contains
    }

    /// `Object.Equals(Object, Object)`.
    pub fn static_object_equals(&self) -> &RuntimeMethod {
        &self.static_object_equals
    }
}
