// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Detection of string comparisons with implicit case handling inside lambdas
//! that a query provider translates.

mod fault;

use crate::catalog::{Catalog, CatalogError};
use crate::config::AnalyzerConfig;
use crate::context::is_in_provider_expression_tree;
use crate::derivation::DerivationCache;
use crate::diagnostics::Diagnostic;
use crate::equivalence::types_equivalent;
use crate::operation::{BinaryOperatorKind, ConstantValue, Operation, OperationKind, OperationTree};
use crate::rules::{RuleDescriptor, Severity, IMPLICIT_CASE_SENSITIVITY, SUPPORTED_RULES};
use crate::runtime::{load_type, TypeResolver};
use crate::signature::method_matches;

use anyhow::{anyhow, bail, Result};
use std::sync::Arc;
use tracing::debug;

/// Name reported in fault records.
pub const ANALYZER_NAME: &str = "ImplicitCaseSensitivityAnalyzer";

pub struct Analyzer {
    catalog: Catalog,
    derivations: DerivationCache,
    resolver: Arc<dyn TypeResolver>,
    severity: Severity,
}

impl Analyzer {
    pub fn new(catalog: Catalog, resolver: Arc<dyn TypeResolver>) -> Self {
        Self {
            catalog,
            derivations: DerivationCache::new(),
            resolver,
            severity: IMPLICIT_CASE_SENSITIVITY.default_severity,
        }
    }

    pub fn from_config(
        config: &AnalyzerConfig,
        resolver: Arc<dyn TypeResolver>,
    ) -> Result<Self, CatalogError> {
        let catalog = Catalog::load(config, resolver.as_ref())?;
        let mut analyzer = Self::new(catalog, resolver);
        if let Some(severity) = config.severity {
            analyzer.severity = severity;
        }
        Ok(analyzer)
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn supported_rules() -> &'static [RuleDescriptor] {
        &SUPPORTED_RULES
    }

    /// Check one binary operator node.
    pub fn analyze_binary_operator(&self, op: Operation<'_>) -> Option<Diagnostic> {
        fault::isolate(op, || self.check_binary_operator(op))
            .map(|fired| fired.then(|| self.violation(op)))
            .unwrap_or_else(Some)
    }

    /// Check one invocation node.
    pub fn analyze_invocation(&self, op: Operation<'_>) -> Option<Diagnostic> {
        fault::isolate(op, || self.check_invocation(op))
            .map(|fired| fired.then(|| self.violation(op)))
            .unwrap_or_else(Some)
    }

    /// Deliver every binary operator and invocation of `tree` to its check.
    ///
    /// Records are ordered by location.
    pub fn analyze_tree(&self, tree: &OperationTree) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = tree
            .iter()
            .filter_map(|op| match op.kind() {
                OperationKind::BinaryOperator(_) => self.analyze_binary_operator(op),
                OperationKind::Invocation(_) => self.analyze_invocation(op),
                _ => None,
            })
            .collect();
        diagnostics.sort_by(|a, b| a.location.cmp(&b.location));
        diagnostics
    }

    fn violation(&self, op: Operation<'_>) -> Diagnostic {
        debug!(location = %op.location(), operation = ?op, "implicit case-sensitive comparison");
        Diagnostic::new(&IMPLICIT_CASE_SENSITIVITY, self.severity, op.location().clone())
    }

    fn in_scope(&self, op: Operation<'_>) -> bool {
        is_in_provider_expression_tree(op, self.catalog.entry_points())
    }

    fn check_binary_operator(&self, op: Operation<'_>) -> Result<bool> {
        if !matches!(
            op.binary_operator_kind(),
            Some(BinaryOperatorKind::Equals | BinaryOperatorKind::NotEquals)
        ) {
            return Ok(false);
        }
        let (Some(left), Some(right)) = (op.child(0), op.child(1)) else {
            bail!("binary operator {} is missing an operand", op.id());
        };
        if !(self.is_string_typed(left)? || self.is_string_typed(right)?) {
            return Ok(false);
        }
        if is_null_value(left)? || is_null_value(right)? {
            return Ok(false);
        }
        Ok(self.in_scope(op))
    }

    fn check_invocation(&self, op: Operation<'_>) -> Result<bool> {
        let Some(target) = op.invocation_target() else {
            bail!("operation {} is not an invocation", op.id());
        };
        if !self.in_scope(op) {
            return Ok(false);
        }

        let catalog = &self.catalog;
        if method_matches(target, catalog.static_string_equals())
            || method_matches(target, catalog.string_equals())
            || method_matches(target, catalog.sequence_contains())
        {
            return Ok(true);
        }
        if method_matches(target, catalog.static_object_equals()) {
            return Ok(self.is_string_typed(argument(op, 0)?)?
                || self.is_string_typed(argument(op, 1)?)?);
        }
        if target.is_static() {
            return Ok(false);
        }

        match target.name() {
            "Equals" if target.parameters().len() == 1 => self.is_string_typed(argument(op, 0)?),
            "Contains" if target.parameters().len() == 1 => {
                Ok(load_type(target.containing_type(), self.resolver.as_ref())
                    .is_some_and(|ty| self.derivations.derives_from(&ty, catalog.strings())))
            }
            _ => Ok(false),
        }
    }

    /// Whether `op`, or the operand of a conversion `op`, is typed `String`.
    fn is_string_typed(&self, op: Operation<'_>) -> Result<bool> {
        let string = self.catalog.string();
        if op.ty().is_some_and(|ty| types_equivalent(ty, string)) {
            return Ok(true);
        }
        if let OperationKind::Conversion = op.kind() {
            let operand = op
                .child(0)
                .ok_or_else(|| anyhow!("conversion {} has no operand", op.id()))?;
            return Ok(operand.ty().is_some_and(|ty| types_equivalent(ty, string)));
        }
        Ok(false)
    }
}

fn argument(op: Operation<'_>, idx: usize) -> Result<Operation<'_>> {
    op.argument_value(idx)
        .ok_or_else(|| anyhow!("invocation {} has no argument {idx}", op.id()))
}

/// Whether `op` is a null literal, looking through conversions.
fn is_null_value(mut op: Operation<'_>) -> Result<bool> {
    loop {
        match op.kind() {
            OperationKind::Literal(None | Some(ConstantValue::Null)) => return Ok(true),
            OperationKind::Conversion => {
                op = op
                    .child(0)
                    .ok_or_else(|| anyhow!("conversion {} has no operand", op.id()))?;
            }
            _ => return Ok(false),
        }
    }
}
