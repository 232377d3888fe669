// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::equivalence::types_equivalent;
use crate::operation::Operation;
use crate::runtime::RuntimeType;

/// Whether `op` sits inside a lambda passed to a provider entry point, i.e. a
/// lambda the provider captures as an expression tree and translates.
///
/// Climbs to the nearest enclosing anonymous function, then to the first
/// invocation above it. That invocation's target must be declared on one of
/// `entry_points`.
pub fn is_in_provider_expression_tree(op: Operation<'_>, entry_points: &[RuntimeType]) -> bool {
    let Some(function) = op.ancestors().find(Operation::is_anonymous_function) else {
        return false;
    };
    let Some(target) = function
        .ancestors()
        .find_map(|ancestor| ancestor.invocation_target())
    else {
        return false;
    };
    entry_points
        .iter()
        .any(|entry_point| types_equivalent(target.containing_type(), entry_point))
}
