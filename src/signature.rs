// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::equivalence::types_equivalent;
use crate::runtime::RuntimeMethod;
use crate::symbols::MethodSymbol;
use crate::utils::all_paired;

/// Whether the invoked `symbol` is the known runtime `method`.
///
/// A known generic method may be given either constructed, in which case the
/// symbol's type arguments must match, or as an open definition, which
/// accepts any type arguments. Known parameters that are generic parameters
/// accept any symbolic parameter type. Parameter counts must agree, so an
/// overload taking an extra comparer never matches one without it.
pub fn method_matches(symbol: &MethodSymbol, method: &RuntimeMethod) -> bool {
    symbol.name() == method.name()
        && types_equivalent(symbol.containing_type(), method.declaring_type())
        && symbol.is_static() == method.is_static()
        && symbol.is_generic() == method.is_generic_method()
        && (!method.is_generic_method()
            || method.is_generic_method_definition()
            || all_paired(
                symbol.type_arguments(),
                method.generic_arguments(),
                types_equivalent,
            ))
        && all_paired(method.parameters(), symbol.parameters(), |expected, param| {
            expected.is_generic_parameter() || types_equivalent(param.ty(), expected)
        })
}
