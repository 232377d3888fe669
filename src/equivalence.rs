// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Equivalence between compile-time type symbols and runtime types.

use crate::runtime::RuntimeType;
use crate::symbols::TypeSymbol;
use crate::utils::all_paired;

/// Whether `symbol` denotes the runtime type `ty`.
///
/// Names and namespaces must match exactly. A generic symbol matches the
/// runtime name carrying its arity suffix, and its type arguments must pair
/// one-to-one with the runtime generic arguments, in order.
pub fn types_equivalent(symbol: &TypeSymbol, ty: &RuntimeType) -> bool {
    if symbol.is_generic() {
        let arguments = symbol.type_arguments();
        generic_name_matches(symbol.name(), arguments.len(), ty.name())
            && symbol.namespace() == ty.namespace()
            && all_paired(arguments, ty.generic_arguments(), types_equivalent)
    } else {
        symbol.name() == ty.name() && symbol.namespace() == ty.namespace()
    }
}

fn generic_name_matches(name: &str, arity: usize, metadata_name: &str) -> bool {
    metadata_name
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('`'))
        .is_some_and(|suffix| suffix == arity.to_string())
}
