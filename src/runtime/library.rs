// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Reference model of the base class library.
//!
//! Holds the types the default catalog resolves plus the common collection
//! types analyzed code reaches through `Contains`. Hosts with a real runtime
//! supply their own [`TypeResolver`](super::TypeResolver) instead.

use super::error::RuntimeTypeError;
use super::resolver::{Assemblies, Assembly};
use super::types::{RuntimeType, TypeBuilder};

/// Assembly names used by the reference library.
pub mod names {
    pub const CORE_LIBRARY: &str = "System.Private.CoreLib";
    /// Reference facade that forwards to the implementation assemblies.
    pub const RUNTIME_FACADE: &str = "System.Runtime";
    pub const COLLECTIONS: &str = "System.Collections";
    pub const LINQ: &str = "System.Linq";
    pub const LINQ_EXPRESSIONS: &str = "System.Linq.Expressions";
    pub const LINQ_QUERYABLE: &str = "System.Linq.Queryable";
}

use names::*;

const SYSTEM: &str = "System";
const GENERIC: &str = "System.Collections.Generic";

fn generic_interface(
    assembly: &str,
    namespace: &str,
    name: &str,
    extends: &[&RuntimeType],
) -> Result<RuntimeType, RuntimeTypeError> {
    let mut builder = TypeBuilder::interface(assembly, namespace, name).generic_parameters(&["T"]);
    let t = builder.parameters()[0].clone();
    for parent in extends {
        builder = builder.implements(parent.make_generic(&[t.clone()])?);
    }
    Ok(builder.build())
}

fn generic_class(
    assembly: &str,
    namespace: &str,
    name: &str,
    base: &RuntimeType,
    implements: &[&RuntimeType],
) -> Result<RuntimeType, RuntimeTypeError> {
    let mut builder = TypeBuilder::class(assembly, namespace, name)
        .generic_parameters(&["T"])
        .extends(base.clone());
    let t = builder.parameters()[0].clone();
    for iface in implements {
        builder = builder.implements(iface.make_generic(&[t.clone()])?);
    }
    Ok(builder.build())
}

/// Build the reference assemblies.
pub fn reference_assemblies() -> Result<Assemblies, RuntimeTypeError> {
    let object = TypeBuilder::universal_base(CORE_LIBRARY, SYSTEM, "Object").build();
    let value_type = TypeBuilder::class(CORE_LIBRARY, SYSTEM, "ValueType")
        .extends(object.clone())
        .build();
    let enum_type = TypeBuilder::class(CORE_LIBRARY, SYSTEM, "Enum")
        .extends(value_type.clone())
        .build();

    let equatable = generic_interface(CORE_LIBRARY, SYSTEM, "IEquatable", &[])?;
    let comparable = TypeBuilder::interface(CORE_LIBRARY, SYSTEM, "IComparable").build();
    let legacy_sequence =
        TypeBuilder::interface(CORE_LIBRARY, "System.Collections", "IEnumerable").build();
    let sequence = TypeBuilder::interface(CORE_LIBRARY, GENERIC, "IEnumerable")
        .generic_parameters(&["T"])
        .implements(legacy_sequence.clone())
        .build();
    let read_only = generic_interface(
        CORE_LIBRARY,
        GENERIC,
        "IReadOnlyCollection",
        &[&sequence],
    )?;
    let collection = generic_interface(CORE_LIBRARY, GENERIC, "ICollection", &[&sequence])?;
    let list_iface = generic_interface(CORE_LIBRARY, GENERIC, "IList", &[&collection])?;
    let set_iface = generic_interface(CORE_LIBRARY, GENERIC, "ISet", &[&collection])?;
    let comparer = generic_interface(CORE_LIBRARY, GENERIC, "IEqualityComparer", &[])?;

    let primitive = |name: &str| -> Result<RuntimeType, RuntimeTypeError> {
        let this = TypeBuilder::class(CORE_LIBRARY, SYSTEM, name)
            .extends(value_type.clone())
            .build();
        Ok(TypeBuilder::class(CORE_LIBRARY, SYSTEM, name)
            .extends(value_type.clone())
            .implements(comparable.clone())
            .implements(equatable.make_generic(&[this])?)
            .build())
    };
    let boolean = primitive("Boolean")?;
    let char_type = primitive("Char")?;
    let int32 = primitive("Int32")?;

    let string_self = TypeBuilder::class(CORE_LIBRARY, SYSTEM, "String")
        .extends(object.clone())
        .build();
    let string = TypeBuilder::class(CORE_LIBRARY, SYSTEM, "String")
        .extends(object.clone())
        .implements(comparable.clone())
        .implements(sequence.make_generic(&[char_type.clone()])?)
        .implements(equatable.make_generic(&[string_self])?)
        .build();
    let string_comparison = TypeBuilder::class(CORE_LIBRARY, SYSTEM, "StringComparison")
        .extends(enum_type.clone())
        .build();
    let string_comparer = TypeBuilder::class(CORE_LIBRARY, SYSTEM, "StringComparer")
        .extends(object.clone())
        .implements(comparer.make_generic(&[string.clone()])?)
        .build();
    let array = TypeBuilder::class(CORE_LIBRARY, SYSTEM, "Array")
        .extends(object.clone())
        .implements(legacy_sequence.clone())
        .build();
    let list = generic_class(
        CORE_LIBRARY,
        GENERIC,
        "List",
        &object,
        &[&list_iface, &read_only],
    )?;

    let core = [
        &object,
        &value_type,
        &enum_type,
        &equatable,
        &comparable,
        &legacy_sequence,
        &sequence,
        &read_only,
        &collection,
        &list_iface,
        &set_iface,
        &comparer,
        &boolean,
        &char_type,
        &int32,
        &string,
        &string_comparison,
        &string_comparer,
        &array,
        &list,
    ]
    .into_iter()
    .fold(Assembly::new(CORE_LIBRARY), |asm, ty| asm.with_type(ty.clone()));

    let hash_set = generic_class(
        COLLECTIONS,
        GENERIC,
        "HashSet",
        &object,
        &[&set_iface, &read_only],
    )?;
    let collections = Assembly::new(COLLECTIONS).with_type(hash_set.clone());

    let facade = core
        .types()
        .chain([&hash_set])
        .fold(Assembly::new(RUNTIME_FACADE), |asm, ty| {
            asm.with_forward(&ty.full_name(), ty.assembly())
        });

    let enumerable = TypeBuilder::class(LINQ, "System.Linq", "Enumerable")
        .extends(object.clone())
        .build();
    let queryable_iface = generic_interface(LINQ_EXPRESSIONS, "System.Linq", "IQueryable", &[&sequence])?;
    let queryable = TypeBuilder::class(LINQ_QUERYABLE, "System.Linq", "Queryable")
        .extends(object.clone())
        .build();

    Ok(Assemblies::new()
        .with(core)
        .with(collections)
        .with(facade)
        .with(Assembly::new(LINQ).with_type(enumerable))
        .with(Assembly::new(LINQ_EXPRESSIONS).with_type(queryable_iface))
        .with(Assembly::new(LINQ_QUERYABLE).with_type(queryable)))
}
