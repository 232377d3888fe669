// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compile-time symbols as they appear on the operation tree.

use core::fmt;
use std::sync::Arc;

/// Shape of a [`TypeSymbol`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSymbolKind {
    /// A class, struct, interface or delegate. Generic when `type_arguments` is non-empty.
    Named { type_arguments: Vec<TypeSymbol> },
    /// A single-dimensional array of `element`.
    Array { element: Box<TypeSymbol> },
    /// An unbound type parameter such as `T`.
    TypeParameter,
}

/// Symbolic type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSymbol {
    name: Arc<str>,
    namespace: Arc<str>,
    assembly: Option<Arc<str>>,
    kind: TypeSymbolKind,
}

impl TypeSymbol {
    /// A non-generic named type.
    pub fn named(
        namespace: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        assembly: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            assembly: Some(assembly.into()),
            kind: TypeSymbolKind::Named {
                type_arguments: Vec::new(),
            },
        }
    }

    /// A named generic type instantiated with `type_arguments`.
    pub fn generic(
        namespace: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        assembly: impl Into<Arc<str>>,
        type_arguments: Vec<TypeSymbol>,
    ) -> Self {
        Self {
            kind: TypeSymbolKind::Named { type_arguments },
            ..Self::named(namespace, name, assembly)
        }
    }

    /// Array type. Named `<element>[]` in the element's namespace, which is how
    /// reflection names array types too.
    pub fn array(element: TypeSymbol) -> Self {
        Self {
            name: format!("{}[]", element.name).into(),
            namespace: element.namespace.clone(),
            assembly: element.assembly.clone(),
            kind: TypeSymbolKind::Array {
                element: Box::new(element),
            },
        }
    }

    pub fn type_parameter(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            namespace: "".into(),
            assembly: None,
            kind: TypeSymbolKind::TypeParameter,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn assembly(&self) -> Option<&str> {
        self.assembly.as_deref()
    }

    pub fn kind(&self) -> &TypeSymbolKind {
        &self.kind
    }

    pub fn is_named(&self) -> bool {
        matches!(self.kind, TypeSymbolKind::Named { .. })
    }

    pub fn is_generic(&self) -> bool {
        !self.type_arguments().is_empty()
    }

    pub fn type_arguments(&self) -> &[TypeSymbol] {
        match &self.kind {
            TypeSymbolKind::Named { type_arguments } => type_arguments,
            _ => &[],
        }
    }

    /// Reflection-style qualified name: `System.Collections.Generic.List`1`.
    pub fn metadata_name(&self) -> String {
        let mut name = String::new();
        if !self.namespace.is_empty() {
            name.push_str(&self.namespace);
            name.push('.');
        }
        name.push_str(&self.name);
        if self.is_generic() {
            name.push('`');
            name.push_str(&self.type_arguments().len().to_string());
        }
        name
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let TypeSymbolKind::Array { element } = &self.kind {
            return write!(f, "{element}[]");
        }
        if !self.namespace.is_empty() {
            write!(f, "{}.", self.namespace)?;
        }
        f.write_str(&self.name)?;
        if self.is_generic() {
            f.write_str("<")?;
            for (idx, arg) in self.type_arguments().iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSymbol {
    name: Arc<str>,
    ty: TypeSymbol,
}

impl ParameterSymbol {
    pub fn new(name: impl Into<Arc<str>>, ty: TypeSymbol) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeSymbol {
        &self.ty
    }
}

/// Symbolic method reference: the target of an invocation.
///
/// Extension methods are referenced in their static, non-reduced form, so the
/// receiver shows up as the first parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSymbol {
    name: Arc<str>,
    containing_type: TypeSymbol,
    is_static: bool,
    type_arguments: Vec<TypeSymbol>,
    parameters: Vec<ParameterSymbol>,
}

impl MethodSymbol {
    pub fn new(
        containing_type: TypeSymbol,
        name: impl Into<Arc<str>>,
        is_static: bool,
        parameters: Vec<ParameterSymbol>,
    ) -> Self {
        Self {
            name: name.into(),
            containing_type,
            is_static,
            type_arguments: Vec::new(),
            parameters,
        }
    }

    pub fn with_type_arguments(mut self, type_arguments: Vec<TypeSymbol>) -> Self {
        self.type_arguments = type_arguments;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn containing_type(&self) -> &TypeSymbol {
        &self.containing_type
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_generic(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    pub fn type_arguments(&self) -> &[TypeSymbol] {
        &self.type_arguments
    }

    pub fn parameters(&self) -> &[ParameterSymbol] {
        &self.parameters
    }
}

impl fmt::Display for MethodSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.containing_type, self.name)?;
        if self.is_generic() {
            f.write_str("<")?;
            for (idx, arg) in self.type_arguments.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        f.write_str("(")?;
        for (idx, param) in self.parameters.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param.ty)?;
        }
        f.write_str(")")
    }
}
