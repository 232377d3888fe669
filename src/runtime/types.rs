// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::error::RuntimeTypeError;

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    Class,
    Interface,
    /// Generic parameter number `position` of the type or method named `owner`.
    GenericParameter { owner: Arc<str>, position: usize },
}

struct TypeInfo {
    assembly: Arc<str>,
    namespace: Arc<str>,
    name: Arc<str>,
    flavor: TypeFlavor,
    universal_base: bool,
    generic_parameters: Vec<RuntimeType>,
    generic_arguments: Vec<RuntimeType>,
    definition: Option<RuntimeType>,
    base_type: Option<RuntimeType>,
    interfaces: Vec<RuntimeType>,
}

/// A loaded runtime type.
///
/// Handles are cheap to clone. Two handles are equal when they denote the same
/// type: same assembly, namespace, metadata name, flavor and generic arguments.
#[derive(Clone)]
pub struct RuntimeType(Arc<TypeInfo>);

impl RuntimeType {
    /// Unbound generic parameter of a type or method.
    pub fn generic_parameter(
        assembly: impl Into<Arc<str>>,
        owner: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        position: usize,
    ) -> Self {
        RuntimeType(Arc::new(TypeInfo {
            assembly: assembly.into(),
            namespace: "".into(),
            name: name.into(),
            flavor: TypeFlavor::GenericParameter {
                owner: owner.into(),
                position,
            },
            universal_base: false,
            generic_parameters: Vec::new(),
            generic_arguments: Vec::new(),
            definition: None,
            base_type: None,
            interfaces: Vec::new(),
        }))
    }

    pub fn assembly(&self) -> &str {
        &self.0.assembly
    }

    pub fn namespace(&self) -> &str {
        &self.0.namespace
    }

    /// Metadata name; generic types carry a "`N" arity suffix.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn full_name(&self) -> String {
        if self.0.namespace.is_empty() {
            self.0.name.to_string()
        } else {
            format!("{}.{}", self.0.namespace, self.0.name)
        }
    }

    pub fn flavor(&self) -> &TypeFlavor {
        &self.0.flavor
    }

    pub fn is_interface(&self) -> bool {
        self.0.flavor == TypeFlavor::Interface
    }

    pub fn is_generic_parameter(&self) -> bool {
        matches!(self.0.flavor, TypeFlavor::GenericParameter { .. })
    }

    /// The class every other type derives from.
    pub fn is_universal_base(&self) -> bool {
        self.0.universal_base
    }

    pub fn is_generic_type(&self) -> bool {
        self.is_generic_type_definition() || self.is_constructed_generic_type()
    }

    pub fn is_generic_type_definition(&self) -> bool {
        !self.0.generic_parameters.is_empty()
    }

    pub fn is_constructed_generic_type(&self) -> bool {
        self.0.definition.is_some()
    }

    /// True if any part of this type is still an unbound generic parameter.
    pub fn contains_generic_parameters(&self) -> bool {
        self.is_generic_parameter()
            || self.is_generic_type_definition()
            || self
                .0
                .generic_arguments
                .iter()
                .any(RuntimeType::contains_generic_parameters)
    }

    pub fn generic_parameters(&self) -> &[RuntimeType] {
        &self.0.generic_parameters
    }

    /// Arguments of a constructed generic type. Empty for definitions.
    pub fn generic_arguments(&self) -> &[RuntimeType] {
        &self.0.generic_arguments
    }

    pub fn generic_type_definition(&self) -> Option<RuntimeType> {
        if self.is_generic_type_definition() {
            Some(self.clone())
        } else {
            self.0.definition.clone()
        }
    }

    pub fn base_type(&self) -> Option<&RuntimeType> {
        self.0.base_type.as_ref()
    }

    /// Interfaces declared directly on this type.
    pub fn declared_interfaces(&self) -> &[RuntimeType] {
        &self.0.interfaces
    }

    /// This type followed by its successive base classes.
    pub fn base_types(&self) -> impl Iterator<Item = RuntimeType> {
        core::iter::successors(Some(self.clone()), |ty| ty.base_type().cloned())
    }

    /// Every interface this type implements, directly, through its base classes
    /// or through other interfaces.
    pub fn implemented_interfaces(&self) -> Vec<RuntimeType> {
        let mut found: Vec<RuntimeType> = Vec::new();
        let mut pending: Vec<RuntimeType> = self
            .base_types()
            .flat_map(|ty| ty.declared_interfaces().to_vec())
            .collect();
        pending.reverse();
        while let Some(iface) = pending.pop() {
            if found.contains(&iface) {
                continue;
            }
            pending.extend(iface.declared_interfaces().iter().rev().cloned());
            found.push(iface);
        }
        found
    }

    /// Whether a value of type `candidate` can be stored in a location of this type.
    pub fn is_assignable_from(&self, candidate: &RuntimeType) -> bool {
        if self == candidate || self.is_universal_base() {
            true
        } else if self.is_interface() {
            candidate.implemented_interfaces().contains(self)
        } else {
            candidate.base_types().any(|ty| &ty == self)
        }
    }

    /// Bind the generic parameters of this definition to `arguments`.
    pub fn make_generic(&self, arguments: &[RuntimeType]) -> Result<RuntimeType, RuntimeTypeError> {
        let parameters = self.generic_parameters();
        if parameters.is_empty() {
            return Err(RuntimeTypeError::NotGenericDefinition(self.full_name()));
        }
        if parameters.len() != arguments.len() {
            return Err(RuntimeTypeError::ArityMismatch {
                name: self.full_name(),
                expected: parameters.len(),
                found: arguments.len(),
            });
        }
        if parameters == arguments {
            return Ok(self.clone());
        }

        let base_type = self
            .base_type()
            .map(|base| substitute(base, parameters, arguments))
            .transpose()?;
        let interfaces = self
            .declared_interfaces()
            .iter()
            .map(|iface| substitute(iface, parameters, arguments))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RuntimeType(Arc::new(TypeInfo {
            assembly: self.0.assembly.clone(),
            namespace: self.0.namespace.clone(),
            name: self.0.name.clone(),
            flavor: self.0.flavor.clone(),
            universal_base: false,
            generic_parameters: Vec::new(),
            generic_arguments: arguments.to_vec(),
            definition: Some(self.clone()),
            base_type,
            interfaces,
        })))
    }
}

/// Replace occurrences of `parameters` within `ty` by the matching `arguments`.
pub(crate) fn substitute(
    ty: &RuntimeType,
    parameters: &[RuntimeType],
    arguments: &[RuntimeType],
) -> Result<RuntimeType, RuntimeTypeError> {
    if let Some((_, argument)) = parameters
        .iter()
        .zip(arguments)
        .find(|(parameter, _)| *parameter == ty)
    {
        return Ok(argument.clone());
    }
    match &ty.0.definition {
        Some(definition) if ty.contains_generic_parameters() => {
            let bound = ty
                .generic_arguments()
                .iter()
                .map(|arg| substitute(arg, parameters, arguments))
                .collect::<Result<Vec<_>, _>>()?;
            definition.make_generic(&bound)
        }
        _ => Ok(ty.clone()),
    }
}

impl PartialEq for RuntimeType {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
            || (self.0.assembly == other.0.assembly
                && self.0.namespace == other.0.namespace
                && self.0.name == other.0.name
                && self.0.flavor == other.0.flavor
                && self.0.generic_arguments == other.0.generic_arguments)
    }
}

impl Eq for RuntimeType {}

impl Hash for RuntimeType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.assembly.hash(state);
        self.0.namespace.hash(state);
        self.0.name.hash(state);
        self.0.flavor.hash(state);
        self.0.generic_arguments.hash(state);
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())?;
        if !self.0.generic_arguments.is_empty() {
            f.write_str("[")?;
            for (idx, arg) in self.0.generic_arguments.iter().enumerate() {
                if idx > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuntimeType({self}, {})", self.0.assembly)
    }
}

/// Builder for type definitions.
pub struct TypeBuilder {
    info: TypeInfo,
}

impl TypeBuilder {
    fn with_flavor(
        assembly: impl Into<Arc<str>>,
        namespace: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        flavor: TypeFlavor,
    ) -> Self {
        Self {
            info: TypeInfo {
                assembly: assembly.into(),
                namespace: namespace.into(),
                name: name.into(),
                flavor,
                universal_base: false,
                generic_parameters: Vec::new(),
                generic_arguments: Vec::new(),
                definition: None,
                base_type: None,
                interfaces: Vec::new(),
            },
        }
    }

    pub fn class(
        assembly: impl Into<Arc<str>>,
        namespace: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
    ) -> Self {
        Self::with_flavor(assembly, namespace, name, TypeFlavor::Class)
    }

    pub fn interface(
        assembly: impl Into<Arc<str>>,
        namespace: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
    ) -> Self {
        Self::with_flavor(assembly, namespace, name, TypeFlavor::Interface)
    }

    /// The root class, such as `System.Object`.
    pub fn universal_base(
        assembly: impl Into<Arc<str>>,
        namespace: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
    ) -> Self {
        let mut builder = Self::class(assembly, namespace, name);
        builder.info.universal_base = true;
        builder
    }

    /// Declare generic parameters. Appends the "`N" arity suffix to the name.
    pub fn generic_parameters(mut self, names: &[&str]) -> Self {
        if names.is_empty() {
            return self;
        }
        let name: Arc<str> = format!("{}`{}", self.info.name, names.len()).into();
        let owner: Arc<str> = if self.info.namespace.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", self.info.namespace, name).into()
        };
        self.info.generic_parameters = names
            .iter()
            .enumerate()
            .map(|(position, param)| {
                RuntimeType::generic_parameter(
                    self.info.assembly.clone(),
                    owner.clone(),
                    *param,
                    position,
                )
            })
            .collect();
        self.info.name = name;
        self
    }

    /// Generic parameters declared so far, for use in base and interface types.
    pub fn parameters(&self) -> &[RuntimeType] {
        &self.info.generic_parameters
    }

    pub fn extends(mut self, base: RuntimeType) -> Self {
        self.info.base_type = Some(base);
        self
    }

    pub fn implements(mut self, iface: RuntimeType) -> Self {
        self.info.interfaces.push(iface);
        self
    }

    pub fn build(self) -> RuntimeType {
        RuntimeType(Arc::new(self.info))
    }
}
