// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::error::RuntimeTypeError;
use super::types::{substitute, RuntimeType};

use core::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MethodGenerics {
    None,
    Definition(Vec<RuntimeType>),
    Constructed {
        parameters: Vec<RuntimeType>,
        arguments: Vec<RuntimeType>,
    },
}

/// A reflected method descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuntimeMethod {
    name: Arc<str>,
    declaring_type: RuntimeType,
    is_static: bool,
    generics: MethodGenerics,
    parameters: Vec<RuntimeType>,
}

impl RuntimeMethod {
    pub fn new(
        declaring_type: RuntimeType,
        name: impl Into<Arc<str>>,
        is_static: bool,
        parameters: Vec<RuntimeType>,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            is_static,
            generics: MethodGenerics::None,
            parameters,
        }
    }

    /// Generic method definition. `parameters` receives the method's own
    /// generic parameters and returns the parameter types.
    pub fn generic_definition<F>(
        declaring_type: RuntimeType,
        name: impl Into<Arc<str>>,
        is_static: bool,
        type_parameters: &[&str],
        parameters: F,
    ) -> Result<Self, RuntimeTypeError>
    where
        F: FnOnce(&[RuntimeType]) -> Result<Vec<RuntimeType>, RuntimeTypeError>,
    {
        let name: Arc<str> = name.into();
        let owner = format!("{}.{}", declaring_type.full_name(), name);
        let type_parameters: Vec<RuntimeType> = type_parameters
            .iter()
            .enumerate()
            .map(|(position, param)| {
                RuntimeType::generic_parameter(
                    declaring_type.assembly(),
                    owner.as_str(),
                    *param,
                    position,
                )
            })
            .collect();
        let parameters = parameters(&type_parameters)?;
        let generics = if type_parameters.is_empty() {
            MethodGenerics::None
        } else {
            MethodGenerics::Definition(type_parameters)
        };
        Ok(Self {
            name,
            declaring_type,
            is_static,
            generics,
            parameters,
        })
    }

    /// Bind the generic parameters of this definition.
    pub fn make_generic(&self, arguments: &[RuntimeType]) -> Result<Self, RuntimeTypeError> {
        let MethodGenerics::Definition(type_parameters) = &self.generics else {
            return Err(RuntimeTypeError::NotGenericDefinition(self.to_string()));
        };
        if type_parameters.len() != arguments.len() {
            return Err(RuntimeTypeError::ArityMismatch {
                name: self.to_string(),
                expected: type_parameters.len(),
                found: arguments.len(),
            });
        }
        let parameters = self
            .parameters
            .iter()
            .map(|param| substitute(param, type_parameters, arguments))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: self.name.clone(),
            declaring_type: self.declaring_type.clone(),
            is_static: self.is_static,
            generics: MethodGenerics::Constructed {
                parameters: type_parameters.clone(),
                arguments: arguments.to_vec(),
            },
            parameters,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaring_type(&self) -> &RuntimeType {
        &self.declaring_type
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_generic_method(&self) -> bool {
        !matches!(self.generics, MethodGenerics::None)
    }

    pub fn is_generic_method_definition(&self) -> bool {
        matches!(self.generics, MethodGenerics::Definition(_))
    }

    /// Generic parameters of a definition, or bound arguments of a constructed method.
    pub fn generic_arguments(&self) -> &[RuntimeType] {
        match &self.generics {
            MethodGenerics::None => &[],
            MethodGenerics::Definition(parameters) => parameters,
            MethodGenerics::Constructed { arguments, .. } => arguments,
        }
    }

    pub fn parameters(&self) -> &[RuntimeType] {
        &self.parameters
    }
}

impl fmt::Display for RuntimeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type.full_name(), self.name)?;
        if self.is_generic_method() {
            f.write_str("[")?;
            for (idx, arg) in self.generic_arguments().iter().enumerate() {
                if idx > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str("]")?;
        }
        f.write_str("(")?;
        for (idx, param) in self.parameters.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}
