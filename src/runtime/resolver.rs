// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::error::ResolveError;
use super::types::RuntimeType;
use crate::symbols::TypeSymbol;

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;

/// Loads runtime types by assembly and qualified metadata name.
///
/// Implementations are shared across concurrent checks.
pub trait TypeResolver: Send + Sync {
    /// Resolve `qualified_name` (e.g. ``System.Collections.Generic.List`1``) in
    /// `assembly`, binding `generic_arguments` when non-empty.
    fn resolve(
        &self,
        assembly: &str,
        qualified_name: &str,
        generic_arguments: &[RuntimeType],
    ) -> Result<RuntimeType, ResolveError>;
}

/// Load the runtime counterpart of a named type symbol, type arguments included.
///
/// Any failure, including an assembly that cannot be located or loaded, yields `None`.
pub fn load_type(symbol: &TypeSymbol, resolver: &dyn TypeResolver) -> Option<RuntimeType> {
    if !symbol.is_named() {
        return None;
    }
    let assembly = symbol.assembly()?;
    let arguments = symbol
        .type_arguments()
        .iter()
        .map(|arg| load_type(arg, resolver))
        .collect::<Option<Vec<_>>>()?;

    match resolver.resolve(assembly, &symbol.metadata_name(), &arguments) {
        Ok(ty) => Some(ty),
        Err(error) => {
            trace!(%symbol, %error, "runtime type not loadable");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Assembly {
    name: Arc<str>,
    types: BTreeMap<String, RuntimeType>,
    forwards: BTreeMap<String, Arc<str>>,
    load_failure: Option<Arc<str>>,
}

impl Assembly {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            types: BTreeMap::new(),
            forwards: BTreeMap::new(),
            load_failure: None,
        }
    }

    /// An assembly that is known but fails to load.
    pub fn unloadable(name: impl Into<Arc<str>>, reason: impl Into<Arc<str>>) -> Self {
        Self {
            load_failure: Some(reason.into()),
            ..Self::new(name)
        }
    }

    pub fn with_type(mut self, ty: RuntimeType) -> Self {
        self.add_type(ty);
        self
    }

    pub fn add_type(&mut self, ty: RuntimeType) {
        self.types.insert(ty.full_name(), ty);
    }

    /// Forward `qualified_name` to the assembly that defines it.
    pub fn with_forward(mut self, qualified_name: &str, target: impl Into<Arc<str>>) -> Self {
        self.forwards.insert(qualified_name.to_string(), target.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, qualified_name: &str) -> Option<&RuntimeType> {
        self.types.get(qualified_name)
    }

    pub fn types(&self) -> impl Iterator<Item = &RuntimeType> {
        self.types.values()
    }
}

/// In-memory set of assemblies.
#[derive(Debug, Clone, Default)]
pub struct Assemblies {
    assemblies: BTreeMap<Arc<str>, Assembly>,
}

const MAX_FORWARDS: usize = 8;

impl Assemblies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assembly, replacing any previous one with the same name.
    pub fn register(&mut self, assembly: Assembly) {
        self.assemblies.insert(assembly.name.clone(), assembly);
    }

    pub fn with(mut self, assembly: Assembly) -> Self {
        self.register(assembly);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Assembly> {
        self.assemblies.get(name)
    }

    /// Non-generic lookup through the resolver path.
    pub fn lookup(&self, assembly: &str, qualified_name: &str) -> Option<RuntimeType> {
        self.resolve(assembly, qualified_name, &[]).ok()
    }

    fn find(&self, assembly: &str, qualified_name: &str) -> Result<RuntimeType, ResolveError> {
        let mut current = assembly;
        for _ in 0..MAX_FORWARDS {
            let asm = self
                .assemblies
                .get(current)
                .ok_or_else(|| ResolveError::AssemblyNotFound(current.to_string()))?;
            if let Some(reason) = &asm.load_failure {
                return Err(ResolveError::AssemblyLoad {
                    assembly: current.to_string(),
                    reason: reason.to_string(),
                });
            }
            if let Some(ty) = asm.types.get(qualified_name) {
                return Ok(ty.clone());
            }
            match asm.forwards.get(qualified_name) {
                Some(target) => current = target.as_ref(),
                None => break,
            }
        }
        Err(ResolveError::TypeNotFound {
            assembly: assembly.to_string(),
            name: qualified_name.to_string(),
        })
    }
}

impl TypeResolver for Assemblies {
    fn resolve(
        &self,
        assembly: &str,
        qualified_name: &str,
        generic_arguments: &[RuntimeType],
    ) -> Result<RuntimeType, ResolveError> {
        let ty = self.find(assembly, qualified_name)?;
        if generic_arguments.is_empty() {
            Ok(ty)
        } else {
            Ok(ty.make_generic(generic_arguments)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::library::{names, reference_assemblies};
    use anyhow::Result;

    fn runtime_symbol(namespace: &str, name: &str, args: Vec<TypeSymbol>) -> TypeSymbol {
        TypeSymbol::generic(namespace, name, names::RUNTIME_FACADE, args)
    }

    #[test]
    fn loads_through_forwards() -> Result<()> {
        let assemblies = reference_assemblies()?;
        let string = runtime_symbol("System", "String", vec![]);
        let ty = load_type(&string, &assemblies).unwrap();
        assert_eq!(ty.full_name(), "System.String");
        assert_eq!(ty.assembly(), names::CORE_LIBRARY);
        Ok(())
    }

    #[test]
    fn loads_constructed_generics() -> Result<()> {
        let assemblies = reference_assemblies()?;
        let string = runtime_symbol("System", "String", vec![]);
        let list = runtime_symbol("System.Collections.Generic", "List", vec![string]);
        let ty = load_type(&list, &assemblies).unwrap();
        assert!(ty.is_constructed_generic_type());
        assert_eq!(ty.generic_arguments()[0].full_name(), "System.String");
        Ok(())
    }

    #[test]
    fn unresolvable_argument_fails_whole_type() -> Result<()> {
        let assemblies = reference_assemblies()?;
        let user = TypeSymbol::named("TestCase", "TestType", "Test0");
        let list = runtime_symbol("System.Collections.Generic", "List", vec![user.clone()]);
        assert!(load_type(&user, &assemblies).is_none());
        assert!(load_type(&list, &assemblies).is_none());
        assert!(load_type(&TypeSymbol::type_parameter("T"), &assemblies).is_none());
        Ok(())
    }

    #[test]
    fn reports_load_failures() -> Result<()> {
        let assemblies = reference_assemblies()?.with(Assembly::unloadable("Broken", "bad image"));
        assert_eq!(
            assemblies.resolve("Broken", "Broken.Type", &[]),
            Err(ResolveError::AssemblyLoad {
                assembly: "Broken".to_string(),
                reason: "bad image".to_string()
            })
        );
        assert_eq!(
            assemblies.resolve("Missing", "Missing.Type", &[]),
            Err(ResolveError::AssemblyNotFound("Missing".to_string()))
        );
        assert!(matches!(
            assemblies.resolve(names::CORE_LIBRARY, "System.Nope", &[]),
            Err(ResolveError::TypeNotFound { .. })
        ));
        let broken = TypeSymbol::named("Broken", "Type", "Broken");
        assert!(load_type(&broken, &assemblies).is_none());
        Ok(())
    }

    #[test]
    fn forwarding_cycles_terminate() {
        let assemblies = Assemblies::new()
            .with(Assembly::new("A").with_forward("X.Y", "B"))
            .with(Assembly::new("B").with_forward("X.Y", "A"));
        assert!(matches!(
            assemblies.resolve("A", "X.Y", &[]),
            Err(ResolveError::TypeNotFound { .. })
        ));
    }
}
