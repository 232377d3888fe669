// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Runtime-reflected type and method descriptors, and the loader that maps
//! compile-time symbols onto them.

mod error;
pub mod library;
mod method;
mod resolver;
mod types;

pub use error::{ResolveError, RuntimeTypeError};
pub use method::RuntimeMethod;
pub use resolver::{load_type, Assemblies, Assembly, TypeResolver};
pub use types::{RuntimeType, TypeBuilder, TypeFlavor};
