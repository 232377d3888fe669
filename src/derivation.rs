// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Memoized "is, or derives from" queries over runtime types.

use crate::runtime::RuntimeType;

use dashmap::DashMap;

/// Concurrent cache of derivation results keyed by `(candidate, ancestor)`.
///
/// Entries are never invalidated: runtime types do not change for the life
/// of the process. Two threads asking the same question may both compute the
/// answer; the first insert wins and both observe the same value.
#[derive(Debug, Default)]
pub struct DerivationCache {
    entries: DashMap<(RuntimeType, RuntimeType), bool>,
}

impl DerivationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `ty` is `ancestor`, inherits from it, or implements it.
    ///
    /// `ancestor` may be an open generic definition such as ``IEnumerable`1``,
    /// in which case any instantiation of it counts.
    pub fn derives_from(&self, ty: &RuntimeType, ancestor: &RuntimeType) -> bool {
        let key = (ty.clone(), ancestor.clone());
        if let Some(hit) = self.entries.get(&key) {
            return *hit;
        }
        let result = derives_from_uncached(ty, ancestor);
        *self.entries.entry(key).or_insert(result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn derives_from_uncached(ty: &RuntimeType, ancestor: &RuntimeType) -> bool {
    if ty == ancestor || ancestor.is_universal_base() {
        return true;
    }
    if ancestor.is_constructed_generic_type() || !ancestor.is_generic_type() {
        return ancestor.is_assignable_from(ty);
    }

    let candidates: Vec<RuntimeType> = if ancestor.is_interface() {
        core::iter::once(ty.clone())
            .chain(ty.implemented_interfaces())
            .collect()
    } else {
        ty.base_types().collect()
    };

    candidates
        .iter()
        .filter(|candidate| candidate.is_generic_type())
        .filter_map(RuntimeType::generic_type_definition)
        .any(|definition| &definition == ancestor)
}
