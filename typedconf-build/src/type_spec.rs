//! The aggregate specification of the generated struct.

use std::collections::{BTreeMap, BTreeSet};

use crate::extract::TypeRef;
use crate::names::ItemPath;
use crate::property::PropertySpec;

/// Traits to implement, their properties and their type-level validators,
/// keyed by declaration.
///
/// `TypeSpec` is a monoid under [`combine`](TypeSpec::combine) with
/// [`empty`](TypeSpec::empty) as identity, so specs built per declaration
/// can be merged in any grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSpec {
    super_interfaces: BTreeSet<ItemPath>,
    properties: BTreeMap<ItemPath, Vec<PropertySpec>>,
    validators: BTreeMap<ItemPath, Vec<TypeRef>>,
}

impl TypeSpec {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The spec of a single declaration.
    pub fn single(declaration: ItemPath, properties: Vec<PropertySpec>, validators: Vec<TypeRef>) -> Self {
        Self {
            super_interfaces: BTreeSet::from([declaration.clone()]),
            properties: BTreeMap::from([(declaration.clone(), properties)]),
            validators: BTreeMap::from([(declaration, validators)]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.super_interfaces.is_empty() && self.properties.is_empty() && self.validators.is_empty()
    }

    /// Union of both specs. Entries of `other` win on key collisions, which
    /// keying by declaration rules out in practice.
    pub fn combine(mut self, other: TypeSpec) -> TypeSpec {
        if self.is_empty() {
            return other;
        }
        self.super_interfaces.extend(other.super_interfaces);
        self.properties.extend(other.properties);
        self.validators.extend(other.validators);
        self
    }

    pub fn super_interfaces(&self) -> &BTreeSet<ItemPath> {
        &self.super_interfaces
    }

    /// Properties of one declaration, in declaration order.
    pub fn properties_of(&self, declaration: &ItemPath) -> &[PropertySpec] {
        self.properties.get(declaration).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every property, grouped by declaration in name order.
    pub fn properties(&self) -> impl Iterator<Item = (&ItemPath, &PropertySpec)> {
        self.properties
            .iter()
            .flat_map(|(declaration, properties)| properties.iter().map(move |property| (declaration, property)))
    }

    /// Declarations with at least one type-level validator.
    pub fn validators(&self) -> impl Iterator<Item = (&ItemPath, &[TypeRef])> {
        self.validators
            .iter()
            .filter(|(_, validators)| !validators.is_empty())
            .map(|(declaration, validators)| (declaration, validators.as_slice()))
    }
}
