//! Behavior shared by entity and complex types

use crate::edm::Edm;
use crate::property::{NavigationProperty, Property, PropertyRef};
use crate::types::{NavigationPropertyMap, PropertyMap, TypeKind};
use crate::{Error, Result};
use edm_csdl::QualifiedName;
use indexmap::IndexSet;
use std::collections::HashSet;
use std::sync::Arc;

/// An entity or complex type
///
/// Implementors supply their own declarations and a base-type link; the
/// provided methods walk the base chain. Own declarations shadow inherited
/// ones of the same name.
pub trait StructuredType: Sized {
    fn name(&self) -> &QualifiedName;

    fn kind(&self) -> TypeKind;

    fn is_abstract(&self) -> bool;

    fn is_open_type(&self) -> bool;

    fn base_type_name(&self) -> Option<&QualifiedName>;

    /// Properties declared by this type alone, in declaration order
    fn declared_properties(&self) -> &PropertyMap;

    fn declared_navigation_properties(&self) -> &NavigationPropertyMap;

    /// Look up a type of the same kind by name
    fn lookup(edm: &Edm, name: &QualifiedName) -> Result<Option<Arc<Self>>>;

    /// The direct base type; a base name that does not resolve to a type of
    /// the same kind is a definition error
    fn base_type(&self, edm: &Edm) -> Result<Option<Arc<Self>>>;

    /// Base types, nearest first
    ///
    /// A cycle, or a chain longer than the configured depth, is an
    /// inheritance error.
    fn ancestors(&self, edm: &Edm) -> Result<Vec<Arc<Self>>> {
        let max_depth = edm.config().max_inheritance_depth;
        let mut visited = HashSet::from([self.name().clone()]);
        let mut chain: Vec<Arc<Self>> = Vec::new();
        let mut next = self.base_type(edm)?;

        while let Some(base) = next {
            if !visited.insert(base.name().clone()) {
                return Err(Error::inheritance(format!(
                    "Cyclic base type chain: {} reaches {} again",
                    self.name(),
                    base.name()
                )));
            }
            if chain.len() >= max_depth {
                return Err(Error::inheritance(format!(
                    "Base type chain of {} is deeper than {} levels",
                    self.name(),
                    max_depth
                )));
            }
            next = base.base_type(edm)?;
            chain.push(base);
        }
        Ok(chain)
    }

    /// Structural property by name, own first, then the base chain
    fn structural_property(&self, edm: &Edm, name: &str) -> Result<Option<Arc<Property>>> {
        if let Some(property) = self.declared_properties().get(name) {
            return Ok(Some(property.clone()));
        }
        if self.base_type_name().is_none() {
            return Ok(None);
        }
        Ok(self
            .ancestors(edm)?
            .iter()
            .find_map(|base| base.declared_properties().get(name).cloned()))
    }

    /// Navigation property by name, own first, then the base chain
    fn navigation_property(
        &self,
        edm: &Edm,
        name: &str,
    ) -> Result<Option<Arc<NavigationProperty>>> {
        if let Some(property) = self.declared_navigation_properties().get(name) {
            return Ok(Some(property.clone()));
        }
        if self.base_type_name().is_none() {
            return Ok(None);
        }
        Ok(self
            .ancestors(edm)?
            .iter()
            .find_map(|base| base.declared_navigation_properties().get(name).cloned()))
    }

    /// Structural or navigation property by name
    fn property(&self, edm: &Edm, name: &str) -> Result<Option<PropertyRef>> {
        if let Some(property) = self.structural_property(edm, name)? {
            return Ok(Some(PropertyRef::Structural(property)));
        }
        Ok(self
            .navigation_property(edm, name)?
            .map(PropertyRef::Navigation))
    }

    /// Every structural property name, base types first
    ///
    /// A name redeclared by a derived type appears once, at the position of
    /// its first declaration.
    fn property_names(&self, edm: &Edm) -> Result<Vec<String>> {
        let ancestors = self.ancestors(edm)?;
        let mut names = IndexSet::new();
        for base in ancestors.iter().rev() {
            names.extend(base.declared_properties().keys().cloned());
        }
        names.extend(self.declared_properties().keys().cloned());
        Ok(names.into_iter().collect())
    }

    /// Every navigation property name, base types first
    fn navigation_property_names(&self, edm: &Edm) -> Result<Vec<String>> {
        let ancestors = self.ancestors(edm)?;
        let mut names = IndexSet::new();
        for base in ancestors.iter().rev() {
            names.extend(base.declared_navigation_properties().keys().cloned());
        }
        names.extend(self.declared_navigation_properties().keys().cloned());
        Ok(names.into_iter().collect())
    }

    /// Whether this type is `target` or derives from it
    ///
    /// A target name with no definition of the same kind is an error.
    fn compatible_to(&self, edm: &Edm, target: &QualifiedName) -> Result<bool> {
        let target = Self::lookup(edm, target)?.ok_or_else(|| {
            Error::definition(format!(
                "Cannot find target {} with name: {}",
                self.kind(),
                target
            ))
        })?;
        if self.name() == target.name() {
            return Ok(true);
        }
        Ok(self
            .ancestors(edm)?
            .iter()
            .any(|base| base.name() == target.name()))
    }
}
