//! Type nodes
//!
//! Entity and complex types share their property and base-chain behavior
//! through the [`StructuredType`] trait. Enumerations and type definitions
//! are leaf types with no links to other nodes.

mod complex;
mod definition;
mod entity;
mod enumeration;
mod structured;

pub use complex::ComplexType;
pub use definition::TypeDefinition;
pub use entity::EntityType;
pub use enumeration::{EnumMember, EnumType};
pub use structured::StructuredType;

use crate::property::{NavigationProperty, Property};
use crate::{Error, Result};
use edm_csdl::{CsdlNavigationProperty, CsdlProperty, QualifiedName};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Kind of a resolved type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Definition,
    Enum,
    Complex,
    Entity,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TypeKind::Primitive => "primitive type",
            TypeKind::Definition => "type definition",
            TypeKind::Enum => "enum type",
            TypeKind::Complex => "complex type",
            TypeKind::Entity => "entity type",
        };
        f.write_str(text)
    }
}

pub type PropertyMap = IndexMap<String, Arc<Property>>;
pub type NavigationPropertyMap = IndexMap<String, Arc<NavigationProperty>>;

/// Build the declared property maps of a structured type
pub(crate) fn build_properties(
    owner: &QualifiedName,
    properties: &[CsdlProperty],
    navigation_properties: &[CsdlNavigationProperty],
) -> Result<(PropertyMap, NavigationPropertyMap)> {
    let mut structural = PropertyMap::with_capacity(properties.len());
    for record in properties {
        let property = Property::from_csdl(owner, record)?;
        if structural
            .insert(record.name.clone(), Arc::new(property))
            .is_some()
        {
            return Err(Error::definition(format!(
                "Duplicate property {} in {}",
                record.name, owner
            )));
        }
    }

    let mut navigation = NavigationPropertyMap::with_capacity(navigation_properties.len());
    for record in navigation_properties {
        if structural.contains_key(&record.name) {
            return Err(Error::definition(format!(
                "Navigation property {} in {} clashes with a structural property",
                record.name, owner
            )));
        }
        let property = NavigationProperty::from_csdl(owner, record)?;
        if navigation
            .insert(record.name.clone(), Arc::new(property))
            .is_some()
        {
            return Err(Error::definition(format!(
                "Duplicate navigation property {} in {}",
                record.name, owner
            )));
        }
    }

    Ok((structural, navigation))
}
