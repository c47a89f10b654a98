//! Complex types

use crate::annotation::Annotation;
use crate::arena::Id;
use crate::edm::Edm;
use crate::types::{build_properties, NavigationPropertyMap, PropertyMap, StructuredType, TypeKind};
use crate::{Error, Result};
use edm_csdl::{CsdlComplexType, QualifiedName};
use std::sync::{Arc, OnceLock};

/// Resolved complex type
#[derive(Debug)]
pub struct ComplexType {
    name: QualifiedName,
    base_name: Option<QualifiedName>,
    base: OnceLock<Id<ComplexType>>,
    is_abstract: bool,
    open_type: bool,
    properties: PropertyMap,
    navigation_properties: NavigationPropertyMap,
    annotations: Vec<Arc<Annotation>>,
}

impl ComplexType {
    pub(crate) fn from_csdl(name: QualifiedName, record: &CsdlComplexType) -> Result<Self> {
        let (properties, navigation_properties) =
            build_properties(&name, &record.properties, &record.navigation_properties)?;
        Ok(Self {
            base_name: record.base_type.clone(),
            base: OnceLock::new(),
            is_abstract: record.is_abstract,
            open_type: record.open_type,
            properties,
            navigation_properties,
            annotations: Annotation::from_csdl_list(&record.annotations)?,
            name,
        })
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }
}

impl StructuredType for ComplexType {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Complex
    }

    fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    fn is_open_type(&self) -> bool {
        self.open_type
    }

    fn base_type_name(&self) -> Option<&QualifiedName> {
        self.base_name.as_ref()
    }

    fn declared_properties(&self) -> &PropertyMap {
        &self.properties
    }

    fn declared_navigation_properties(&self) -> &NavigationPropertyMap {
        &self.navigation_properties
    }

    fn lookup(edm: &Edm, name: &QualifiedName) -> Result<Option<Arc<Self>>> {
        edm.complex_type(name)
    }

    fn base_type(&self, edm: &Edm) -> Result<Option<Arc<Self>>> {
        let Some(base_name) = &self.base_name else {
            return Ok(None);
        };
        if let Some(id) = self.base.get() {
            return edm.complex_type_by_id(*id).map(Some);
        }
        match edm.complex_type_id(base_name)? {
            Some(id) => {
                let _ = self.base.set(id);
                edm.complex_type_by_id(id).map(Some)
            }
            None => Err(Error::definition(format!(
                "Cannot find base type with name: {} for complex type {}",
                base_name, self.name
            ))),
        }
    }
}
