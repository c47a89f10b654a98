//! Type definitions

use crate::annotation::Annotation;
use crate::primitive::PrimitiveTypeKind;
use crate::{Error, Result};
use edm_csdl::{CsdlFacets, CsdlTypeDefinition, QualifiedName};
use std::sync::Arc;

/// Named primitive type with fixed facets
#[derive(Debug)]
pub struct TypeDefinition {
    name: QualifiedName,
    underlying_type: PrimitiveTypeKind,
    facets: CsdlFacets,
    annotations: Vec<Arc<Annotation>>,
}

impl TypeDefinition {
    pub(crate) fn from_csdl(name: QualifiedName, record: &CsdlTypeDefinition) -> Result<Self> {
        let underlying_type = PrimitiveTypeKind::from_name(&record.underlying_type)
            .ok_or_else(|| {
                Error::definition(format!(
                    "Invalid underlying type {} for type definition {}",
                    record.underlying_type, name
                ))
            })?;
        Ok(Self {
            underlying_type,
            facets: record.facets.clone(),
            annotations: Annotation::from_csdl_list(&record.annotations)?,
            name,
        })
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn underlying_type(&self) -> PrimitiveTypeKind {
        self.underlying_type
    }

    pub fn facets(&self) -> &CsdlFacets {
        &self.facets
    }

    pub fn max_length(&self) -> Option<u32> {
        self.facets.max_length
    }

    pub fn precision(&self) -> Option<u32> {
        self.facets.precision
    }

    pub fn scale(&self) -> Option<u32> {
        self.facets.scale
    }

    pub fn srid(&self) -> Option<&str> {
        self.facets.srid.as_deref()
    }

    pub fn is_unicode(&self) -> Option<bool> {
        self.facets.unicode
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underlying_type_must_be_primitive() {
        let record = CsdlTypeDefinition::new("Code", "NS.Address");
        assert!(TypeDefinition::from_csdl(QualifiedName::new("NS", "Code"), &record).is_err());
    }

    #[test]
    fn test_facets_are_kept() {
        let record = CsdlTypeDefinition::new("Code", "Edm.String").with_facets(CsdlFacets {
            max_length: Some(8),
            unicode: Some(false),
            ..CsdlFacets::default()
        });
        let code = TypeDefinition::from_csdl(QualifiedName::new("NS", "Code"), &record).unwrap();
        assert_eq!(code.underlying_type(), PrimitiveTypeKind::String);
        assert_eq!(code.max_length(), Some(8));
        assert_eq!(code.is_unicode(), Some(false));
    }
}
