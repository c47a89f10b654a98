//! Entity types

use crate::annotation::Annotation;
use crate::arena::Id;
use crate::edm::Edm;
use crate::property::KeyPropertyRef;
use crate::types::{build_properties, NavigationPropertyMap, PropertyMap, StructuredType, TypeKind};
use crate::{Error, Result};
use edm_csdl::{CsdlEntityType, QualifiedName};
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Resolved entity type
#[derive(Debug)]
pub struct EntityType {
    name: QualifiedName,
    base_name: Option<QualifiedName>,
    base: OnceLock<Id<EntityType>>,
    is_abstract: bool,
    open_type: bool,
    has_stream: bool,
    declared_keys: Vec<Arc<KeyPropertyRef>>,
    properties: PropertyMap,
    navigation_properties: NavigationPropertyMap,
    annotations: Vec<Arc<Annotation>>,
    keys: OnceLock<Vec<Arc<KeyPropertyRef>>>,
}

impl EntityType {
    /// Wrap a record; links to other types are resolved later, on demand
    pub(crate) fn from_csdl(name: QualifiedName, record: &CsdlEntityType) -> Result<Self> {
        let (properties, navigation_properties) =
            build_properties(&name, &record.properties, &record.navigation_properties)?;
        let declared_keys = record
            .key
            .iter()
            .map(|key| Arc::new(KeyPropertyRef::from_csdl(&name, key)))
            .collect();
        Ok(Self {
            base_name: record.base_type.clone(),
            base: OnceLock::new(),
            is_abstract: record.is_abstract,
            open_type: record.open_type,
            has_stream: record.has_stream,
            declared_keys,
            properties,
            navigation_properties,
            annotations: Annotation::from_csdl_list(&record.annotations)?,
            keys: OnceLock::new(),
            name,
        })
    }

    /// Key refs declared by this type alone
    pub fn declared_key_property_refs(&self) -> &[Arc<KeyPropertyRef>] {
        &self.declared_keys
    }

    /// Effective key of the type
    ///
    /// Keys come from the root of the base chain downward. A type's own key
    /// replaces the inherited one when its base is abstract or supplies no
    /// key; otherwise the inherited key stands. Computed once.
    pub fn key_property_refs(&self, edm: &Edm) -> Result<Vec<Arc<KeyPropertyRef>>> {
        if let Some(keys) = self.keys.get() {
            return Ok(keys.clone());
        }

        let ancestors = self.ancestors(edm)?;
        let mut effective: Vec<Arc<KeyPropertyRef>> = Vec::new();
        let mut base_is_abstract: Option<bool> = None;
        let levels = ancestors
            .iter()
            .rev()
            .map(|base| (base.is_abstract, &base.declared_keys))
            .chain(std::iter::once((self.is_abstract, &self.declared_keys)));

        for (is_abstract, own) in levels {
            let own_wins = match base_is_abstract {
                None => true,
                Some(abstract_base) => !own.is_empty() && (abstract_base || effective.is_empty()),
            };
            if own_wins {
                effective = own.clone();
            }
            base_is_abstract = Some(is_abstract);
        }

        trace!(entity_type = %self.name, keys = effective.len(), "resolved key");
        let _ = self.keys.set(effective.clone());
        Ok(effective)
    }

    /// Key ref addressed by alias or by raw name
    pub fn key_property_ref(&self, edm: &Edm, name: &str) -> Result<Option<Arc<KeyPropertyRef>>> {
        Ok(self
            .key_property_refs(edm)?
            .into_iter()
            .find(|key| key.matches(name)))
    }

    /// Names used in key predicates: alias if present, else the name
    pub fn key_predicate_names(&self, edm: &Edm) -> Result<Vec<String>> {
        Ok(self
            .key_property_refs(edm)?
            .iter()
            .map(|key| key.key_predicate_name().to_string())
            .collect())
    }

    /// Whether the type or any base type is a media entity
    pub fn has_stream(&self, edm: &Edm) -> Result<bool> {
        if self.has_stream {
            return Ok(true);
        }
        if self.base_name.is_none() {
            return Ok(false);
        }
        Ok(self.ancestors(edm)?.iter().any(|base| base.has_stream))
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }
}

impl StructuredType for EntityType {
    fn name(&self) -> &QualifiedName {
        &self.name
    }

    fn kind(&self) -> TypeKind {
        TypeKind::Entity
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
        edm.entity_type(name)
    }

    fn base_type(&self, edm: &Edm) -> Result<Option<Arc<Self>>> {
        let Some(base_name) = &self.base_name else {
            return Ok(None);
        };
        if let Some(id) = self.base.get() {
            return edm.entity_type_by_id(*id).map(Some);
        }
        match edm.entity_type_id(base_name)? {
            Some(id) => {
                let _ = self.base.set(id);
                edm.entity_type_by_id(id).map(Some)
            }
            None => Err(Error::definition(format!(
                "Cannot find base type with name: {} for entity type {}",
                base_name, self.name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edm_csdl::{CsdlNavigationProperty, CsdlProperty};

    #[test]
    fn test_from_csdl_keeps_declaration_order() {
        let record = CsdlEntityType::new("Order")
            .with_key(["Id"])
            .with_property(CsdlProperty::new("Id", "Edm.Int32").nullable(false))
            .with_property(CsdlProperty::new("Placed", "Edm.DateTimeOffset"))
            .with_property(CsdlProperty::new("Total", "Edm.Decimal"))
            .with_navigation_property(CsdlNavigationProperty::new("Lines", "Collection(NS.Line)"));
        let order = EntityType::from_csdl(QualifiedName::new("NS", "Order"), &record).unwrap();

        let names: Vec<&str> = order.declared_properties().keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Id", "Placed", "Total"]);
        assert!(order.declared_navigation_properties()["Lines"].is_collection());
        assert_eq!(order.declared_key_property_refs()[0].name(), "Id");
        assert_eq!(order.declared_key_property_refs()[0].owner(), order.name());
    }

    #[test]
    fn test_duplicate_property_is_rejected() {
        let record = CsdlEntityType::new("Order")
            .with_property(CsdlProperty::new("Id", "Edm.Int32"))
            .with_property(CsdlProperty::new("Id", "Edm.String"));
        let result = EntityType::from_csdl(QualifiedName::new("NS", "Order"), &record);
        assert!(matches!(result, Err(Error::Definition(_))));
    }

    #[test]
    fn test_bad_property_type_is_rejected() {
        let record =
            CsdlEntityType::new("Order").with_property(CsdlProperty::new("Id", "Collection("));
        assert!(EntityType::from_csdl(QualifiedName::new("NS", "Order"), &record).is_err());
    }
}
