//! Structural and navigation properties

use crate::annotation::Annotation;
use crate::arena::Id;
use crate::edm::Edm;
use crate::type_info::{EdmType, TypeInfo, TypeRef};
use crate::types::{EntityType, StructuredType};
use crate::{Error, Result};
use edm_csdl::{
    CsdlFacets, CsdlNavigationProperty, CsdlProperty, CsdlPropertyRef, CsdlReferentialConstraint,
    QualifiedName,
};
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// Structural property of an entity or complex type
#[derive(Debug)]
pub struct Property {
    name: String,
    owner: QualifiedName,
    type_info: TypeInfo,
    nullable: bool,
    facets: CsdlFacets,
    default_value: Option<String>,
    mime_type: Option<String>,
    annotations: Vec<Arc<Annotation>>,
    resolved: OnceLock<TypeRef>,
}

impl Property {
    pub(crate) fn from_csdl(owner: &QualifiedName, record: &CsdlProperty) -> Result<Self> {
        let type_info = TypeInfo::parse(&record.type_name).map_err(|e| {
            Error::definition(format!("Property {} of {}: {}", record.name, owner, e))
        })?;
        Ok(Self {
            name: record.name.clone(),
            owner: owner.clone(),
            type_info,
            nullable: record.nullable,
            facets: record.facets.clone(),
            default_value: record.default_value.clone(),
            mime_type: record.mime_type.clone(),
            annotations: Annotation::from_csdl_list(&record.annotations)?,
            resolved: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type that declares this property
    pub fn owner(&self) -> &QualifiedName {
        &self.owner
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    pub fn is_collection(&self) -> bool {
        self.type_info.is_collection()
    }

    pub fn is_primitive(&self) -> bool {
        self.type_info.is_primitive()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn facets(&self) -> &CsdlFacets {
        &self.facets
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Annotations declared inline on the property
    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    /// Annotation target string, `Namespace.Type/Property`
    pub fn target_path(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// The declared type; unresolvable types are a definition error
    pub fn ty(&self, edm: &Edm) -> Result<EdmType> {
        if let Some(type_ref) = self.resolved.get() {
            return edm.materialize(*type_ref);
        }
        match self.type_info.resolve_ref(edm)? {
            Some(type_ref) => {
                let _ = self.resolved.set(type_ref);
                edm.materialize(type_ref)
            }
            None => {
                warn!(property = %self.target_path(), "unresolvable property type");
                Err(Error::definition(format!(
                    "Cannot find type with name: {} for property {}",
                    self.type_info.name(),
                    self.target_path()
                )))
            }
        }
    }
}

/// Navigation property of an entity or complex type
#[derive(Debug)]
pub struct NavigationProperty {
    name: String,
    owner: QualifiedName,
    type_info: TypeInfo,
    nullable: bool,
    contains_target: bool,
    partner: Option<String>,
    referential_constraints: Vec<CsdlReferentialConstraint>,
    annotations: Vec<Arc<Annotation>>,
    target: OnceLock<Id<EntityType>>,
}

impl NavigationProperty {
    pub(crate) fn from_csdl(
        owner: &QualifiedName,
        record: &CsdlNavigationProperty,
    ) -> Result<Self> {
        let type_info = TypeInfo::parse(&record.type_name).map_err(|e| {
            Error::definition(format!(
                "Navigation property {} of {}: {}",
                record.name, owner, e
            ))
        })?;
        Ok(Self {
            name: record.name.clone(),
            owner: owner.clone(),
            type_info,
            nullable: record.nullable,
            contains_target: record.contains_target,
            partner: record.partner.clone(),
            referential_constraints: record.referential_constraints.clone(),
            annotations: Annotation::from_csdl_list(&record.annotations)?,
            target: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &QualifiedName {
        &self.owner
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    pub fn is_collection(&self) -> bool {
        self.type_info.is_collection()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn contains_target(&self) -> bool {
        self.contains_target
    }

    /// Declared partner path, `Nav` or `Nav/Nav`
    pub fn partner_path(&self) -> Option<&str> {
        self.partner.as_deref()
    }

    pub fn referential_constraints(&self) -> &[CsdlReferentialConstraint] {
        &self.referential_constraints
    }

    /// Dependent property that references the given principal property
    pub fn referencing_property_name(&self, referenced_property: &str) -> Option<&str> {
        self.referential_constraints
            .iter()
            .find(|c| c.referenced_property == referenced_property)
            .map(|c| c.property.as_str())
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    pub fn target_path(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Entity type the property navigates to
    pub fn target_type(&self, edm: &Edm) -> Result<Arc<EntityType>> {
        if let Some(id) = self.target.get() {
            return edm.entity_type_by_id(*id);
        }
        match edm.entity_type_id(self.type_info.name())? {
            Some(id) => {
                let _ = self.target.set(id);
                edm.entity_type_by_id(id)
            }
            None => {
                warn!(navigation = %self.target_path(), "unresolvable navigation target");
                Err(Error::definition(format!(
                    "Cannot find entity type with name: {} for navigation property {}",
                    self.type_info.name(),
                    self.target_path()
                )))
            }
        }
    }

    /// Follow the partner path through navigation properties of the target
    pub fn partner(&self, edm: &Edm) -> Result<Option<Arc<NavigationProperty>>> {
        let Some(path) = &self.partner else {
            return Ok(None);
        };

        let mut current_type = self.target_type(edm)?;
        let mut found = None;
        for segment in path.split('/') {
            let navigation = current_type
                .navigation_property(edm, segment)?
                .ok_or_else(|| {
                    Error::definition(format!(
                        "Cannot find navigation property with name: {} at type {}",
                        segment,
                        current_type.name()
                    ))
                })?;
            current_type = navigation.target_type(edm)?;
            found = Some(navigation);
        }
        Ok(found)
    }
}

/// Either kind of property, as returned by a combined lookup
#[derive(Debug, Clone)]
pub enum PropertyRef {
    Structural(Arc<Property>),
    Navigation(Arc<NavigationProperty>),
}

impl PropertyRef {
    pub fn name(&self) -> &str {
        match self {
            PropertyRef::Structural(p) => p.name(),
            PropertyRef::Navigation(p) => p.name(),
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, PropertyRef::Navigation(_))
    }
}

/// Key property reference of an entity type
///
/// The name may be a path into complex properties (`Address/Zip`); such
/// keys are addressed by their alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPropertyRef {
    name: String,
    alias: Option<String>,
    owner: QualifiedName,
}

impl KeyPropertyRef {
    pub(crate) fn from_csdl(owner: &QualifiedName, record: &CsdlPropertyRef) -> Self {
        Self {
            name: record.name.clone(),
            alias: record.alias.clone(),
            owner: owner.clone(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Entity type that declares the key
    pub fn owner(&self) -> &QualifiedName {
        &self.owner
    }

    /// Name used in key predicates: the alias if present, else the name
    pub fn key_predicate_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Whether `name` addresses this key, by alias or by raw name
    pub fn matches(&self, name: &str) -> bool {
        self.alias.as_deref() == Some(name) || self.name == name
    }

    /// The structural property the key refers to, following complex paths
    pub fn property(&self, edm: &Edm) -> Result<Arc<Property>> {
        let owner = edm.entity_type(&self.owner)?.ok_or_else(|| {
            Error::definition(format!("Cannot find entity type with name: {}", self.owner))
        })?;

        let missing = |segment: &str| {
            Error::definition(format!(
                "Invalid key property ref specified. Cannot find property with name: {} in key {} of {}",
                segment, self.name, self.owner
            ))
        };

        let mut segments = self.name.split('/');
        let first = segments.next().unwrap_or_default();
        let mut property = owner
            .structural_property(edm, first)?
            .ok_or_else(|| missing(first))?;

        for segment in segments {
            let next = match property.ty(edm)? {
                EdmType::Complex(complex) => complex.structural_property(edm, segment)?,
                EdmType::Entity(entity) => entity.structural_property(edm, segment)?,
                _ => None,
            };
            property = next.ok_or_else(|| missing(segment))?;
        }
        Ok(property)
    }
}
