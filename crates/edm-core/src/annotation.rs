//! Terms, annotations and annotation targets
//!
//! Annotation targets are strings of the form `Base[/Path]`. [`resolve_target`]
//! turns one into the model element it names, trying element kinds in a
//! fixed order; see [`AnnotationTarget`].

use crate::arena::Id;
use crate::container::{ActionImport, BindingTarget, EntityContainer, FunctionImport};
use crate::edm::Edm;
use crate::property::{NavigationProperty, Property, PropertyRef};
use crate::type_info::{EdmType, TypeInfo, TypeRef};
use crate::types::{ComplexType, EntityType, EnumMember, EnumType, StructuredType, TypeDefinition};
use crate::{Error, Result};
use edm_csdl::{
    CsdlAnnotation, CsdlAnnotations, CsdlConstantKind, CsdlExpression, CsdlFacets, CsdlPathKind,
    CsdlTerm, QualifiedName,
};
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace};

/// Vocabulary term
#[derive(Debug)]
pub struct Term {
    name: QualifiedName,
    type_info: TypeInfo,
    base_name: Option<QualifiedName>,
    base: OnceLock<Id<Term>>,
    applies_to: Vec<String>,
    default_value: Option<String>,
    nullable: bool,
    facets: CsdlFacets,
    annotations: Vec<Arc<Annotation>>,
    resolved: OnceLock<TypeRef>,
}

impl Term {
    pub(crate) fn from_csdl(name: QualifiedName, record: &CsdlTerm) -> Result<Self> {
        let type_info = TypeInfo::parse(&record.type_name)
            .map_err(|e| Error::definition(format!("Term {}: {}", name, e)))?;
        Ok(Self {
            type_info,
            base_name: record.base_term.clone(),
            base: OnceLock::new(),
            applies_to: record.applies_to.clone(),
            default_value: record.default_value.clone(),
            nullable: record.nullable,
            facets: record.facets.clone(),
            annotations: Annotation::from_csdl_list(&record.annotations)?,
            resolved: OnceLock::new(),
            name,
        })
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    /// Element kinds the term may be applied to; empty means any
    pub fn applies_to(&self) -> &[String] {
        &self.applies_to
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn facets(&self) -> &CsdlFacets {
        &self.facets
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    pub fn ty(&self, edm: &Edm) -> Result<EdmType> {
        if let Some(type_ref) = self.resolved.get() {
            return edm.materialize(*type_ref);
        }
        let type_ref = self.type_info.resolve_ref(edm)?.ok_or_else(|| {
            Error::definition(format!(
                "Cannot find type with name: {} for term {}",
                self.type_info.name(),
                self.name
            ))
        })?;
        let _ = self.resolved.set(type_ref);
        edm.materialize(type_ref)
    }

    /// The term this one specializes; a missing base is a definition error
    pub fn base_term(&self, edm: &Edm) -> Result<Option<Arc<Term>>> {
        let Some(base_name) = &self.base_name else {
            return Ok(None);
        };
        if let Some(id) = self.base.get() {
            return edm.term_by_id(*id).map(Some);
        }
        match edm.term_id(base_name)? {
            Some(id) => {
                let _ = self.base.set(id);
                edm.term_by_id(id).map(Some)
            }
            None => Err(Error::definition(format!(
                "Cannot find base term with name: {} for term {}",
                base_name, self.name
            ))),
        }
    }
}

/// Application of a term to a model element
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    term: QualifiedName,
    qualifier: Option<String>,
    expression: Option<Expression>,
    annotations: Vec<Arc<Annotation>>,
}

impl Annotation {
    pub(crate) fn from_csdl(record: &CsdlAnnotation) -> Result<Self> {
        let expression = record
            .expression
            .as_ref()
            .map(Expression::from_csdl)
            .transpose()
            .map_err(|e| {
                Error::definition(format!("Annotation with term {}: {}", record.term, e))
            })?;
        Ok(Self {
            term: record.term.clone(),
            qualifier: record.qualifier.clone(),
            expression,
            annotations: Self::from_csdl_list(&record.annotations)?,
        })
    }

    pub(crate) fn from_csdl_list(records: &[CsdlAnnotation]) -> Result<Vec<Arc<Self>>> {
        records
            .iter()
            .map(|record| Self::from_csdl(record).map(Arc::new))
            .collect()
    }

    pub fn term_name(&self) -> &QualifiedName {
        &self.term
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn expression(&self) -> Option<&Expression> {
        self.expression.as_ref()
    }

    /// Annotations of the annotation
    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    pub fn term(&self, edm: &Edm) -> Result<Option<Arc<Term>>> {
        edm.term(&self.term)
    }
}

/// One property of a record expression
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub property: String,
    pub value: Expression,
}

/// Annotation value expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant {
        kind: CsdlConstantKind,
        value: String,
    },
    Path {
        kind: CsdlPathKind,
        value: String,
    },
    Record {
        type_info: Option<TypeInfo>,
        property_values: Vec<PropertyValue>,
        annotations: Vec<Arc<Annotation>>,
    },
    Collection(Vec<Expression>),
    Apply {
        function: QualifiedName,
        parameters: Vec<Expression>,
    },
    Cast {
        type_info: TypeInfo,
        facets: CsdlFacets,
        value: Box<Expression>,
    },
    If {
        condition: Box<Expression>,
        then: Box<Expression>,
        otherwise: Option<Box<Expression>>,
    },
    IsOf {
        type_info: TypeInfo,
        facets: CsdlFacets,
        value: Box<Expression>,
    },
    LabeledElement {
        name: String,
        value: Box<Expression>,
    },
    LabeledElementReference(QualifiedName),
    Null,
    UrlRef(Box<Expression>),
}

impl Expression {
    pub(crate) fn from_csdl(record: &CsdlExpression) -> Result<Self> {
        let boxed = |inner: &CsdlExpression| Self::from_csdl(inner).map(Box::new);
        let list = |items: &[CsdlExpression]| {
            items.iter().map(Self::from_csdl).collect::<Result<Vec<_>>>()
        };

        Ok(match record {
            CsdlExpression::Constant { kind, value } => Expression::Constant {
                kind: *kind,
                value: value.clone(),
            },
            CsdlExpression::Path { kind, value } => Expression::Path {
                kind: *kind,
                value: value.clone(),
            },
            CsdlExpression::Record {
                type_name,
                property_values,
                annotations,
            } => Expression::Record {
                type_info: type_name.as_deref().map(TypeInfo::parse).transpose()?,
                property_values: property_values
                    .iter()
                    .map(|pv| {
                        Ok(PropertyValue {
                            property: pv.property.clone(),
                            value: Self::from_csdl(&pv.value)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
                annotations: Annotation::from_csdl_list(annotations)?,
            },
            CsdlExpression::Collection { items } => Expression::Collection(list(items)?),
            CsdlExpression::Apply {
                function,
                parameters,
            } => Expression::Apply {
                function: function.clone(),
                parameters: list(parameters)?,
            },
            CsdlExpression::Cast {
                type_name,
                facets,
                value,
            } => Expression::Cast {
                type_info: TypeInfo::parse(type_name)?,
                facets: facets.clone(),
                value: boxed(value)?,
            },
            CsdlExpression::If {
                condition,
                then,
                otherwise,
            } => Expression::If {
                condition: boxed(condition)?,
                then: boxed(then)?,
                otherwise: otherwise.as_deref().map(boxed).transpose()?,
            },
            CsdlExpression::IsOf {
                type_name,
                facets,
                value,
            } => Expression::IsOf {
                type_info: TypeInfo::parse(type_name)?,
                facets: facets.clone(),
                value: boxed(value)?,
            },
            CsdlExpression::LabeledElement { name, value } => Expression::LabeledElement {
                name: name.clone(),
                value: boxed(value)?,
            },
            CsdlExpression::LabeledElementReference { name } => {
                Expression::LabeledElementReference(name.clone())
            }
            CsdlExpression::Null => Expression::Null,
            CsdlExpression::UrlRef { value } => Expression::UrlRef(boxed(value)?),
        })
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Expression::Constant { .. })
    }

    /// Literal text of a constant expression
    pub fn as_constant(&self) -> Option<&str> {
        match self {
            Expression::Constant { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Model element an annotation target string resolves to
#[derive(Debug, Clone)]
pub enum AnnotationTarget {
    ActionImport(Arc<ActionImport>),
    ComplexType(Arc<ComplexType>),
    EntityContainer(Arc<EntityContainer>),
    EntitySet(Arc<BindingTarget>),
    EntityType(Arc<EntityType>),
    EnumType(Arc<EnumType>),
    EnumMember(Arc<EnumType>, Arc<EnumMember>),
    FunctionImport(Arc<FunctionImport>),
    Singleton(Arc<BindingTarget>),
    Term(Arc<Term>),
    TypeDefinition(Arc<TypeDefinition>),
    Property(Arc<Property>),
    NavigationProperty(Arc<NavigationProperty>),
}

impl AnnotationTarget {
    pub fn kind_name(&self) -> &'static str {
        match self {
            AnnotationTarget::ActionImport(_) => "ActionImport",
            AnnotationTarget::ComplexType(_) => "ComplexType",
            AnnotationTarget::EntityContainer(_) => "EntityContainer",
            AnnotationTarget::EntitySet(_) => "EntitySet",
            AnnotationTarget::EntityType(_) => "EntityType",
            AnnotationTarget::EnumType(_) => "EnumType",
            AnnotationTarget::EnumMember(..) => "Member",
            AnnotationTarget::FunctionImport(_) => "FunctionImport",
            AnnotationTarget::Singleton(_) => "Singleton",
            AnnotationTarget::Term(_) => "Term",
            AnnotationTarget::TypeDefinition(_) => "TypeDefinition",
            AnnotationTarget::Property(_) => "Property",
            AnnotationTarget::NavigationProperty(_) => "NavigationProperty",
        }
    }

    /// Name of the element, as written in a target string
    pub fn path(&self) -> String {
        match self {
            AnnotationTarget::ActionImport(i) => format!("{}/{}", i.container_name(), i.name()),
            AnnotationTarget::ComplexType(t) => t.name().to_string(),
            AnnotationTarget::EntityContainer(c) => c.name().to_string(),
            AnnotationTarget::EntitySet(s) | AnnotationTarget::Singleton(s) => {
                format!("{}/{}", s.container_name(), s.name())
            }
            AnnotationTarget::EntityType(t) => t.name().to_string(),
            AnnotationTarget::EnumType(t) => t.name().to_string(),
            AnnotationTarget::EnumMember(t, m) => format!("{}/{}", t.name(), m.name()),
            AnnotationTarget::FunctionImport(i) => {
                format!("{}/{}", i.container_name(), i.name())
            }
            AnnotationTarget::Term(t) => t.name().to_string(),
            AnnotationTarget::TypeDefinition(t) => t.name().to_string(),
            AnnotationTarget::Property(p) => p.target_path(),
            AnnotationTarget::NavigationProperty(p) => p.target_path(),
        }
    }
}

/// External annotations that share one target and qualifier
#[derive(Debug)]
pub struct AnnotationsGroup {
    target_path: String,
    qualifier: Option<String>,
    annotations: Vec<Arc<Annotation>>,
    target: OnceLock<Option<AnnotationTarget>>,
}

impl AnnotationsGroup {
    pub(crate) fn from_csdl(record: &CsdlAnnotations) -> Result<Self> {
        Ok(Self {
            target_path: record.target.clone(),
            qualifier: record.qualifier.clone(),
            annotations: Annotation::from_csdl_list(&record.annotations)?,
            target: OnceLock::new(),
        })
    }

    /// Target string as declared
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    /// Annotation for a term, if the group applies it
    pub fn annotation(&self, term: &QualifiedName) -> Option<Arc<Annotation>> {
        self.annotations.iter().find(|a| &a.term == term).cloned()
    }

    /// The element the group targets; resolved once
    pub fn target(&self, edm: &Edm) -> Result<Option<AnnotationTarget>> {
        if let Some(target) = self.target.get() {
            return Ok(target.clone());
        }
        let target = resolve_target(edm, &self.target_path)?;
        let _ = self.target.set(target.clone());
        Ok(target)
    }
}

/// Resolve a `Base[/Path]` target string
///
/// Candidates are tried in this order, first match wins: action import,
/// complex type (plus path), the default container itself, entity set, entity
/// type (plus path), enum type (plus member), function import, singleton,
/// term, type definition. Container children are written
/// `Namespace.Container/Child` or `Namespace.Child`, both against the default
/// container. A path on a structured type walks structural properties, then
/// navigation properties, segment by segment.
pub fn resolve_target(edm: &Edm, target: &str) -> Result<Option<AnnotationTarget>> {
    let (base, path) = match target.split_once('/') {
        Some((base, path)) => (base, Some(path)),
        None => (target, None),
    };
    let Ok(base_name) = QualifiedName::parse(base) else {
        debug!(annotation_target = target, "annotation target base is not a qualified name");
        return Ok(None);
    };
    let base_name = edm.resolve_alias(&base_name)?;
    let container = edm.entity_container(None)?;
    let child = container
        .as_ref()
        .and_then(|c| container_child_name(c, &base_name, path));
    trace!(annotation_target = target, ?child, "resolving annotation target");

    if let (Some(container), Some(child)) = (&container, child) {
        if let Some(import) = container.action_import(edm, child)? {
            return Ok(Some(AnnotationTarget::ActionImport(import)));
        }
    }

    if let Some(complex) = edm.complex_type(&base_name)? {
        let found = match path {
            None => Some(AnnotationTarget::ComplexType(complex)),
            Some(path) => path_target(edm, EdmType::Complex(complex), path)?,
        };
        if found.is_some() {
            return Ok(found);
        }
    }

    if let Some(container) = &container {
        if path.is_none() && container.name() == &base_name {
            return Ok(Some(AnnotationTarget::EntityContainer(container.clone())));
        }
        if let Some(child) = child {
            if let Some(entity_set) = container.entity_set(edm, child)? {
                return Ok(Some(AnnotationTarget::EntitySet(entity_set)));
            }
        }
    }

    if let Some(entity) = edm.entity_type(&base_name)? {
        let found = match path {
            None => Some(AnnotationTarget::EntityType(entity)),
            Some(path) => path_target(edm, EdmType::Entity(entity), path)?,
        };
        if found.is_some() {
            return Ok(found);
        }
    }

    if let Some(enum_type) = edm.enum_type(&base_name)? {
        let found = match path {
            None => Some(AnnotationTarget::EnumType(enum_type)),
            Some(path) => enum_type
                .member(path)
                .map(|member| AnnotationTarget::EnumMember(enum_type.clone(), member)),
        };
        if found.is_some() {
            return Ok(found);
        }
    }

    if let (Some(container), Some(child)) = (&container, child) {
        if let Some(import) = container.function_import(edm, child)? {
            return Ok(Some(AnnotationTarget::FunctionImport(import)));
        }
        if let Some(singleton) = container.singleton(edm, child)? {
            return Ok(Some(AnnotationTarget::Singleton(singleton)));
        }
    }

    if path.is_none() {
        if let Some(term) = edm.term(&base_name)? {
            return Ok(Some(AnnotationTarget::Term(term)));
        }
        if let Some(definition) = edm.type_definition(&base_name)? {
            return Ok(Some(AnnotationTarget::TypeDefinition(definition)));
        }
    }

    debug!(annotation_target = target, "annotation target not found");
    Ok(None)
}

/// Simple name of a default-container child addressed by a target string
fn container_child_name<'a>(
    container: &EntityContainer,
    base: &'a QualifiedName,
    path: Option<&'a str>,
) -> Option<&'a str> {
    match path {
        Some(path) if container.name() == base => Some(path),
        None if container.name().namespace() == base.namespace() => Some(base.name()),
        _ => None,
    }
}

/// Walk a property path starting at a structured type
fn path_target(edm: &Edm, owner: EdmType, path: &str) -> Result<Option<AnnotationTarget>> {
    let segments: Vec<&str> = path.split('/').collect();
    let mut owner = owner;

    for (index, segment) in segments.iter().enumerate() {
        let found = match &owner {
            EdmType::Complex(complex) => complex.property(edm, segment)?,
            EdmType::Entity(entity) => entity.property(edm, segment)?,
            _ => None,
        };
        let Some(found) = found else {
            return Ok(None);
        };

        if index + 1 == segments.len() {
            return Ok(Some(match found {
                PropertyRef::Structural(property) => AnnotationTarget::Property(property),
                PropertyRef::Navigation(navigation) => {
                    AnnotationTarget::NavigationProperty(navigation)
                }
            }));
        }

        owner = match found {
            PropertyRef::Structural(property) => property.ty(edm)?,
            PropertyRef::Navigation(navigation) => EdmType::Entity(navigation.target_type(edm)?),
        };
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edm_csdl::CsdlPropertyValue;

    #[test]
    fn test_expression_conversion_parses_types() {
        let record = CsdlExpression::Cast {
            type_name: "Collection(Edm.Int32)".to_string(),
            facets: CsdlFacets::default(),
            value: Box::new(CsdlExpression::path("Quantities")),
        };
        match Expression::from_csdl(&record).unwrap() {
            Expression::Cast {
                type_info, value, ..
            } => {
                assert!(type_info.is_collection());
                assert_eq!(
                    *value,
                    Expression::Path {
                        kind: CsdlPathKind::Path,
                        value: "Quantities".to_string()
                    }
                );
            }
            other => panic!("expected cast, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_type_in_expression_is_rejected() {
        let record = CsdlExpression::IsOf {
            type_name: "Collection(".to_string(),
            facets: CsdlFacets::default(),
            value: Box::new(CsdlExpression::Null),
        };
        assert!(Expression::from_csdl(&record).is_err());
    }

    #[test]
    fn test_record_expression() {
        let record = CsdlExpression::Record {
            type_name: Some("Org.Vocab.Link".to_string()),
            property_values: vec![CsdlPropertyValue {
                property: "href".to_string(),
                value: CsdlExpression::string("/docs"),
            }],
            annotations: Vec::new(),
        };
        let Expression::Record {
            type_info,
            property_values,
            ..
        } = Expression::from_csdl(&record).unwrap()
        else {
            panic!("expected record");
        };
        assert_eq!(type_info.unwrap().to_string(), "Org.Vocab.Link");
        assert_eq!(property_values[0].value.as_constant(), Some("/docs"));
    }

    #[test]
    fn test_annotation_keeps_nested_annotations() {
        let record = CsdlAnnotation::new(QualifiedName::new("Core", "Description"))
            .with_qualifier("short")
            .with_expression(CsdlExpression::string("Customer"));
        let mut record_with_nested = record.clone();
        record_with_nested
            .annotations
            .push(CsdlAnnotation::new(QualifiedName::new("Core", "IsLanguageDependent")));

        let annotation = Annotation::from_csdl(&record_with_nested).unwrap();
        assert_eq!(annotation.qualifier(), Some("short"));
        assert!(annotation.expression().unwrap().is_constant());
        assert_eq!(
            annotation.annotations()[0].term_name(),
            &QualifiedName::new("Core", "IsLanguageDependent")
        );
    }
}
