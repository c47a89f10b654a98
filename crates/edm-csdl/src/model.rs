//! Schema record definitions
//!
//! These are the raw records a provider hands to the resolution engine. Type
//! references are kept as unparsed type expressions (`"NS.Type"`,
//! `"Collection(NS.Type)"`, `"Edm.String"`); the engine parses and resolves
//! them on demand.

use crate::expression::CsdlExpression;
use crate::name::QualifiedName;
use serde::{Deserialize, Serialize};

fn default_true() -> bool {
    true
}

/// Facets refining a primitive type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsdlFacets {
    pub max_length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub srid: Option<String>,
    pub unicode: Option<bool>,
}

impl CsdlFacets {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A complete schema: one namespace worth of definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdlSchema {
    pub namespace: String,
    #[serde(default)]
    pub alias: Option<String>,
    /// Namespaces this schema refers to; loaded alongside it
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default)]
    pub entity_types: Vec<CsdlEntityType>,
    #[serde(default)]
    pub complex_types: Vec<CsdlComplexType>,
    #[serde(default)]
    pub enum_types: Vec<CsdlEnumType>,
    #[serde(default)]
    pub type_definitions: Vec<CsdlTypeDefinition>,
    #[serde(default)]
    pub terms: Vec<CsdlTerm>,
    #[serde(default)]
    pub actions: Vec<CsdlAction>,
    #[serde(default)]
    pub functions: Vec<CsdlFunction>,
    #[serde(default)]
    pub entity_container: Option<CsdlEntityContainer>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotations>,
}

impl CsdlSchema {
    /// Create an empty schema for a namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_reference(mut self, namespace: impl Into<String>) -> Self {
        self.references.push(namespace.into());
        self
    }

    pub fn with_entity_type(mut self, entity_type: CsdlEntityType) -> Self {
        self.entity_types.push(entity_type);
        self
    }

    pub fn with_complex_type(mut self, complex_type: CsdlComplexType) -> Self {
        self.complex_types.push(complex_type);
        self
    }

    pub fn with_enum_type(mut self, enum_type: CsdlEnumType) -> Self {
        self.enum_types.push(enum_type);
        self
    }

    pub fn with_type_definition(mut self, type_definition: CsdlTypeDefinition) -> Self {
        self.type_definitions.push(type_definition);
        self
    }

    pub fn with_term(mut self, term: CsdlTerm) -> Self {
        self.terms.push(term);
        self
    }

    pub fn with_action(mut self, action: CsdlAction) -> Self {
        self.actions.push(action);
        self
    }

    pub fn with_function(mut self, function: CsdlFunction) -> Self {
        self.functions.push(function);
        self
    }

    pub fn with_entity_container(mut self, container: CsdlEntityContainer) -> Self {
        self.entity_container = Some(container);
        self
    }

    pub fn with_annotations(mut self, annotations: CsdlAnnotations) -> Self {
        self.annotations.push(annotations);
        self
    }

    /// Qualify a simple name with this schema's namespace
    pub fn qualify(&self, name: &str) -> QualifiedName {
        QualifiedName::new(self.namespace.clone(), name)
    }
}

/// Structural property of an entity or complex type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlProperty {
    pub name: String,
    /// Type expression, possibly `Collection(...)`
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub facets: CsdlFacets,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlProperty {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
            facets: CsdlFacets::default(),
            default_value: None,
            mime_type: None,
            annotations: Vec::new(),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_facets(mut self, facets: CsdlFacets) -> Self {
        self.facets = facets;
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_annotation(mut self, annotation: CsdlAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Dependent/principal property pair of a navigation property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsdlReferentialConstraint {
    pub property: String,
    pub referenced_property: String,
}

/// Navigation property of an entity or complex type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlNavigationProperty {
    pub name: String,
    /// Target entity type expression, `Collection(...)` for to-many
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub partner: Option<String>,
    #[serde(default)]
    pub contains_target: bool,
    #[serde(default)]
    pub referential_constraints: Vec<CsdlReferentialConstraint>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlNavigationProperty {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
            partner: None,
            contains_target: false,
            referential_constraints: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_partner(mut self, partner: impl Into<String>) -> Self {
        self.partner = Some(partner.into());
        self
    }

    pub fn contains_target(mut self, contains_target: bool) -> Self {
        self.contains_target = contains_target;
        self
    }

    pub fn with_referential_constraint(
        mut self,
        property: impl Into<String>,
        referenced_property: impl Into<String>,
    ) -> Self {
        self.referential_constraints.push(CsdlReferentialConstraint {
            property: property.into(),
            referenced_property: referenced_property.into(),
        });
        self
    }
}

/// Key property reference, optionally aliased
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsdlPropertyRef {
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl CsdlPropertyRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

/// Entity type record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdlEntityType {
    pub name: String,
    #[serde(default)]
    pub base_type: Option<QualifiedName>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub open_type: bool,
    #[serde(default)]
    pub has_stream: bool,
    #[serde(default)]
    pub key: Vec<CsdlPropertyRef>,
    #[serde(default)]
    pub properties: Vec<CsdlProperty>,
    #[serde(default)]
    pub navigation_properties: Vec<CsdlNavigationProperty>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlEntityType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_type(mut self, base_type: QualifiedName) -> Self {
        self.base_type = Some(base_type);
        self
    }

    pub fn is_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn open_type(mut self, open_type: bool) -> Self {
        self.open_type = open_type;
        self
    }

    pub fn has_stream(mut self, has_stream: bool) -> Self {
        self.has_stream = has_stream;
        self
    }

    /// Add key property refs by name
    pub fn with_key<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key.extend(names.into_iter().map(CsdlPropertyRef::new));
        self
    }

    pub fn with_key_ref(mut self, key_ref: CsdlPropertyRef) -> Self {
        self.key.push(key_ref);
        self
    }

    pub fn with_property(mut self, property: CsdlProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_navigation_property(mut self, navigation: CsdlNavigationProperty) -> Self {
        self.navigation_properties.push(navigation);
        self
    }

    pub fn with_annotation(mut self, annotation: CsdlAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Complex type record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdlComplexType {
    pub name: String,
    #[serde(default)]
    pub base_type: Option<QualifiedName>,
    #[serde(default)]
    pub is_abstract: bool,
    #[serde(default)]
    pub open_type: bool,
    #[serde(default)]
    pub properties: Vec<CsdlProperty>,
    #[serde(default)]
    pub navigation_properties: Vec<CsdlNavigationProperty>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlComplexType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_type(mut self, base_type: QualifiedName) -> Self {
        self.base_type = Some(base_type);
        self
    }

    pub fn is_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn open_type(mut self, open_type: bool) -> Self {
        self.open_type = open_type;
        self
    }

    pub fn with_property(mut self, property: CsdlProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_navigation_property(mut self, navigation: CsdlNavigationProperty) -> Self {
        self.navigation_properties.push(navigation);
        self
    }
}

/// Enumeration member; the value is kept as literal text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlEnumMember {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlEnumMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            annotations: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Enumeration type record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdlEnumType {
    pub name: String,
    /// Underlying integer type; `Edm.Int32` when absent
    #[serde(default)]
    pub underlying_type: Option<String>,
    #[serde(default)]
    pub is_flags: bool,
    #[serde(default)]
    pub members: Vec<CsdlEnumMember>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlEnumType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_underlying_type(mut self, underlying_type: impl Into<String>) -> Self {
        self.underlying_type = Some(underlying_type.into());
        self
    }

    pub fn is_flags(mut self, is_flags: bool) -> Self {
        self.is_flags = is_flags;
        self
    }

    pub fn with_member(mut self, member: CsdlEnumMember) -> Self {
        self.members.push(member);
        self
    }
}

/// Type definition record: a named primitive with fixed facets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlTypeDefinition {
    pub name: String,
    pub underlying_type: String,
    #[serde(default)]
    pub facets: CsdlFacets,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlTypeDefinition {
    pub fn new(name: impl Into<String>, underlying_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            underlying_type: underlying_type.into(),
            facets: CsdlFacets::default(),
            annotations: Vec::new(),
        }
    }

    pub fn with_facets(mut self, facets: CsdlFacets) -> Self {
        self.facets = facets;
        self
    }
}

/// Vocabulary term record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlTerm {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub base_term: Option<QualifiedName>,
    #[serde(default)]
    pub applies_to: Vec<String>,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub facets: CsdlFacets,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlTerm {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            base_term: None,
            applies_to: Vec::new(),
            default_value: None,
            nullable: true,
            facets: CsdlFacets::default(),
            annotations: Vec::new(),
        }
    }

    pub fn with_base_term(mut self, base_term: QualifiedName) -> Self {
        self.base_term = Some(base_term);
        self
    }

    pub fn applies_to(mut self, element: impl Into<String>) -> Self {
        self.applies_to.push(element.into());
        self
    }
}

/// Operation parameter record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub facets: CsdlFacets,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlParameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
            facets: CsdlFacets::default(),
            annotations: Vec::new(),
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Operation return type record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlReturnType {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub facets: CsdlFacets,
}

impl CsdlReturnType {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            nullable: true,
            facets: CsdlFacets::default(),
        }
    }
}

/// Action record; several actions may share one name as overloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdlAction {
    pub name: String,
    #[serde(default)]
    pub is_bound: bool,
    #[serde(default)]
    pub entity_set_path: Option<String>,
    #[serde(default)]
    pub parameters: Vec<CsdlParameter>,
    #[serde(default)]
    pub return_type: Option<CsdlReturnType>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn bound(mut self, is_bound: bool) -> Self {
        self.is_bound = is_bound;
        self
    }

    pub fn with_entity_set_path(mut self, path: impl Into<String>) -> Self {
        self.entity_set_path = Some(path.into());
        self
    }

    pub fn with_parameter(mut self, parameter: CsdlParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return_type(mut self, return_type: CsdlReturnType) -> Self {
        self.return_type = Some(return_type);
        self
    }
}

/// Function record; several functions may share one name as overloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdlFunction {
    pub name: String,
    #[serde(default)]
    pub is_bound: bool,
    #[serde(default)]
    pub is_composable: bool,
    #[serde(default)]
    pub entity_set_path: Option<String>,
    #[serde(default)]
    pub parameters: Vec<CsdlParameter>,
    #[serde(default)]
    pub return_type: Option<CsdlReturnType>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlFunction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn bound(mut self, is_bound: bool) -> Self {
        self.is_bound = is_bound;
        self
    }

    pub fn composable(mut self, is_composable: bool) -> Self {
        self.is_composable = is_composable;
        self
    }

    pub fn with_entity_set_path(mut self, path: impl Into<String>) -> Self {
        self.entity_set_path = Some(path.into());
        self
    }

    pub fn with_parameter(mut self, parameter: CsdlParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_return_type(mut self, return_type: CsdlReturnType) -> Self {
        self.return_type = Some(return_type);
        self
    }
}

/// Navigation property path bound to a concrete entity set or singleton
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsdlNavigationPropertyBinding {
    pub path: String,
    /// `Name` or `Namespace.Container/Name`
    pub target: String,
}

impl CsdlNavigationPropertyBinding {
    pub fn new(path: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            target: target.into(),
        }
    }
}

/// Entity set record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlEntitySet {
    pub name: String,
    pub entity_type: QualifiedName,
    #[serde(default = "default_true")]
    pub include_in_service_document: bool,
    #[serde(default)]
    pub navigation_property_bindings: Vec<CsdlNavigationPropertyBinding>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlEntitySet {
    pub fn new(name: impl Into<String>, entity_type: QualifiedName) -> Self {
        Self {
            name: name.into(),
            entity_type,
            include_in_service_document: true,
            navigation_property_bindings: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_binding(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.navigation_property_bindings
            .push(CsdlNavigationPropertyBinding::new(path, target));
        self
    }

    pub fn include_in_service_document(mut self, include: bool) -> Self {
        self.include_in_service_document = include;
        self
    }
}

/// Singleton record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlSingleton {
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: QualifiedName,
    #[serde(default)]
    pub navigation_property_bindings: Vec<CsdlNavigationPropertyBinding>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlSingleton {
    pub fn new(name: impl Into<String>, entity_type: QualifiedName) -> Self {
        Self {
            name: name.into(),
            entity_type,
            navigation_property_bindings: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn with_binding(mut self, path: impl Into<String>, target: impl Into<String>) -> Self {
        self.navigation_property_bindings
            .push(CsdlNavigationPropertyBinding::new(path, target));
        self
    }
}

/// Action import record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlActionImport {
    pub name: String,
    pub action: QualifiedName,
    #[serde(default)]
    pub entity_set: Option<String>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlActionImport {
    pub fn new(name: impl Into<String>, action: QualifiedName) -> Self {
        Self {
            name: name.into(),
            action,
            entity_set: None,
            annotations: Vec::new(),
        }
    }
}

/// Function import record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlFunctionImport {
    pub name: String,
    pub function: QualifiedName,
    #[serde(default)]
    pub entity_set: Option<String>,
    #[serde(default)]
    pub include_in_service_document: bool,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlFunctionImport {
    pub fn new(name: impl Into<String>, function: QualifiedName) -> Self {
        Self {
            name: name.into(),
            function,
            entity_set: None,
            include_in_service_document: false,
            annotations: Vec::new(),
        }
    }

    pub fn with_entity_set(mut self, entity_set: impl Into<String>) -> Self {
        self.entity_set = Some(entity_set.into());
        self
    }
}

/// Entity container record with all its children
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CsdlEntityContainer {
    pub name: String,
    #[serde(default)]
    pub extends: Option<QualifiedName>,
    #[serde(default)]
    pub entity_sets: Vec<CsdlEntitySet>,
    #[serde(default)]
    pub singletons: Vec<CsdlSingleton>,
    #[serde(default)]
    pub action_imports: Vec<CsdlActionImport>,
    #[serde(default)]
    pub function_imports: Vec<CsdlFunctionImport>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlEntityContainer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_extends(mut self, parent: QualifiedName) -> Self {
        self.extends = Some(parent);
        self
    }

    pub fn with_entity_set(mut self, entity_set: CsdlEntitySet) -> Self {
        self.entity_sets.push(entity_set);
        self
    }

    pub fn with_singleton(mut self, singleton: CsdlSingleton) -> Self {
        self.singletons.push(singleton);
        self
    }

    pub fn with_action_import(mut self, action_import: CsdlActionImport) -> Self {
        self.action_imports.push(action_import);
        self
    }

    pub fn with_function_import(mut self, function_import: CsdlFunctionImport) -> Self {
        self.function_imports.push(function_import);
        self
    }
}

/// Name and parent of an entity container, without its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsdlEntityContainerInfo {
    pub container_name: QualifiedName,
    #[serde(default)]
    pub extends_container: Option<QualifiedName>,
}

/// Namespace alias declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsdlAliasInfo {
    pub namespace: String,
    pub alias: String,
}

/// Application of a term to a model element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlAnnotation {
    pub term: QualifiedName,
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub expression: Option<CsdlExpression>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlAnnotation {
    pub fn new(term: QualifiedName) -> Self {
        Self {
            term,
            qualifier: None,
            expression: None,
            annotations: Vec::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_expression(mut self, expression: CsdlExpression) -> Self {
        self.expression = Some(expression);
        self
    }
}

/// External annotations targeting one model element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlAnnotations {
    /// `Base[/Path]`
    pub target: String,
    #[serde(default)]
    pub qualifier: Option<String>,
    #[serde(default)]
    pub annotations: Vec<CsdlAnnotation>,
}

impl CsdlAnnotations {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            qualifier: None,
            annotations: Vec::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    pub fn with_annotation(mut self, annotation: CsdlAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}
