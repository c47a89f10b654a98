//! Per-namespace views over the provider's schemas

use crate::container::EntityContainer;
use crate::edm::Edm;
use crate::types::{ComplexType, EntityType};
use crate::{Error, Result};
use edm_csdl::{CsdlSchema, QualifiedName};
use indexmap::IndexSet;
use std::sync::Arc;

/// Qualified names of everything one schema declares
///
/// The view holds names only; elements resolve through the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdmSchema {
    namespace: String,
    alias: Option<String>,
    entity_types: Vec<QualifiedName>,
    complex_types: Vec<QualifiedName>,
    enum_types: Vec<QualifiedName>,
    type_definitions: Vec<QualifiedName>,
    terms: Vec<QualifiedName>,
    actions: Vec<QualifiedName>,
    functions: Vec<QualifiedName>,
    entity_container: Option<QualifiedName>,
    annotation_groups: Vec<(String, Option<String>)>,
}

impl EdmSchema {
    pub(crate) fn from_csdl(record: &CsdlSchema) -> Self {
        let qualify = |name: &str| record.qualify(name);

        Self {
            namespace: record.namespace.clone(),
            alias: record.alias.clone(),
            entity_types: record.entity_types.iter().map(|t| qualify(&t.name)).collect(),
            complex_types: record.complex_types.iter().map(|t| qualify(&t.name)).collect(),
            enum_types: record.enum_types.iter().map(|t| qualify(&t.name)).collect(),
            type_definitions: record
                .type_definitions
                .iter()
                .map(|t| qualify(&t.name))
                .collect(),
            terms: record.terms.iter().map(|t| qualify(&t.name)).collect(),
            actions: unique_names(record, record.actions.iter().map(|a| a.name.as_str())),
            functions: unique_names(record, record.functions.iter().map(|f| f.name.as_str())),
            entity_container: record
                .entity_container
                .as_ref()
                .map(|container| qualify(&container.name)),
            annotation_groups: record
                .annotations
                .iter()
                .map(|group| (group.target.clone(), group.qualifier.clone()))
                .collect(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn entity_type_names(&self) -> &[QualifiedName] {
        &self.entity_types
    }

    pub fn complex_type_names(&self) -> &[QualifiedName] {
        &self.complex_types
    }

    pub fn enum_type_names(&self) -> &[QualifiedName] {
        &self.enum_types
    }

    pub fn type_definition_names(&self) -> &[QualifiedName] {
        &self.type_definitions
    }

    pub fn term_names(&self) -> &[QualifiedName] {
        &self.terms
    }

    /// Action names, each once even when overloaded
    pub fn action_names(&self) -> &[QualifiedName] {
        &self.actions
    }

    pub fn function_names(&self) -> &[QualifiedName] {
        &self.functions
    }

    pub fn entity_container_name(&self) -> Option<&QualifiedName> {
        self.entity_container.as_ref()
    }

    /// Target and qualifier of each external annotation group, as declared
    pub fn annotation_groups(&self) -> &[(String, Option<String>)] {
        &self.annotation_groups
    }

    pub fn entity_types(&self, edm: &Edm) -> Result<Vec<Arc<EntityType>>> {
        self.entity_types
            .iter()
            .map(|name| {
                edm.entity_type(name)?
                    .ok_or_else(|| missing("entity type", name))
            })
            .collect()
    }

    pub fn complex_types(&self, edm: &Edm) -> Result<Vec<Arc<ComplexType>>> {
        self.complex_types
            .iter()
            .map(|name| {
                edm.complex_type(name)?
                    .ok_or_else(|| missing("complex type", name))
            })
            .collect()
    }

    pub fn entity_container(&self, edm: &Edm) -> Result<Option<Arc<EntityContainer>>> {
        match &self.entity_container {
            Some(name) => edm
                .entity_container(Some(name))?
                .ok_or_else(|| missing("entity container", name))
                .map(Some),
            None => Ok(None),
        }
    }
}

/// Overloads share a name; list each name once
fn unique_names<'a>(
    record: &CsdlSchema,
    names: impl Iterator<Item = &'a str>,
) -> Vec<QualifiedName> {
    names
        .map(|name| record.qualify(name))
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

fn missing(kind: &str, name: &QualifiedName) -> Error {
    Error::definition(format!(
        "Schema declares {kind} {name} but the provider does not return it"
    ))
}
