//! Provider interface
//!
//! The resolution engine pulls raw records through [`EdmProvider`]. Every call
//! answers with one of three outcomes: found (`Ok(Some(..))`), not found
//! (`Ok(None)`), or failure (`Err(ProviderError)`). Providers are called
//! synchronously and must be shareable across threads.

use crate::model::{
    CsdlAction, CsdlActionImport, CsdlAliasInfo, CsdlAnnotation, CsdlAnnotations,
    CsdlComplexType, CsdlEntityContainer, CsdlEntityContainerInfo, CsdlEntitySet,
    CsdlEntityType, CsdlEnumType, CsdlFunction, CsdlFunctionImport, CsdlSchema, CsdlSingleton,
    CsdlTerm, CsdlTypeDefinition,
};
use crate::name::QualifiedName;
use thiserror::Error;

/// Failure raised by a provider call
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying cause
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Source of raw schema records
///
/// Names handed to a provider are already alias-resolved. Container children
/// are keyed by the container's qualified name and the child's simple name.
pub trait EdmProvider: Send + Sync {
    fn get_entity_type(&self, name: &QualifiedName) -> ProviderResult<Option<CsdlEntityType>>;

    fn get_complex_type(&self, name: &QualifiedName) -> ProviderResult<Option<CsdlComplexType>>;

    fn get_enum_type(&self, name: &QualifiedName) -> ProviderResult<Option<CsdlEnumType>>;

    fn get_type_definition(
        &self,
        name: &QualifiedName,
    ) -> ProviderResult<Option<CsdlTypeDefinition>>;

    fn get_term(&self, name: &QualifiedName) -> ProviderResult<Option<CsdlTerm>>;

    /// All overloads sharing an action name
    fn get_actions(&self, name: &QualifiedName) -> ProviderResult<Option<Vec<CsdlAction>>>;

    /// All overloads sharing a function name
    fn get_functions(&self, name: &QualifiedName) -> ProviderResult<Option<Vec<CsdlFunction>>>;

    /// Container name and parent; `None` asks for the default container
    fn get_entity_container_info(
        &self,
        name: Option<&QualifiedName>,
    ) -> ProviderResult<Option<CsdlEntityContainerInfo>>;

    /// The default container with all its children
    fn get_entity_container(&self) -> ProviderResult<Option<CsdlEntityContainer>>;

    /// A named container with all its children
    ///
    /// The default implementation only knows the default container.
    fn get_entity_container_by_name(
        &self,
        name: &QualifiedName,
    ) -> ProviderResult<Option<CsdlEntityContainer>> {
        let Some(info) = self.get_entity_container_info(None)? else {
            return Ok(None);
        };
        if &info.container_name != name {
            return Ok(None);
        }
        self.get_entity_container()
    }

    fn get_entity_set(
        &self,
        container: &QualifiedName,
        name: &str,
    ) -> ProviderResult<Option<CsdlEntitySet>>;

    fn get_singleton(
        &self,
        container: &QualifiedName,
        name: &str,
    ) -> ProviderResult<Option<CsdlSingleton>>;

    fn get_action_import(
        &self,
        container: &QualifiedName,
        name: &str,
    ) -> ProviderResult<Option<CsdlActionImport>>;

    fn get_function_import(
        &self,
        container: &QualifiedName,
        name: &str,
    ) -> ProviderResult<Option<CsdlFunctionImport>>;

    fn get_alias_infos(&self) -> ProviderResult<Vec<CsdlAliasInfo>>;

    /// External annotations for a target string and optional qualifier
    fn get_annotations_group(
        &self,
        target: &str,
        qualifier: Option<&str>,
    ) -> ProviderResult<Option<CsdlAnnotations>>;

    /// Inline annotations declared on the element a target string names
    fn get_annotatable(&self, target: &str) -> ProviderResult<Option<Vec<CsdlAnnotation>>>;

    /// Every schema the provider knows; empty when it cannot enumerate
    fn get_schemas(&self) -> ProviderResult<Vec<CsdlSchema>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_provider_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "metadata.json");
        let error = ProviderError::with_source("backing store unavailable", io);
        assert_eq!(error.to_string(), "backing store unavailable");
        assert!(error.source().is_some());
        assert_eq!(error.message(), "backing store unavailable");
    }

    #[test]
    fn test_provider_error_without_source() {
        let error = ProviderError::new("timeout");
        assert!(error.source().is_none());
    }
}
