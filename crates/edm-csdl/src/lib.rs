#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # edm-csdl
//!
//! Raw, unresolved schema records for the Entity Data Model engine.
//!
//! This crate holds everything on the provider side of the resolution engine:
//! the schema records as a schema author writes them, the [`EdmProvider`]
//! interface the engine pulls records through, an in-memory provider, and a
//! loader for JSON/YAML schema documents.

/// Annotation expression records.
pub mod expression;
/// Schema document loading from JSON and YAML.
pub mod loader;
/// In-memory provider over loaded schema documents.
pub mod memory;
/// Schema records (types, operations, containers, annotations).
pub mod model;
/// Namespace-qualified names.
pub mod name;
/// The provider interface consumed by the resolution engine.
pub mod provider;

pub use expression::{CsdlConstantKind, CsdlExpression, CsdlPathKind, CsdlPropertyValue};
pub use loader::SchemaLoader;
pub use memory::InMemoryProvider;
pub use model::{
    CsdlAction, CsdlActionImport, CsdlAliasInfo, CsdlAnnotation, CsdlAnnotations,
    CsdlComplexType, CsdlEntityContainer, CsdlEntityContainerInfo, CsdlEntitySet,
    CsdlEntityType, CsdlEnumMember, CsdlEnumType, CsdlFacets, CsdlFunction, CsdlFunctionImport,
    CsdlNavigationProperty, CsdlNavigationPropertyBinding, CsdlParameter, CsdlProperty,
    CsdlPropertyRef, CsdlReferentialConstraint, CsdlReturnType, CsdlSchema, CsdlSingleton,
    CsdlTerm, CsdlTypeDefinition,
};
pub use name::QualifiedName;
pub use provider::{EdmProvider, ProviderError, ProviderResult};

use thiserror::Error;

/// Errors that can occur when loading or naming schema records
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema not found: {0}")]
    NotFound(String),

    #[error("Invalid schema format: {0}")]
    InvalidFormat(String),

    #[error("Invalid qualified name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Reference error: {0}")]
    Reference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an invalid-name error with the offending input.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
