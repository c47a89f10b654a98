#![deny(rust_2018_idioms)]
#![warn(clippy::all)]

//! # edm-core
//!
//! Resolution and caching engine for Entity Data Model schemas.
//!
//! An [`Edm`] registry pulls raw records from an [`EdmProvider`] on first
//! access and turns them into resolved, identity-stable nodes. Resolving the
//! same qualified name twice yields the same `Arc`. Links between nodes (base
//! types, property types, parent containers) are filled lazily, so schemas
//! may reference types in any order and may be self-referential.
//!
//! ```no_run
//! use edm_core::{Edm, StructuredType};
//! use edm_csdl::{InMemoryProvider, QualifiedName, SchemaLoader};
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let loader = SchemaLoader::new(vec!["schemas".into()]);
//! let provider = InMemoryProvider::from_schemas(loader.load_with_references("Org.Sales")?);
//! let edm = Edm::new(Arc::new(provider));
//!
//! if let Some(customer) = edm.entity_type(&QualifiedName::parse("Org.Sales.Customer")?)? {
//!     println!("{:?}", customer.property_names(&edm)?);
//! }
//! # Ok(())
//! # }
//! ```

/// Resolved annotations, terms, expressions and target resolution.
pub mod annotation;
/// Append-only node storage addressed by typed ids.
pub mod arena;
/// Whole-model consistency check.
pub mod check;
/// Registry configuration.
pub mod config;
/// Entity containers, binding targets and operation imports.
pub mod container;
/// The central registry.
pub mod edm;
/// Actions, functions, parameters and return types.
pub mod operation;
/// Built-in primitive types.
pub mod primitive;
/// Structural and navigation properties.
pub mod property;
/// Per-namespace views over the provider's schemas.
pub mod schema;
/// Parsed type expressions.
pub mod type_info;
/// Entity, complex, enumeration and type definition nodes.
pub mod types;

pub use annotation::{Annotation, AnnotationTarget, AnnotationsGroup, Expression, Term};
pub use arena::Id;
pub use check::{check_model, CheckIssue, CheckReport};
pub use config::EdmConfig;
pub use container::{
    ActionImport, BindingTarget, BindingTargetKind, EntityContainer, FunctionImport,
};
pub use edm::Edm;
pub use operation::{Operation, OperationKind, Parameter, ReturnType};
pub use primitive::PrimitiveTypeKind;
pub use property::{KeyPropertyRef, NavigationProperty, Property, PropertyRef};
pub use schema::EdmSchema;
pub use type_info::{EdmType, TypeInfo};
pub use types::{
    ComplexType, EntityType, EnumMember, EnumType, StructuredType, TypeDefinition, TypeKind,
};

pub use edm_csdl::{EdmProvider, ProviderError, QualifiedName};

use thiserror::Error;

/// Errors raised while resolving a model
///
/// A name with no definition is not an error; lookups answer `Ok(None)`.
/// Every variant here means the schema, or the provider behind it, is broken.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Definition error: {0}")]
    Definition(String),

    #[error("Inheritance error: {0}")]
    Inheritance(String),

    #[error("Provider failed while {context}: {source}")]
    Provider {
        context: String,
        #[source]
        source: ProviderError,
    },
}

impl Error {
    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition(message.into())
    }

    pub fn inheritance(message: impl Into<String>) -> Self {
        Self::Inheritance(message.into())
    }

    /// Wrap a failing provider call with what the registry was doing
    pub fn provider(context: impl Into<String>, source: ProviderError) -> Self {
        Self::Provider {
            context: context.into(),
            source,
        }
    }
}

impl From<edm_csdl::Error> for Error {
    fn from(error: edm_csdl::Error) -> Self {
        Self::Definition(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_provider_error_is_wrapped_with_context() {
        let error = Error::provider("loading entity type NS.Order", ProviderError::new("offline"));
        assert_eq!(
            error.to_string(),
            "Provider failed while loading entity type NS.Order: offline"
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn test_invalid_name_becomes_definition_error() {
        let error: Error = QualifiedName::parse("NoDot").unwrap_err().into();
        assert!(matches!(error, Error::Definition(_)));
        assert!(error.to_string().contains("NoDot"));
    }
}
