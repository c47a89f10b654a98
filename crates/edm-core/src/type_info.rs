//! Parsed type expressions
//!
//! Schema records refer to types with strings such as `Edm.String`,
//! `Org.Sales.Customer` or `Collection(Org.Sales.Address)`. [`TypeInfo`] is
//! the parsed form; resolving it against a registry yields an [`EdmType`].

use crate::arena::Id;
use crate::edm::Edm;
use crate::primitive::{PrimitiveTypeKind, EDM_NAMESPACE};
use crate::types::{ComplexType, EntityType, EnumType, StructuredType, TypeDefinition, TypeKind};
use crate::{Error, Result};
use edm_csdl::QualifiedName;
use std::fmt;
use std::sync::Arc;

const COLLECTION_PREFIX: &str = "Collection(";

/// Parsed type expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeInfo {
    name: QualifiedName,
    collection: bool,
    primitive: Option<PrimitiveTypeKind>,
}

impl TypeInfo {
    /// Parse `Collection(X)`, `Namespace.Name`, or a primitive name
    ///
    /// A bare simple name must be a primitive (`String` is read as
    /// `Edm.String`).
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (inner, collection) = match text.strip_prefix(COLLECTION_PREFIX) {
            Some(rest) => match rest.strip_suffix(')') {
                Some(inner) => (inner.trim(), true),
                None => {
                    return Err(Error::definition(format!(
                        "Unbalanced collection type expression: {text}"
                    )));
                }
            },
            None => (text, false),
        };

        if inner.is_empty() {
            return Err(Error::definition(format!("Empty type expression: '{text}'")));
        }
        if inner.contains('(') || inner.contains(')') {
            return Err(Error::definition(format!("Malformed type expression: {text}")));
        }

        if !inner.contains('.') {
            return match PrimitiveTypeKind::from_name(inner) {
                Some(kind) => Ok(Self::primitive(kind).collection(collection)),
                None => Err(Error::definition(format!(
                    "Type expression {text} is neither qualified nor primitive"
                ))),
            };
        }

        let name = QualifiedName::parse(inner)?;
        let primitive = PrimitiveTypeKind::from_qualified_name(&name);
        Ok(Self {
            name,
            collection,
            primitive,
        })
    }

    /// Non-collection primitive type
    pub fn primitive(kind: PrimitiveTypeKind) -> Self {
        Self {
            name: kind.qualified_name(),
            collection: false,
            primitive: Some(kind),
        }
    }

    /// Non-collection reference to a named type
    pub fn named(name: QualifiedName) -> Self {
        let primitive = PrimitiveTypeKind::from_qualified_name(&name);
        Self {
            name,
            collection: false,
            primitive,
        }
    }

    pub fn collection(mut self, collection: bool) -> Self {
        self.collection = collection;
        self
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn is_collection(&self) -> bool {
        self.collection
    }

    pub fn primitive_kind(&self) -> Option<PrimitiveTypeKind> {
        self.primitive
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive.is_some()
    }

    /// Resolve against the registry: primitive, type definition, enum,
    /// complex, then entity
    pub fn resolve(&self, edm: &Edm) -> Result<Option<EdmType>> {
        match self.resolve_ref(edm)? {
            Some(type_ref) => edm.materialize(type_ref).map(Some),
            None => Ok(None),
        }
    }

    pub(crate) fn resolve_ref(&self, edm: &Edm) -> Result<Option<TypeRef>> {
        if let Some(kind) = self.primitive {
            return Ok(Some(TypeRef::Primitive(kind)));
        }
        if self.name.namespace() == EDM_NAMESPACE {
            return Ok(None);
        }
        if let Some(id) = edm.type_definition_id(&self.name)? {
            return Ok(Some(TypeRef::Definition(id)));
        }
        if let Some(id) = edm.enum_type_id(&self.name)? {
            return Ok(Some(TypeRef::Enum(id)));
        }
        if let Some(id) = edm.complex_type_id(&self.name)? {
            return Ok(Some(TypeRef::Complex(id)));
        }
        if let Some(id) = edm.entity_type_id(&self.name)? {
            return Ok(Some(TypeRef::Entity(id)));
        }
        Ok(None)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.collection {
            write!(f, "{COLLECTION_PREFIX}{})", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// A resolved type
#[derive(Debug, Clone)]
pub enum EdmType {
    Primitive(PrimitiveTypeKind),
    Definition(Arc<TypeDefinition>),
    Enum(Arc<EnumType>),
    Complex(Arc<ComplexType>),
    Entity(Arc<EntityType>),
}

impl EdmType {
    pub fn name(&self) -> QualifiedName {
        match self {
            EdmType::Primitive(kind) => kind.qualified_name(),
            EdmType::Definition(t) => t.name().clone(),
            EdmType::Enum(t) => t.name().clone(),
            EdmType::Complex(t) => t.name().clone(),
            EdmType::Entity(t) => t.name().clone(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            EdmType::Primitive(_) => TypeKind::Primitive,
            EdmType::Definition(_) => TypeKind::Definition,
            EdmType::Enum(_) => TypeKind::Enum,
            EdmType::Complex(_) => TypeKind::Complex,
            EdmType::Entity(_) => TypeKind::Entity,
        }
    }

    pub fn as_entity(&self) -> Option<&Arc<EntityType>> {
        match self {
            EdmType::Entity(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&Arc<ComplexType>> {
        match self {
            EdmType::Complex(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Arc<EnumType>> {
        match self {
            EdmType::Enum(t) => Some(t),
            _ => None,
        }
    }

    /// Primitive kind, looking through type definitions
    pub fn primitive_kind(&self) -> Option<PrimitiveTypeKind> {
        match self {
            EdmType::Primitive(kind) => Some(*kind),
            EdmType::Definition(t) => Some(t.underlying_type()),
            _ => None,
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, EdmType::Complex(_) | EdmType::Entity(_))
    }
}

/// Id-based form of [`EdmType`], stored inside nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeRef {
    Primitive(PrimitiveTypeKind),
    Definition(Id<TypeDefinition>),
    Enum(Id<EnumType>),
    Complex(Id<ComplexType>),
    Entity(Id<EntityType>),
}
