//! Annotation expression records

use crate::model::{CsdlAnnotation, CsdlFacets};
use crate::name::QualifiedName;
use serde::{Deserialize, Serialize};

/// Expression attached to an annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CsdlExpression {
    /// Typed literal, kept as text
    Constant { kind: CsdlConstantKind, value: String },

    /// Path into the model or instance
    Path {
        #[serde(default)]
        kind: CsdlPathKind,
        value: String,
    },

    /// Structured value with named property values
    Record {
        #[serde(default)]
        type_name: Option<String>,
        #[serde(default)]
        property_values: Vec<CsdlPropertyValue>,
        #[serde(default)]
        annotations: Vec<CsdlAnnotation>,
    },

    /// Ordered list of expressions
    Collection {
        #[serde(default)]
        items: Vec<CsdlExpression>,
    },

    /// Client-side function application
    Apply {
        function: QualifiedName,
        #[serde(default)]
        parameters: Vec<CsdlExpression>,
    },

    /// Cast of a value to a type
    Cast {
        type_name: String,
        #[serde(default)]
        facets: CsdlFacets,
        value: Box<CsdlExpression>,
    },

    /// Conditional; `otherwise` may be omitted inside collections
    If {
        condition: Box<CsdlExpression>,
        then: Box<CsdlExpression>,
        #[serde(default)]
        otherwise: Option<Box<CsdlExpression>>,
    },

    /// Type test of a value
    IsOf {
        type_name: String,
        #[serde(default)]
        facets: CsdlFacets,
        value: Box<CsdlExpression>,
    },

    /// Named expression that can be referenced elsewhere
    LabeledElement {
        name: String,
        value: Box<CsdlExpression>,
    },

    /// Reference to a labeled element by qualified name
    LabeledElementReference { name: QualifiedName },

    Null,

    /// URL computed by an inner expression
    UrlRef { value: Box<CsdlExpression> },
}

/// Literal kinds of a constant expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsdlConstantKind {
    Binary,
    Bool,
    Date,
    DateTimeOffset,
    Decimal,
    Duration,
    EnumMember,
    Float,
    Guid,
    Int,
    String,
    TimeOfDay,
}

/// Flavours of a path expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsdlPathKind {
    #[default]
    Path,
    PropertyPath,
    NavigationPropertyPath,
    AnnotationPath,
}

/// One property of a record expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsdlPropertyValue {
    pub property: String,
    pub value: CsdlExpression,
}

impl CsdlExpression {
    /// Constant string literal
    pub fn string(value: impl Into<String>) -> Self {
        Self::Constant {
            kind: CsdlConstantKind::String,
            value: value.into(),
        }
    }

    /// Constant boolean literal
    pub fn bool(value: bool) -> Self {
        Self::Constant {
            kind: CsdlConstantKind::Bool,
            value: value.to_string(),
        }
    }

    /// Constant integer literal
    pub fn int(value: i64) -> Self {
        Self::Constant {
            kind: CsdlConstantKind::Int,
            value: value.to_string(),
        }
    }

    /// Plain path expression
    pub fn path(value: impl Into<String>) -> Self {
        Self::Path {
            kind: CsdlPathKind::Path,
            value: value.into(),
        }
    }
}
