//! Built-in primitive types
//!
//! The catalog is fixed and needs no registry: every kind is a plain enum
//! value addressed as `Edm.<Name>`.

use edm_csdl::QualifiedName;
use std::fmt;

/// Namespace of the built-in types
pub const EDM_NAMESPACE: &str = "Edm";

/// Built-in primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTypeKind {
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    Stream,
    String,
    TimeOfDay,
    Geography,
    GeographyPoint,
    GeographyLineString,
    GeographyPolygon,
    GeographyMultiPoint,
    GeographyMultiLineString,
    GeographyMultiPolygon,
    GeographyCollection,
    Geometry,
    GeometryPoint,
    GeometryLineString,
    GeometryPolygon,
    GeometryMultiPoint,
    GeometryMultiLineString,
    GeometryMultiPolygon,
    GeometryCollection,
}

use PrimitiveTypeKind::*;

impl PrimitiveTypeKind {
    pub const ALL: [PrimitiveTypeKind; 33] = [
        Binary,
        Boolean,
        Byte,
        Date,
        DateTimeOffset,
        Decimal,
        Double,
        Duration,
        Guid,
        Int16,
        Int32,
        Int64,
        SByte,
        Single,
        Stream,
        String,
        TimeOfDay,
        Geography,
        GeographyPoint,
        GeographyLineString,
        GeographyPolygon,
        GeographyMultiPoint,
        GeographyMultiLineString,
        GeographyMultiPolygon,
        GeographyCollection,
        Geometry,
        GeometryPoint,
        GeometryLineString,
        GeometryPolygon,
        GeometryMultiPoint,
        GeometryMultiLineString,
        GeometryMultiPolygon,
        GeometryCollection,
    ];

    /// Simple name, without the `Edm` namespace
    pub fn name(self) -> &'static str {
        match self {
            Binary => "Binary",
            Boolean => "Boolean",
            Byte => "Byte",
            Date => "Date",
            DateTimeOffset => "DateTimeOffset",
            Decimal => "Decimal",
            Double => "Double",
            Duration => "Duration",
            Guid => "Guid",
            Int16 => "Int16",
            Int32 => "Int32",
            Int64 => "Int64",
            SByte => "SByte",
            Single => "Single",
            Stream => "Stream",
            String => "String",
            TimeOfDay => "TimeOfDay",
            Geography => "Geography",
            GeographyPoint => "GeographyPoint",
            GeographyLineString => "GeographyLineString",
            GeographyPolygon => "GeographyPolygon",
            GeographyMultiPoint => "GeographyMultiPoint",
            GeographyMultiLineString => "GeographyMultiLineString",
            GeographyMultiPolygon => "GeographyMultiPolygon",
            GeographyCollection => "GeographyCollection",
            Geometry => "Geometry",
            GeometryPoint => "GeometryPoint",
            GeometryLineString => "GeometryLineString",
            GeometryPolygon => "GeometryPolygon",
            GeometryMultiPoint => "GeometryMultiPoint",
            GeometryMultiLineString => "GeometryMultiLineString",
            GeometryMultiPolygon => "GeometryMultiPolygon",
            GeometryCollection => "GeometryCollection",
        }
    }

    pub fn qualified_name(self) -> QualifiedName {
        QualifiedName::new(EDM_NAMESPACE, self.name())
    }

    /// Look up a kind by simple name (`String`) or qualified name (`Edm.String`)
    pub fn from_name(name: &str) -> Option<Self> {
        let simple = name
            .strip_prefix(EDM_NAMESPACE)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name);
        Self::ALL.into_iter().find(|kind| kind.name() == simple)
    }

    /// Look up a kind by qualified name; the namespace must be `Edm`
    pub fn from_qualified_name(name: &QualifiedName) -> Option<Self> {
        if name.namespace() != EDM_NAMESPACE {
            return None;
        }
        Self::ALL.into_iter().find(|kind| kind.name() == name.name())
    }

    pub fn is_integer(self) -> bool {
        matches!(self, Byte | SByte | Int16 | Int32 | Int64)
    }

    /// Whether an enumeration may use this kind as its underlying type
    pub fn is_enum_underlying(self) -> bool {
        self.is_integer()
    }

    pub fn is_geospatial(self) -> bool {
        self.geospatial_family().is_some()
    }

    /// `Geography` or `Geometry` for the spatial kinds
    pub fn geospatial_family(self) -> Option<Self> {
        match self {
            Geography
            | GeographyPoint
            | GeographyLineString
            | GeographyPolygon
            | GeographyMultiPoint
            | GeographyMultiLineString
            | GeographyMultiPolygon
            | GeographyCollection => Some(Geography),
            Geometry
            | GeometryPoint
            | GeometryLineString
            | GeometryPolygon
            | GeometryMultiPoint
            | GeometryMultiLineString
            | GeometryMultiPolygon
            | GeometryCollection => Some(Geometry),
            _ => None,
        }
    }

    /// Inclusive value range of an integer kind
    pub fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            Byte => Some((0, i64::from(u8::MAX))),
            SByte => Some((i64::from(i8::MIN), i64::from(i8::MAX))),
            Int16 => Some((i64::from(i16::MIN), i64::from(i16::MAX))),
            Int32 => Some((i64::from(i32::MIN), i64::from(i32::MAX))),
            Int64 => Some((i64::MIN, i64::MAX)),
            _ => None,
        }
    }

    /// Whether a value of `source` may be used where `self` is expected
    ///
    /// Integers widen to larger integers and to the floating and decimal
    /// kinds, `Single` widens to `Double`, and spatial kinds widen to the
    /// base type of their family.
    pub fn is_compatible(self, source: Self) -> bool {
        if self == source {
            return true;
        }
        match source {
            Byte | SByte => matches!(self, Int16 | Int32 | Int64 | Decimal | Single | Double),
            Int16 => matches!(self, Int32 | Int64 | Decimal | Single | Double),
            Int32 => matches!(self, Int64 | Decimal | Single | Double),
            Int64 => matches!(self, Decimal | Single | Double),
            Single => self == Double,
            _ => source.geospatial_family() == Some(self),
        }
    }
}

impl fmt::Display for PrimitiveTypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", EDM_NAMESPACE, self.name())
    }
}
