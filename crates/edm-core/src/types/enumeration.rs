//! Enumeration types

use crate::annotation::Annotation;
use crate::primitive::PrimitiveTypeKind;
use crate::{Error, Result};
use edm_csdl::{CsdlEnumType, QualifiedName};
use indexmap::IndexMap;
use std::sync::Arc;

/// Member of an enumeration
#[derive(Debug)]
pub struct EnumMember {
    name: String,
    value: i64,
    annotations: Vec<Arc<Annotation>>,
}

impl EnumMember {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }
}

/// Resolved enumeration type
#[derive(Debug)]
pub struct EnumType {
    name: QualifiedName,
    underlying_type: PrimitiveTypeKind,
    is_flags: bool,
    members: IndexMap<String, Arc<EnumMember>>,
    annotations: Vec<Arc<Annotation>>,
}

impl EnumType {
    /// Validate and wrap a record
    ///
    /// The underlying type must be an integer kind (`Edm.Int32` when absent).
    /// Members without a value take their declaration index.
    pub(crate) fn from_csdl(name: QualifiedName, record: &CsdlEnumType) -> Result<Self> {
        let underlying_type = match &record.underlying_type {
            None => PrimitiveTypeKind::Int32,
            Some(text) => PrimitiveTypeKind::from_name(text)
                .filter(|kind| kind.is_enum_underlying())
                .ok_or_else(|| {
                    Error::definition(format!(
                        "Not allowed as underlying type: {} for enum type {}",
                        text, name
                    ))
                })?,
        };
        let (min, max) = underlying_type.integer_range().unwrap_or((i64::MIN, i64::MAX));

        let mut members = IndexMap::with_capacity(record.members.len());
        for (index, member) in record.members.iter().enumerate() {
            let value = match &member.value {
                Some(text) => text.trim().parse::<i64>().map_err(|_| {
                    Error::definition(format!(
                        "Invalid value {} for member {} of enum type {}",
                        text, member.name, name
                    ))
                })?,
                None => i64::try_from(index).unwrap_or(i64::MAX),
            };
            if value < min || value > max {
                return Err(Error::definition(format!(
                    "Value {} of member {} does not fit {} in enum type {}",
                    value, member.name, underlying_type, name
                )));
            }
            let resolved = EnumMember {
                name: member.name.clone(),
                value,
                annotations: Annotation::from_csdl_list(&member.annotations)?,
            };
            if members
                .insert(member.name.clone(), Arc::new(resolved))
                .is_some()
            {
                return Err(Error::definition(format!(
                    "Duplicate member {} in enum type {}",
                    member.name, name
                )));
            }
        }

        Ok(Self {
            underlying_type,
            is_flags: record.is_flags,
            members,
            annotations: Annotation::from_csdl_list(&record.annotations)?,
            name,
        })
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn underlying_type(&self) -> PrimitiveTypeKind {
        self.underlying_type
    }

    pub fn is_flags(&self) -> bool {
        self.is_flags
    }

    pub fn member(&self, name: &str) -> Option<Arc<EnumMember>> {
        self.members.get(name).cloned()
    }

    pub fn members(&self) -> impl Iterator<Item = &Arc<EnumMember>> {
        self.members.values()
    }

    pub fn member_names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    /// Numeric value of a literal
    ///
    /// Accepts a member name, a comma-separated list of names for flags
    /// enumerations, or an integer.
    pub fn value_of(&self, literal: &str) -> Result<i64> {
        let literal = literal.trim();
        if let Ok(value) = literal.parse::<i64>() {
            return Ok(value);
        }

        let mut names = literal.split(',').map(str::trim);
        if !self.is_flags && literal.contains(',') {
            return Err(Error::definition(format!(
                "Multiple members in literal {} of non-flags enum type {}",
                literal, self.name
            )));
        }
        names.try_fold(0i64, |acc, name| {
            self.members
                .get(name)
                .map(|member| acc | member.value)
                .ok_or_else(|| {
                    Error::definition(format!(
                        "Unknown member {} in enum type {}",
                        name, self.name
                    ))
                })
        })
    }

    /// Literal for a numeric value
    ///
    /// Flags enumerations render every contained member, in declaration
    /// order, separated by commas.
    pub fn literal_of(&self, value: i64) -> Result<String> {
        if let Some(member) = self.members.values().find(|m| m.value == value) {
            return Ok(member.name.clone());
        }

        if self.is_flags {
            let mut remaining = value;
            let mut names = Vec::new();
            for member in self.members.values() {
                if member.value != 0 && value & member.value == member.value {
                    names.push(member.name.as_str());
                    remaining &= !member.value;
                }
            }
            if remaining == 0 && !names.is_empty() {
                return Ok(names.join(","));
            }
        }

        Err(Error::definition(format!(
            "No literal for value {} in enum type {}",
            value, self.name
        )))
    }
}
