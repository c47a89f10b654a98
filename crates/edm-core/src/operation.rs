//! Actions and functions
//!
//! Several operations may share one qualified name. Overload selection lives
//! on the registry (`Edm::bound_action`, `Edm::bound_function`, ...); this
//! module holds the resolved operation itself.

use crate::annotation::Annotation;
use crate::container::BindingTarget;
use crate::edm::Edm;
use crate::type_info::{EdmType, TypeInfo, TypeRef};
use crate::{Error, Result};
use edm_csdl::{
    CsdlAction, CsdlAnnotation, CsdlFacets, CsdlFunction, CsdlParameter, CsdlReturnType,
    QualifiedName,
};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// Action or function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Action,
    Function { composable: bool },
}

/// Operation parameter
#[derive(Debug)]
pub struct Parameter {
    name: String,
    type_info: TypeInfo,
    nullable: bool,
    facets: CsdlFacets,
    annotations: Vec<Arc<Annotation>>,
    resolved: OnceLock<TypeRef>,
}

impl Parameter {
    fn from_csdl(operation: &QualifiedName, record: &CsdlParameter) -> Result<Self> {
        let type_info = TypeInfo::parse(&record.type_name).map_err(|e| {
            Error::definition(format!(
                "Parameter {} of {}: {}",
                record.name, operation, e
            ))
        })?;
        Ok(Self {
            name: record.name.clone(),
            type_info,
            nullable: record.nullable,
            facets: record.facets.clone(),
            annotations: Annotation::from_csdl_list(&record.annotations)?,
            resolved: OnceLock::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    pub fn is_collection(&self) -> bool {
        self.type_info.is_collection()
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
        resolve_cached(edm, &self.resolved, &self.type_info, || {
            format!("parameter {}", self.name)
        })
    }
}

/// Declared return type of an operation
#[derive(Debug)]
pub struct ReturnType {
    type_info: TypeInfo,
    nullable: bool,
    facets: CsdlFacets,
    resolved: OnceLock<TypeRef>,
}

impl ReturnType {
    fn from_csdl(operation: &QualifiedName, record: &CsdlReturnType) -> Result<Self> {
        let type_info = TypeInfo::parse(&record.type_name).map_err(|e| {
            Error::definition(format!("Return type of {}: {}", operation, e))
        })?;
        Ok(Self {
            type_info,
            nullable: record.nullable,
            facets: record.facets.clone(),
            resolved: OnceLock::new(),
        })
    }

    pub fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    pub fn is_collection(&self) -> bool {
        self.type_info.is_collection()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn facets(&self) -> &CsdlFacets {
        &self.facets
    }

    pub fn ty(&self, edm: &Edm) -> Result<EdmType> {
        resolve_cached(edm, &self.resolved, &self.type_info, || "return type".to_string())
    }
}

fn resolve_cached(
    edm: &Edm,
    slot: &OnceLock<TypeRef>,
    type_info: &TypeInfo,
    describe: impl FnOnce() -> String,
) -> Result<EdmType> {
    if let Some(type_ref) = slot.get() {
        return edm.materialize(*type_ref);
    }
    let type_ref = type_info.resolve_ref(edm)?.ok_or_else(|| {
        Error::definition(format!(
            "Cannot find type with name: {} for {}",
            type_info.name(),
            describe()
        ))
    })?;
    let _ = slot.set(type_ref);
    edm.materialize(type_ref)
}

/// Resolved action or function overload
#[derive(Debug)]
pub struct Operation {
    kind: OperationKind,
    name: QualifiedName,
    bound: bool,
    entity_set_path: Option<String>,
    parameters: IndexMap<String, Arc<Parameter>>,
    return_type: Option<ReturnType>,
    annotations: Vec<Arc<Annotation>>,
}

impl Operation {
    pub(crate) fn from_action(name: QualifiedName, record: &CsdlAction) -> Result<Self> {
        Self::build(
            OperationKind::Action,
            name,
            record.is_bound,
            record.entity_set_path.clone(),
            &record.parameters,
            record.return_type.as_ref(),
            &record.annotations,
        )
    }

    /// Functions must declare a return type
    pub(crate) fn from_function(name: QualifiedName, record: &CsdlFunction) -> Result<Self> {
        if record.return_type.is_none() {
            return Err(Error::definition(format!(
                "Function {} must have a return type",
                name
            )));
        }
        Self::build(
            OperationKind::Function {
                composable: record.is_composable,
            },
            name,
            record.is_bound,
            record.entity_set_path.clone(),
            &record.parameters,
            record.return_type.as_ref(),
            &record.annotations,
        )
    }

    fn build(
        kind: OperationKind,
        name: QualifiedName,
        bound: bool,
        entity_set_path: Option<String>,
        parameters: &[CsdlParameter],
        return_type: Option<&CsdlReturnType>,
        annotations: &[CsdlAnnotation],
    ) -> Result<Self> {
        if bound && parameters.is_empty() {
            return Err(Error::definition(format!(
                "Bound operation {} has no binding parameter",
                name
            )));
        }

        let mut resolved = IndexMap::with_capacity(parameters.len());
        for record in parameters {
            let parameter = Parameter::from_csdl(&name, record)?;
            if resolved
                .insert(record.name.clone(), Arc::new(parameter))
                .is_some()
            {
                return Err(Error::definition(format!(
                    "Duplicate parameter {} in {}",
                    record.name, name
                )));
            }
        }

        Ok(Self {
            kind,
            bound,
            entity_set_path,
            parameters: resolved,
            return_type: return_type
                .map(|record| ReturnType::from_csdl(&name, record))
                .transpose()?,
            annotations: Annotation::from_csdl_list(annotations)?,
            name,
        })
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn is_action(&self) -> bool {
        self.kind == OperationKind::Action
    }

    pub fn is_function(&self) -> bool {
        !self.is_action()
    }

    pub fn is_composable(&self) -> bool {
        matches!(self.kind, OperationKind::Function { composable: true })
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn entity_set_path(&self) -> Option<&str> {
        self.entity_set_path.as_deref()
    }

    pub fn parameter(&self, name: &str) -> Option<Arc<Parameter>> {
        self.parameters.get(name).cloned()
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Arc<Parameter>> {
        self.parameters.values()
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    /// First parameter of a bound operation
    pub fn binding_parameter(&self) -> Option<&Arc<Parameter>> {
        if self.bound {
            self.parameters.values().next()
        } else {
            None
        }
    }

    pub fn return_type(&self) -> Option<&ReturnType> {
        self.return_type.as_ref()
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    /// Whether the binding parameter has exactly this type and collection-ness
    pub(crate) fn matches_binding(
        &self,
        edm: &Edm,
        binding_type: &QualifiedName,
        is_collection: bool,
    ) -> Result<bool> {
        let Some(binding) = self.binding_parameter() else {
            return Ok(false);
        };
        if binding.is_collection() != is_collection {
            return Ok(false);
        }
        Ok(&edm.resolve_alias(binding.type_info().name())? == binding_type)
    }

    /// Whether the non-binding parameter names are exactly `names`
    pub(crate) fn matches_parameter_names(&self, names: &HashSet<&str>) -> bool {
        let skip = usize::from(self.bound);
        let own: HashSet<&str> = self
            .parameters
            .keys()
            .skip(skip)
            .map(String::as_str)
            .collect();
        &own == names
    }

    /// Binding target of the result, computed from the entity set path
    ///
    /// A leading segment naming the binding parameter stands for `binding`
    /// itself and is dropped. What remains is matched against `binding`'s
    /// navigation property bindings, entity set first, then singleton.
    /// Answers `None` when the operation declares no entity set path.
    pub fn returned_binding_target(
        &self,
        edm: &Edm,
        binding: &Arc<BindingTarget>,
    ) -> Result<Option<Arc<BindingTarget>>> {
        let Some(path) = &self.entity_set_path else {
            return Ok(None);
        };
        let rest = match self.binding_parameter() {
            Some(parameter) => match path.split_once('/') {
                Some((head, rest)) if head == parameter.name() => rest,
                None if path.as_str() == parameter.name() => "",
                _ => path.as_str(),
            },
            None => path.as_str(),
        };
        if rest.is_empty() {
            return Ok(Some(binding.clone()));
        }
        match binding.related_binding_target(edm, rest)? {
            Some(target) => Ok(Some(target)),
            None => Err(Error::definition(format!(
                "Cannot find binding target with path: {} of {} from {}",
                path,
                self.name,
                binding.name()
            ))),
        }
    }
}
