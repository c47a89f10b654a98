//! Entity containers and their children
//!
//! Container children are cached per container and per name. They are
//! fetched one at a time, or, with `bulk_load_containers`, all at once on
//! first use; both paths store into the same maps. Enumerating children
//! always loads the whole container. A child missing from a container is
//! looked up in its parent containers.

use crate::annotation::Annotation;
use crate::arena::Id;
use crate::edm::Edm;
use crate::operation::Operation;
use crate::types::EntityType;
use crate::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use edm_csdl::{
    CsdlActionImport, CsdlAnnotation, CsdlEntityContainer, CsdlEntityContainerInfo, CsdlEntitySet,
    CsdlFunctionImport, CsdlNavigationPropertyBinding, CsdlSingleton, QualifiedName,
};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, trace};

/// Entity set or singleton
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingTargetKind {
    EntitySet { include_in_service_document: bool },
    Singleton,
}

/// Entity set or singleton of a container
#[derive(Debug)]
pub struct BindingTarget {
    kind: BindingTargetKind,
    name: String,
    container: QualifiedName,
    entity_type_name: QualifiedName,
    entity_type: OnceLock<Id<EntityType>>,
    bindings: Vec<CsdlNavigationPropertyBinding>,
    annotations: Vec<Arc<Annotation>>,
}

impl BindingTarget {
    pub(crate) fn entity_set(container: &QualifiedName, record: &CsdlEntitySet) -> Result<Self> {
        Self::build(
            BindingTargetKind::EntitySet {
                include_in_service_document: record.include_in_service_document,
            },
            container,
            &record.name,
            &record.entity_type,
            &record.navigation_property_bindings,
            &record.annotations,
        )
    }

    pub(crate) fn singleton(container: &QualifiedName, record: &CsdlSingleton) -> Result<Self> {
        Self::build(
            BindingTargetKind::Singleton,
            container,
            &record.name,
            &record.entity_type,
            &record.navigation_property_bindings,
            &record.annotations,
        )
    }

    fn build(
        kind: BindingTargetKind,
        container: &QualifiedName,
        name: &str,
        entity_type: &QualifiedName,
        bindings: &[CsdlNavigationPropertyBinding],
        annotations: &[CsdlAnnotation],
    ) -> Result<Self> {
        if let Some(binding) = bindings
            .iter()
            .find(|b| b.path.is_empty() || b.target.is_empty())
        {
            return Err(Error::definition(format!(
                "Path and target of a navigation property binding in {}/{} must not be empty (path '{}', target '{}')",
                container, name, binding.path, binding.target
            )));
        }
        Ok(Self {
            kind,
            name: name.to_string(),
            container: container.clone(),
            entity_type_name: entity_type.clone(),
            entity_type: OnceLock::new(),
            bindings: bindings.to_vec(),
            annotations: Annotation::from_csdl_list(annotations)?,
        })
    }

    pub fn kind(&self) -> BindingTargetKind {
        self.kind
    }

    pub fn is_entity_set(&self) -> bool {
        matches!(self.kind, BindingTargetKind::EntitySet { .. })
    }

    pub fn is_singleton(&self) -> bool {
        self.kind == BindingTargetKind::Singleton
    }

    /// Whether an entity set is listed in the service document
    pub fn include_in_service_document(&self) -> bool {
        match self.kind {
            BindingTargetKind::EntitySet {
                include_in_service_document,
            } => include_in_service_document,
            BindingTargetKind::Singleton => false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container_name(&self) -> &QualifiedName {
        &self.container
    }

    pub fn entity_type_name(&self) -> &QualifiedName {
        &self.entity_type_name
    }

    pub fn navigation_property_bindings(&self) -> &[CsdlNavigationPropertyBinding] {
        &self.bindings
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    pub fn entity_type(&self, edm: &Edm) -> Result<Arc<EntityType>> {
        if let Some(id) = self.entity_type.get() {
            return edm.entity_type_by_id(*id);
        }
        match edm.entity_type_id(&self.entity_type_name)? {
            Some(id) => {
                let _ = self.entity_type.set(id);
                edm.entity_type_by_id(id)
            }
            None => Err(Error::definition(format!(
                "Cannot find entity type with name: {} for {}/{}",
                self.entity_type_name, self.container, self.name
            ))),
        }
    }

    /// Binding target reached through a navigation property path
    ///
    /// The first binding whose path equals `path`, or is followed in `path`
    /// by `/`, wins. Its target is `Name` (in this container) or
    /// `Namespace.Container/Name`, and names an entity set or, failing that,
    /// a singleton. An empty path has no target.
    pub fn related_binding_target(
        &self,
        edm: &Edm,
        path: &str,
    ) -> Result<Option<Arc<BindingTarget>>> {
        if path.is_empty() {
            return Ok(None);
        }

        let Some(binding) = self
            .bindings
            .iter()
            .find(|binding| binding_path_matches(&binding.path, path))
        else {
            trace!(binding_target = %self.name, path, "no navigation property binding");
            return Ok(None);
        };

        let (container, target) = split_target(edm, &self.container, &binding.target)?;
        if let Some(entity_set) = container.entity_set(edm, target)? {
            return Ok(Some(entity_set));
        }
        if let Some(singleton) = container.singleton(edm, target)? {
            return Ok(Some(singleton));
        }
        Err(Error::definition(format!(
            "Cannot find target with name: {} in container {} for binding {} of {}",
            target,
            container.name(),
            binding.path,
            self.name
        )))
    }
}

fn binding_path_matches(binding_path: &str, path: &str) -> bool {
    match path.strip_prefix(binding_path) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Split `[Namespace.Container/]Name`, defaulting to `current`
fn split_target<'a>(
    edm: &Edm,
    current: &QualifiedName,
    target: &'a str,
) -> Result<(Arc<EntityContainer>, &'a str)> {
    let (container_name, name) = match target.split_once('/') {
        Some((container, name)) => (edm.resolve_alias(&QualifiedName::parse(container)?)?, name),
        None => (current.clone(), target),
    };
    let container = edm.entity_container(Some(&container_name))?.ok_or_else(|| {
        Error::definition(format!(
            "Cannot find entity container with name: {}",
            container_name
        ))
    })?;
    Ok((container, name))
}

/// Action exposed at container level
#[derive(Debug)]
pub struct ActionImport {
    name: String,
    container: QualifiedName,
    action: QualifiedName,
    entity_set: Option<String>,
    annotations: Vec<Arc<Annotation>>,
}

impl ActionImport {
    pub(crate) fn from_csdl(container: &QualifiedName, record: &CsdlActionImport) -> Result<Self> {
        Ok(Self {
            name: record.name.clone(),
            container: container.clone(),
            action: record.action.clone(),
            entity_set: record.entity_set.clone(),
            annotations: Annotation::from_csdl_list(&record.annotations)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container_name(&self) -> &QualifiedName {
        &self.container
    }

    pub fn action_name(&self) -> &QualifiedName {
        &self.action
    }

    pub fn entity_set_path(&self) -> Option<&str> {
        self.entity_set.as_deref()
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    /// The unbound action the import exposes; it must exist
    pub fn unbound_action(&self, edm: &Edm) -> Result<Arc<Operation>> {
        edm.unbound_action(&self.action)?.ok_or_else(|| {
            Error::definition(format!(
                "Cannot find unbound action {} for action import {}",
                self.action, self.name
            ))
        })
    }

    pub fn returned_entity_set(&self, edm: &Edm) -> Result<Option<Arc<BindingTarget>>> {
        returned_entity_set(edm, &self.container, self.entity_set.as_deref())
    }
}

/// Function exposed at container level
#[derive(Debug)]
pub struct FunctionImport {
    name: String,
    container: QualifiedName,
    function: QualifiedName,
    entity_set: Option<String>,
    include_in_service_document: bool,
    annotations: Vec<Arc<Annotation>>,
}

impl FunctionImport {
    pub(crate) fn from_csdl(
        container: &QualifiedName,
        record: &CsdlFunctionImport,
    ) -> Result<Self> {
        Ok(Self {
            name: record.name.clone(),
            container: container.clone(),
            function: record.function.clone(),
            entity_set: record.entity_set.clone(),
            include_in_service_document: record.include_in_service_document,
            annotations: Annotation::from_csdl_list(&record.annotations)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container_name(&self) -> &QualifiedName {
        &self.container
    }

    pub fn function_name(&self) -> &QualifiedName {
        &self.function
    }

    pub fn entity_set_path(&self) -> Option<&str> {
        self.entity_set.as_deref()
    }

    pub fn include_in_service_document(&self) -> bool {
        self.include_in_service_document
    }

    pub fn annotations(&self) -> &[Arc<Annotation>] {
        &self.annotations
    }

    /// Every unbound overload of the imported function
    pub fn unbound_functions(&self, edm: &Edm) -> Result<Vec<Arc<Operation>>> {
        edm.unbound_functions(&self.function)
    }

    /// The unbound overload with exactly these parameter names
    pub fn unbound_function(
        &self,
        edm: &Edm,
        parameter_names: Option<&[&str]>,
    ) -> Result<Option<Arc<Operation>>> {
        edm.unbound_function(&self.function, parameter_names)
    }

    pub fn returned_entity_set(&self, edm: &Edm) -> Result<Option<Arc<BindingTarget>>> {
        returned_entity_set(edm, &self.container, self.entity_set.as_deref())
    }
}

fn returned_entity_set(
    edm: &Edm,
    container: &QualifiedName,
    entity_set: Option<&str>,
) -> Result<Option<Arc<BindingTarget>>> {
    let Some(text) = entity_set else {
        return Ok(None);
    };
    let (container, name) = split_target(edm, container, text)?;
    match container.entity_set(edm, name)? {
        Some(entity_set) => Ok(Some(entity_set)),
        None => Err(Error::definition(format!(
            "Cannot find entity set with name: {} in container {}",
            name,
            container.name()
        ))),
    }
}

/// Child names of a fully loaded container, in declaration order
#[derive(Debug)]
struct Listing {
    entity_sets: Vec<String>,
    singletons: Vec<String>,
    action_imports: Vec<String>,
    function_imports: Vec<String>,
}

/// Resolved entity container
pub struct EntityContainer {
    name: QualifiedName,
    parent_name: Option<QualifiedName>,
    parent: OnceLock<Id<EntityContainer>>,
    entity_sets: DashMap<String, Arc<BindingTarget>>,
    singletons: DashMap<String, Arc<BindingTarget>>,
    action_imports: DashMap<String, Arc<ActionImport>>,
    function_imports: DashMap<String, Arc<FunctionImport>>,
    listing: OnceLock<Listing>,
}

impl std::fmt::Debug for EntityContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityContainer")
            .field("name", &self.name)
            .field("parent_name", &self.parent_name)
            .field("loaded", &self.listing.get().is_some())
            .finish()
    }
}

impl EntityContainer {
    pub(crate) fn from_info(info: &CsdlEntityContainerInfo) -> Self {
        Self {
            name: info.container_name.clone(),
            parent_name: info.extends_container.clone(),
            parent: OnceLock::new(),
            entity_sets: DashMap::new(),
            singletons: DashMap::new(),
            action_imports: DashMap::new(),
            function_imports: DashMap::new(),
            listing: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn parent_name(&self) -> Option<&QualifiedName> {
        self.parent_name.as_ref()
    }

    /// The container this one extends; a missing parent is a definition error
    pub fn parent(&self, edm: &Edm) -> Result<Option<Arc<EntityContainer>>> {
        let Some(parent_name) = &self.parent_name else {
            return Ok(None);
        };
        if let Some(id) = self.parent.get() {
            return edm.container_by_id(*id).map(Some);
        }
        match edm.entity_container_id(Some(parent_name))? {
            Some(id) => {
                let _ = self.parent.set(id);
                edm.container_by_id(id).map(Some)
            }
            None => Err(Error::definition(format!(
                "Cannot find parent container with name: {} for container {}",
                parent_name, self.name
            ))),
        }
    }

    /// Parent containers, nearest first
    pub fn ancestors(&self, edm: &Edm) -> Result<Vec<Arc<EntityContainer>>> {
        let max_depth = edm.config().max_inheritance_depth;
        let mut visited = HashSet::from([self.name.clone()]);
        let mut chain: Vec<Arc<EntityContainer>> = Vec::new();
        let mut next = self.parent(edm)?;

        while let Some(parent) = next {
            if !visited.insert(parent.name.clone()) {
                return Err(Error::inheritance(format!(
                    "Cyclic container extension: {} reaches {} again",
                    self.name, parent.name
                )));
            }
            if chain.len() >= max_depth {
                return Err(Error::inheritance(format!(
                    "Container extension chain of {} is deeper than {} levels",
                    self.name, max_depth
                )));
            }
            next = parent.parent(edm)?;
            chain.push(parent);
        }
        Ok(chain)
    }

    pub fn entity_set(&self, edm: &Edm, name: &str) -> Result<Option<Arc<BindingTarget>>> {
        self.child(
            edm,
            name,
            ChildKind::EntitySet,
            |c| &c.entity_sets,
            |edm, c, name| {
                edm.provider()
                    .get_entity_set(&c.name, name)
                    .map_err(|e| {
                        Error::provider(format!("loading entity set {}/{}", c.name, name), e)
                    })?
                    .map(|record| BindingTarget::entity_set(&c.name, &record))
                    .transpose()
            },
        )
    }

    pub fn singleton(&self, edm: &Edm, name: &str) -> Result<Option<Arc<BindingTarget>>> {
        self.child(
            edm,
            name,
            ChildKind::Singleton,
            |c| &c.singletons,
            |edm, c, name| {
                edm.provider()
                    .get_singleton(&c.name, name)
                    .map_err(|e| {
                        Error::provider(format!("loading singleton {}/{}", c.name, name), e)
                    })?
                    .map(|record| BindingTarget::singleton(&c.name, &record))
                    .transpose()
            },
        )
    }

    pub fn action_import(&self, edm: &Edm, name: &str) -> Result<Option<Arc<ActionImport>>> {
        self.child(
            edm,
            name,
            ChildKind::ActionImport,
            |c| &c.action_imports,
            |edm, c, name| {
                edm.provider()
                    .get_action_import(&c.name, name)
                    .map_err(|e| {
                        Error::provider(format!("loading action import {}/{}", c.name, name), e)
                    })?
                    .map(|record| ActionImport::from_csdl(&c.name, &record))
                    .transpose()
            },
        )
    }

    pub fn function_import(&self, edm: &Edm, name: &str) -> Result<Option<Arc<FunctionImport>>> {
        self.child(
            edm,
            name,
            ChildKind::FunctionImport,
            |c| &c.function_imports,
            |edm, c, name| {
                edm.provider()
                    .get_function_import(&c.name, name)
                    .map_err(|e| {
                        Error::provider(format!("loading function import {}/{}", c.name, name), e)
                    })?
                    .map(|record| FunctionImport::from_csdl(&c.name, &record))
                    .transpose()
            },
        )
    }

    /// Every entity set, own first, then inherited ones not shadowed by name
    pub fn entity_sets(&self, edm: &Edm) -> Result<Vec<Arc<BindingTarget>>> {
        self.children(edm, |c| &c.entity_sets, |l| &l.entity_sets)
    }

    pub fn singletons(&self, edm: &Edm) -> Result<Vec<Arc<BindingTarget>>> {
        self.children(edm, |c| &c.singletons, |l| &l.singletons)
    }

    pub fn action_imports(&self, edm: &Edm) -> Result<Vec<Arc<ActionImport>>> {
        self.children(edm, |c| &c.action_imports, |l| &l.action_imports)
    }

    pub fn function_imports(&self, edm: &Edm) -> Result<Vec<Arc<FunctionImport>>> {
        self.children(edm, |c| &c.function_imports, |l| &l.function_imports)
    }

    /// Look up a child here, then in the parent chain
    fn child<T>(
        &self,
        edm: &Edm,
        name: &str,
        kind: ChildKind,
        map: impl Fn(&EntityContainer) -> &DashMap<String, Arc<T>>,
        fetch: impl Fn(&Edm, &EntityContainer, &str) -> Result<Option<T>>,
    ) -> Result<Option<Arc<T>>> {
        if let Some(found) = self.own_child(edm, name, kind, &map, &fetch)? {
            return Ok(Some(found));
        }
        if self.parent_name.is_none() {
            return Ok(None);
        }
        for parent in self.ancestors(edm)? {
            if let Some(found) = parent.own_child(edm, name, kind, &map, &fetch)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    fn own_child<T>(
        &self,
        edm: &Edm,
        name: &str,
        kind: ChildKind,
        map: &impl Fn(&EntityContainer) -> &DashMap<String, Arc<T>>,
        fetch: &impl Fn(&Edm, &EntityContainer, &str) -> Result<Option<T>>,
    ) -> Result<Option<Arc<T>>> {
        let children = map(self);
        if let Some(found) = children.get(name) {
            trace!("Cache hit for {}: {}/{}", kind, self.name, name);
            return Ok(Some(found.clone()));
        }

        if edm.config().bulk_load_containers {
            self.load(edm)?;
            return Ok(children.get(name).map(|found| found.clone()));
        }
        if self.listing.get().is_some() {
            return Ok(None);
        }

        match children.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(Some(entry.get().clone())),
            Entry::Vacant(entry) => {
                debug!("Cache miss for {}: {}/{}", kind, self.name, name);
                match fetch(edm, self, name)? {
                    Some(child) => Ok(Some(entry.insert(Arc::new(child)).clone())),
                    None => Ok(None),
                }
            }
        }
    }

    fn children<T>(
        &self,
        edm: &Edm,
        map: impl Fn(&EntityContainer) -> &DashMap<String, Arc<T>>,
        names: impl Fn(&Listing) -> &Vec<String>,
    ) -> Result<Vec<Arc<T>>> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();
        let ancestors = if self.parent_name.is_some() {
            self.ancestors(edm)?
        } else {
            Vec::new()
        };

        for container in std::iter::once(self).chain(ancestors.iter().map(|parent| &**parent)) {
            let listing = container.load(edm)?;
            let children = map(container);
            for name in names(listing) {
                if !seen.insert(name.clone()) {
                    continue;
                }
                if let Some(child) = children.get(name) {
                    result.push(child.clone());
                }
            }
        }
        Ok(result)
    }

    /// Fetch the whole container once and store every child
    fn load(&self, edm: &Edm) -> Result<&Listing> {
        if let Some(listing) = self.listing.get() {
            return Ok(listing);
        }

        info!("Loading entity container: {}", self.name);
        let record = edm
            .provider()
            .get_entity_container_by_name(&self.name)
            .map_err(|e| Error::provider(format!("loading entity container {}", self.name), e))?
            .ok_or_else(|| {
                Error::definition(format!(
                    "Provider has no record for entity container {}",
                    self.name
                ))
            })?;

        let listing = self.store_all(&record)?;
        Ok(self.listing.get_or_init(|| listing))
    }

    fn store_all(&self, record: &CsdlEntityContainer) -> Result<Listing> {
        for entity_set in &record.entity_sets {
            if let Entry::Vacant(entry) = self.entity_sets.entry(entity_set.name.clone()) {
                entry.insert(Arc::new(BindingTarget::entity_set(&self.name, entity_set)?));
            }
        }
        for singleton in &record.singletons {
            if let Entry::Vacant(entry) = self.singletons.entry(singleton.name.clone()) {
                entry.insert(Arc::new(BindingTarget::singleton(&self.name, singleton)?));
            }
        }
        for import in &record.action_imports {
            if let Entry::Vacant(entry) = self.action_imports.entry(import.name.clone()) {
                entry.insert(Arc::new(ActionImport::from_csdl(&self.name, import)?));
            }
        }
        for import in &record.function_imports {
            if let Entry::Vacant(entry) = self.function_imports.entry(import.name.clone()) {
                entry.insert(Arc::new(FunctionImport::from_csdl(&self.name, import)?));
            }
        }

        Ok(Listing {
            entity_sets: record.entity_sets.iter().map(|s| s.name.clone()).collect(),
            singletons: record.singletons.iter().map(|s| s.name.clone()).collect(),
            action_imports: record.action_imports.iter().map(|i| i.name.clone()).collect(),
            function_imports: record.function_imports.iter().map(|i| i.name.clone()).collect(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum ChildKind {
    EntitySet,
    Singleton,
    ActionImport,
    FunctionImport,
}

impl std::fmt::Display for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ChildKind::EntitySet => "entity set",
            ChildKind::Singleton => "singleton",
            ChildKind::ActionImport => "action import",
            ChildKind::FunctionImport => "function import",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_path_matching_is_segment_aware() {
        assert!(binding_path_matches("Orders", "Orders"));
        assert!(binding_path_matches("Orders", "Orders/Lines"));
        assert!(!binding_path_matches("Orders", "OrdersArchive"));
        assert!(!binding_path_matches("Orders/Lines", "Orders"));
    }

    #[test]
    fn test_empty_binding_is_rejected() {
        let record = CsdlEntitySet::new("Orders", QualifiedName::new("NS", "Order"))
            .with_binding("Customer", "");
        let result = BindingTarget::entity_set(&QualifiedName::new("NS", "Service"), &record);
        assert!(matches!(result, Err(Error::Definition(_))));
    }

    #[test]
    fn test_include_in_service_document() {
        let container = QualifiedName::new("NS", "Service");
        let hidden = CsdlEntitySet::new("Audit", QualifiedName::new("NS", "Entry"))
            .include_in_service_document(false);
        let entity_set = BindingTarget::entity_set(&container, &hidden).unwrap();
        assert!(entity_set.is_entity_set());
        assert!(!entity_set.include_in_service_document());

        let me = CsdlSingleton::new("Me", QualifiedName::new("NS", "User"));
        let singleton = BindingTarget::singleton(&container, &me).unwrap();
        assert!(singleton.is_singleton());
        assert_eq!(singleton.container_name(), &container);
    }
}
