//! The central registry
//!
//! [`Edm`] owns every cache. Each lookup alias-resolves the name, probes the
//! per-kind table and, on a miss, asks the provider for the raw record. The
//! resolved node is stored before anything it references is looked up; links
//! to other nodes are filled on first use. A name the provider does not know
//! answers `Ok(None)` and leaves nothing behind, so a later lookup asks again.

use crate::annotation::{resolve_target, Annotation, AnnotationTarget, AnnotationsGroup, Term};
use crate::arena::{Id, Table};
use crate::config::EdmConfig;
use crate::container::EntityContainer;
use crate::operation::Operation;
use crate::schema::EdmSchema;
use crate::type_info::{EdmType, TypeRef};
use crate::types::{ComplexType, EntityType, EnumType, TypeDefinition};
use crate::{Error, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use edm_csdl::{EdmProvider, ProviderResult, QualifiedName};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, trace, warn};

type Overloads = Arc<[Arc<Operation>]>;
type GroupKey = (String, Option<String>);

/// Memoizing registry over an [`EdmProvider`]
///
/// Resolving the same qualified name twice yields the same `Arc`. The
/// registry is `Send + Sync`; concurrent first lookups of one name converge
/// on a single node.
pub struct Edm {
    provider: Arc<dyn EdmProvider>,
    config: EdmConfig,
    aliases: OnceLock<HashMap<String, String>>,
    default_container: OnceLock<Option<QualifiedName>>,
    entity_types: Table<QualifiedName, EntityType>,
    complex_types: Table<QualifiedName, ComplexType>,
    enum_types: Table<QualifiedName, EnumType>,
    type_definitions: Table<QualifiedName, TypeDefinition>,
    terms: Table<QualifiedName, Term>,
    containers: Table<QualifiedName, EntityContainer>,
    actions: DashMap<QualifiedName, Overloads>,
    functions: DashMap<QualifiedName, Overloads>,
    annotation_groups: Table<GroupKey, AnnotationsGroup>,
    annotations: DashMap<String, Arc<[Arc<Annotation>]>>,
    schemas: OnceLock<Vec<Arc<EdmSchema>>>,
}

impl fmt::Debug for Edm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edm")
            .field("config", &self.config)
            .field("entity_types", &self.entity_types.len())
            .field("complex_types", &self.complex_types.len())
            .field("enum_types", &self.enum_types.len())
            .field("type_definitions", &self.type_definitions.len())
            .field("terms", &self.terms.len())
            .field("containers", &self.containers.len())
            .finish_non_exhaustive()
    }
}

impl Edm {
    /// Create a registry with the default configuration
    pub fn new(provider: Arc<dyn EdmProvider>) -> Self {
        Self::with_config(provider, EdmConfig::default())
    }

    pub fn with_config(provider: Arc<dyn EdmProvider>, config: EdmConfig) -> Self {
        Self {
            provider,
            config,
            aliases: OnceLock::new(),
            default_container: OnceLock::new(),
            entity_types: Table::new(),
            complex_types: Table::new(),
            enum_types: Table::new(),
            type_definitions: Table::new(),
            terms: Table::new(),
            containers: Table::new(),
            actions: DashMap::new(),
            functions: DashMap::new(),
            annotation_groups: Table::new(),
            annotations: DashMap::new(),
            schemas: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &EdmConfig {
        &self.config
    }

    pub fn provider(&self) -> &dyn EdmProvider {
        self.provider.as_ref()
    }

    // Aliases

    fn aliases(&self) -> Result<&HashMap<String, String>> {
        if let Some(aliases) = self.aliases.get() {
            return Ok(aliases);
        }
        let infos = self
            .provider
            .get_alias_infos()
            .map_err(|e| Error::provider("loading alias infos", e))?;
        debug!("Loaded {} namespace aliases", infos.len());
        let aliases = infos
            .into_iter()
            .map(|info| (info.alias, info.namespace))
            .collect();
        Ok(self.aliases.get_or_init(|| aliases))
    }

    /// Namespace an alias stands for
    pub fn namespace_for_alias(&self, alias: &str) -> Result<Option<String>> {
        Ok(self.aliases()?.get(alias).cloned())
    }

    /// Replace an alias namespace by the namespace it stands for
    pub fn resolve_alias(&self, name: &QualifiedName) -> Result<QualifiedName> {
        Ok(match self.aliases()?.get(name.namespace()) {
            Some(namespace) => name.with_namespace(namespace.clone()),
            None => name.clone(),
        })
    }

    /// Alias-resolve the base of a `Base[/Path]` target string
    fn normalize_target(&self, target: &str) -> Result<String> {
        let (base, path) = match target.split_once('/') {
            Some((base, path)) => (base, Some(path)),
            None => (target, None),
        };
        let base = match QualifiedName::parse(base) {
            Ok(name) => self.resolve_alias(&name)?.to_string(),
            Err(_) => base.to_string(),
        };
        Ok(match path {
            Some(path) => format!("{base}/{path}"),
            None => base,
        })
    }

    // Named types and terms

    pub fn entity_type(&self, name: &QualifiedName) -> Result<Option<Arc<EntityType>>> {
        self.entity_type_id(name)?
            .map(|id| self.entity_type_by_id(id))
            .transpose()
    }

    pub fn complex_type(&self, name: &QualifiedName) -> Result<Option<Arc<ComplexType>>> {
        self.complex_type_id(name)?
            .map(|id| self.complex_type_by_id(id))
            .transpose()
    }

    pub fn enum_type(&self, name: &QualifiedName) -> Result<Option<Arc<EnumType>>> {
        self.enum_type_id(name)?
            .map(|id| self.enum_type_by_id(id))
            .transpose()
    }

    pub fn type_definition(&self, name: &QualifiedName) -> Result<Option<Arc<TypeDefinition>>> {
        self.type_definition_id(name)?
            .map(|id| self.type_definition_by_id(id))
            .transpose()
    }

    pub fn term(&self, name: &QualifiedName) -> Result<Option<Arc<Term>>> {
        self.term_id(name)?.map(|id| self.term_by_id(id)).transpose()
    }

    pub(crate) fn entity_type_id(&self, name: &QualifiedName) -> Result<Option<Id<EntityType>>> {
        self.lookup(
            &self.entity_types,
            "entity type",
            name,
            |provider, name| provider.get_entity_type(name),
            EntityType::from_csdl,
        )
    }

    pub(crate) fn complex_type_id(&self, name: &QualifiedName) -> Result<Option<Id<ComplexType>>> {
        self.lookup(
            &self.complex_types,
            "complex type",
            name,
            |provider, name| provider.get_complex_type(name),
            ComplexType::from_csdl,
        )
    }

    pub(crate) fn enum_type_id(&self, name: &QualifiedName) -> Result<Option<Id<EnumType>>> {
        self.lookup(
            &self.enum_types,
            "enum type",
            name,
            |provider, name| provider.get_enum_type(name),
            EnumType::from_csdl,
        )
    }

    pub(crate) fn type_definition_id(
        &self,
        name: &QualifiedName,
    ) -> Result<Option<Id<TypeDefinition>>> {
        self.lookup(
            &self.type_definitions,
            "type definition",
            name,
            |provider, name| provider.get_type_definition(name),
            TypeDefinition::from_csdl,
        )
    }

    pub(crate) fn term_id(&self, name: &QualifiedName) -> Result<Option<Id<Term>>> {
        self.lookup(
            &self.terms,
            "term",
            name,
            |provider, name| provider.get_term(name),
            Term::from_csdl,
        )
    }

    pub(crate) fn entity_type_by_id(&self, id: Id<EntityType>) -> Result<Arc<EntityType>> {
        node(&self.entity_types, "entity type", id)
    }

    pub(crate) fn complex_type_by_id(&self, id: Id<ComplexType>) -> Result<Arc<ComplexType>> {
        node(&self.complex_types, "complex type", id)
    }

    pub(crate) fn enum_type_by_id(&self, id: Id<EnumType>) -> Result<Arc<EnumType>> {
        node(&self.enum_types, "enum type", id)
    }

    pub(crate) fn type_definition_by_id(
        &self,
        id: Id<TypeDefinition>,
    ) -> Result<Arc<TypeDefinition>> {
        node(&self.type_definitions, "type definition", id)
    }

    pub(crate) fn term_by_id(&self, id: Id<Term>) -> Result<Arc<Term>> {
        node(&self.terms, "term", id)
    }

    pub(crate) fn container_by_id(&self, id: Id<EntityContainer>) -> Result<Arc<EntityContainer>> {
        node(&self.containers, "entity container", id)
    }

    pub(crate) fn materialize(&self, type_ref: TypeRef) -> Result<EdmType> {
        Ok(match type_ref {
            TypeRef::Primitive(kind) => EdmType::Primitive(kind),
            TypeRef::Definition(id) => EdmType::Definition(self.type_definition_by_id(id)?),
            TypeRef::Enum(id) => EdmType::Enum(self.enum_type_by_id(id)?),
            TypeRef::Complex(id) => EdmType::Complex(self.complex_type_by_id(id)?),
            TypeRef::Entity(id) => EdmType::Entity(self.entity_type_by_id(id)?),
        })
    }

    /// Probe `table`, then build from the provider record on a miss
    fn lookup<T, R>(
        &self,
        table: &Table<QualifiedName, T>,
        kind: &'static str,
        name: &QualifiedName,
        fetch: impl FnOnce(&dyn EdmProvider, &QualifiedName) -> ProviderResult<Option<R>>,
        build: impl FnOnce(QualifiedName, &R) -> Result<T>,
    ) -> Result<Option<Id<T>>> {
        let name = self.resolve_alias(name)?;
        if let Some(id) = table.id(&name) {
            trace!("Cache hit for {}: {}", kind, name);
            return Ok(Some(id));
        }

        table.get_or_try_insert(name.clone(), || {
            debug!("Cache miss for {}: {}", kind, name);
            let record = fetch(self.provider.as_ref(), &name)
                .map_err(|e| Error::provider(format!("loading {kind} {name}"), e))?;
            let Some(record) = record else {
                return Ok(None);
            };
            build(name.clone(), &record).map(Some).inspect_err(|e| {
                warn!("Invalid {} {}: {}", kind, name, e);
            })
        })
    }

    // Containers

    /// Name of the default container, asked from the provider once
    pub fn default_container_name(&self) -> Result<Option<QualifiedName>> {
        if let Some(name) = self.default_container.get() {
            return Ok(name.clone());
        }
        let info = self
            .provider
            .get_entity_container_info(None)
            .map_err(|e| Error::provider("loading default entity container info", e))?;
        let name = info.map(|info| info.container_name);
        Ok(self.default_container.get_or_init(|| name).clone())
    }

    /// Container by name; `None` asks for the default container
    pub fn entity_container(
        &self,
        name: Option<&QualifiedName>,
    ) -> Result<Option<Arc<EntityContainer>>> {
        self.entity_container_id(name)?
            .map(|id| self.container_by_id(id))
            .transpose()
    }

    pub(crate) fn entity_container_id(
        &self,
        name: Option<&QualifiedName>,
    ) -> Result<Option<Id<EntityContainer>>> {
        let name = match name {
            Some(name) => name.clone(),
            None => match self.default_container_name()? {
                Some(name) => name,
                None => return Ok(None),
            },
        };
        self.lookup(
            &self.containers,
            "entity container",
            &name,
            |provider, name| provider.get_entity_container_info(Some(name)),
            |_, info| Ok(EntityContainer::from_info(info)),
        )
    }

    // Operations

    /// Every action overload sharing `name`, in provider order
    pub fn actions(&self, name: &QualifiedName) -> Result<Vec<Arc<Operation>>> {
        Ok(self.action_overloads(name)?.to_vec())
    }

    /// Every function overload sharing `name`, in provider order
    pub fn functions(&self, name: &QualifiedName) -> Result<Vec<Arc<Operation>>> {
        Ok(self.function_overloads(name)?.to_vec())
    }

    pub fn unbound_action(&self, name: &QualifiedName) -> Result<Option<Arc<Operation>>> {
        Ok(self
            .action_overloads(name)?
            .iter()
            .find(|action| !action.is_bound())
            .cloned())
    }

    /// First action bound to exactly this binding type and collection-ness
    pub fn bound_action(
        &self,
        name: &QualifiedName,
        binding_type: &QualifiedName,
        is_binding_collection: bool,
    ) -> Result<Option<Arc<Operation>>> {
        let binding_type = self.resolve_alias(binding_type)?;
        for action in self.action_overloads(name)?.iter() {
            if action.is_bound()
                && action.matches_binding(self, &binding_type, is_binding_collection)?
            {
                return Ok(Some(action.clone()));
            }
        }
        Ok(None)
    }

    pub fn unbound_functions(&self, name: &QualifiedName) -> Result<Vec<Arc<Operation>>> {
        Ok(self
            .function_overloads(name)?
            .iter()
            .filter(|function| !function.is_bound())
            .cloned()
            .collect())
    }

    /// Unbound overload whose parameter names are exactly `parameter_names`
    ///
    /// `None` matches only an overload without parameters.
    pub fn unbound_function(
        &self,
        name: &QualifiedName,
        parameter_names: Option<&[&str]>,
    ) -> Result<Option<Arc<Operation>>> {
        let names: HashSet<&str> = parameter_names.unwrap_or_default().iter().copied().collect();
        Ok(self
            .function_overloads(name)?
            .iter()
            .find(|function| !function.is_bound() && function.matches_parameter_names(&names))
            .cloned())
    }

    /// Bound overload matching the binding signature and the remaining parameter names
    pub fn bound_function(
        &self,
        name: &QualifiedName,
        binding_type: &QualifiedName,
        is_binding_collection: bool,
        parameter_names: Option<&[&str]>,
    ) -> Result<Option<Arc<Operation>>> {
        let binding_type = self.resolve_alias(binding_type)?;
        let names: HashSet<&str> = parameter_names.unwrap_or_default().iter().copied().collect();
        for function in self.function_overloads(name)?.iter() {
            if function.is_bound()
                && function.matches_binding(self, &binding_type, is_binding_collection)?
                && function.matches_parameter_names(&names)
            {
                return Ok(Some(function.clone()));
            }
        }
        Ok(None)
    }

    fn action_overloads(&self, name: &QualifiedName) -> Result<Overloads> {
        self.overloads(
            &self.actions,
            "action",
            name,
            |provider, name| provider.get_actions(name),
            Operation::from_action,
        )
    }

    fn function_overloads(&self, name: &QualifiedName) -> Result<Overloads> {
        self.overloads(
            &self.functions,
            "function",
            name,
            |provider, name| provider.get_functions(name),
            Operation::from_function,
        )
    }

    fn overloads<R>(
        &self,
        cache: &DashMap<QualifiedName, Overloads>,
        kind: &'static str,
        name: &QualifiedName,
        fetch: impl FnOnce(&dyn EdmProvider, &QualifiedName) -> ProviderResult<Option<Vec<R>>>,
        build: impl Fn(QualifiedName, &R) -> Result<Operation>,
    ) -> Result<Overloads> {
        let name = self.resolve_alias(name)?;
        if let Some(overloads) = cache.get(&name) {
            trace!("Cache hit for {}: {}", kind, name);
            return Ok(overloads.clone());
        }

        match cache.entry(name.clone()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                debug!("Cache miss for {}: {}", kind, name);
                let records = fetch(self.provider.as_ref(), &name)
                    .map_err(|e| Error::provider(format!("loading {kind} {name}"), e))?;
                let Some(records) = records else {
                    return Ok(Arc::from(Vec::new()));
                };
                let overloads = records
                    .iter()
                    .map(|record| build(name.clone(), record).map(Arc::new))
                    .collect::<Result<Vec<_>>>()
                    .inspect_err(|e| warn!("Invalid {} {}: {}", kind, name, e))?;
                Ok(entry.insert(Arc::from(overloads)).clone())
            }
        }
    }

    // Annotations

    /// External annotations for a target and qualifier
    pub fn annotations_group(
        &self,
        target: &str,
        qualifier: Option<&str>,
    ) -> Result<Option<Arc<AnnotationsGroup>>> {
        let key = (
            self.normalize_target(target)?,
            qualifier.map(ToString::to_string),
        );
        if let Some(id) = self.annotation_groups.id(&key) {
            trace!("Cache hit for annotations group: {}", key.0);
            return node(&self.annotation_groups, "annotations group", id).map(Some);
        }

        let id = self.annotation_groups.get_or_try_insert(key.clone(), || {
            debug!("Cache miss for annotations group: {}", key.0);
            self.provider
                .get_annotations_group(&key.0, key.1.as_deref())
                .map_err(|e| Error::provider(format!("loading annotations for {}", key.0), e))?
                .map(|record| AnnotationsGroup::from_csdl(&record))
                .transpose()
        })?;
        id.map(|id| node(&self.annotation_groups, "annotations group", id))
            .transpose()
    }

    /// Inline annotations of the element `target` names, then those of the
    /// unqualified external group targeting it
    pub fn annotations_for(&self, target: &str) -> Result<Vec<Arc<Annotation>>> {
        let target = self.normalize_target(target)?;
        if let Some(annotations) = self.annotations.get(&target) {
            trace!("Cache hit for annotations: {}", target);
            return Ok(annotations.to_vec());
        }

        debug!("Cache miss for annotations: {}", target);
        let mut annotations = match self
            .provider
            .get_annotatable(&target)
            .map_err(|e| Error::provider(format!("loading inline annotations for {target}"), e))?
        {
            Some(records) => Annotation::from_csdl_list(&records)?,
            None => Vec::new(),
        };
        if let Some(group) = self.annotations_group(&target, None)? {
            annotations.extend(group.annotations().iter().cloned());
        }

        let stored = self
            .annotations
            .entry(target)
            .or_insert_with(|| Arc::from(annotations))
            .clone();
        Ok(stored.to_vec())
    }

    /// Model element a `Base[/Path]` target string names
    pub fn annotation_target(&self, target: &str) -> Result<Option<AnnotationTarget>> {
        resolve_target(self, target)
    }

    // Schemas

    /// Every schema the provider can enumerate, in provider order
    pub fn schemas(&self) -> Result<Vec<Arc<EdmSchema>>> {
        if let Some(schemas) = self.schemas.get() {
            return Ok(schemas.clone());
        }
        let records = self
            .provider
            .get_schemas()
            .map_err(|e| Error::provider("loading schemas", e))?;
        let schemas = records
            .iter()
            .map(|record| Arc::new(EdmSchema::from_csdl(record)))
            .collect();
        Ok(self.schemas.get_or_init(|| schemas).clone())
    }
}

fn node<K, T>(table: &Table<K, T>, kind: &str, id: Id<T>) -> Result<Arc<T>>
where
    K: Eq + std::hash::Hash,
{
    table
        .get(id)
        .ok_or_else(|| Error::definition(format!("No {kind} stored under {id:?}")))
}
