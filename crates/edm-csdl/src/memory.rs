//! In-memory provider over registered schemas

use crate::model::{
    CsdlAction, CsdlActionImport, CsdlAliasInfo, CsdlAnnotation, CsdlAnnotations,
    CsdlComplexType, CsdlEntityContainer, CsdlEntityContainerInfo, CsdlEntitySet,
    CsdlEntityType, CsdlEnumType, CsdlFunction, CsdlFunctionImport, CsdlSchema, CsdlSingleton,
    CsdlTerm, CsdlTypeDefinition,
};
use crate::name::QualifiedName;
use crate::provider::{EdmProvider, ProviderResult};
use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::debug;

type GroupKey = (String, Option<String>);

/// Provider backed by schemas held in memory
///
/// Records are indexed by qualified name at registration time. The first
/// registered schema that declares an entity container supplies the default
/// container.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    schemas: IndexMap<String, CsdlSchema>,
    aliases: HashMap<String, String>,
    entity_types: HashMap<QualifiedName, CsdlEntityType>,
    complex_types: HashMap<QualifiedName, CsdlComplexType>,
    enum_types: HashMap<QualifiedName, CsdlEnumType>,
    type_definitions: HashMap<QualifiedName, CsdlTypeDefinition>,
    terms: HashMap<QualifiedName, CsdlTerm>,
    actions: HashMap<QualifiedName, Vec<CsdlAction>>,
    functions: HashMap<QualifiedName, Vec<CsdlFunction>>,
    containers: IndexMap<QualifiedName, CsdlEntityContainer>,
    default_container: Option<QualifiedName>,
    annotation_groups: HashMap<GroupKey, CsdlAnnotations>,
    annotatables: HashMap<String, Vec<CsdlAnnotation>>,
}

impl InMemoryProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding the given schemas
    pub fn from_schemas(schemas: impl IntoIterator<Item = CsdlSchema>) -> Self {
        let mut provider = Self::new();
        for schema in schemas {
            provider.register(schema);
        }
        provider
    }

    /// Register a schema, indexing all of its records
    pub fn register(&mut self, schema: CsdlSchema) {
        debug!(namespace = %schema.namespace, "registering schema");

        if let Some(alias) = &schema.alias {
            self.aliases.insert(alias.clone(), schema.namespace.clone());
            self.rekey_annotation_groups();
        }

        for entity_type in &schema.entity_types {
            let name = schema.qualify(&entity_type.name);
            self.register_annotatable(name.to_string(), &entity_type.annotations);
            for property in &entity_type.properties {
                let target = format!("{name}/{}", property.name);
                self.register_annotatable(target, &property.annotations);
            }
            for navigation in &entity_type.navigation_properties {
                self.register_annotatable(
                    format!("{name}/{}", navigation.name),
                    &navigation.annotations,
                );
            }
            self.entity_types.insert(name, entity_type.clone());
        }

        for complex_type in &schema.complex_types {
            let name = schema.qualify(&complex_type.name);
            self.register_annotatable(name.to_string(), &complex_type.annotations);
            for property in &complex_type.properties {
                let target = format!("{name}/{}", property.name);
                self.register_annotatable(target, &property.annotations);
            }
            for navigation in &complex_type.navigation_properties {
                self.register_annotatable(
                    format!("{name}/{}", navigation.name),
                    &navigation.annotations,
                );
            }
            self.complex_types.insert(name, complex_type.clone());
        }

        for enum_type in &schema.enum_types {
            let name = schema.qualify(&enum_type.name);
            self.register_annotatable(name.to_string(), &enum_type.annotations);
            for member in &enum_type.members {
                self.register_annotatable(format!("{name}/{}", member.name), &member.annotations);
            }
            self.enum_types.insert(name, enum_type.clone());
        }

        for type_definition in &schema.type_definitions {
            let name = schema.qualify(&type_definition.name);
            self.register_annotatable(name.to_string(), &type_definition.annotations);
            self.type_definitions.insert(name, type_definition.clone());
        }

        for term in &schema.terms {
            let name = schema.qualify(&term.name);
            self.register_annotatable(name.to_string(), &term.annotations);
            self.terms.insert(name, term.clone());
        }

        for action in &schema.actions {
            let name = schema.qualify(&action.name);
            self.register_annotatable(name.to_string(), &action.annotations);
            self.actions.entry(name).or_default().push(action.clone());
        }

        for function in &schema.functions {
            let name = schema.qualify(&function.name);
            self.register_annotatable(name.to_string(), &function.annotations);
            self.functions.entry(name).or_default().push(function.clone());
        }

        if let Some(container) = &schema.entity_container {
            let name = schema.qualify(&container.name);
            self.register_container_annotatables(&name, container);
            if self.default_container.is_none() {
                self.default_container = Some(name.clone());
            }
            self.containers.insert(name, container.clone());
        }

        for group in &schema.annotations {
            let target = self.normalize_target(&group.target);
            let key = (target, group.qualifier.clone());
            match self.annotation_groups.get_mut(&key) {
                Some(existing) => existing.annotations.extend(group.annotations.iter().cloned()),
                None => {
                    let mut group = group.clone();
                    group.target = key.0.clone();
                    self.annotation_groups.insert(key, group);
                }
            }
        }

        self.schemas.insert(schema.namespace.clone(), schema);
    }

    /// Get a registered schema by namespace
    pub fn schema(&self, namespace: &str) -> Option<&CsdlSchema> {
        self.schemas.get(namespace)
    }

    /// Check if a schema namespace is registered
    pub fn contains(&self, namespace: &str) -> bool {
        self.schemas.contains_key(namespace)
    }

    /// Number of registered schemas
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Normalize group keys again once a new alias is known
    fn rekey_annotation_groups(&mut self) {
        let groups: Vec<CsdlAnnotations> = self
            .annotation_groups
            .drain()
            .map(|(_, group)| group)
            .collect();
        for mut group in groups {
            group.target = self.normalize_target(&group.target);
            let key = (group.target.clone(), group.qualifier.clone());
            match self.annotation_groups.get_mut(&key) {
                Some(existing) => existing.annotations.extend(group.annotations),
                None => {
                    self.annotation_groups.insert(key, group);
                }
            }
        }
    }

    fn register_container_annotatables(
        &mut self,
        name: &QualifiedName,
        container: &CsdlEntityContainer,
    ) {
        self.register_annotatable(name.to_string(), &container.annotations);
        for entity_set in &container.entity_sets {
            let target = format!("{name}/{}", entity_set.name);
            self.register_annotatable(target, &entity_set.annotations);
        }
        for singleton in &container.singletons {
            self.register_annotatable(format!("{name}/{}", singleton.name), &singleton.annotations);
        }
        for import in &container.action_imports {
            self.register_annotatable(format!("{name}/{}", import.name), &import.annotations);
        }
        for import in &container.function_imports {
            self.register_annotatable(format!("{name}/{}", import.name), &import.annotations);
        }
    }

    fn register_annotatable(&mut self, target: String, annotations: &[CsdlAnnotation]) {
        if annotations.is_empty() {
            return;
        }
        self.annotatables
            .entry(target)
            .or_default()
            .extend(annotations.iter().cloned());
    }

    /// Replace an alias in the base part of a target string by its namespace
    fn normalize_target(&self, target: &str) -> String {
        let (base, path) = match target.split_once('/') {
            Some((base, path)) => (base, Some(path)),
            None => (target, None),
        };
        let base = match QualifiedName::parse(base) {
            Ok(name) => match self.aliases.get(name.namespace()) {
                Some(namespace) => name.with_namespace(namespace.clone()).to_string(),
                None => base.to_string(),
            },
            Err(_) => base.to_string(),
        };
        match path {
            Some(path) => format!("{base}/{path}"),
            None => base,
        }
    }

    fn container(&self, name: &QualifiedName) -> Option<&CsdlEntityContainer> {
        self.containers.get(name)
    }
}

impl EdmProvider for InMemoryProvider {
    fn get_entity_type(&self, name: &QualifiedName) -> ProviderResult<Option<CsdlEntityType>> {
        Ok(self.entity_types.get(name).cloned())
    }

    fn get_complex_type(&self, name: &QualifiedName) -> ProviderResult<Option<CsdlComplexType>> {
        Ok(self.complex_types.get(name).cloned())
    }

    fn get_enum_type(&self, name: &QualifiedName) -> ProviderResult<Option<CsdlEnumType>> {
        Ok(self.enum_types.get(name).cloned())
    }

    fn get_type_definition(
        &self,
        name: &QualifiedName,
    ) -> ProviderResult<Option<CsdlTypeDefinition>> {
        Ok(self.type_definitions.get(name).cloned())
    }

    fn get_term(&self, name: &QualifiedName) -> ProviderResult<Option<CsdlTerm>> {
        Ok(self.terms.get(name).cloned())
    }

    fn get_actions(&self, name: &QualifiedName) -> ProviderResult<Option<Vec<CsdlAction>>> {
        Ok(self.actions.get(name).cloned())
    }

    fn get_functions(&self, name: &QualifiedName) -> ProviderResult<Option<Vec<CsdlFunction>>> {
        Ok(self.functions.get(name).cloned())
    }

    fn get_entity_container_info(
        &self,
        name: Option<&QualifiedName>,
    ) -> ProviderResult<Option<CsdlEntityContainerInfo>> {
        let Some(name) = name.or(self.default_container.as_ref()) else {
            return Ok(None);
        };
        Ok(self.container(name).map(|container| CsdlEntityContainerInfo {
            container_name: name.clone(),
            extends_container: container.extends.clone(),
        }))
    }

    fn get_entity_container(&self) -> ProviderResult<Option<CsdlEntityContainer>> {
        Ok(self
            .default_container
            .as_ref()
            .and_then(|name| self.container(name))
            .cloned())
    }

    fn get_entity_container_by_name(
        &self,
        name: &QualifiedName,
    ) -> ProviderResult<Option<CsdlEntityContainer>> {
        Ok(self.container(name).cloned())
    }

    fn get_entity_set(
        &self,
        container: &QualifiedName,
        name: &str,
    ) -> ProviderResult<Option<CsdlEntitySet>> {
        Ok(self
            .container(container)
            .and_then(|c| c.entity_sets.iter().find(|s| s.name == name))
            .cloned())
    }

    fn get_singleton(
        &self,
        container: &QualifiedName,
        name: &str,
    ) -> ProviderResult<Option<CsdlSingleton>> {
        Ok(self
            .container(container)
            .and_then(|c| c.singletons.iter().find(|s| s.name == name))
            .cloned())
    }

    fn get_action_import(
        &self,
        container: &QualifiedName,
        name: &str,
    ) -> ProviderResult<Option<CsdlActionImport>> {
        Ok(self
            .container(container)
            .and_then(|c| c.action_imports.iter().find(|i| i.name == name))
            .cloned())
    }

    fn get_function_import(
        &self,
        container: &QualifiedName,
        name: &str,
    ) -> ProviderResult<Option<CsdlFunctionImport>> {
        Ok(self
            .container(container)
            .and_then(|c| c.function_imports.iter().find(|i| i.name == name))
            .cloned())
    }

    fn get_alias_infos(&self) -> ProviderResult<Vec<CsdlAliasInfo>> {
        Ok(self
            .schemas
            .values()
            .filter_map(|schema| {
                schema.alias.as_ref().map(|alias| CsdlAliasInfo {
                    namespace: schema.namespace.clone(),
                    alias: alias.clone(),
                })
            })
            .collect())
    }

    fn get_annotations_group(
        &self,
        target: &str,
        qualifier: Option<&str>,
    ) -> ProviderResult<Option<CsdlAnnotations>> {
        let key = (
            self.normalize_target(target),
            qualifier.map(ToString::to_string),
        );
        Ok(self.annotation_groups.get(&key).cloned())
    }

    fn get_annotatable(&self, target: &str) -> ProviderResult<Option<Vec<CsdlAnnotation>>> {
        Ok(self.annotatables.get(&self.normalize_target(target)).cloned())
    }

    fn get_schemas(&self) -> ProviderResult<Vec<CsdlSchema>> {
        Ok(self.schemas.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CsdlEntitySet, CsdlProperty};

    fn sales_schema() -> CsdlSchema {
        CsdlSchema::new("Org.Sales")
            .with_alias("sales")
            .with_entity_type(
                CsdlEntityType::new("Customer")
                    .with_key(["Id"])
                    .with_property(CsdlProperty::new("Id", "Edm.Int32").with_annotation(
                        CsdlAnnotation::new(QualifiedName::new("Core", "Computed")),
                    )),
            )
            .with_action(CsdlAction::new("Ship"))
            .with_action(CsdlAction::new("Ship").bound(true))
            .with_entity_container(
                CsdlEntityContainer::new("Service").with_entity_set(CsdlEntitySet::new(
                    "Customers",
                    QualifiedName::new("Org.Sales", "Customer"),
                )),
            )
            .with_annotations(
                CsdlAnnotations::new("sales.Customer")
                    .with_annotation(CsdlAnnotation::new(QualifiedName::new(
                        "Core",
                        "Description",
                    ))),
            )
    }

    #[test]
    fn test_register_and_lookup() {
        let provider = InMemoryProvider::from_schemas([sales_schema()]);
        assert!(provider.contains("Org.Sales"));
        assert_eq!(provider.len(), 1);

        let customer = provider
            .get_entity_type(&QualifiedName::new("Org.Sales", "Customer"))
            .unwrap();
        assert!(customer.is_some());

        let missing = provider
            .get_entity_type(&QualifiedName::new("Org.Sales", "Missing"))
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_overloads_are_grouped_by_name() {
        let provider = InMemoryProvider::from_schemas([sales_schema()]);
        let actions = provider
            .get_actions(&QualifiedName::new("Org.Sales", "Ship"))
            .unwrap()
            .unwrap();
        assert_eq!(actions.len(), 2);
        assert!(!actions[0].is_bound);
        assert!(actions[1].is_bound);
    }

    #[test]
    fn test_default_container() {
        let provider = InMemoryProvider::from_schemas([sales_schema()]);
        let info = provider.get_entity_container_info(None).unwrap().unwrap();
        assert_eq!(info.container_name, QualifiedName::new("Org.Sales", "Service"));

        let entity_set = provider
            .get_entity_set(&info.container_name, "Customers")
            .unwrap();
        assert!(entity_set.is_some());

        let by_name = provider
            .get_entity_container_by_name(&info.container_name)
            .unwrap();
        assert_eq!(by_name.unwrap().entity_sets.len(), 1);
    }

    #[test]
    fn test_annotation_targets_are_alias_normalized() {
        let provider = InMemoryProvider::from_schemas([sales_schema()]);

        let group = provider
            .get_annotations_group("Org.Sales.Customer", None)
            .unwrap()
            .unwrap();
        assert_eq!(group.target, "Org.Sales.Customer");
        assert_eq!(group.annotations.len(), 1);

        let via_alias = provider.get_annotations_group("sales.Customer", None).unwrap();
        assert!(via_alias.is_some());

        let inline = provider.get_annotatable("sales.Customer/Id").unwrap().unwrap();
        assert_eq!(inline[0].term, QualifiedName::new("Core", "Computed"));
    }

    #[test]
    fn test_alias_infos() {
        let provider = InMemoryProvider::from_schemas([sales_schema()]);
        let aliases = provider.get_alias_infos().unwrap();
        assert_eq!(
            aliases,
            vec![CsdlAliasInfo {
                namespace: "Org.Sales".to_string(),
                alias: "sales".to_string(),
            }]
        );
    }
}
