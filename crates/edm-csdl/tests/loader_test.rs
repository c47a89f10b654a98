//! Integration tests for schema document loading

use edm_csdl::{EdmProvider, Error, InMemoryProvider, QualifiedName, SchemaLoader};
use std::path::PathBuf;

fn test_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn catalog_provider() -> InMemoryProvider {
    let loader = SchemaLoader::new(vec![test_data()]);
    let schemas = loader.load_with_references("Org.Catalog").unwrap();
    InMemoryProvider::from_schemas(schemas)
}

#[test]
fn test_json_and_yaml_documents_load_together() {
    let provider = catalog_provider();
    assert_eq!(provider.len(), 2);

    let address = provider
        .get_complex_type(&QualifiedName::new("Org.Common", "Address"))
        .unwrap()
        .unwrap();
    assert_eq!(address.properties.len(), 2);

    let status = provider
        .get_enum_type(&QualifiedName::new("Org.Common", "Status"))
        .unwrap()
        .unwrap();
    assert_eq!(status.members[2].name, "Retired");
}

#[test]
fn test_default_container_comes_from_catalog() {
    let provider = catalog_provider();
    let info = provider.get_entity_container_info(None).unwrap().unwrap();
    assert_eq!(info.container_name, QualifiedName::new("Org.Catalog", "Catalog"));
    assert!(info.extends_container.is_none());

    let products = provider
        .get_entity_set(&info.container_name, "Products")
        .unwrap()
        .unwrap();
    assert_eq!(products.navigation_property_bindings[0].target, "Categories");
}

#[test]
fn test_alias_annotation_group_is_found_by_namespace() -> anyhow::Result<()> {
    let provider = catalog_provider();
    let group = provider
        .get_annotations_group("Org.Catalog.Product", None)?
        .expect("group registered under alias target");
    assert_eq!(group.annotations.len(), 1);
    assert_eq!(
        group.annotations[0].term,
        QualifiedName::parse("Org.Common.Description")?
    );
    Ok(())
}

#[test]
fn test_missing_reference_fails_whole_load() {
    let loader = SchemaLoader::new(vec![test_data()]);
    let result = loader.load_provider(&[test_data().join("broken.yaml")]);
    match result {
        Err(Error::Reference(message)) => assert!(message.contains("Org.Missing")),
        other => panic!("Expected Reference error, got {:?}", other.map(|p| p.len())),
    }
}

#[test]
fn test_search_paths_are_extendable() {
    let mut loader = SchemaLoader::new(Vec::new());
    assert!(matches!(loader.load("Org.Common"), Err(Error::NotFound(_))));

    loader.add_path(test_data());
    assert_eq!(loader.schema_paths().len(), 1);
    let schema = loader.load("Org.Common").unwrap();
    assert_eq!(schema.terms[0].applies_to, vec!["EntityType", "Property"]);
}

#[test]
fn test_file_names_match_namespace_ignoring_case() {
    let loader = SchemaLoader::new(vec![test_data()]);

    let schema = loader.load("Org.Inventory").unwrap();
    assert_eq!(schema.entity_types[0].name, "Bin");

    // org.common.yaml is stored lowercase
    let schema = loader.load("Org.Common").unwrap();
    assert_eq!(schema.namespace, "Org.Common");
}
