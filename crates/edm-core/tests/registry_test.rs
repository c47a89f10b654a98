//! Integration tests for type resolution through the registry
//!
//! The fixture model under `tests/data` spans three documents: a JSON sales
//! schema and two YAML schemas it references.

use edm_core::{
    Edm, EdmConfig, EdmType, Error, PrimitiveTypeKind, PropertyRef, StructuredType, TypeInfo,
    TypeKind,
};
use edm_csdl::{
    CsdlComplexType, CsdlEntityType, CsdlNavigationProperty, CsdlProperty, CsdlPropertyRef,
    CsdlSchema, InMemoryProvider, QualifiedName, SchemaLoader,
};
use std::path::PathBuf;
use std::sync::Arc;

fn test_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
}

fn sales_edm() -> Edm {
    let loader = SchemaLoader::new(vec![test_data()]);
    let schemas = loader.load_with_references("Org.Sales").unwrap();
    Edm::new(Arc::new(InMemoryProvider::from_schemas(schemas)))
}

fn edm_from(schemas: Vec<CsdlSchema>) -> Edm {
    Edm::new(Arc::new(InMemoryProvider::from_schemas(schemas)))
}

fn sales(name: &str) -> QualifiedName {
    QualifiedName::new("Org.Sales", name)
}

#[test]
fn test_same_name_resolves_to_same_node() {
    let edm = sales_edm();
    let first = edm.entity_type(&sales("Customer")).unwrap().unwrap();
    let second = edm.entity_type(&sales("Customer")).unwrap().unwrap();
    let by_alias = edm
        .entity_type(&QualifiedName::new("sales", "Customer"))
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &by_alias));

    let address = QualifiedName::new("Org.Common", "Address");
    let complex = edm.complex_type(&address).unwrap().unwrap();
    let via_property = first
        .structural_property(&edm, "Address")
        .unwrap()
        .unwrap()
        .ty(&edm)
        .unwrap();
    assert!(Arc::ptr_eq(&complex, via_property.as_complex().unwrap()));
}

#[test]
fn test_missing_definitions_are_not_errors() {
    let edm = sales_edm();
    assert!(edm.entity_type(&sales("Invoice")).unwrap().is_none());
    assert!(edm.enum_type(&sales("Customer")).unwrap().is_none());
    assert!(edm.term(&sales("Customer")).unwrap().is_none());
    assert!(edm
        .entity_container(Some(&sales("Backoffice")))
        .unwrap()
        .is_none());
}

#[test]
fn test_inherited_key_from_abstract_base() {
    let edm = sales_edm();
    let customer = edm.entity_type(&sales("Customer")).unwrap().unwrap();
    let keys = customer.key_property_refs(&edm).unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].name(), "Id");
    assert_eq!(keys[0].owner(), &sales("Party"));
    assert_eq!(keys[0].property(&edm).unwrap().name(), "Id");

    // Memoized: same refs on the second call
    let again = customer.key_property_refs(&edm).unwrap();
    assert!(Arc::ptr_eq(&keys[0], &again[0]));
}

#[test]
fn test_own_key_replaces_abstract_base_key() {
    let edm = sales_edm();
    let employee = edm.entity_type(&sales("Employee")).unwrap().unwrap();
    assert_eq!(employee.key_predicate_names(&edm).unwrap(), vec!["BadgeNumber"]);
    assert!(employee
        .key_property_ref(&edm, "Id")
        .unwrap()
        .is_none());
}

#[test]
fn test_concrete_base_key_stands() {
    let edm = sales_edm();
    let rush = edm.entity_type(&sales("RushOrder")).unwrap().unwrap();
    assert_eq!(rush.key_predicate_names(&edm).unwrap(), vec!["Number"]);
    assert_eq!(rush.declared_key_property_refs().len(), 1);
}

#[test]
fn test_key_by_alias_follows_complex_path() {
    let edm = edm_from(vec![CsdlSchema::new("NS")
        .with_complex_type(
            CsdlComplexType::new("Address").with_property(CsdlProperty::new("Zip", "Edm.String")),
        )
        .with_entity_type(
            CsdlEntityType::new("Site")
                .with_key_ref(CsdlPropertyRef::new("Location/Zip").with_alias("Zip"))
                .with_property(CsdlProperty::new("Location", "NS.Address")),
        )]);

    let site = edm
        .entity_type(&QualifiedName::new("NS", "Site"))
        .unwrap()
        .unwrap();
    let by_alias = site.key_property_ref(&edm, "Zip").unwrap().unwrap();
    let by_name = site.key_property_ref(&edm, "Location/Zip").unwrap().unwrap();
    assert!(Arc::ptr_eq(&by_alias, &by_name));
    assert_eq!(by_alias.key_predicate_name(), "Zip");
    assert_eq!(by_alias.property(&edm).unwrap().name(), "Zip");
}

#[test]
fn test_shadowed_property_is_listed_once_and_own_wins() {
    let edm = edm_from(vec![CsdlSchema::new("NS")
        .with_entity_type(
            CsdlEntityType::new("A")
                .with_key(["id"])
                .with_property(CsdlProperty::new("id", "Edm.Int32"))
                .with_property(CsdlProperty::new("x", "Edm.Int32")),
        )
        .with_entity_type(
            CsdlEntityType::new("B")
                .with_base_type(QualifiedName::new("NS", "A"))
                .with_property(CsdlProperty::new("y", "Edm.Boolean"))
                .with_property(CsdlProperty::new("x", "Edm.String")),
        )]);

    let b = edm
        .entity_type(&QualifiedName::new("NS", "B"))
        .unwrap()
        .unwrap();
    assert_eq!(b.property_names(&edm).unwrap(), vec!["id", "x", "y"]);

    let x = b.structural_property(&edm, "x").unwrap().unwrap();
    assert_eq!(x.owner(), &QualifiedName::new("NS", "B"));
    assert_eq!(x.ty(&edm).unwrap().primitive_kind(), Some(PrimitiveTypeKind::String));

    let id = b.structural_property(&edm, "id").unwrap().unwrap();
    assert_eq!(id.owner(), &QualifiedName::new("NS", "A"));
}

#[test]
fn test_self_referential_types_terminate() {
    let edm = sales_edm();
    let customer = edm.entity_type(&sales("Customer")).unwrap().unwrap();

    let referrer = customer.navigation_property(&edm, "Referrer").unwrap().unwrap();
    let target = referrer.target_type(&edm).unwrap();
    assert!(Arc::ptr_eq(&customer, &target));

    // Customer -> Orders -> Customer
    let orders = customer.navigation_property(&edm, "Orders").unwrap().unwrap();
    assert!(orders.is_collection());
    let order = orders.target_type(&edm).unwrap();
    let back = order
        .navigation_property(&edm, "Customer")
        .unwrap()
        .unwrap()
        .target_type(&edm)
        .unwrap();
    assert!(Arc::ptr_eq(&customer, &back));

    let partner = orders.partner(&edm).unwrap().unwrap();
    assert_eq!(partner.name(), "Customer");
    assert!(!partner.is_nullable());
}

#[test]
fn test_cyclic_base_chain_is_an_inheritance_error() {
    let edm = edm_from(vec![CsdlSchema::new("NS")
        .with_complex_type(
            CsdlComplexType::new("Left").with_base_type(QualifiedName::new("NS", "Right")),
        )
        .with_complex_type(
            CsdlComplexType::new("Right").with_base_type(QualifiedName::new("NS", "Left")),
        )]);

    let left = edm
        .complex_type(&QualifiedName::new("NS", "Left"))
        .unwrap()
        .unwrap();
    assert!(matches!(left.ancestors(&edm), Err(Error::Inheritance(_))));
    assert!(matches!(left.property_names(&edm), Err(Error::Inheritance(_))));
}

#[test]
fn test_deep_chain_respects_configured_depth() {
    let mut schema = CsdlSchema::new("NS").with_complex_type(CsdlComplexType::new("T0"));
    for level in 1..=5 {
        schema = schema.with_complex_type(
            CsdlComplexType::new(format!("T{level}"))
                .with_base_type(QualifiedName::new("NS", format!("T{}", level - 1))),
        );
    }
    let provider = Arc::new(InMemoryProvider::from_schemas([schema]));
    let shallow = Edm::with_config(
        provider.clone(),
        EdmConfig::new().with_max_inheritance_depth(3),
    );
    let deep = Edm::new(provider);

    let name = QualifiedName::new("NS", "T5");
    let t5 = shallow.complex_type(&name).unwrap().unwrap();
    assert!(matches!(t5.ancestors(&shallow), Err(Error::Inheritance(_))));

    let t5 = deep.complex_type(&name).unwrap().unwrap();
    assert_eq!(t5.ancestors(&deep).unwrap().len(), 5);
}

#[test]
fn test_base_of_wrong_kind_is_a_definition_error() {
    let edm = edm_from(vec![CsdlSchema::new("NS")
        .with_complex_type(CsdlComplexType::new("Shape"))
        .with_entity_type(
            CsdlEntityType::new("Box")
                .with_key(["id"])
                .with_property(CsdlProperty::new("id", "Edm.Int32"))
                .with_base_type(QualifiedName::new("NS", "Shape")),
        )]);

    let boxed = edm
        .entity_type(&QualifiedName::new("NS", "Box"))
        .unwrap()
        .unwrap();
    assert!(matches!(boxed.base_type(&edm), Err(Error::Definition(_))));
}

#[test]
fn test_compatible_to_walks_base_chain() {
    let edm = sales_edm();
    let customer = edm.entity_type(&sales("Customer")).unwrap().unwrap();
    assert!(customer.compatible_to(&edm, &sales("Party")).unwrap());
    assert!(customer.compatible_to(&edm, &sales("Customer")).unwrap());
    assert!(!customer.compatible_to(&edm, &sales("Order")).unwrap());
    assert!(customer.compatible_to(&edm, &sales("Invoice")).is_err());
}

#[test]
fn test_combined_property_lookup() {
    let edm = sales_edm();
    let order = edm.entity_type(&sales("Order")).unwrap().unwrap();
    assert_eq!(order.kind(), TypeKind::Entity);

    match order.property(&edm, "Lines").unwrap() {
        Some(PropertyRef::Navigation(lines)) => assert!(lines.contains_target()),
        other => panic!("expected navigation property, got {other:?}"),
    }
    let total = order.property(&edm, "Total").unwrap().unwrap();
    assert!(!total.is_navigation());
    assert!(order.property(&edm, "Missing").unwrap().is_none());
    assert_eq!(
        order.navigation_property_names(&edm).unwrap(),
        vec!["Customer", "Lines"]
    );
}

#[test]
fn test_enum_and_type_definition_from_yaml() {
    let edm = sales_edm();
    let status = edm
        .enum_type(&QualifiedName::new("Org.Common", "Status"))
        .unwrap()
        .unwrap();
    assert_eq!(status.underlying_type(), PrimitiveTypeKind::Int32);
    assert_eq!(status.value_of("Retired").unwrap(), 2);
    assert_eq!(status.literal_of(1).unwrap(), "Placed");

    let code = edm
        .type_definition(&QualifiedName::new("Org.Common", "CountryCode"))
        .unwrap()
        .unwrap();
    assert_eq!(code.underlying_type(), PrimitiveTypeKind::String);
    assert_eq!(code.max_length(), Some(2));
}

#[test]
fn test_type_expression_round_trip() {
    let edm = sales_edm();

    let orders = TypeInfo::parse("Collection(Org.Sales.Order)").unwrap();
    assert!(orders.is_collection());
    assert_eq!(orders.name(), &sales("Order"));
    assert_eq!(orders.to_string(), "Collection(Org.Sales.Order)");
    match orders.resolve(&edm).unwrap() {
        Some(EdmType::Entity(order)) => assert_eq!(order.name(), &sales("Order")),
        other => panic!("expected entity type, got {other:?}"),
    }

    let text = TypeInfo::parse("Edm.String").unwrap();
    assert!(!text.is_collection());
    assert_eq!(text.primitive_kind(), Some(PrimitiveTypeKind::String));
    assert_eq!(text.to_string(), "Edm.String");

    let unknown = TypeInfo::parse("Org.Sales.Invoice").unwrap();
    assert!(unknown.resolve(&edm).unwrap().is_none());
}

#[test]
fn test_unresolvable_property_type_is_a_definition_error() {
    let edm = edm_from(vec![CsdlSchema::new("NS").with_complex_type(
        CsdlComplexType::new("Note")
            .with_property(CsdlProperty::new("Body", "NS.Missing"))
            .with_navigation_property(CsdlNavigationProperty::new("Author", "NS.Note")),
    )]);

    let note = edm
        .complex_type(&QualifiedName::new("NS", "Note"))
        .unwrap()
        .unwrap();
    let body = note.structural_property(&edm, "Body").unwrap().unwrap();
    assert!(matches!(body.ty(&edm), Err(Error::Definition(_))));

    // A navigation target must be an entity type
    let author = note.navigation_property(&edm, "Author").unwrap().unwrap();
    assert!(matches!(author.target_type(&edm), Err(Error::Definition(_))));
}
