//! Integration tests for annotation groups and target resolution

use edm_core::{AnnotationTarget, Edm};
use edm_csdl::{
    CsdlAction, CsdlActionImport, CsdlAnnotation, CsdlAnnotations, CsdlComplexType,
    CsdlEntityContainer, CsdlEntitySet, CsdlEntityType, CsdlExpression, CsdlFunction,
    CsdlFunctionImport, CsdlProperty, CsdlReturnType, CsdlSchema, CsdlSingleton, CsdlTerm,
    CsdlTypeDefinition, InMemoryProvider, QualifiedName, SchemaLoader,
};
use std::path::PathBuf;
use std::sync::Arc;

fn sales_edm() -> Edm {
    let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data");
    let schemas = SchemaLoader::new(vec![data])
        .load_with_references("Org.Sales")
        .unwrap();
    Edm::new(Arc::new(InMemoryProvider::from_schemas(schemas)))
}

fn ns(name: &str) -> QualifiedName {
    QualifiedName::new("NS", name)
}

/// Names reused across element kinds, to pin the resolution order
fn colliding_edm() -> Edm {
    let schema = CsdlSchema::new("NS")
        .with_entity_type(
            CsdlEntityType::new("Item")
                .with_key(["id"])
                .with_property(CsdlProperty::new("id", "Edm.Int32")),
        )
        .with_complex_type(CsdlComplexType::new("Shape"))
        .with_term(CsdlTerm::new("Thing", "Edm.String"))
        .with_term(CsdlTerm::new("Mark", "Edm.Boolean"))
        .with_type_definition(CsdlTypeDefinition::new("Mark", "Edm.Int32"))
        .with_type_definition(CsdlTypeDefinition::new("Code", "Edm.String"))
        .with_action(CsdlAction::new("Run"))
        .with_function(CsdlFunction::new("Run").with_return_type(CsdlReturnType::new("Edm.Int32")))
        .with_entity_container(
            CsdlEntityContainer::new("Svc")
                .with_entity_set(CsdlEntitySet::new("Thing", ns("Item")))
                .with_entity_set(CsdlEntitySet::new("Shape", ns("Item")))
                .with_singleton(CsdlSingleton::new("Item", ns("Item")))
                .with_action_import(CsdlActionImport::new("Run", ns("Run")))
                .with_function_import(CsdlFunctionImport::new("Run", ns("Run"))),
        );
    Edm::new(Arc::new(InMemoryProvider::from_schemas([schema])))
}

fn kind_of(edm: &Edm, target: &str) -> Option<&'static str> {
    edm.annotation_target(target)
        .unwrap()
        .map(|found| found.kind_name())
}

#[test]
fn test_resolution_order_for_colliding_names() {
    let edm = colliding_edm();
    assert_eq!(kind_of(&edm, "NS.Run"), Some("ActionImport"));
    assert_eq!(kind_of(&edm, "NS.Shape"), Some("ComplexType"));
    assert_eq!(kind_of(&edm, "NS.Thing"), Some("EntitySet"));
    assert_eq!(kind_of(&edm, "NS.Item"), Some("EntityType"));
    assert_eq!(kind_of(&edm, "NS.Mark"), Some("Term"));
    assert_eq!(kind_of(&edm, "NS.Code"), Some("TypeDefinition"));
}

#[test]
fn test_container_targets() {
    let edm = colliding_edm();
    assert_eq!(kind_of(&edm, "NS.Svc"), Some("EntityContainer"));
    assert_eq!(kind_of(&edm, "NS.Svc/Thing"), Some("EntitySet"));
    assert_eq!(kind_of(&edm, "NS.Svc/Item"), Some("Singleton"));
    assert_eq!(kind_of(&edm, "NS.Svc/Run"), Some("ActionImport"));
    assert_eq!(kind_of(&edm, "NS.Svc/Nothing"), None);
}

#[test]
fn test_terms_and_definitions_take_no_path() {
    let edm = colliding_edm();
    assert_eq!(kind_of(&edm, "NS.Mark/x"), None);
    assert_eq!(kind_of(&edm, "NS.Code/x"), None);
    assert_eq!(kind_of(&edm, "Other.Thing"), None);
}

#[test]
fn test_unqualified_target_is_not_found() {
    let edm = colliding_edm();
    assert!(edm.annotation_target("Thing").unwrap().is_none());
    assert!(edm.annotation_target("Svc/Thing").unwrap().is_none());
    assert!(edm.annotation_target("").unwrap().is_none());
}

#[test]
fn test_property_paths() {
    let edm = sales_edm();

    match edm.annotation_target("sales.Customer/Address/City").unwrap() {
        Some(AnnotationTarget::Property(city)) => {
            assert_eq!(city.target_path(), "Org.Common.Address/City");
        }
        other => panic!("expected property, got {other:?}"),
    }

    let customer = edm
        .annotation_target("Org.Sales.Order/Customer")
        .unwrap()
        .unwrap();
    assert_eq!(customer.kind_name(), "NavigationProperty");
    assert_eq!(customer.path(), "Org.Sales.Order/Customer");

    // Through a navigation property into its target type
    match edm.annotation_target("Org.Sales.Customer/Orders/Total").unwrap() {
        Some(AnnotationTarget::Property(total)) => {
            assert_eq!(total.owner(), &QualifiedName::new("Org.Sales", "Order"));
        }
        other => panic!("expected property, got {other:?}"),
    }

    // Inherited property of a derived type
    assert_eq!(kind_of(&edm, "Org.Sales.Customer/Name"), Some("Property"));
    assert_eq!(kind_of(&edm, "Org.Sales.Customer/Missing"), None);
}

#[test]
fn test_enum_member_target() {
    let edm = sales_edm();
    match edm.annotation_target("Org.Common.Status/Retired").unwrap() {
        Some(AnnotationTarget::EnumMember(status, member)) => {
            assert_eq!(status.name(), &QualifiedName::new("Org.Common", "Status"));
            assert_eq!(member.value(), 2);
        }
        other => panic!("expected enum member, got {other:?}"),
    }
    assert_eq!(kind_of(&edm, "Org.Common.Status/Unknown"), None);
}

#[test]
fn test_groups_are_cached_and_alias_insensitive() {
    let edm = sales_edm();
    let group = edm
        .annotations_group("Org.Sales.Customer/Email", None)
        .unwrap()
        .unwrap();
    let by_alias = edm
        .annotations_group("sales.Customer/Email", None)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&group, &by_alias));

    let description = QualifiedName::new("Org.Common", "Description");
    let annotation = group.annotation(&description).unwrap();
    assert_eq!(
        annotation.expression().and_then(|e| e.as_constant()),
        Some("Contact address")
    );

    let term = annotation.term(&edm).unwrap().unwrap();
    assert!(term.applies_to().iter().any(|kind| kind == "Property"));

    match group.target(&edm).unwrap() {
        Some(AnnotationTarget::Property(email)) => assert_eq!(email.name(), "Email"),
        other => panic!("expected property, got {other:?}"),
    }
}

#[test]
fn test_qualified_group() {
    let edm = sales_edm();
    assert!(edm
        .annotations_group("Org.Sales.Service/Customers", None)
        .unwrap()
        .is_none());

    let tablet = edm
        .annotations_group("Org.Sales.Service/Customers", Some("Tablet"))
        .unwrap()
        .unwrap();
    assert_eq!(tablet.qualifier(), Some("Tablet"));
    match tablet.target(&edm).unwrap() {
        Some(AnnotationTarget::EntitySet(customers)) => assert_eq!(customers.name(), "Customers"),
        other => panic!("expected entity set, got {other:?}"),
    }
}

#[test]
fn test_annotations_for_merges_inline_then_external() {
    let description = QualifiedName::new("NS", "Description");
    let schema = CsdlSchema::new("NS")
        .with_term(CsdlTerm::new("Description", "Edm.String"))
        .with_entity_type(
            CsdlEntityType::new("Doc")
                .with_key(["id"])
                .with_property(CsdlProperty::new("id", "Edm.Int32"))
                .with_annotation(
                    CsdlAnnotation::new(description.clone())
                        .with_expression(CsdlExpression::string("inline")),
                ),
        )
        .with_annotations(
            CsdlAnnotations::new("NS.Doc").with_annotation(
                CsdlAnnotation::new(description.clone())
                    .with_qualifier("Print")
                    .with_expression(CsdlExpression::string("external")),
            ),
        );
    let edm = Edm::new(Arc::new(InMemoryProvider::from_schemas([schema])));

    let annotations = edm.annotations_for("NS.Doc").unwrap();
    let values: Vec<_> = annotations
        .iter()
        .map(|a| a.expression().and_then(|e| e.as_constant()).unwrap())
        .collect();
    assert_eq!(values, vec!["inline", "external"]);
    assert_eq!(annotations[1].qualifier(), Some("Print"));

    let doc = edm.entity_type(&ns("Doc")).unwrap().unwrap();
    assert_eq!(doc.annotations().len(), 1);
    assert!(edm.annotations_for("NS.Nothing").unwrap().is_empty());
}

#[test]
fn test_annotations_for_enum_member() {
    let edm = sales_edm();
    let annotations = edm.annotations_for("Org.Common.Status/Retired").unwrap();
    assert_eq!(annotations.len(), 1);
    assert_eq!(
        annotations[0].term_name(),
        &QualifiedName::new("Org.Common", "Description")
    );
}
