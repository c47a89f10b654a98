//! Integration tests for overload selection and operation imports

use edm_core::{Edm, EdmType, Error, OperationKind, StructuredType};
use edm_csdl::{
    CsdlEntityContainer, CsdlEntitySet, CsdlEntityType, CsdlFunction, CsdlNavigationProperty,
    CsdlParameter, CsdlProperty, CsdlReturnType, CsdlSchema, InMemoryProvider, QualifiedName,
    SchemaLoader,
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

fn sales(name: &str) -> QualifiedName {
    QualifiedName::new("Org.Sales", name)
}

#[test]
fn test_bound_action_matches_collection_flag() {
    let edm = sales_edm();

    let single = edm
        .bound_action(&sales("Cancel"), &sales("Order"), false)
        .unwrap()
        .unwrap();
    assert_eq!(single.binding_parameter().unwrap().name(), "order");

    let many = edm
        .bound_action(&sales("Cancel"), &QualifiedName::new("sales", "Order"), true)
        .unwrap()
        .unwrap();
    assert_eq!(many.binding_parameter().unwrap().name(), "orders");

    assert!(edm
        .bound_action(&sales("Cancel"), &sales("Customer"), false)
        .unwrap()
        .is_none());
    assert!(edm.unbound_action(&sales("Cancel")).unwrap().is_none());
}

#[test]
fn test_unbound_action() {
    let edm = sales_edm();
    let ship = edm.unbound_action(&sales("Ship")).unwrap().unwrap();
    assert!(ship.is_action());
    assert!(!ship.is_bound());
    assert!(ship.return_type().is_none());
    assert_eq!(ship.parameter_names(), vec!["carrier"]);
    assert!(edm
        .bound_action(&sales("Ship"), &sales("Order"), false)
        .unwrap()
        .is_none());
}

#[test]
fn test_bound_function_selected_by_remaining_parameter_names() {
    let edm = sales_edm();
    let name = sales("RecentOrders");
    let customer = sales("Customer");

    let plain = edm
        .bound_function(&name, &customer, false, Some(&[]))
        .unwrap()
        .unwrap();
    assert_eq!(plain.parameter_names(), vec!["customer"]);
    assert!(!plain.is_composable());

    let with_days = edm
        .bound_function(&name, &customer, false, Some(&["days"]))
        .unwrap()
        .unwrap();
    assert_eq!(with_days.parameter_names(), vec!["customer", "days"]);
    assert_eq!(with_days.kind(), OperationKind::Function { composable: true });

    // No names at all means the overload without extra parameters
    let unnamed = edm.bound_function(&name, &customer, false, None).unwrap().unwrap();
    assert!(Arc::ptr_eq(&plain, &unnamed));

    assert!(edm
        .bound_function(&name, &customer, false, Some(&["weeks"]))
        .unwrap()
        .is_none());
    assert!(edm
        .bound_function(&name, &customer, false, Some(&["days", "weeks"]))
        .unwrap()
        .is_none());
    assert!(edm
        .bound_function(&name, &customer, true, Some(&["days"]))
        .unwrap()
        .is_none());
}

#[test]
fn test_unbound_function_overloads() {
    let edm = sales_edm();
    let name = sales("TopCustomers");

    assert_eq!(edm.unbound_functions(&name).unwrap().len(), 2);
    let all = edm
        .unbound_function(&name, None)
        .unwrap()
        .unwrap();
    assert!(all.parameter_names().is_empty());

    let limited = edm
        .unbound_function(&name, Some(&["count"]))
        .unwrap()
        .unwrap();
    assert_eq!(limited.parameter("count").unwrap().type_info().to_string(), "Edm.Int32");
    assert!(edm.unbound_function(&name, Some(&["limit"])).unwrap().is_none());
}

#[test]
fn test_overloads_resolve_once() {
    let edm = sales_edm();
    let first = edm.functions(&sales("RecentOrders")).unwrap();
    let second = edm.functions(&QualifiedName::new("sales", "RecentOrders")).unwrap();
    assert_eq!(first.len(), 2);
    assert!(Arc::ptr_eq(&first[0], &second[0]));
    assert!(Arc::ptr_eq(&first[1], &second[1]));
}

#[test]
fn test_parameter_and_return_types_resolve() {
    let edm = sales_edm();
    let function = edm
        .bound_function(&sales("RecentOrders"), &sales("Customer"), false, None)
        .unwrap()
        .unwrap();

    match function.binding_parameter().unwrap().ty(&edm).unwrap() {
        EdmType::Entity(customer) => assert_eq!(customer.name(), &sales("Customer")),
        other => panic!("expected entity type, got {other:?}"),
    }
    let return_type = function.return_type().unwrap();
    assert!(return_type.is_collection());
    assert_eq!(return_type.ty(&edm).unwrap().name(), sales("Order"));
}

#[test]
fn test_returned_binding_target_follows_entity_set_path() {
    let edm = sales_edm();
    let container = edm.entity_container(None).unwrap().unwrap();
    let customers = container.entity_set(&edm, "Customers").unwrap().unwrap();
    let orders = container.entity_set(&edm, "Orders").unwrap().unwrap();
    let function = edm
        .bound_function(&sales("RecentOrders"), &sales("Customer"), false, None)
        .unwrap()
        .unwrap();

    let returned = function
        .returned_binding_target(&edm, &customers)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&returned, &orders));

    let me = container.singleton(&edm, "Me").unwrap().unwrap();
    let returned = function.returned_binding_target(&edm, &me).unwrap().unwrap();
    assert!(Arc::ptr_eq(&returned, &orders));

    // Orders has no binding for the `Orders` path
    assert!(matches!(
        function.returned_binding_target(&edm, &orders),
        Err(Error::Definition(_))
    ));
}

fn entity_set_path_edm() -> Edm {
    let bound = |name: &str, path: &str| {
        CsdlFunction::new(name)
            .bound(true)
            .with_entity_set_path(path)
            .with_parameter(CsdlParameter::new("doc", "NS.Doc"))
            .with_return_type(CsdlReturnType::new("NS.Doc"))
    };
    let schema = CsdlSchema::new("NS")
        .with_entity_type(
            CsdlEntityType::new("Doc")
                .with_key(["id"])
                .with_property(CsdlProperty::new("id", "Edm.Int32"))
                .with_navigation_property(CsdlNavigationProperty::new("related", "NS.Doc")),
        )
        .with_function(bound("Same", "doc"))
        .with_function(bound("Related", "related"))
        .with_function(bound("ViaParameter", "doc/related"))
        .with_function(bound("Unbound", "document"))
        .with_entity_container(
            CsdlEntityContainer::new("Svc")
                .with_entity_set(
                    CsdlEntitySet::new("Docs", QualifiedName::new("NS", "Doc"))
                        .with_binding("related", "Archive"),
                )
                .with_entity_set(CsdlEntitySet::new("Archive", QualifiedName::new("NS", "Doc"))),
        );
    Edm::new(Arc::new(InMemoryProvider::from_schemas([schema])))
}

#[test]
fn test_entity_set_path_with_and_without_binding_parameter() {
    let edm = entity_set_path_edm();
    let container = edm.entity_container(None).unwrap().unwrap();
    let docs = container.entity_set(&edm, "Docs").unwrap().unwrap();
    let archive = container.entity_set(&edm, "Archive").unwrap().unwrap();
    let doc = QualifiedName::new("NS", "Doc");
    let function = |name: &str| {
        edm.bound_function(&QualifiedName::new("NS", name), &doc, false, None)
            .unwrap()
            .unwrap()
    };

    let returned = function("Same").returned_binding_target(&edm, &docs).unwrap().unwrap();
    assert!(Arc::ptr_eq(&returned, &docs));

    // A path that does not start with the parameter name is a binding path
    let returned = function("Related").returned_binding_target(&edm, &docs).unwrap().unwrap();
    assert!(Arc::ptr_eq(&returned, &archive));

    let returned = function("ViaParameter")
        .returned_binding_target(&edm, &docs)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&returned, &archive));

    assert!(matches!(
        function("Unbound").returned_binding_target(&edm, &docs),
        Err(Error::Definition(_))
    ));
}

#[test]
fn test_function_without_return_type_is_rejected() {
    let schema = CsdlSchema::new("NS").with_function(CsdlFunction::new("Broken"));
    let edm = Edm::new(Arc::new(InMemoryProvider::from_schemas([schema])));
    assert!(matches!(
        edm.functions(&QualifiedName::new("NS", "Broken")),
        Err(Error::Definition(_))
    ));
}

#[test]
fn test_operation_imports() {
    let edm = sales_edm();
    let container = edm.entity_container(None).unwrap().unwrap();

    let ship_all = container.action_import(&edm, "ShipAll").unwrap().unwrap();
    let action = ship_all.unbound_action(&edm).unwrap();
    assert_eq!(action.name(), &sales("Ship"));
    assert!(ship_all.returned_entity_set(&edm).unwrap().is_none());

    let top = container.function_import(&edm, "TopCustomers").unwrap().unwrap();
    assert_eq!(top.unbound_functions(&edm).unwrap().len(), 2);
    assert!(top
        .unbound_function(&edm, Some(&["count"]))
        .unwrap()
        .is_some());
    let returned = top.returned_entity_set(&edm).unwrap().unwrap();
    let customers = container.entity_set(&edm, "Customers").unwrap().unwrap();
    assert!(Arc::ptr_eq(&returned, &customers));
}
