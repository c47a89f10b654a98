//! Integration tests for the whole-model check

use edm_core::{check_model, Edm};
use edm_csdl::{
    CsdlAnnotation, CsdlAnnotations, CsdlEntityContainer, CsdlEntitySet, CsdlEntityType,
    CsdlExpression, CsdlFunction, CsdlFunctionImport, CsdlParameter, CsdlProperty,
    CsdlReturnType, CsdlSchema, InMemoryProvider, QualifiedName, SchemaLoader,
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

fn broken_edm() -> Edm {
    let schema = CsdlSchema::new("NS")
        .with_entity_type(
            CsdlEntityType::new("Thing")
                .with_key(["id"])
                .with_property(CsdlProperty::new("id", "Edm.Int32")),
        )
        .with_entity_type(
            CsdlEntityType::new("Orphan")
                .with_base_type(ns("Missing"))
                .with_property(CsdlProperty::new("label", "Edm.String")),
        )
        .with_function(
            CsdlFunction::new("Twice")
                .with_parameter(CsdlParameter::new("x", "Edm.Int32"))
                .with_return_type(CsdlReturnType::new("Edm.Int32")),
        )
        .with_function(
            CsdlFunction::new("Twice")
                .with_parameter(CsdlParameter::new("x", "Edm.Int64"))
                .with_return_type(CsdlReturnType::new("Edm.Int64")),
        )
        .with_entity_container(
            CsdlEntityContainer::new("Svc")
                .with_entity_set(
                    CsdlEntitySet::new("Things", ns("Thing")).with_binding("Ghost", "Nowhere"),
                )
                .with_function_import(CsdlFunctionImport::new("Lost", ns("Lost"))),
        )
        .with_annotations(
            CsdlAnnotations::new("NS.Nowhere").with_annotation(
                CsdlAnnotation::new(ns("Description")).with_expression(CsdlExpression::string("?")),
            ),
        );
    Edm::new(Arc::new(InMemoryProvider::from_schemas([schema])))
}

#[test]
fn test_fixture_model_is_valid() {
    let edm = sales_edm();
    let report = check_model(&edm);

    for issue in report.errors.iter().chain(&report.warnings) {
        eprintln!("{issue}");
    }
    assert!(report.is_valid);
    assert!(!report.has_errors());
    assert!(!report.has_warnings());
    assert!(report.checked > 30);
}

#[test]
fn test_check_is_repeatable() {
    let edm = sales_edm();
    let first = check_model(&edm);
    let second = check_model(&edm);
    assert_eq!(first.checked, second.checked);
    assert_eq!(first.errors.len(), second.errors.len());
}

#[test]
fn test_broken_model_reports_every_element() {
    let edm = broken_edm();
    let report = check_model(&edm);
    assert!(!report.is_valid);

    let failed: Vec<&str> = report.errors.iter().map(|e| e.element.as_str()).collect();
    assert!(failed.contains(&"NS.Orphan"), "{failed:?}");
    assert!(failed.contains(&"NS.Svc/Things/Ghost"), "{failed:?}");
    assert!(failed.contains(&"NS.Svc/Lost"), "{failed:?}");

    // The healthy type still resolves
    assert!(!failed.contains(&"NS.Thing"));
}

#[test]
fn test_broken_model_warnings() {
    let edm = broken_edm();
    let report = check_model(&edm);

    let warned: Vec<String> = report.warnings.iter().map(|w| w.to_string()).collect();
    assert!(
        warned.iter().any(|w| w.starts_with("NS.Twice: ambiguous overload")),
        "{warned:?}"
    );
    assert!(
        warned.iter().any(|w| w == "NS.Nowhere: annotation target not found"),
        "{warned:?}"
    );
}
