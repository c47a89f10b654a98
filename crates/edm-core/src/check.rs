//! Whole-model consistency check
//!
//! [`check_model`] resolves every element of every schema the provider can
//! enumerate and collects the definition errors instead of stopping at the
//! first one.

use crate::container::{BindingTarget, EntityContainer};
use crate::edm::Edm;
use crate::operation::Operation;
use crate::schema::EdmSchema;
use crate::types::StructuredType;
use crate::{Error, Result};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// One problem found while checking, with the element that raised it
#[derive(Debug)]
pub struct CheckIssue {
    /// Qualified name or `Name/child` path of the element
    pub element: String,
    pub message: String,
}

impl CheckIssue {
    pub fn new(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.element, self.message)
    }
}

/// Outcome of a model check
#[derive(Debug)]
pub struct CheckReport {
    /// Whether no element raised an error
    pub is_valid: bool,
    /// Number of elements visited
    pub checked: usize,
    pub errors: Vec<CheckIssue>,
    /// Suspicious but resolvable, e.g. ambiguous overloads
    pub warnings: Vec<CheckIssue>,
}

impl CheckReport {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            checked: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_error(&mut self, issue: CheckIssue) {
        self.errors.push(issue);
        self.is_valid = false;
    }

    pub fn add_warning(&mut self, issue: CheckIssue) {
        self.warnings.push(issue);
    }

    /// Count an element; keep its value or record its error
    fn record<T>(&mut self, element: &str, result: Result<T>) -> Option<T> {
        self.checked += 1;
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                debug!(element, %error, "check failed");
                self.add_error(CheckIssue::new(element, error.to_string()));
                None
            }
        }
    }
}

impl Default for CheckReport {
    fn default() -> Self {
        Self::valid()
    }
}

/// Resolve every element of the model and report what fails
pub fn check_model(edm: &Edm) -> CheckReport {
    let mut report = CheckReport::valid();
    let Some(schemas) = report.record("<model>", edm.schemas()) else {
        return report;
    };

    for schema in &schemas {
        info!("Checking schema: {}", schema.namespace());
        check_schema(edm, schema, &mut report);
    }

    info!(
        "Checked {} elements: {} errors, {} warnings",
        report.checked,
        report.errors.len(),
        report.warnings.len()
    );
    report
}

fn check_schema(edm: &Edm, schema: &EdmSchema, report: &mut CheckReport) {
    for name in schema.entity_type_names() {
        let element = name.to_string();
        let Some(Some(entity_type)) = report.record(&element, edm.entity_type(name)) else {
            continue;
        };
        check_structured(edm, entity_type.as_ref(), report);
        if let Some(keys) = report.record(&element, entity_type.key_property_refs(edm)) {
            for key in keys {
                let element = format!("{element}/{}", key.key_predicate_name());
                report.record(&element, key.property(edm));
            }
        }
    }

    for name in schema.complex_type_names() {
        if let Some(Some(complex_type)) = report.record(&name.to_string(), edm.complex_type(name)) {
            check_structured(edm, complex_type.as_ref(), report);
        }
    }

    for name in schema.enum_type_names() {
        report.record(&name.to_string(), edm.enum_type(name));
    }

    for name in schema.type_definition_names() {
        report.record(&name.to_string(), edm.type_definition(name));
    }

    for name in schema.term_names() {
        let element = name.to_string();
        if let Some(Some(term)) = report.record(&element, edm.term(name)) {
            report.record(&element, term.ty(edm));
            report.record(&element, term.base_term(edm));
        }
    }

    for name in schema.action_names() {
        if let Some(actions) = report.record(&name.to_string(), edm.actions(name)) {
            check_overloads(edm, &actions, report);
        }
    }

    for name in schema.function_names() {
        if let Some(functions) = report.record(&name.to_string(), edm.functions(name)) {
            check_overloads(edm, &functions, report);
        }
    }

    if let Some(name) = schema.entity_container_name() {
        let container = report.record(&name.to_string(), schema.entity_container(edm));
        if let Some(Some(container)) = container {
            check_container(edm, &container, report);
        }
    }

    for (target, qualifier) in schema.annotation_groups() {
        let element = match qualifier {
            Some(qualifier) => format!("{target}#{qualifier}"),
            None => target.clone(),
        };
        let group = edm.annotations_group(target, qualifier.as_deref());
        let Some(Some(group)) = report.record(&element, group) else {
            continue;
        };
        if let Some(None) = report.record(&element, group.target(edm)) {
            report.add_warning(CheckIssue::new(element, "annotation target not found"));
        }
    }
}

fn check_structured<T: StructuredType>(edm: &Edm, ty: &T, report: &mut CheckReport) {
    let element = ty.name().to_string();
    if report.record(&element, ty.ancestors(edm)).is_none() {
        return;
    }
    report.record(&element, ty.property_names(edm));

    for property in ty.declared_properties().values() {
        report.record(&property.target_path(), property.ty(edm));
    }
    for navigation in ty.declared_navigation_properties().values() {
        let element = navigation.target_path();
        report.record(&element, navigation.target_type(edm));
        report.record(&element, navigation.partner(edm));
    }
}

fn check_overloads(edm: &Edm, overloads: &[Arc<Operation>], report: &mut CheckReport) {
    let mut signatures = HashSet::new();
    for operation in overloads {
        let element = operation.name().to_string();
        for parameter in operation.parameters() {
            report.record(&format!("{element}/{}", parameter.name()), parameter.ty(edm));
        }
        if let Some(return_type) = operation.return_type() {
            report.record(&element, return_type.ty(edm));
        }

        // Actions are selected by binding alone, functions also by parameter names.
        let binding = operation
            .binding_parameter()
            .map(|parameter| parameter.type_info().to_string());
        let mut names = Vec::new();
        if operation.is_function() {
            names = operation.parameter_names();
            if binding.is_some() {
                names.remove(0);
            }
            names.sort();
        }
        let signature = (binding, names);
        if !signatures.insert(signature) {
            report.add_warning(CheckIssue::new(
                element,
                "ambiguous overload; the first declared one wins",
            ));
        }
    }
}

fn check_container(edm: &Edm, container: &EntityContainer, report: &mut CheckReport) {
    let element = container.name().to_string();
    report.record(&element, container.parent(edm));

    let binding_targets = [container.entity_sets(edm), container.singletons(edm)];
    for targets in binding_targets {
        let Some(targets) = report.record(&element, targets) else {
            continue;
        };
        for target in targets {
            check_binding_target(edm, &target, report);
        }
    }

    if let Some(imports) = report.record(&element, container.action_imports(edm)) {
        for import in imports {
            let element = format!("{}/{}", import.container_name(), import.name());
            report.record(&element, import.unbound_action(edm));
            report.record(&element, import.returned_entity_set(edm));
        }
    }

    if let Some(imports) = report.record(&element, container.function_imports(edm)) {
        for import in imports {
            let element = format!("{}/{}", import.container_name(), import.name());
            let functions = import.unbound_functions(edm).and_then(|functions| {
                if functions.is_empty() {
                    Err(Error::definition(format!(
                        "Cannot find unbound function {} for function import {}",
                        import.function_name(),
                        import.name()
                    )))
                } else {
                    Ok(functions)
                }
            });
            report.record(&element, functions);
            report.record(&element, import.returned_entity_set(edm));
        }
    }
}

fn check_binding_target(edm: &Edm, target: &BindingTarget, report: &mut CheckReport) {
    let element = format!("{}/{}", target.container_name(), target.name());
    report.record(&element, target.entity_type(edm));
    for binding in target.navigation_property_bindings() {
        let element = format!("{element}/{}", binding.path);
        report.record(&element, target.related_binding_target(edm, &binding.path));
    }
}
